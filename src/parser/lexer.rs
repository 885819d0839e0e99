//! Logos-based lexer for Solidity
//!
//! Fast tokenization using the logos crate. Keywords are not distinguished
//! at the token level; the parser matches identifier text where grammar
//! position demands a keyword. Trivia tokens are produced by logos and
//! filtered out by [`tokenize`].

use crate::base::Span;
use logos::Logos;

/// A token with its kind, text, and position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Span,
}

/// Token kinds as seen by the parser. `Unknown` covers characters logos
/// could not match; the parser reports them in place.
pub type TokenKind = LogosToken;

impl LogosToken {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            LogosToken::Whitespace | LogosToken::LineComment | LogosToken::BlockComment
        )
    }
}

/// Tokenize an entire string, dropping trivia.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut lexer = LogosToken::lexer(input);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let kind = match result {
            Ok(token) => token,
            Err(()) => LogosToken::Unknown,
        };
        if kind.is_trivia() {
            continue;
        }
        let range = lexer.span();
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            span: Span::new(range.start as u32, range.end as u32),
        });
    }
    tokens
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r"/\*(?:[^*]|\*+[^*/])*\*+/")]
    BlockComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexNumber,

    #[regex(r"[0-9][0-9_]*(\.[0-9_]+)?([eE][+-]?[0-9_]+)?")]
    Number,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[regex(r"'(?:[^'\\\n]|\\.)*'")]
    Str,

    #[regex(r#"hex"[0-9a-fA-F_]*""#)]
    #[regex(r"hex'[0-9a-fA-F_]*'")]
    HexStr,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (longest match wins)
    // =========================================================================
    #[token("=>")]
    FatArrow,

    #[token("==")]
    EqEq,

    #[token("!=")]
    BangEq,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("**")]
    StarStar,

    #[token("++")]
    PlusPlus,

    #[token("--")]
    MinusMinus,

    #[token("+=")]
    PlusEq,

    #[token("-=")]
    MinusEq,

    #[token("*=")]
    StarEq,

    #[token("/=")]
    SlashEq,

    #[token("%=")]
    PercentEq,

    #[token("&&")]
    AmpAmp,

    #[token("||")]
    PipePipe,

    #[token("&=")]
    AmpEq,

    #[token("|=")]
    PipeEq,

    #[token("^=")]
    CaretEq,

    #[token("<<=")]
    ShlEq,

    #[token(">>=")]
    ShrEq,

    #[token("<<")]
    Shl,

    #[token(">>")]
    Shr,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(";")]
    Semi,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("?")]
    Question,

    #[token(":")]
    Colon,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("!")]
    Bang,

    #[token("~")]
    Tilde,

    #[token("&")]
    Amp,

    #[token("|")]
    Pipe,

    #[token("^")]
    Caret,

    /// Catch-all for stray characters; lowest priority so any real token
    /// pattern wins.
    #[regex(r".", priority = 0)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_trivia_is_dropped() {
        let tokens = tokenize("a // comment\n /* block */ b");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "a");
        assert_eq!(tokens[1].text, "b");
    }

    #[test]
    fn test_block_comment_with_stars() {
        assert_eq!(kinds("/* a ** b **/ x"), vec![TokenKind::Ident]);
    }

    #[test]
    fn test_numbers_and_strings() {
        assert_eq!(
            kinds(r#"0x1F 42 1.5e8 "s" 'c' hex"deadbeef""#),
            vec![
                TokenKind::HexNumber,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Str,
                TokenKind::Str,
                TokenKind::HexStr,
            ]
        );
    }

    #[test]
    fn test_punctuation_longest_match() {
        assert_eq!(
            kinds("=> == = ** * <<= <<"),
            vec![
                TokenKind::FatArrow,
                TokenKind::EqEq,
                TokenKind::Eq,
                TokenKind::StarStar,
                TokenKind::Star,
                TokenKind::ShlEq,
                TokenKind::Shl,
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_ranges() {
        let tokens = tokenize("ab cd");
        assert_eq!(tokens[0].span, Span::new(0, 2));
        assert_eq!(tokens[1].span, Span::new(3, 5));
    }
}
