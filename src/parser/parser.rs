//! Recursive descent parser for the Solidity subset the model consumes.
//!
//! Tolerant by construction: errors at source-item and statement level are
//! recorded and skipped past, so one malformed region never loses the rest
//! of the file. Statement/declaration ambiguity is settled by speculative
//! parsing with rollback.

use smol_str::SmolStr;

use crate::base::Span;

use super::ast::*;
use super::error::{ParseError, ParseResult};
use super::helpers::{is_elementary_type_name, is_subdenomination};
use super::lexer::{Token, TokenKind, tokenize};

/// Parse Solidity source into an AST plus recovered errors.
pub fn parse(input: &str) -> ParseResult {
    let tokens = tokenize(input);
    let mut parser = Parser::new(input, tokens);
    let unit = parser.parse_source_unit();
    ParseResult {
        unit,
        errors: parser.errors,
    }
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: Vec<Token<'a>>) -> Self {
        Self {
            src,
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.tokens.get(self.pos + n).map(|t| t.kind)
    }

    fn text(&self) -> &'a str {
        self.tokens.get(self.pos).map(|t| t.text).unwrap_or("")
    }

    fn span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(token) => token.span,
            None => {
                let end = self.src.len() as u32;
                Span::new(end, end)
            }
        }
    }

    fn prev_end(&self) -> u32 {
        if self.pos == 0 {
            return 0;
        }
        self.tokens
            .get(self.pos - 1)
            .map(|t| t.span.end)
            .unwrap_or(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == Some(kind)
    }

    fn at_text(&self, keyword: &str) -> bool {
        self.at(TokenKind::Ident) && self.text() == keyword
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump_any(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn bump(&mut self) -> Span {
        let span = self.span();
        self.bump_any();
        span
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump_any();
            true
        } else {
            false
        }
    }

    fn eat_text(&mut self, keyword: &str) -> bool {
        if self.at_text(keyword) {
            self.bump_any();
            true
        } else {
            false
        }
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.span())
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Span, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected {} but found '{}'", what, self.text())))
        }
    }

    fn expect_text(&mut self, keyword: &str) -> Result<Span, ParseError> {
        if self.at_text(keyword) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!(
                "expected '{}' but found '{}'",
                keyword,
                self.text()
            )))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(SmolStr, Span), ParseError> {
        if self.at(TokenKind::Ident) {
            let name = SmolStr::new(self.text());
            let span = self.bump();
            Ok((name, span))
        } else {
            Err(self.error_here(format!("expected {} but found '{}'", what, self.text())))
        }
    }

    // =========================================================================
    // Error recovery
    // =========================================================================

    fn skip_balanced_braces(&mut self) {
        if !self.eat(TokenKind::LBrace) {
            return;
        }
        let mut depth = 1usize;
        while depth > 0 && !self.at_eof() {
            match self.kind() {
                Some(TokenKind::LBrace) => depth += 1,
                Some(TokenKind::RBrace) => depth -= 1,
                _ => {}
            }
            self.bump_any();
        }
    }

    /// Skip to the start of the next plausible source item.
    fn recover_item(&mut self) {
        const ITEM_STARTS: &[&str] = &[
            "pragma",
            "import",
            "contract",
            "interface",
            "library",
            "abstract",
            "struct",
            "enum",
            "function",
            "using",
        ];
        while !self.at_eof() {
            match self.kind() {
                Some(TokenKind::Semi) => {
                    self.bump_any();
                    return;
                }
                Some(TokenKind::LBrace) => {
                    self.skip_balanced_braces();
                    return;
                }
                Some(TokenKind::Ident) if ITEM_STARTS.contains(&self.text()) => return,
                _ => self.bump_any(),
            }
        }
    }

    /// Skip to the end of a malformed contract part or statement.
    fn recover_block_member(&mut self) {
        while !self.at_eof() {
            match self.kind() {
                Some(TokenKind::Semi) => {
                    self.bump_any();
                    return;
                }
                Some(TokenKind::LBrace) => {
                    self.skip_balanced_braces();
                    return;
                }
                Some(TokenKind::RBrace) => return,
                _ => self.bump_any(),
            }
        }
    }

    // =========================================================================
    // Source unit
    // =========================================================================

    fn parse_source_unit(&mut self) -> SourceUnitNode {
        let mut items = Vec::new();
        while !self.at_eof() {
            let checkpoint = self.pos;
            match self.parse_source_item() {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(error) => {
                    self.errors.push(error);
                    self.recover_item();
                }
            }
            if self.pos == checkpoint {
                self.bump_any();
            }
        }
        SourceUnitNode {
            items,
            span: Span::new(0, self.src.len() as u32),
        }
    }

    fn parse_source_item(&mut self) -> Result<Option<SourceItem>, ParseError> {
        if self.eat(TokenKind::Semi) {
            return Ok(None);
        }
        match self.text() {
            "pragma" => Ok(Some(SourceItem::Pragma(self.parse_pragma()?))),
            "import" => Ok(Some(SourceItem::Import(self.parse_import()?))),
            "contract" | "interface" | "library" | "abstract" => {
                Ok(Some(SourceItem::Contract(self.parse_contract()?)))
            }
            "struct" => Ok(Some(SourceItem::Struct(self.parse_struct()?))),
            "enum" => Ok(Some(SourceItem::Enum(self.parse_enum()?))),
            "function" => Ok(Some(SourceItem::Function(
                self.parse_function(FunctionKind::Function)?,
            ))),
            "using" => {
                // file-level binding, tolerated but not modeled
                let _ = self.parse_using()?;
                Ok(None)
            }
            "error" => {
                let _ = self.parse_error_definition()?;
                Ok(None)
            }
            "event" => {
                let _ = self.parse_event()?;
                Ok(None)
            }
            "type" => {
                // user-defined value type: `type Price is uint128;`
                self.bump_any();
                let _ = self.expect_ident("type name")?;
                self.expect_text("is")?;
                let _ = self.parse_type_name()?;
                self.expect(TokenKind::Semi, "';'")?;
                Ok(None)
            }
            _ => Err(self.error_here(format!(
                "expected pragma, import, or definition but found '{}'",
                self.text()
            ))),
        }
    }

    fn parse_pragma(&mut self) -> Result<PragmaDirective, ParseError> {
        let start = self.expect_text("pragma")?.start;
        let (name, _) = self.expect_ident("pragma name")?;
        let value_start = self.span().start as usize;
        while !self.at(TokenKind::Semi) && !self.at_eof() {
            self.bump_any();
        }
        let value_end = (self.prev_end() as usize).max(value_start);
        let value = self.src[value_start..value_end].trim().to_string();
        let end = self.expect(TokenKind::Semi, "';'")?.end;
        Ok(PragmaDirective {
            name,
            value,
            span: Span::new(start, end),
        })
    }

    fn parse_import(&mut self) -> Result<ImportDirective, ParseError> {
        let start = self.expect_text("import")?.start;
        let mut unit_alias = None;
        let mut symbols = Vec::new();
        let path;
        match self.kind() {
            Some(TokenKind::Str) => {
                path = unquote(self.text());
                self.bump_any();
                if self.eat_text("as") {
                    unit_alias = Some(self.expect_ident("import alias")?.0);
                }
            }
            Some(TokenKind::LBrace) => {
                self.bump_any();
                loop {
                    let (name, _) = self.expect_ident("imported symbol")?;
                    let alias = if self.eat_text("as") {
                        Some(self.expect_ident("symbol alias")?.0)
                    } else {
                        None
                    };
                    symbols.push((name, alias));
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace, "'}'")?;
                self.expect_text("from")?;
                if !self.at(TokenKind::Str) {
                    return Err(self.error_here("expected import path string"));
                }
                path = unquote(self.text());
                self.bump_any();
            }
            Some(TokenKind::Star) => {
                self.bump_any();
                self.expect_text("as")?;
                unit_alias = Some(self.expect_ident("import alias")?.0);
                self.expect_text("from")?;
                if !self.at(TokenKind::Str) {
                    return Err(self.error_here("expected import path string"));
                }
                path = unquote(self.text());
                self.bump_any();
            }
            _ => return Err(self.error_here("expected import path or symbol list")),
        }
        let end = self.expect(TokenKind::Semi, "';'")?.end;
        Ok(ImportDirective {
            path,
            unit_alias,
            symbols,
            span: Span::new(start, end),
        })
    }

    // =========================================================================
    // Contract level
    // =========================================================================

    fn parse_contract(&mut self) -> Result<ContractDefinition, ParseError> {
        let start = self.span().start;
        let kind = if self.eat_text("abstract") {
            self.expect_text("contract")?;
            ContractKind::AbstractContract
        } else if self.eat_text("contract") {
            ContractKind::Contract
        } else if self.eat_text("interface") {
            ContractKind::Interface
        } else {
            self.expect_text("library")?;
            ContractKind::Library
        };
        let (name, _) = self.expect_ident("contract name")?;

        let mut bases = Vec::new();
        if self.eat_text("is") {
            loop {
                bases.push(self.parse_inheritance_specifier()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut parts = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let checkpoint = self.pos;
            match self.parse_contract_part() {
                Ok(Some(part)) => parts.push(part),
                Ok(None) => {}
                Err(error) => {
                    self.errors.push(error);
                    self.recover_block_member();
                }
            }
            if self.pos == checkpoint {
                self.bump_any();
            }
        }
        let end = if self.at(TokenKind::RBrace) {
            self.bump().end
        } else {
            self.errors
                .push(self.error_here(format!("unclosed body of {} '{}'", kind.as_str(), name)));
            self.prev_end()
        };

        Ok(ContractDefinition {
            kind,
            name,
            bases,
            parts,
            span: Span::new(start, end),
        })
    }

    fn parse_inheritance_specifier(&mut self) -> Result<InheritanceSpecifier, ParseError> {
        let start = self.span().start;
        let name = self.parse_name_path()?;
        let mut arguments = Vec::new();
        if self.eat(TokenKind::LParen) {
            if !self.at(TokenKind::RParen) {
                loop {
                    arguments.push(self.parse_expression()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
        }
        Ok(InheritanceSpecifier {
            name,
            arguments,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_contract_part(&mut self) -> Result<Option<ContractPart>, ParseError> {
        if self.eat(TokenKind::Semi) {
            return Ok(None);
        }
        match self.text() {
            "struct" => Ok(Some(ContractPart::Struct(self.parse_struct()?))),
            "enum" => Ok(Some(ContractPart::Enum(self.parse_enum()?))),
            "event" => Ok(Some(ContractPart::Event(self.parse_event()?))),
            "error" => Ok(Some(ContractPart::ErrorDef(self.parse_error_definition()?))),
            "using" => Ok(self.parse_using()?.map(ContractPart::UsingFor)),
            "modifier" => Ok(Some(ContractPart::Function(
                self.parse_function(FunctionKind::Modifier)?,
            ))),
            "function" => Ok(Some(ContractPart::Function(
                self.parse_function(FunctionKind::Function)?,
            ))),
            "constructor" => Ok(Some(ContractPart::Function(
                self.parse_function(FunctionKind::Constructor)?,
            ))),
            "fallback" if self.nth_kind(1) == Some(TokenKind::LParen) => Ok(Some(
                ContractPart::Function(self.parse_function(FunctionKind::Fallback)?),
            )),
            "receive" if self.nth_kind(1) == Some(TokenKind::LParen) => Ok(Some(
                ContractPart::Function(self.parse_function(FunctionKind::Receive)?),
            )),
            _ => Ok(Some(ContractPart::StateVariable(
                self.parse_state_variable()?,
            ))),
        }
    }

    fn parse_struct(&mut self) -> Result<StructDefinition, ParseError> {
        let start = self.expect_text("struct")?.start;
        let (name, _) = self.expect_ident("struct name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let member_start = self.span().start;
            let type_name = self.parse_type_name()?;
            let storage_location = self.parse_storage_location();
            let (member_name, _) = self.expect_ident("struct member name")?;
            let end = self.expect(TokenKind::Semi, "';'")?.end;
            members.push(VariableDeclaration {
                name: Some(member_name),
                type_name,
                visibility: None,
                mutability: None,
                storage_location,
                indexed: false,
                span: Span::new(member_start, end),
            });
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.end;
        Ok(StructDefinition {
            name,
            members,
            span: Span::new(start, end),
        })
    }

    fn parse_enum(&mut self) -> Result<EnumDefinition, ParseError> {
        let start = self.expect_text("enum")?.start;
        let (name, _) = self.expect_ident("enum name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut values = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            values.push(self.expect_ident("enum value")?.0);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(TokenKind::RBrace, "'}'")?.end;
        Ok(EnumDefinition {
            name,
            values,
            span: Span::new(start, end),
        })
    }

    fn parse_event(&mut self) -> Result<EventDefinition, ParseError> {
        let start = self.expect_text("event")?.start;
        let (name, _) = self.expect_ident("event name")?;
        let parameters = self.parse_parameter_list(true)?;
        let anonymous = self.eat_text("anonymous");
        let end = self.expect(TokenKind::Semi, "';'")?.end;
        Ok(EventDefinition {
            name,
            parameters,
            anonymous,
            span: Span::new(start, end),
        })
    }

    fn parse_error_definition(&mut self) -> Result<ErrorDefinition, ParseError> {
        let start = self.expect_text("error")?.start;
        let (name, _) = self.expect_ident("error name")?;
        let parameters = self.parse_parameter_list(false)?;
        let end = self.expect(TokenKind::Semi, "';'")?.end;
        Ok(ErrorDefinition {
            name,
            parameters,
            span: Span::new(start, end),
        })
    }

    fn parse_using(&mut self) -> Result<Option<UsingForDirective>, ParseError> {
        let start = self.expect_text("using")?.start;
        if self.at(TokenKind::LBrace) {
            // `using {f, g} for T;` free-function binding, not modeled
            self.skip_balanced_braces();
            self.expect_text("for")?;
            if !self.eat(TokenKind::Star) {
                let _ = self.parse_type_name()?;
            }
            let _ = self.eat_text("global");
            self.expect(TokenKind::Semi, "';'")?;
            return Ok(None);
        }
        let library = self.parse_name_path()?;
        self.expect_text("for")?;
        let type_name = if self.eat(TokenKind::Star) {
            None
        } else {
            Some(self.parse_type_name()?)
        };
        let _ = self.eat_text("global");
        let end = self.expect(TokenKind::Semi, "';'")?.end;
        Ok(Some(UsingForDirective {
            library,
            type_name,
            span: Span::new(start, end),
        }))
    }

    fn parse_state_variable(&mut self) -> Result<VariableDeclaration, ParseError> {
        let start = self.span().start;
        let type_name = self.parse_type_name()?;
        let mut visibility = None;
        let mut mutability = None;
        loop {
            match self.text() {
                "public" => visibility = Some(Visibility::Public),
                "private" => visibility = Some(Visibility::Private),
                "internal" => visibility = Some(Visibility::Internal),
                "external" => visibility = Some(Visibility::External),
                "constant" | "immutable" => mutability = Some(StateMutability::Constant),
                "override" => {
                    self.bump_any();
                    if self.eat(TokenKind::LParen) {
                        while !self.at(TokenKind::RParen) && !self.at_eof() {
                            self.bump_any();
                        }
                        self.expect(TokenKind::RParen, "')'")?;
                    }
                    continue;
                }
                _ => break,
            }
            self.bump_any();
        }
        let (name, _) = self.expect_ident("state variable name")?;
        if self.eat(TokenKind::Eq) {
            let _ = self.parse_expression()?;
        }
        let end = self.expect(TokenKind::Semi, "';'")?.end;
        Ok(VariableDeclaration {
            name: Some(name),
            type_name,
            visibility,
            mutability,
            storage_location: None,
            indexed: false,
            span: Span::new(start, end),
        })
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_function(&mut self, kind: FunctionKind) -> Result<FunctionDefinition, ParseError> {
        let start = self.bump().start; // keyword
        let name = match kind {
            FunctionKind::Function | FunctionKind::Modifier => {
                Some(self.expect_ident("name")?.0)
            }
            _ => None,
        };
        let parameters = if self.at(TokenKind::LParen) {
            self.parse_parameter_list(false)?
        } else {
            Vec::new()
        };

        let mut visibility = None;
        let mut mutability = None;
        let mut is_virtual = false;
        let mut modifiers = Vec::new();
        let mut returns = Vec::new();
        while self.at(TokenKind::Ident) {
            match self.text() {
                "public" => {
                    visibility = Some(Visibility::Public);
                    self.bump_any();
                }
                "private" => {
                    visibility = Some(Visibility::Private);
                    self.bump_any();
                }
                "internal" => {
                    visibility = Some(Visibility::Internal);
                    self.bump_any();
                }
                "external" => {
                    visibility = Some(Visibility::External);
                    self.bump_any();
                }
                "pure" => {
                    mutability = Some(StateMutability::Pure);
                    self.bump_any();
                }
                "view" => {
                    mutability = Some(StateMutability::View);
                    self.bump_any();
                }
                "payable" => {
                    mutability = Some(StateMutability::Payable);
                    self.bump_any();
                }
                "constant" => {
                    mutability = Some(StateMutability::Constant);
                    self.bump_any();
                }
                "virtual" => {
                    is_virtual = true;
                    self.bump_any();
                }
                "override" => {
                    self.bump_any();
                    if self.eat(TokenKind::LParen) {
                        while !self.at(TokenKind::RParen) && !self.at_eof() {
                            self.bump_any();
                        }
                        self.expect(TokenKind::RParen, "')'")?;
                    }
                }
                "returns" => {
                    self.bump_any();
                    returns = self.parse_parameter_list(false)?;
                }
                _ => {
                    let invocation_start = self.span().start;
                    let name = self.parse_name_path()?;
                    let mut arguments = Vec::new();
                    if self.eat(TokenKind::LParen) {
                        if !self.at(TokenKind::RParen) {
                            loop {
                                arguments.push(self.parse_expression()?);
                                if !self.eat(TokenKind::Comma) {
                                    break;
                                }
                            }
                        }
                        self.expect(TokenKind::RParen, "')'")?;
                    }
                    modifiers.push(ModifierInvocation {
                        name,
                        arguments,
                        span: Span::new(invocation_start, self.prev_end()),
                    });
                }
            }
        }

        let body = if self.eat(TokenKind::Semi) {
            None
        } else if self.at(TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            return Err(self.error_here(format!(
                "expected function body or ';' but found '{}'",
                self.text()
            )));
        };
        Ok(FunctionDefinition {
            kind,
            name,
            parameters,
            returns,
            visibility,
            mutability,
            is_virtual,
            modifiers,
            body,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_parameter_list(
        &mut self,
        allow_indexed: bool,
    ) -> Result<Vec<VariableDeclaration>, ParseError> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut parameters = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                parameters.push(self.parse_parameter(allow_indexed)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(parameters)
    }

    fn parse_parameter(&mut self, allow_indexed: bool) -> Result<VariableDeclaration, ParseError> {
        let start = self.span().start;
        let type_name = self.parse_type_name()?;
        let mut storage_location = None;
        let mut indexed = false;
        loop {
            if let Some(location) = self.parse_storage_location() {
                storage_location = Some(location);
            } else if allow_indexed && self.at_text("indexed") {
                indexed = true;
                self.bump_any();
            } else {
                break;
            }
        }
        let name = if self.at(TokenKind::Ident) {
            let (name, _) = self.expect_ident("parameter name")?;
            Some(name)
        } else {
            None
        };
        Ok(VariableDeclaration {
            name,
            type_name,
            visibility: None,
            mutability: None,
            storage_location,
            indexed,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_storage_location(&mut self) -> Option<StorageLocation> {
        let location = match self.text() {
            "memory" => StorageLocation::Memory,
            "storage" => StorageLocation::Storage,
            "calldata" => StorageLocation::Calldata,
            _ => return None,
        };
        if self.at(TokenKind::Ident) {
            self.bump_any();
            Some(location)
        } else {
            None
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_name_path(&mut self) -> Result<SmolStr, ParseError> {
        let (first, _) = self.expect_ident("name")?;
        let mut path = first.to_string();
        while self.at(TokenKind::Dot) && self.nth_kind(1) == Some(TokenKind::Ident) {
            self.bump_any();
            path.push('.');
            path.push_str(self.text());
            self.bump_any();
        }
        Ok(SmolStr::new(path))
    }

    fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let mut type_name = self.parse_type_name_atom()?;
        while self.at(TokenKind::LBracket) {
            self.bump_any();
            let length = if self.at(TokenKind::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expression()?))
            };
            self.expect(TokenKind::RBracket, "']'")?;
            type_name = TypeName::Array {
                base: Box::new(type_name),
                length,
            };
        }
        Ok(type_name)
    }

    fn parse_type_name_atom(&mut self) -> Result<TypeName, ParseError> {
        if !self.at(TokenKind::Ident) {
            return Err(self.error_here(format!("expected type name but found '{}'", self.text())));
        }
        match self.text() {
            "mapping" => {
                self.bump_any();
                self.expect(TokenKind::LParen, "'('")?;
                let key = self.parse_type_name()?;
                // 0.8.18 named mapping parameters
                if self.at(TokenKind::Ident) {
                    self.bump_any();
                }
                self.expect(TokenKind::FatArrow, "'=>'")?;
                let value = self.parse_type_name()?;
                if self.at(TokenKind::Ident) {
                    self.bump_any();
                }
                self.expect(TokenKind::RParen, "')'")?;
                Ok(TypeName::Mapping {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            "function" => {
                self.bump_any();
                self.expect(TokenKind::LParen, "'('")?;
                let mut parameters = Vec::new();
                if !self.at(TokenKind::RParen) {
                    loop {
                        parameters.push(self.parse_type_name()?);
                        let _ = self.parse_storage_location();
                        if self.at(TokenKind::Ident) {
                            self.bump_any();
                        }
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RParen, "')'")?;
                while matches!(
                    self.text(),
                    "internal" | "external" | "pure" | "view" | "payable"
                ) {
                    self.bump_any();
                }
                let mut function_returns = Vec::new();
                if self.eat_text("returns") {
                    self.expect(TokenKind::LParen, "'('")?;
                    if !self.at(TokenKind::RParen) {
                        loop {
                            function_returns.push(self.parse_type_name()?);
                            let _ = self.parse_storage_location();
                            if self.at(TokenKind::Ident) {
                                self.bump_any();
                            }
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                }
                Ok(TypeName::FunctionType {
                    parameters,
                    returns: function_returns,
                })
            }
            text if is_elementary_type_name(text) => {
                let name = SmolStr::new(text);
                self.bump_any();
                if name == "address" {
                    let _ = self.eat_text("payable");
                }
                Ok(TypeName::Elementary { name })
            }
            _ => {
                let name_path = self.parse_name_path()?;
                Ok(TypeName::UserDefined { name_path })
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect(TokenKind::LBrace, "'{'")?.start;
        let mut statements = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let checkpoint = self.pos;
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(error) => {
                    self.errors.push(error);
                    self.recover_block_member();
                }
            }
            if self.pos == checkpoint {
                self.bump_any();
            }
        }
        let end = if self.at(TokenKind::RBrace) {
            self.bump().end
        } else {
            self.errors.push(self.error_here("unclosed block"));
            self.prev_end()
        };
        Ok(Block {
            statements,
            span: Span::new(start, end),
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        if self.at(TokenKind::LBrace) {
            return Ok(Statement::Block(self.parse_block()?));
        }
        match self.text() {
            "if" => self.parse_if(),
            "while" => self.parse_while(),
            "do" => self.parse_do_while(),
            "for" => self.parse_for(),
            "return" => {
                let start = self.bump().start;
                let value = if self.at(TokenKind::Semi) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                let end = self.expect(TokenKind::Semi, "';'")?.end;
                Ok(Statement::Return {
                    value,
                    span: Span::new(start, end),
                })
            }
            "emit" => {
                let start = self.bump().start;
                let call = self.parse_expression()?;
                let end = self.expect(TokenKind::Semi, "';'")?.end;
                Ok(Statement::Emit {
                    call,
                    span: Span::new(start, end),
                })
            }
            "revert" if self.nth_kind(1) == Some(TokenKind::Ident) => {
                // `revert CustomError(...)`; plain `revert(...)` stays an expression
                let start = self.bump().start;
                let call = self.parse_expression()?;
                let end = self.expect(TokenKind::Semi, "';'")?.end;
                Ok(Statement::Revert {
                    call,
                    span: Span::new(start, end),
                })
            }
            "break" => {
                let span = self.bump();
                let end = self.expect(TokenKind::Semi, "';'")?.end;
                Ok(Statement::Break {
                    span: Span::new(span.start, end),
                })
            }
            "continue" => {
                let span = self.bump();
                let end = self.expect(TokenKind::Semi, "';'")?.end;
                Ok(Statement::Continue {
                    span: Span::new(span.start, end),
                })
            }
            "try" => self.parse_try(),
            "unchecked" => {
                let start = self.bump().start;
                let block = self.parse_block()?;
                let span = Span::new(start, block.span.end);
                Ok(Statement::Unchecked { block, span })
            }
            "assembly" => self.parse_assembly(),
            _ => {
                let statement = self.parse_simple_statement()?;
                let end = self.expect(TokenKind::Semi, "';'")?.end;
                Ok(respan_simple(statement, end))
            }
        }
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_text("if")?.start;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat_text("else") {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_while(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_text("while")?.start;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While {
            condition,
            body,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_do_while(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_text("do")?.start;
        let body = Box::new(self.parse_statement()?);
        self.expect_text("while")?;
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let end = self.expect(TokenKind::Semi, "';'")?.end;
        Ok(Statement::DoWhile {
            body,
            condition,
            span: Span::new(start, end),
        })
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_text("for")?.start;
        self.expect(TokenKind::LParen, "'('")?;
        let init = if self.eat(TokenKind::Semi) {
            None
        } else {
            let statement = self.parse_simple_statement()?;
            self.expect(TokenKind::Semi, "';'")?;
            Some(Box::new(statement))
        };
        let condition = if self.at(TokenKind::Semi) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semi, "';'")?;
        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::For {
            init,
            condition,
            update,
            body,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_try(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_text("try")?.start;
        let expression = self.parse_expression()?;
        if self.eat_text("returns") {
            let _ = self.parse_parameter_list(false)?;
        }
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.eat_text("catch") {
            if self.at(TokenKind::Ident) && self.nth_kind(1) == Some(TokenKind::LParen) {
                self.bump_any(); // Error / Panic
            }
            if self.at(TokenKind::LParen) {
                let _ = self.parse_parameter_list(false)?;
            }
            catches.push(self.parse_block()?);
        }
        Ok(Statement::Try {
            expression,
            body,
            catches,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_assembly(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_text("assembly")?.start;
        let dialect = if self.at(TokenKind::Str) {
            let dialect = unquote(self.text());
            self.bump_any();
            Some(dialect)
        } else {
            None
        };
        if self.eat(TokenKind::LParen) {
            while !self.at(TokenKind::RParen) && !self.at_eof() {
                self.bump_any();
            }
            self.expect(TokenKind::RParen, "')'")?;
        }
        if !self.at(TokenKind::LBrace) {
            return Err(self.error_here("expected assembly block"));
        }
        self.skip_balanced_braces();
        Ok(Statement::InlineAssembly {
            dialect,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_simple_statement(&mut self) -> Result<Statement, ParseError> {
        if let Some(statement) = self.try_variable_definition()? {
            return Ok(statement);
        }
        let start = self.span().start;
        let expression = self.parse_expression()?;
        let span = Span::new(start, expression.span().end);
        Ok(Statement::Expression { expression, span })
    }

    /// Speculatively parse `Type [location] name [= init]`; rolls back and
    /// returns `None` when the tokens turn out to be an expression.
    fn try_variable_definition(&mut self) -> Result<Option<Statement>, ParseError> {
        let save = self.pos;
        let errors_len = self.errors.len();
        let start = self.span().start;

        if self.at(TokenKind::LParen) {
            match self.try_tuple_variable_definition()? {
                Some(statement) => return Ok(Some(statement)),
                None => {
                    self.pos = save;
                    self.errors.truncate(errors_len);
                    return Ok(None);
                }
            }
        }

        let Ok(type_name) = self.parse_type_name() else {
            self.pos = save;
            self.errors.truncate(errors_len);
            return Ok(None);
        };
        let storage_location = self.parse_storage_location();
        if !self.at(TokenKind::Ident)
            || !matches!(
                self.nth_kind(1),
                Some(TokenKind::Eq) | Some(TokenKind::Semi)
            )
        {
            self.pos = save;
            self.errors.truncate(errors_len);
            return Ok(None);
        }
        let (name, name_span) = self.expect_ident("variable name")?;
        let declaration = VariableDeclaration {
            name: Some(name),
            type_name,
            visibility: None,
            mutability: None,
            storage_location,
            indexed: false,
            span: Span::new(start, name_span.end),
        };
        let initializer = if self.eat(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Some(Statement::VariableDefinition {
            declarations: vec![Some(declaration)],
            initializer,
            span: Span::new(start, self.prev_end()),
        }))
    }

    fn try_tuple_variable_definition(&mut self) -> Result<Option<Statement>, ParseError> {
        let save = self.pos;
        let start = self.span().start;
        self.bump_any(); // '('
        let mut declarations: Vec<Option<VariableDeclaration>> = Vec::new();
        loop {
            if self.at(TokenKind::Comma) {
                declarations.push(None);
                self.bump_any();
                continue;
            }
            if self.at(TokenKind::RParen) {
                break;
            }
            let slot_start = self.span().start;
            let Ok(type_name) = self.parse_type_name() else {
                self.pos = save;
                return Ok(None);
            };
            let storage_location = self.parse_storage_location();
            if !self.at(TokenKind::Ident) {
                self.pos = save;
                return Ok(None);
            }
            let (name, name_span) = self.expect_ident("variable name")?;
            declarations.push(Some(VariableDeclaration {
                name: Some(name),
                type_name,
                visibility: None,
                mutability: None,
                storage_location,
                indexed: false,
                span: Span::new(slot_start, name_span.end),
            }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if !self.at(TokenKind::RParen) {
            self.pos = save;
            return Ok(None);
        }
        self.bump_any();
        if !self.eat(TokenKind::Eq) {
            self.pos = save;
            return Ok(None);
        }
        let initializer = self.parse_expression()?;
        Ok(Some(Statement::VariableDefinition {
            declarations,
            initializer: Some(initializer),
            span: Span::new(start, self.prev_end()),
        }))
    }

    // =========================================================================
    // Expressions (Pratt)
    // =========================================================================

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some(kind) = self.kind() else { break };
            if kind == TokenKind::Question {
                const COND_LBP: u8 = 3;
                if COND_LBP < min_bp {
                    break;
                }
                self.bump_any();
                let true_expression = self.parse_expr_bp(0)?;
                self.expect(TokenKind::Colon, "':'")?;
                let false_expression = self.parse_expr_bp(COND_LBP - 1)?;
                let span = lhs.span().cover(false_expression.span());
                lhs = Expression::Conditional {
                    condition: Box::new(lhs),
                    true_expression: Box::new(true_expression),
                    false_expression: Box::new(false_expression),
                    span,
                };
                continue;
            }
            let Some((lbp, rbp)) = binary_binding_power(kind) else {
                break;
            };
            if lbp < min_bp {
                break;
            }
            let operator = SmolStr::new(self.text());
            let is_assignment = is_assignment_operator(kind);
            self.bump_any();
            let rhs = self.parse_expr_bp(rbp)?;
            let span = lhs.span().cover(rhs.span());
            lhs = if is_assignment {
                Expression::Assignment {
                    operator,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    span,
                }
            } else {
                Expression::Binary {
                    operator,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    span,
                }
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let start = self.span().start;
        match self.kind() {
            Some(
                TokenKind::Bang
                | TokenKind::Tilde
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus,
            ) => {
                let operator = SmolStr::new(self.text());
                self.bump_any();
                let operand = self.parse_unary()?;
                let span = Span::new(start, operand.span().end);
                Ok(Expression::Unary {
                    operator,
                    prefix: true,
                    operand: Box::new(operand),
                    span,
                })
            }
            Some(TokenKind::Ident) if self.text() == "delete" => {
                let operator = SmolStr::new("delete");
                self.bump_any();
                let operand = self.parse_unary()?;
                let span = Span::new(start, operand.span().end);
                Ok(Expression::Unary {
                    operator,
                    prefix: true,
                    operand: Box::new(operand),
                    span,
                })
            }
            Some(TokenKind::Ident) if self.text() == "new" => {
                self.bump_any();
                let type_name = self.parse_type_name()?;
                let expression = Expression::New {
                    type_name,
                    span: Span::new(start, self.prev_end()),
                };
                self.parse_postfix(expression)
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    fn parse_postfix(&mut self, mut expression: Expression) -> Result<Expression, ParseError> {
        loop {
            match self.kind() {
                Some(TokenKind::Dot) => {
                    self.bump_any();
                    let (member, member_span) = self.expect_ident("member name")?;
                    let span = expression.span().cover(member_span);
                    expression = Expression::MemberAccess {
                        expression: Box::new(expression),
                        member,
                        span,
                    };
                }
                Some(TokenKind::LBracket) => {
                    self.bump_any();
                    let index = if self.at(TokenKind::RBracket) {
                        None
                    } else {
                        let index = self.parse_expression()?;
                        // tolerate slice syntax `a[1:2]`
                        if self.eat(TokenKind::Colon) && !self.at(TokenKind::RBracket) {
                            let _ = self.parse_expression()?;
                        }
                        Some(Box::new(index))
                    };
                    let end = self.expect(TokenKind::RBracket, "']'")?.end;
                    let span = Span::new(expression.span().start, end);
                    expression = Expression::IndexAccess {
                        base: Box::new(expression),
                        index,
                        span,
                    };
                }
                Some(TokenKind::LParen) => {
                    self.bump_any();
                    let mut arguments = Vec::new();
                    let mut named_arguments = Vec::new();
                    if self.at(TokenKind::LBrace) {
                        named_arguments = self.parse_name_value_pairs()?;
                    } else if !self.at(TokenKind::RParen) {
                        loop {
                            arguments.push(self.parse_expression()?);
                            if !self.eat(TokenKind::Comma) {
                                break;
                            }
                        }
                    }
                    let end = self.expect(TokenKind::RParen, "')'")?.end;
                    let span = Span::new(expression.span().start, end);
                    expression = Expression::FunctionCall {
                        expression: Box::new(expression),
                        arguments,
                        named_arguments,
                        span,
                    };
                }
                Some(TokenKind::LBrace)
                    if self.nth_kind(1) == Some(TokenKind::Ident)
                        && self.nth_kind(2) == Some(TokenKind::Colon) =>
                {
                    let arguments = self.parse_name_value_pairs()?;
                    let span = Span::new(expression.span().start, self.prev_end());
                    expression = Expression::NameValue {
                        expression: Box::new(expression),
                        arguments,
                        span,
                    };
                }
                Some(TokenKind::PlusPlus | TokenKind::MinusMinus) => {
                    let operator = SmolStr::new(self.text());
                    let op_span = self.bump();
                    let span = expression.span().cover(op_span);
                    expression = Expression::Unary {
                        operator,
                        prefix: false,
                        operand: Box::new(expression),
                        span,
                    };
                }
                _ => break,
            }
        }
        Ok(expression)
    }

    fn parse_name_value_pairs(&mut self) -> Result<Vec<(SmolStr, Expression)>, ParseError> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut pairs = Vec::new();
        while !self.at(TokenKind::RBrace) && !self.at_eof() {
            let (name, _) = self.expect_ident("argument name")?;
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expression()?;
            pairs.push((name, value));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(pairs)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let span = self.span();
        match self.kind() {
            Some(TokenKind::Number) => {
                let value = SmolStr::new(self.text());
                self.bump_any();
                let subdenomination =
                    if self.at(TokenKind::Ident) && is_subdenomination(self.text()) {
                        let sub = SmolStr::new(self.text());
                        self.bump_any();
                        Some(sub)
                    } else {
                        None
                    };
                Ok(Expression::NumberLiteral {
                    value,
                    subdenomination,
                    span: Span::new(span.start, self.prev_end()),
                })
            }
            Some(TokenKind::HexNumber) => {
                let value = SmolStr::new(self.text());
                self.bump_any();
                Ok(Expression::NumberLiteral {
                    value,
                    subdenomination: None,
                    span,
                })
            }
            Some(TokenKind::Str) => {
                let value = unquote(self.text());
                self.bump_any();
                Ok(Expression::StringLiteral { value, span })
            }
            Some(TokenKind::HexStr) => {
                let value = self.text().to_string();
                self.bump_any();
                Ok(Expression::HexLiteral { value, span })
            }
            Some(TokenKind::Ident) => match self.text() {
                "true" => {
                    self.bump_any();
                    Ok(Expression::BoolLiteral { value: true, span })
                }
                "false" => {
                    self.bump_any();
                    Ok(Expression::BoolLiteral { value: false, span })
                }
                text if is_elementary_type_name(text) => {
                    let name = SmolStr::new(text);
                    self.bump_any();
                    if name == "address" {
                        let _ = self.eat_text("payable");
                    }
                    Ok(Expression::ElementaryType {
                        name,
                        span: Span::new(span.start, self.prev_end()),
                    })
                }
                text => {
                    let name = SmolStr::new(text);
                    self.bump_any();
                    Ok(Expression::Identifier { name, span })
                }
            },
            Some(TokenKind::LParen) => self.parse_tuple_expression(),
            Some(TokenKind::LBracket) => {
                let start = self.bump().start;
                let mut elements = Vec::new();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(TokenKind::RBracket, "']'")?.end;
                Ok(Expression::ArrayLiteral {
                    elements,
                    span: Span::new(start, end),
                })
            }
            _ => Err(self.error_here(format!(
                "expected expression but found '{}'",
                self.text()
            ))),
        }
    }

    fn parse_tuple_expression(&mut self) -> Result<Expression, ParseError> {
        let start = self.expect(TokenKind::LParen, "'('")?.start;
        let mut components: Vec<Option<Expression>> = Vec::new();
        let mut saw_comma = false;
        while !self.at(TokenKind::RParen) && !self.at_eof() {
            if self.at(TokenKind::Comma) {
                components.push(None);
                saw_comma = true;
                self.bump_any();
                continue;
            }
            components.push(Some(self.parse_expression()?));
            if self.eat(TokenKind::Comma) {
                saw_comma = true;
                if self.at(TokenKind::RParen) {
                    components.push(None);
                }
            } else {
                break;
            }
        }
        let end = self.expect(TokenKind::RParen, "')'")?.end;
        if components.len() == 1 && !saw_comma {
            if let Some(Some(inner)) = components.into_iter().next() {
                return Ok(inner);
            }
            return Ok(Expression::Tuple {
                components: vec![],
                span: Span::new(start, end),
            });
        }
        Ok(Expression::Tuple {
            components,
            span: Span::new(start, end),
        })
    }
}

fn binary_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    use super::lexer::LogosToken::*;
    Some(match kind {
        Eq | PlusEq | MinusEq | StarEq | SlashEq | PercentEq | AmpEq | PipeEq | CaretEq | ShlEq
        | ShrEq => (2, 1),
        PipePipe => (4, 5),
        AmpAmp => (6, 7),
        EqEq | BangEq => (8, 9),
        Lt | Gt | LtEq | GtEq => (10, 11),
        Pipe => (12, 13),
        Caret => (14, 15),
        Amp => (16, 17),
        Shl | Shr => (18, 19),
        Plus | Minus => (20, 21),
        Star | Slash | Percent => (22, 23),
        StarStar => (25, 24),
        _ => return None,
    })
}

fn is_assignment_operator(kind: TokenKind) -> bool {
    use super::lexer::LogosToken::*;
    matches!(
        kind,
        Eq | PlusEq | MinusEq | StarEq | SlashEq | PercentEq | AmpEq | PipeEq | CaretEq | ShlEq
            | ShrEq
    )
}

fn unquote(text: &str) -> String {
    let trimmed = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\''))
        .unwrap_or(text);
    let trimmed = trimmed
        .strip_suffix('"')
        .or_else(|| trimmed.strip_suffix('\''))
        .unwrap_or(trimmed);
    trimmed.to_string()
}

fn respan_simple(statement: Statement, end: u32) -> Statement {
    match statement {
        Statement::Expression { expression, span } => Statement::Expression {
            expression,
            span: Span::new(span.start, end),
        },
        Statement::VariableDefinition {
            declarations,
            initializer,
            span,
        } => Statement::VariableDefinition {
            declarations,
            initializer,
            span: Span::new(span.start, end),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_clean(input: &str) -> SourceUnitNode {
        let result = parse(input);
        assert!(result.ok(), "unexpected errors: {:?}", result.errors);
        result.unit
    }

    fn first_contract(unit: &SourceUnitNode) -> &ContractDefinition {
        unit.items
            .iter()
            .find_map(|item| match item {
                SourceItem::Contract(contract) => Some(contract),
                _ => None,
            })
            .expect("no contract parsed")
    }

    #[test]
    fn test_parse_pragma_and_import() {
        let unit = parse_clean(
            r#"pragma solidity ^0.8.0;
            import "./Token.sol";
            import {A as B, C} from "./lib/Other.sol";"#,
        );
        assert_eq!(unit.items.len(), 3);
        match &unit.items[0] {
            SourceItem::Pragma(pragma) => {
                assert_eq!(pragma.name, "solidity");
                assert_eq!(pragma.value, "^0.8.0");
            }
            other => panic!("expected pragma, got {other:?}"),
        }
        match &unit.items[2] {
            SourceItem::Import(import) => {
                assert_eq!(import.path, "./lib/Other.sol");
                assert_eq!(import.symbols.len(), 2);
                assert_eq!(import.symbols[0].1.as_deref(), Some("B"));
            }
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_contract_with_inheritance() {
        let unit = parse_clean("contract C is A, B(1) { uint256 public total; }");
        let contract = first_contract(&unit);
        assert_eq!(contract.name, "C");
        assert_eq!(contract.bases.len(), 2);
        assert_eq!(contract.bases[0].name, "A");
        assert_eq!(contract.bases[1].arguments.len(), 1);
        assert_eq!(contract.parts.len(), 1);
    }

    #[test]
    fn test_parse_function_full_header() {
        let unit = parse_clean(
            "contract C { function f(uint a, address to) public view onlyOwner(a) returns (bool ok) { return true; } }",
        );
        let contract = first_contract(&unit);
        let ContractPart::Function(function) = &contract.parts[0] else {
            panic!("expected function");
        };
        assert_eq!(function.name.as_deref(), Some("f"));
        assert_eq!(function.parameters.len(), 2);
        assert_eq!(function.visibility, Some(Visibility::Public));
        assert_eq!(function.mutability, Some(StateMutability::View));
        assert_eq!(function.modifiers.len(), 1);
        assert_eq!(function.modifiers[0].name, "onlyOwner");
        assert_eq!(function.returns.len(), 1);
    }

    #[test]
    fn test_variable_definition_vs_expression() {
        let unit = parse_clean(
            "contract C { function f() public { uint x = 1; x = 2; Lib.Item storage it = s; (uint a, , uint b) = g(); } }",
        );
        let contract = first_contract(&unit);
        let ContractPart::Function(function) = &contract.parts[0] else {
            panic!("expected function");
        };
        let statements = &function.body.as_ref().unwrap().statements;
        assert!(matches!(
            statements[0],
            Statement::VariableDefinition { .. }
        ));
        assert!(matches!(statements[1], Statement::Expression { .. }));
        match &statements[2] {
            Statement::VariableDefinition { declarations, .. } => {
                let declaration = declarations[0].as_ref().unwrap();
                assert_eq!(
                    declaration.storage_location,
                    Some(StorageLocation::Storage)
                );
                assert_eq!(
                    declaration.type_name,
                    TypeName::UserDefined {
                        name_path: "Lib.Item".into()
                    }
                );
            }
            other => panic!("expected variable definition, got {other:?}"),
        }
        match &statements[3] {
            Statement::VariableDefinition { declarations, .. } => {
                assert_eq!(declarations.len(), 3);
                assert!(declarations[1].is_none());
            }
            other => panic!("expected tuple definition, got {other:?}"),
        }
    }

    #[test]
    fn test_name_value_call_shape() {
        let unit =
            parse_clean("contract C { function f(address a) public { Token(a).pay{value: 1}(); } }");
        let contract = first_contract(&unit);
        let ContractPart::Function(function) = &contract.parts[0] else {
            panic!("expected function");
        };
        let Statement::Expression { expression, .. } = &function.body.as_ref().unwrap().statements[0]
        else {
            panic!("expected expression statement");
        };
        let Expression::FunctionCall { expression, .. } = expression else {
            panic!("expected call");
        };
        assert!(matches!(**expression, Expression::NameValue { .. }));
    }

    #[test]
    fn test_address_cast_shape() {
        let unit = parse_clean("contract C { function f(address a) public { address(a).call(\"\"); } }");
        let contract = first_contract(&unit);
        let ContractPart::Function(function) = &contract.parts[0] else {
            panic!("expected function");
        };
        let Statement::Expression { expression, .. } = &function.body.as_ref().unwrap().statements[0]
        else {
            panic!("expected expression statement");
        };
        let Expression::FunctionCall { expression, .. } = expression else {
            panic!("expected outer call");
        };
        let Expression::MemberAccess { expression, member, .. } = &**expression else {
            panic!("expected member access");
        };
        assert_eq!(member, "call");
        let Expression::FunctionCall { expression, .. } = &**expression else {
            panic!("expected cast call");
        };
        assert!(
            matches!(&**expression, Expression::ElementaryType { name, .. } if name == "address")
        );
    }

    #[test]
    fn test_assembly_is_opaque() {
        let unit = parse_clean(
            "contract C { function f() public { assembly { let x := add(1, 2) } } }",
        );
        let contract = first_contract(&unit);
        let ContractPart::Function(function) = &contract.parts[0] else {
            panic!("expected function");
        };
        assert!(matches!(
            function.body.as_ref().unwrap().statements[0],
            Statement::InlineAssembly { .. }
        ));
    }

    #[test]
    fn test_recovers_from_malformed_part() {
        let result = parse("contract C { uint256 public }; contract D { }");
        assert!(!result.ok());
        let names: Vec<_> = result
            .unit
            .items
            .iter()
            .filter_map(|item| match item {
                SourceItem::Contract(contract) => Some(contract.name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["C", "D"]);
    }

    #[test]
    fn test_mapping_and_array_types() {
        let unit = parse_clean(
            "contract C { mapping(address => uint256) public balances; address[] owners; }",
        );
        let contract = first_contract(&unit);
        let ContractPart::StateVariable(mapping_var) = &contract.parts[0] else {
            panic!("expected state variable");
        };
        assert!(matches!(mapping_var.type_name, TypeName::Mapping { .. }));
        let ContractPart::StateVariable(array_var) = &contract.parts[1] else {
            panic!("expected state variable");
        };
        assert!(matches!(array_var.type_name, TypeName::Array { .. }));
    }
}
