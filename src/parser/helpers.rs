//! Lexical helpers shared by the parser and the call classifier.

/// Global functions that look like bare calls but never are user code.
pub const BUILTINS: &[&str] = &[
    "gasleft",
    "require",
    "assert",
    "revert",
    "addmod",
    "mulmod",
    "keccak256",
    "sha256",
    "sha3",
    "ripemd160",
    "ecrecover",
];

/// Number suffixes that denominate a literal.
pub const SUBDENOMINATIONS: &[&str] = &[
    "wei", "gwei", "szabo", "finney", "ether", "seconds", "minutes", "hours", "days", "weeks",
    "years",
];

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

pub fn is_subdenomination(name: &str) -> bool {
    SUBDENOMINATIONS.contains(&name)
}

/// An identifier "starts lowercase" unless its first character is an
/// uppercase letter; leading `_` and `$` count as lowercase.
pub fn starts_lowercase(name: &str) -> bool {
    !starts_uppercase(name)
}

pub fn starts_uppercase(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() && c.is_uppercase())
}

/// Whether an identifier names an elementary (value) type.
pub fn is_elementary_type_name(text: &str) -> bool {
    match text {
        "address" | "bool" | "string" | "bytes" | "var" => return true,
        "uint" | "int" | "fixed" | "ufixed" | "byte" => return true,
        _ => {}
    }
    if let Some(suffix) = text.strip_prefix("bytes") {
        return suffix
            .parse::<u32>()
            .is_ok_and(|width| (1..=32).contains(&width));
    }
    if let Some(suffix) = text.strip_prefix("uint").or_else(|| text.strip_prefix("int")) {
        return suffix
            .parse::<u32>()
            .is_ok_and(|width| width % 8 == 0 && (8..=256).contains(&width));
    }
    if let Some(suffix) = text
        .strip_prefix("ufixed")
        .or_else(|| text.strip_prefix("fixed"))
    {
        if let Some((m, n)) = suffix.split_once('x') {
            return m.parse::<u32>().is_ok() && n.parse::<u32>().is_ok();
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementary_type_names() {
        for name in ["address", "bool", "uint", "uint256", "int8", "bytes32", "fixed128x18"] {
            assert!(is_elementary_type_name(name), "{name}");
        }
        for name in ["uint7", "bytes33", "Token", "mapping", "uint256x"] {
            assert!(!is_elementary_type_name(name), "{name}");
        }
    }

    #[test]
    fn test_case_checks() {
        assert!(starts_lowercase("transfer"));
        assert!(starts_lowercase("_transfer"));
        assert!(starts_lowercase("$x"));
        assert!(!starts_lowercase("Token"));
        assert!(starts_uppercase("Token"));
        assert!(!starts_uppercase("_Token"));
    }
}
