//! Function signature canonicalization and selector hashing.
//!
//! Resolves every argument type to its canonical ABI string (enums become
//! `uint8`, structs become tuples of their member types, bare
//! contract/interface references default to `address`) and hashes the
//! exact signature string with Keccak-256. The first four digest bytes are
//! the selector.

use smol_str::SmolStr;
use thiserror::Error;

use crate::parser::ast::{StorageLocation, TypeName};

use super::contract::Contract;
use super::source_unit::SourceUnit;

/// Fixed-width substitutions for the generic aliases, applied to the
/// trailing type token even through an array suffix.
const TYPE_ALIASES: &[(&str, &str)] = &[
    ("int", "int256"),
    ("uint", "uint256"),
    ("fixed", "fixed128x18"),
    ("ufixed", "ufixed128x18"),
    ("function", "bytes24"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("inheritance for contract '{0}' is not resolved; resolve the workspace first")]
    InheritanceNotResolved(SmolStr),
    #[error("failed to resolve type '{0}' in the current scope")]
    UnresolvedType(SmolStr),
    #[error("type '{0}' has no ABI encoding")]
    UnsupportedType(String),
}

/// A canonicalized signature with its 4-byte selector (8 hex characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: SmolStr,
    pub signature: String,
    pub selector: String,
}

/// Per-function outcome of signature extraction for one contract. A
/// resolution failure is captured here instead of aborting the batch.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    pub contract: SmolStr,
    pub name: SmolStr,
    pub result: Result<FunctionSignature, SignatureError>,
}

/// Substitute the canonical width for a generic alias, keeping any array
/// suffix: `uint` → `uint256`, `uint[2][]` → `uint256[2][]`.
pub fn canonical_evm_type(name: &str) -> String {
    let (head, tail) = match name.find('[') {
        Some(index) => name.split_at(index),
        None => (name, ""),
    };
    for (alias, canonical) in TYPE_ALIASES {
        if head == *alias {
            return format!("{canonical}{tail}");
        }
    }
    name.to_string()
}

/// Compute the 4-byte selector of a canonical signature string.
pub fn selector(signature: &str) -> String {
    use sha3::{Digest, Keccak256};
    let digest = Keccak256::digest(signature.as_bytes());
    hex::encode(&digest[..4])
}

/// Resolves argument types against a contract's scope: its own and
/// inherited declarations plus the file scope of its source unit.
pub(crate) struct TypeResolver<'a> {
    pub unit: &'a SourceUnit,
    pub contract: &'a Contract,
}

impl TypeResolver<'_> {
    pub(crate) fn resolve(
        &self,
        type_name: &TypeName,
        storage: Option<StorageLocation>,
        in_array: bool,
        inside_struct: bool,
    ) -> Result<String, SignatureError> {
        match type_name {
            TypeName::Elementary { name } => Ok(canonical_evm_type(name)),
            TypeName::Array { base, .. } => {
                let inner = self.resolve(base, storage, true, inside_struct)?;
                Ok(format!("{inner}[]"))
            }
            TypeName::FunctionType { .. } => Ok(canonical_evm_type("function")),
            TypeName::Mapping { .. } => Err(SignatureError::UnsupportedType("mapping".into())),
            TypeName::UserDefined { name_path } => {
                self.resolve_user_defined(name_path, storage, in_array, inside_struct)
            }
        }
    }

    fn resolve_user_defined(
        &self,
        name_path: &SmolStr,
        storage: Option<StorageLocation>,
        in_array: bool,
        inside_struct: bool,
    ) -> Result<String, SignatureError> {
        let is_enum = self.contract.enums.contains_key(name_path)
            || self.contract.inherited_enums.contains_key(name_path)
            || self.unit.enums.contains_key(name_path);
        if is_enum {
            return Ok("uint8".to_string());
        }

        // A bare user-defined reference with no data location is the
        // conventional ABI encoding of a contract/interface handle.
        if storage.is_none() && !inside_struct && !in_array {
            return Ok("address".to_string());
        }

        let definition = self
            .contract
            .structs
            .get(name_path)
            .or_else(|| self.contract.inherited_structs.get(name_path))
            .or_else(|| self.unit.structs.get(name_path));
        let Some(definition) = definition else {
            return Err(SignatureError::UnresolvedType(name_path.clone()));
        };
        let mut member_types = Vec::with_capacity(definition.members.len());
        for member in &definition.members {
            member_types.push(self.resolve(
                &member.type_name,
                member.storage_location,
                false,
                true,
            )?);
        }
        Ok(format!("({})", member_types.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("uint", "uint256")]
    #[case("int", "int256")]
    #[case("fixed", "fixed128x18")]
    #[case("ufixed", "ufixed128x18")]
    #[case("function", "bytes24")]
    #[case("uint[]", "uint256[]")]
    #[case("uint[2][]", "uint256[2][]")]
    #[case("uint8", "uint8")]
    #[case("bytes32", "bytes32")]
    #[case("address", "address")]
    fn test_canonical_evm_type(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_evm_type(input), expected);
    }

    #[test]
    fn test_selector_of_known_signature() {
        // The canonical ERC-20 transfer selector.
        assert_eq!(selector("transfer(address,uint256)"), "a9059cbb");
        assert_eq!(selector("balanceOf(address)"), "70a08231");
    }
}
