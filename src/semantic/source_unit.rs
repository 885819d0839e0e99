//! One parsed source file in the semantic model.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::path::PathBuf;

use crate::base::{ContentHash, LineIndex, Position};
use crate::parser::ast::{
    EnumDefinition, ImportDirective, PragmaDirective, StructDefinition,
};

use super::calls::{CallType, FunctionCall};
use super::contract::Contract;
use super::function::FunctionDef;
use super::ids::SourceUnitId;

/// A parsed file: pragmas, import edges, file-scope type declarations,
/// and the contracts it defines. Identity is the content hash: two units
/// with equal hashes are interchangeable apart from their path.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub id: SourceUnitId,
    pub path: PathBuf,
    pub hash: ContentHash,
    pub pragmas: Vec<PragmaDirective>,
    pub imports: Vec<ImportDirective>,
    /// Structs declared outside any contract. Grows when imported
    /// file-scope declarations are propagated in.
    pub structs: IndexMap<SmolStr, StructDefinition>,
    /// Enums declared outside any contract; same propagation.
    pub enums: IndexMap<SmolStr, EnumDefinition>,
    pub contracts: IndexMap<SmolStr, Contract>,
    pub line_index: LineIndex,
}

impl SourceUnit {
    pub fn basename(&self) -> String {
        crate::base::paths::basename(&self.path)
    }

    pub fn contract(&self, name: &str) -> Option<&Contract> {
        self.contracts.get(name)
    }

    pub fn external_calls(&self) -> Vec<&FunctionCall> {
        self.calls_matching(|call| call.call_type == Some(CallType::External))
    }

    pub fn calls_matching<F>(&self, predicate: F) -> Vec<&FunctionCall>
    where
        F: Fn(&FunctionCall) -> bool,
    {
        self.contracts
            .values()
            .flat_map(|contract| {
                contract
                    .all_functions()
                    .flat_map(|function| function.calls.iter())
            })
            .filter(|call| predicate(call))
            .collect()
    }

    /// The contract whose body covers the given line/column, if any.
    pub fn contract_at(&self, line: u32, column: u32) -> Option<&Contract> {
        let offset = self.line_index.offset(Position::new(line, column))?;
        self.contracts
            .values()
            .find(|contract| contract.span.contains(offset))
    }

    /// The contract and, when the position falls inside one, the function
    /// or modifier body at the given line/column.
    pub fn function_at(&self, line: u32, column: u32) -> Option<(&Contract, Option<&FunctionDef>)> {
        let offset = self.line_index.offset(Position::new(line, column))?;
        let contract = self
            .contracts
            .values()
            .find(|contract| contract.span.contains(offset))?;
        let function = contract
            .all_functions()
            .find(|function| function.span.contains(offset));
        Some((contract, function))
    }
}
