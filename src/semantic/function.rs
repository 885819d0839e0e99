//! Function and modifier bodies in the semantic model.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::Span;
use crate::parser::ast::{
    FunctionKind, ModifierInvocation, StateMutability, VariableDeclaration, Visibility,
};

use super::calls::{CallType, FunctionCall};
use super::ids::ContractId;

/// Where an identifier use resolved, checked in this fixed order:
/// argument > returns > body > state variable > inherited name > unknown.
/// Local scopes refine to `StorageRef` when the declaration is
/// storage-located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierScope {
    Argument,
    Returns,
    Body,
    StorageRef,
    StateVar,
    InheritedName,
    Unknown,
}

/// One use of a name inside a function body.
#[derive(Debug, Clone)]
pub struct IdentifierUse {
    pub name: SmolStr,
    pub scope: IdentifierScope,
    pub span: Span,
}

/// A function or modifier body with its declarations, identifier uses,
/// call sites, and branching-count complexity.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Owning contract, fixed up when the unit is registered.
    pub parent: ContractId,
    /// Declaration counter within the contract; identifies overloads
    /// without resolving argument types.
    pub id: u32,
    pub kind: FunctionKind,
    pub name: Option<SmolStr>,
    pub visibility: Option<Visibility>,
    pub mutability: Option<StateMutability>,
    /// Parameters in declaration order, the source of truth for
    /// signature canonicalization (unnamed parameters stay in place here).
    pub params: Vec<VariableDeclaration>,
    /// Named parameters for scope lookup.
    pub arguments: IndexMap<SmolStr, VariableDeclaration>,
    /// Named return values for scope lookup.
    pub returns: IndexMap<SmolStr, VariableDeclaration>,
    /// All named declarations: arguments + returns + body.
    pub declarations: IndexMap<SmolStr, VariableDeclaration>,
    pub modifiers: IndexMap<SmolStr, ModifierInvocation>,
    pub identifiers: Vec<IdentifierUse>,
    pub calls: Vec<FunctionCall>,
    /// Branching-count heuristic, not cyclomatic complexity.
    pub complexity: u32,
    pub accesses_state: bool,
    pub span: Span,
}

impl FunctionDef {
    /// Narrowest-scope declaration lookup: local declarations first, the
    /// caller falls back to contract state variables.
    pub fn scoped_declaration(&self, name: &str) -> Option<&VariableDeclaration> {
        self.declarations.get(name)
    }

    pub fn is_public(&self) -> bool {
        !matches!(
            self.visibility,
            Some(Visibility::Private) | Some(Visibility::Internal)
        )
    }

    pub fn external_calls(&self) -> Vec<&FunctionCall> {
        self.calls_matching(|call| call.call_type == Some(CallType::External))
    }

    pub fn calls_matching<F>(&self, predicate: F) -> Vec<&FunctionCall>
    where
        F: Fn(&FunctionCall) -> bool,
    {
        self.calls.iter().filter(|call| predicate(call)).collect()
    }
}
