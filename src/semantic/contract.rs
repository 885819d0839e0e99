//! Contracts, interfaces and libraries in the semantic model.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::base::Span;
use crate::parser::ast::{
    ContractKind, EnumDefinition, StructDefinition, TypeName, UsingForDirective,
    VariableDeclaration, Visibility,
};

use super::calls::{CallType, FunctionCall};
use super::function::FunctionDef;
use super::ids::{ContractId, SourceUnitId};

/// One slot of a contract's linearized ancestor order. Bases whose
/// definition never made it into the workspace (missing import) stay as
/// name placeholders and are excluded from inherited-name propagation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ancestor {
    Resolved(ContractId),
    Unknown(SmolStr),
}

impl Ancestor {
    pub fn resolved(&self) -> Option<ContractId> {
        match self {
            Ancestor::Resolved(id) => Some(*id),
            Ancestor::Unknown(_) => None,
        }
    }
}

/// An event declaration. Events can be overloaded, so they live in a list
/// rather than a name table.
#[derive(Debug, Clone)]
pub struct EventDef {
    pub name: SmolStr,
    pub params: Vec<VariableDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Contract {
    /// Owning source unit, fixed up when the unit is registered.
    pub unit: SourceUnitId,
    pub name: SmolStr,
    pub kind: ContractKind,
    /// Declared base names in source order, most-derived first.
    pub base_names: Vec<SmolStr>,
    /// Linearized ancestors, closest first, excluding self. Computed
    /// exactly once; guarded by `resolved_inheritance`.
    pub linearized: Vec<Ancestor>,
    /// Monotonic: set once inherited names have been propagated, never
    /// cleared.
    pub resolved_inheritance: bool,
    pub state_vars: IndexMap<SmolStr, VariableDeclaration>,
    /// The mapping-typed subset of the state variables.
    pub mappings: IndexMap<SmolStr, VariableDeclaration>,
    pub structs: IndexMap<SmolStr, StructDefinition>,
    pub enums: IndexMap<SmolStr, EnumDefinition>,
    pub events: Vec<EventDef>,
    pub functions: Vec<FunctionDef>,
    pub modifiers: IndexMap<SmolStr, FunctionDef>,
    pub using_for: Vec<UsingForDirective>,
    /// Name → the ancestor contract that declared it.
    pub inherited_names: FxHashMap<SmolStr, ContractId>,
    /// Struct/enum declarations visible through inheritance or file scope,
    /// kept separately for ABI type resolution.
    pub inherited_structs: IndexMap<SmolStr, StructDefinition>,
    pub inherited_enums: IndexMap<SmolStr, EnumDefinition>,
    pub span: Span,
}

impl Contract {
    pub fn is_library(&self) -> bool {
        self.kind == ContractKind::Library
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ContractKind::Interface
    }

    pub fn constructor(&self) -> Option<&FunctionDef> {
        self.functions
            .iter()
            .find(|f| f.kind == crate::parser::ast::FunctionKind::Constructor)
    }

    /// All function and modifier bodies.
    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.iter().chain(self.modifiers.values())
    }

    /// Whether this contract declares a member under `name`. Used to
    /// decide if a library exports a called function.
    pub fn has_member(&self, name: &str) -> bool {
        self.functions
            .iter()
            .any(|f| f.name.as_deref() == Some(name))
            || self.modifiers.contains_key(name)
            || self.events.iter().any(|e| e.name == name)
            || self.state_vars.contains_key(name)
            || self.structs.contains_key(name)
            || self.enums.contains_key(name)
    }

    /// The `using X for Y` directives that apply to a type name: exact
    /// matches plus wildcard (`using X for *`) directives.
    pub fn using_for_matches(&self, type_name: &str) -> Vec<&UsingForDirective> {
        self.using_for
            .iter()
            .filter(|directive| match &directive.type_name {
                None => true,
                Some(TypeName::Elementary { name }) => name == type_name,
                Some(TypeName::UserDefined { name_path }) => name_path == type_name,
                Some(_) => false,
            })
            .collect()
    }

    /// Non-private state variable lookup, used when ancestors donate names.
    pub fn visible_state_var(&self, name: &str) -> Option<&VariableDeclaration> {
        self.state_vars
            .get(name)
            .filter(|decl| decl.visibility != Some(Visibility::Private))
    }

    pub fn external_calls(&self) -> Vec<&FunctionCall> {
        self.calls_matching(|call| call.call_type == Some(CallType::External))
    }

    pub fn calls_matching<F>(&self, predicate: F) -> Vec<&FunctionCall>
    where
        F: Fn(&FunctionCall) -> bool,
    {
        self.all_functions()
            .flat_map(|function| function.calls.iter())
            .filter(|call| predicate(call))
            .collect()
    }
}
