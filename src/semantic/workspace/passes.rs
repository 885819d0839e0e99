//! The global resolution passes.
//!
//! Pass 1 (`resolve_dependencies`): file-scope import propagation,
//! inheritance linearization, and inherited-name propagation, optionally
//! restricted to one scope file. Pass 2 (`refine_calls`): a deterministic
//! re-scan of every external or inconclusive call now that the whole
//! workspace is parsed. Call classification for a freshly integrated unit
//! (`classify_unit_calls`) lives here too: it is the same decision
//! procedure, evaluated against whatever the workspace knows at that
//! moment.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use std::path::Path;

use indexmap::IndexMap;

use crate::parser::ast::{TypeName, Visibility};
use crate::semantic::calls::{CallKind, CallShape, CallTarget, CallType, FunctionCall};
use crate::semantic::contract::{Ancestor, Contract};
use crate::semantic::error::WorkspaceError;
use crate::semantic::function::{FunctionDef, IdentifierScope};
use crate::semantic::ids::{ContractId, SourceUnitId};
use crate::semantic::linearize::{LinearizeError, linearize_all};

use super::model::Model;

// ============================================================================
// PASS 1: linearization and inherited names
// ============================================================================

impl Model {
    /// Linearize every known contract and propagate inherited names for
    /// the contracts in scope. `scope` restricts propagation to one file
    /// unless `resolve_all` is set; linearization itself is always global
    /// since it only needs declared base names.
    pub(crate) fn resolve_dependencies(
        &mut self,
        scope: Option<&Path>,
        resolve_all: bool,
        resolve_inheritance: bool,
    ) -> Result<(), WorkspaceError> {
        if resolve_inheritance {
            self.propagate_file_scope_definitions();
        }

        let by_name = self.contracts_by_name();
        let dependency_map: IndexMap<SmolStr, Vec<SmolStr>> = by_name
            .iter()
            .map(|(name, id)| {
                let bases = self
                    .contract(*id)
                    .map(|contract| contract.base_names.clone())
                    .unwrap_or_default();
                (name.clone(), bases)
            })
            .collect();
        let orders = linearize_all(&dependency_map).map_err(|error| {
            let contract = match error {
                LinearizeError::Unresolvable(name) | LinearizeError::Cycle(name) => name,
            };
            WorkspaceError::UnresolvedInheritanceOrder { contract }
        })?;

        for (name, order) in &orders {
            let Some(&contract_id) = by_name.get(name) else {
                continue;
            };
            let Some(already_resolved) = self
                .contract(contract_id)
                .map(|contract| contract.resolved_inheritance)
            else {
                continue;
            };
            let unit_path = self.unit(contract_id.unit).path.clone();
            if already_resolved {
                tracing::debug!(contract = %name, "inheritance already resolved");
                continue;
            }

            let ancestors: Vec<Ancestor> = order
                .iter()
                .filter(|ancestor| *ancestor != name)
                .map(|ancestor| match by_name.get(ancestor) {
                    Some(&id) => Ancestor::Resolved(id),
                    None => Ancestor::Unknown(ancestor.clone()),
                })
                .collect();
            if let Some(contract) = self.contract_mut(contract_id) {
                contract.linearized = ancestors;
            }

            let in_scope =
                resolve_inheritance && (resolve_all || scope == Some(unit_path.as_path()));
            if in_scope {
                self.propagate_inherited_names(contract_id);
                if let Some(contract) = self.contract_mut(contract_id) {
                    contract.resolved_inheritance = true;
                }
                self.upgrade_identifier_scopes(contract_id);
            }
        }
        Ok(())
    }

    /// Copy file-scope struct/enum declarations bottom-up along the file
    /// import graph, keyed by basename, so types declared outside any
    /// contract resolve across files. Cycle-safe through the visited set.
    fn propagate_file_scope_definitions(&mut self) {
        let mut import_map: IndexMap<String, Vec<String>> = IndexMap::new();
        for unit in self.iter_units() {
            let imported: Vec<String> = unit
                .imports
                .iter()
                .map(|import| crate::base::paths::basename(Path::new(&import.path)))
                .collect();
            import_map.insert(unit.basename(), imported);
        }

        let mut visited: FxHashSet<String> = FxHashSet::default();
        let roots: Vec<String> = import_map.keys().cloned().collect();
        for root in roots {
            if visited.contains(&root) {
                continue;
            }
            // Depth-first over this component, preorder.
            let mut order = Vec::new();
            let mut stack = vec![root];
            while let Some(current) = stack.pop() {
                if !visited.insert(current.clone()) {
                    continue;
                }
                if let Some(imports) = import_map.get(&current) {
                    stack.extend(
                        imports
                            .iter()
                            .filter(|name| !visited.contains(*name))
                            .cloned(),
                    );
                }
                order.push(current);
            }
            // Deepest-visited first: merge each file's direct imports into
            // it, so transitive declarations bubble up.
            for name in order.iter().rev() {
                let Some(&target_id) = self.by_basename.get(name) else {
                    continue;
                };
                let Some(imports) = import_map.get(name).cloned() else {
                    continue;
                };
                for imported in imports {
                    let Some(&source_id) = self.by_basename.get(&imported) else {
                        continue;
                    };
                    if source_id == target_id {
                        continue;
                    }
                    let (structs, enums) = {
                        let source = self.unit(source_id);
                        (source.structs.clone(), source.enums.clone())
                    };
                    let target = self.unit_mut(target_id);
                    target.structs.extend(structs);
                    target.enums.extend(enums);
                }
            }
        }
    }

    /// Merge each linearized ancestor's visible members into the contract,
    /// in linearization order. Interfaces donate only their type
    /// declarations.
    fn propagate_inherited_names(&mut self, contract_id: ContractId) {
        let Some((own_name, ancestors)) = self.contract(contract_id).map(|contract| {
            (
                contract.name.clone(),
                contract
                    .linearized
                    .iter()
                    .filter_map(Ancestor::resolved)
                    .collect::<Vec<_>>(),
            )
        }) else {
            return;
        };

        let mut names: Vec<(SmolStr, ContractId)> = Vec::new();
        let mut structs = Vec::new();
        let mut enums = Vec::new();
        for ancestor_id in ancestors {
            let Some(ancestor) = self.contract(ancestor_id) else {
                continue;
            };
            if ancestor.name == own_name {
                continue;
            }
            if ancestor.is_interface() {
                for (name, definition) in &ancestor.structs {
                    names.push((name.clone(), ancestor_id));
                    structs.push((name.clone(), definition.clone()));
                }
                for (name, definition) in &ancestor.enums {
                    names.push((name.clone(), ancestor_id));
                    enums.push((name.clone(), definition.clone()));
                }
                continue;
            }
            for (name, declaration) in &ancestor.state_vars {
                if declaration.visibility != Some(Visibility::Private) {
                    names.push((name.clone(), ancestor_id));
                }
            }
            for function in &ancestor.functions {
                if function.visibility != Some(Visibility::Private) {
                    if let Some(name) = &function.name {
                        names.push((name.clone(), ancestor_id));
                    }
                }
            }
            for event in &ancestor.events {
                names.push((event.name.clone(), ancestor_id));
            }
            for (name, modifier) in &ancestor.modifiers {
                if modifier.visibility != Some(Visibility::Private) {
                    names.push((name.clone(), ancestor_id));
                }
            }
            for (name, definition) in &ancestor.enums {
                names.push((name.clone(), ancestor_id));
                enums.push((name.clone(), definition.clone()));
            }
            for (name, definition) in &ancestor.structs {
                names.push((name.clone(), ancestor_id));
                structs.push((name.clone(), definition.clone()));
            }
            for (name, declaration) in &ancestor.mappings {
                if declaration.visibility != Some(Visibility::Private) {
                    names.push((name.clone(), ancestor_id));
                }
            }
        }

        let Some(contract) = self.contract_mut(contract_id) else {
            return;
        };
        for (name, ancestor_id) in names {
            contract.inherited_names.insert(name, ancestor_id);
        }
        for (name, definition) in structs {
            contract.inherited_structs.insert(name, definition);
        }
        for (name, definition) in enums {
            contract.inherited_enums.insert(name, definition);
        }
    }

    /// Identifiers are scoped at parse time, when inherited names cannot
    /// be known yet; lift the ones the propagation just explained.
    fn upgrade_identifier_scopes(&mut self, contract_id: ContractId) {
        let Some(contract) = self.contract_mut(contract_id) else {
            return;
        };
        let inherited: FxHashSet<SmolStr> = contract.inherited_names.keys().cloned().collect();
        if inherited.is_empty() {
            return;
        }
        let functions = contract
            .functions
            .iter_mut()
            .chain(contract.modifiers.values_mut());
        for function in functions {
            for identifier in &mut function.identifiers {
                if identifier.scope == IdentifierScope::Unknown
                    && inherited.contains(&identifier.name)
                {
                    identifier.scope = IdentifierScope::InheritedName;
                }
            }
        }
    }
}

// ============================================================================
// CALL CLASSIFICATION: first pass at integration, second pass globally
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FnSlot {
    Function(usize),
    Modifier(usize),
}

struct CallPatch {
    contract_index: usize,
    slot: FnSlot,
    call_index: usize,
    kind: Option<CallKind>,
    call_type: Option<CallType>,
    /// `None` keeps the call's current target.
    target: Option<Option<CallTarget>>,
    pending: Option<ContractId>,
}

impl Model {
    /// First-pass classification of every call in a freshly integrated
    /// unit, against the contracts and libraries known right now. Anything
    /// that cannot be proven yet is tagged inconclusive for pass 2.
    pub(crate) fn classify_unit_calls(&mut self, unit_id: SourceUnitId) {
        let patches = self.compute_initial_patches(unit_id);
        self.apply_call_patches(unit_id, patches);
    }

    /// Second pass: re-check every external or inconclusive call with the
    /// whole workspace parsed, then drop the helper payloads.
    pub(crate) fn refine_calls(&mut self) {
        let unit_ids: Vec<SourceUnitId> = self.by_path.values().copied().collect();
        for unit_id in unit_ids {
            let patches = self.compute_refine_patches(unit_id);
            self.apply_call_patches(unit_id, patches);
        }
    }

    fn compute_initial_patches(&self, unit_id: SourceUnitId) -> Vec<CallPatch> {
        let unit = self.unit(unit_id);
        let mut patches = Vec::new();
        for (contract_index, contract) in unit.contracts.values().enumerate() {
            let contract_id = ContractId::new(unit_id, contract_index);
            let function_slots = contract
                .functions
                .iter()
                .enumerate()
                .map(|(i, f)| (FnSlot::Function(i), f))
                .chain(
                    contract
                        .modifiers
                        .values()
                        .enumerate()
                        .map(|(i, f)| (FnSlot::Modifier(i), f)),
                );
            for (slot, function) in function_slots {
                for (call_index, call) in function.calls.iter().enumerate() {
                    if let Some(mut patch) =
                        self.classify_call(unit, contract, contract_id, function, call)
                    {
                        patch.contract_index = contract_index;
                        patch.slot = slot;
                        patch.call_index = call_index;
                        patches.push(patch);
                    }
                }
            }
        }
        patches
    }

    /// Decide one call from its shape. Returns `None` to leave the call
    /// unclassified.
    fn classify_call(
        &self,
        unit: &crate::semantic::source_unit::SourceUnit,
        contract: &Contract,
        contract_id: ContractId,
        function: &FunctionDef,
        call: &FunctionCall,
    ) -> Option<CallPatch> {
        let patch = |kind: Option<CallKind>,
                     call_type: Option<CallType>,
                     target: Option<Option<CallTarget>>,
                     pending: Option<ContractId>| {
            Some(CallPatch {
                contract_index: 0,
                slot: FnSlot::Function(0),
                call_index: 0,
                kind,
                call_type,
                target,
                pending,
            })
        };

        match &call.shape {
            CallShape::Regular { .. } => patch(Some(CallKind::Regular), None, None, None),
            CallShape::NameValueCall { .. } => patch(
                Some(CallKind::NameValueCall),
                Some(CallType::External),
                None,
                None,
            ),
            CallShape::MemberOfAddressCast { .. } => patch(
                Some(CallKind::MemberAccessOfAddress),
                Some(CallType::External),
                None,
                None,
            ),
            CallShape::MemberOfGlobalVar { .. } => patch(
                Some(CallKind::MemberAccessOfGlobalEvmVar),
                Some(CallType::External),
                None,
                None,
            ),
            CallShape::ContractTypecast { target, .. } => {
                let known = unit.contracts.contains_key(target)
                    || self.has_non_library_contract(target);
                let kind = if known {
                    CallKind::ContractTypecast
                } else {
                    CallKind::ContractTypecastAnonymous
                };
                patch(Some(kind), Some(CallType::External), None, None)
            }
            CallShape::MemberOfIdentifier { base, member } => {
                let declaration = function
                    .scoped_declaration(base)
                    .or_else(|| contract.state_vars.get(base));
                match declaration {
                    Some(declaration)
                        if declaration.is_address() || declaration.is_user_defined() =>
                    {
                        let type_name = declaration
                            .type_name
                            .declared_name()
                            .cloned()
                            .unwrap_or_default();
                        if self.library_candidates_export(Some(contract), &type_name, member) {
                            // proven library-internal; keep the resolved
                            // declaration but no call tag
                            patch(
                                None,
                                None,
                                Some(Some(CallTarget::Variable(declaration.clone()))),
                                None,
                            )
                        } else {
                            patch(
                                Some(CallKind::MemberAccessOfVar),
                                Some(CallType::External),
                                Some(Some(CallTarget::Variable(declaration.clone()))),
                                Some(contract_id),
                            )
                        }
                    }
                    Some(_) => None,
                    None => {
                        if self.find_library(base).is_some() {
                            // a direct library call, never external
                            None
                        } else {
                            patch(
                                Some(CallKind::MemberAccessOfUnknownIdentifier),
                                Some(CallType::Inconclusive),
                                None,
                                Some(contract_id),
                            )
                        }
                    }
                }
            }
            CallShape::MemberOfIndexAccess { base, .. } => {
                let base = base.as_ref()?;
                let declaration = function
                    .scoped_declaration(base)
                    .or_else(|| contract.state_vars.get(base))?;
                match &declaration.type_name {
                    TypeName::Array { base: element, .. } => match &**element {
                        TypeName::Elementary { name } if name == "address" => patch(
                            Some(CallKind::MemberAccessOfArrayVar),
                            Some(CallType::External),
                            Some(Some(CallTarget::Variable(declaration.clone()))),
                            None,
                        ),
                        TypeName::UserDefined { .. } => patch(
                            Some(CallKind::MemberAccessOfArrayVar),
                            Some(CallType::External),
                            Some(Some(CallTarget::Variable(declaration.clone()))),
                            None,
                        ),
                        _ => None,
                    },
                    TypeName::Mapping { value, .. } => match &**value {
                        TypeName::Elementary { name } if name == "address" => patch(
                            Some(CallKind::MemberAccessOfAddressMappingValue),
                            Some(CallType::External),
                            Some(Some(CallTarget::Variable(declaration.clone()))),
                            None,
                        ),
                        TypeName::UserDefined { name_path } => {
                            let first = name_path.split('.').next().unwrap_or(name_path);
                            if self.has_non_library_contract(first) {
                                patch(
                                    Some(CallKind::MemberAccessOfUserDefinedMappingValue),
                                    Some(CallType::External),
                                    Some(Some(CallTarget::Variable(declaration.clone()))),
                                    None,
                                )
                            } else {
                                None
                            }
                        }
                        _ => None,
                    },
                    _ => None,
                }
            }
            CallShape::MemberOfStruct { .. } => {
                tracing::warn!(
                    contract = %contract.name,
                    "struct member external call detection is not supported"
                );
                None
            }
            CallShape::Other => None,
        }
    }

    fn compute_refine_patches(&self, unit_id: SourceUnitId) -> Vec<CallPatch> {
        let unit = self.unit(unit_id);
        let mut patches = Vec::new();
        for (contract_index, contract) in unit.contracts.values().enumerate() {
            let function_slots = contract
                .functions
                .iter()
                .enumerate()
                .map(|(i, f)| (FnSlot::Function(i), f))
                .chain(
                    contract
                        .modifiers
                        .values()
                        .enumerate()
                        .map(|(i, f)| (FnSlot::Modifier(i), f)),
                );
            for (slot, function) in function_slots {
                for (call_index, call) in function.calls.iter().enumerate() {
                    if !matches!(
                        call.call_type,
                        Some(CallType::External) | Some(CallType::Inconclusive)
                    ) {
                        continue;
                    }
                    if let Some(mut patch) = self.refine_call(call) {
                        patch.contract_index = contract_index;
                        patch.slot = slot;
                        patch.call_index = call_index;
                        patches.push(patch);
                    }
                }
            }
        }
        patches
    }

    fn refine_call(&self, call: &FunctionCall) -> Option<CallPatch> {
        let patch = |kind: Option<CallKind>,
                     call_type: Option<CallType>,
                     target: Option<Option<CallTarget>>| {
            Some(CallPatch {
                contract_index: 0,
                slot: FnSlot::Function(0),
                call_index: 0,
                kind,
                call_type,
                target,
                pending: None,
            })
        };

        match call.kind {
            Some(CallKind::MemberAccessOfVar) => {
                let Some(CallTarget::Variable(declaration)) = &call.target else {
                    return None;
                };
                let Some(type_name) = declaration.type_name.declared_name() else {
                    return None;
                };
                let member = call.name.as_ref()?;
                let using_contract = call.pending.and_then(|id| self.contract(id));
                if self.library_candidates_export(using_contract, type_name, member) {
                    // the library arrived after the first pass; not an
                    // external call after all
                    patch(None, None, None)
                } else {
                    patch(Some(CallKind::MemberAccessOfVar), Some(CallType::External), None)
                }
            }
            Some(CallKind::MemberAccessOfUnknownIdentifier) => {
                if call.target.is_some() {
                    return None;
                }
                let pending_id = call.pending?;
                let CallShape::MemberOfIdentifier { base, .. } = &call.shape else {
                    return None;
                };
                let pending_contract = self.contract(pending_id)?;
                let resolved = pending_contract
                    .linearized
                    .iter()
                    .filter_map(Ancestor::resolved)
                    .find_map(|ancestor_id| {
                        self.contract(ancestor_id)
                            .and_then(|ancestor| ancestor.state_vars.get(base))
                            .cloned()
                    });
                match resolved {
                    Some(declaration) => patch(
                        Some(CallKind::InheritedStateVarAccess),
                        Some(CallType::External),
                        Some(Some(CallTarget::Variable(declaration))),
                    ),
                    // still unknown; keep the tag but drop the payload
                    None => patch(call.kind, call.call_type, None),
                }
            }
            _ => None,
        }
    }

    fn apply_call_patches(&mut self, unit_id: SourceUnitId, patches: Vec<CallPatch>) {
        if patches.is_empty() {
            return;
        }
        let unit = self.unit_mut(unit_id);
        for patch in patches {
            let Some((_, contract)) = unit.contracts.get_index_mut(patch.contract_index) else {
                continue;
            };
            let function = match patch.slot {
                FnSlot::Function(index) => contract.functions.get_mut(index),
                FnSlot::Modifier(index) => {
                    contract.modifiers.get_index_mut(index).map(|(_, f)| f)
                }
            };
            let Some(call) = function.and_then(|f| f.calls.get_mut(patch.call_index)) else {
                continue;
            };
            call.kind = patch.kind;
            call.call_type = patch.call_type;
            if let Some(target) = patch.target {
                call.target = target;
            }
            call.pending = patch.pending;
        }
    }

    /// Library membership over all candidate type names: the declared
    /// type, its first dotted segment, and any matching `using X for Y`
    /// library.
    fn library_candidates_export(
        &self,
        using_contract: Option<&Contract>,
        type_name: &str,
        member: &str,
    ) -> bool {
        let mut candidates: Vec<SmolStr> = vec![SmolStr::new(type_name)];
        if let Some(first) = type_name.split('.').next() {
            if first != type_name {
                candidates.push(SmolStr::new(first));
            }
        }
        if let Some(contract) = using_contract {
            for directive in contract.using_for_matches(type_name) {
                candidates.push(directive.library.clone());
            }
        }
        let mut seen = FxHashSet::default();
        candidates
            .into_iter()
            .filter(|candidate| seen.insert(candidate.clone()))
            .any(|candidate| self.library_exports(&candidate, member))
    }
}
