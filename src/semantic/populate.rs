//! AST → semantic model construction.
//!
//! Runs inside the parse task, before the unit is integrated into the
//! workspace: everything here is derivable from one file alone. Contract
//! tables are collected before function bodies are processed, so scope
//! resolution sees the whole contract regardless of declaration order.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::path::PathBuf;

use crate::base::{ContentHash, LineIndex};
use crate::parser::ast::{
    ContractDefinition, ContractPart, EnumDefinition, Expression, FunctionDefinition,
    FunctionKind, SourceItem, SourceUnitNode, Statement, StorageLocation, StructDefinition,
    TypeName, Visit, walk_block, walk_expression,
};

use super::calls::FunctionCall;
use super::contract::{Contract, EventDef};
use super::function::{FunctionDef, IdentifierScope, IdentifierUse};
use super::ids::{ContractId, SourceUnitId};
use super::source_unit::SourceUnit;

/// Build the model of one file. IDs and back-links are placeholders until
/// the workspace registers the unit.
pub(crate) fn build_source_unit(
    path: PathBuf,
    hash: ContentHash,
    text: &str,
    ast: &SourceUnitNode,
    resolve_identifiers: bool,
) -> SourceUnit {
    let mut pragmas = Vec::new();
    let mut imports = Vec::new();
    let mut structs = IndexMap::new();
    let mut enums = IndexMap::new();

    // File-scope declarations first: contracts reference them no matter
    // where in the file they appear.
    for item in &ast.items {
        match item {
            SourceItem::Pragma(pragma) => pragmas.push(pragma.clone()),
            SourceItem::Import(import) => imports.push(import.clone()),
            SourceItem::Struct(definition) => {
                structs.insert(definition.name.clone(), definition.clone());
            }
            SourceItem::Enum(definition) => {
                enums.insert(definition.name.clone(), definition.clone());
            }
            SourceItem::Contract(_) | SourceItem::Function(_) => {}
        }
    }

    let mut contracts = IndexMap::new();
    for item in &ast.items {
        if let SourceItem::Contract(definition) = item {
            let contract = build_contract(definition, &structs, &enums, resolve_identifiers);
            contracts.insert(contract.name.clone(), contract);
        }
    }

    SourceUnit {
        id: SourceUnitId::new(0),
        path,
        hash,
        pragmas,
        imports,
        structs,
        enums,
        contracts,
        line_index: LineIndex::new(text),
    }
}

fn build_contract(
    definition: &ContractDefinition,
    file_structs: &IndexMap<SmolStr, StructDefinition>,
    file_enums: &IndexMap<SmolStr, EnumDefinition>,
    resolve_identifiers: bool,
) -> Contract {
    let mut contract = Contract {
        unit: SourceUnitId::new(0),
        name: definition.name.clone(),
        kind: definition.kind,
        base_names: definition.bases.iter().map(|b| b.name.clone()).collect(),
        linearized: Vec::new(),
        resolved_inheritance: false,
        state_vars: IndexMap::new(),
        mappings: IndexMap::new(),
        structs: IndexMap::new(),
        enums: IndexMap::new(),
        events: Vec::new(),
        functions: Vec::new(),
        modifiers: IndexMap::new(),
        using_for: Vec::new(),
        inherited_names: Default::default(),
        // File-scope declarations are visible to the contract from the
        // start; imported ones are merged in by the file-scope pass.
        inherited_structs: file_structs.clone(),
        inherited_enums: file_enums.clone(),
        span: definition.span,
    };

    // Pass 1: tables. Function bodies resolve against the full contract.
    for part in &definition.parts {
        match part {
            ContractPart::StateVariable(declaration) => {
                let Some(name) = declaration.name.clone() else {
                    continue;
                };
                if matches!(declaration.type_name, TypeName::Mapping { .. }) {
                    contract.mappings.insert(name.clone(), declaration.clone());
                }
                contract.state_vars.insert(name, declaration.clone());
            }
            ContractPart::Struct(struct_definition) => {
                contract
                    .structs
                    .insert(struct_definition.name.clone(), struct_definition.clone());
            }
            ContractPart::Enum(enum_definition) => {
                contract
                    .enums
                    .insert(enum_definition.name.clone(), enum_definition.clone());
            }
            ContractPart::Event(event) => {
                contract.events.push(EventDef {
                    name: event.name.clone(),
                    params: event.parameters.clone(),
                    span: event.span,
                });
            }
            ContractPart::UsingFor(directive) => {
                contract.using_for.push(directive.clone());
            }
            ContractPart::ErrorDef(_) | ContractPart::Function(_) => {}
        }
    }

    // Pass 2: bodies.
    let mut functions = Vec::new();
    let mut modifiers = IndexMap::new();
    let mut next_id = 0u32;
    for part in &definition.parts {
        let ContractPart::Function(function_definition) = part else {
            continue;
        };
        let function = build_function(
            function_definition,
            &contract,
            next_id,
            resolve_identifiers,
        );
        next_id += 1;
        if function_definition.kind == FunctionKind::Modifier {
            if let Some(name) = function.name.clone() {
                modifiers.insert(name, function);
            }
        } else {
            functions.push(function);
        }
    }
    contract.functions = functions;
    contract.modifiers = modifiers;
    contract
}

fn build_function(
    definition: &FunctionDefinition,
    contract: &Contract,
    id: u32,
    resolve_identifiers: bool,
) -> FunctionDef {
    let mut arguments = IndexMap::new();
    let mut returns = IndexMap::new();
    let mut declarations = IndexMap::new();
    for parameter in &definition.parameters {
        if let Some(name) = parameter.name.clone() {
            arguments.insert(name.clone(), parameter.clone());
            declarations.insert(name, parameter.clone());
        }
    }
    for value in &definition.returns {
        if let Some(name) = value.name.clone() {
            returns.insert(name.clone(), value.clone());
            declarations.insert(name, value.clone());
        }
    }

    let mut modifiers = IndexMap::new();
    for invocation in &definition.modifiers {
        modifiers.insert(invocation.name.clone(), invocation.clone());
    }

    let mut function = FunctionDef {
        parent: ContractId::new(SourceUnitId::new(0), 0),
        id,
        kind: definition.kind,
        name: definition.name.clone(),
        visibility: definition.visibility,
        mutability: definition.mutability,
        params: definition.parameters.clone(),
        arguments,
        returns,
        declarations,
        modifiers,
        identifiers: Vec::new(),
        calls: Vec::new(),
        complexity: 0,
        accesses_state: false,
        span: definition.span,
    };

    if let Some(body) = &definition.body {
        // First walk: body declarations, call sites, complexity.
        let mut collector = BodyCollector {
            declarations: &mut function.declarations,
            calls: &mut function.calls,
            complexity: 0,
        };
        walk_block(&mut collector, body);
        function.complexity = collector.complexity;

        // Second walk: identifier uses, scoped against the now-complete
        // declaration table.
        let mut identifiers = IdentifierCollector {
            function: &function,
            contract,
            resolve_identifiers,
            identifiers: Vec::new(),
            accesses_state: false,
        };
        walk_block(&mut identifiers, body);
        for invocation in &definition.modifiers {
            for argument in &invocation.arguments {
                walk_expression(&mut identifiers, argument);
            }
        }
        let IdentifierCollector {
            identifiers,
            accesses_state,
            ..
        } = identifiers;
        function.identifiers = identifiers;
        function.accesses_state = accesses_state;
    }

    function
}

/// Collects body declarations and call sites, and scores branching
/// complexity along the way.
struct BodyCollector<'a> {
    declarations: &'a mut IndexMap<SmolStr, crate::parser::ast::VariableDeclaration>,
    calls: &'a mut Vec<FunctionCall>,
    complexity: u32,
}

impl Visit for BodyCollector<'_> {
    fn visit_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::If { .. }
            | Statement::While { .. }
            | Statement::For { .. }
            | Statement::DoWhile { .. } => self.complexity += 1,
            Statement::InlineAssembly { .. } => self.complexity += 3,
            _ => {}
        }
    }

    fn visit_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Conditional { .. } => self.complexity += 1,
            Expression::FunctionCall { .. } => {
                self.complexity += 2;
                self.calls.push(FunctionCall::from_expression(expression));
            }
            _ => {}
        }
    }

    fn visit_variable_declaration(
        &mut self,
        declaration: &crate::parser::ast::VariableDeclaration,
    ) {
        if let Some(name) = declaration.name.clone() {
            self.declarations.insert(name, declaration.clone());
        }
    }
}

/// Collects identifier uses with their resolved scope.
struct IdentifierCollector<'a> {
    function: &'a FunctionDef,
    contract: &'a Contract,
    resolve_identifiers: bool,
    identifiers: Vec<IdentifierUse>,
    accesses_state: bool,
}

impl Visit for IdentifierCollector<'_> {
    fn visit_expression(&mut self, expression: &Expression) {
        let Expression::Identifier { name, span } = expression else {
            return;
        };
        let scope = if self.resolve_identifiers {
            self.resolve_scope(name)
        } else {
            IdentifierScope::Unknown
        };
        if scope == IdentifierScope::StateVar {
            self.accesses_state = true;
        }
        self.identifiers.push(IdentifierUse {
            name: name.clone(),
            scope,
            span: *span,
        });
    }
}

impl IdentifierCollector<'_> {
    fn resolve_scope(&self, name: &str) -> IdentifierScope {
        if let Some(declaration) = self.function.declarations.get(name) {
            let scope = if self.function.arguments.contains_key(name) {
                IdentifierScope::Argument
            } else if self.function.returns.contains_key(name) {
                IdentifierScope::Returns
            } else {
                IdentifierScope::Body
            };
            if declaration.storage_location == Some(StorageLocation::Storage) {
                return IdentifierScope::StorageRef;
            }
            return scope;
        }
        if self.contract.state_vars.contains_key(name) {
            return IdentifierScope::StateVar;
        }
        // Inherited names are not known until pass 1 has linearized the
        // workspace; those uses are upgraded there.
        IdentifierScope::Unknown
    }
}
