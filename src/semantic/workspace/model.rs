//! The workspace's shared model: the source-unit arena and its indices.
//!
//! Three indices point into the arena (by absolute path, by basename, and
//! by content hash in a bounded LRU), and they are only ever written through
//! the registration routine so they cannot drift apart. Re-adding a path
//! supersedes the old unit in the indices; the arena slot stays allocated,
//! which keeps previously handed-out IDs valid for the session.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::path::{Path, PathBuf};

use crate::base::{ContentHash, normalize_path};
use crate::core::LruCache;
use crate::semantic::contract::Contract;
use crate::semantic::error::WorkspaceError;
use crate::semantic::ids::{ContractId, SourceUnitId};
use crate::semantic::imports::ImportResolver;
use crate::semantic::signature::{
    FunctionSignature, SignatureError, SignatureRecord, TypeResolver, selector,
};
use crate::semantic::source_unit::SourceUnit;

pub struct Model {
    pub(super) units: Vec<SourceUnit>,
    pub(super) by_path: IndexMap<PathBuf, SourceUnitId>,
    pub(super) by_basename: FxHashMap<String, SourceUnitId>,
    pub(super) cache: LruCache<ContentHash, SourceUnitId>,
    pub(super) basedirs: Vec<PathBuf>,
}

impl Model {
    pub(crate) fn new(basedirs: Vec<PathBuf>, cache_capacity: usize) -> Self {
        Self {
            units: Vec::new(),
            by_path: IndexMap::new(),
            by_basename: FxHashMap::default(),
            cache: LruCache::new(cache_capacity),
            basedirs,
        }
    }

    // =========================================================================
    // Registration: the only writer of the indices
    // =========================================================================

    /// Take ownership of a freshly built unit: allocate its arena slot,
    /// fix up all parent back-links, and point every index at it.
    pub(crate) fn register_unit(&mut self, mut unit: SourceUnit) -> SourceUnitId {
        let id = SourceUnitId::new(self.units.len());
        unit.id = id;
        for (index, (_, contract)) in unit.contracts.iter_mut().enumerate() {
            let contract_id = ContractId::new(id, index);
            contract.unit = id;
            for function in contract
                .functions
                .iter_mut()
                .chain(contract.modifiers.values_mut())
            {
                function.parent = contract_id;
            }
        }
        let path = unit.path.clone();
        let basename = unit.basename();
        let hash = unit.hash;
        self.units.push(unit);
        self.by_path.insert(path, id);
        if !basename.is_empty() {
            self.by_basename.insert(basename, id);
        }
        self.cache.insert(hash, id);
        id
    }

    /// Refresh the indices for an already-registered unit (cache hit on
    /// the same path).
    pub(crate) fn touch(&mut self, id: SourceUnitId) {
        let (path, basename, hash) = {
            let unit = self.unit(id);
            (unit.path.clone(), unit.basename(), unit.hash)
        };
        self.by_path.insert(path, id);
        if !basename.is_empty() {
            self.by_basename.insert(basename, id);
        }
        self.cache.insert(hash, id);
    }

    /// Reuse a parsed unit for identical content reached under another
    /// path: deep-clone it and register the clone with the new path.
    pub(crate) fn clone_unit_as(&mut self, id: SourceUnitId, path: PathBuf) -> SourceUnitId {
        let mut unit = self.units[id.index()].clone();
        unit.path = path;
        self.register_unit(unit)
    }

    /// Hash-cache lookup, refreshing recency.
    pub(crate) fn cached(&mut self, hash: ContentHash) -> Option<SourceUnitId> {
        self.cache.get(&hash).copied()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The unit behind an ID. IDs stay valid for the whole session.
    pub fn unit(&self, id: SourceUnitId) -> &SourceUnit {
        &self.units[id.index()]
    }

    pub(crate) fn unit_mut(&mut self, id: SourceUnitId) -> &mut SourceUnit {
        &mut self.units[id.index()]
    }

    pub fn get(&self, path: &Path) -> Option<&SourceUnit> {
        let id = self.by_path.get(&normalize_path(path))?;
        Some(self.unit(*id))
    }

    pub fn get_by_basename(&self, basename: &str) -> Option<&SourceUnit> {
        let id = self.by_basename.get(basename)?;
        Some(self.unit(*id))
    }

    /// Live units in registration order. Superseded arena entries are not
    /// visited.
    pub fn iter_units(&self) -> impl Iterator<Item = &SourceUnit> {
        self.by_path.values().map(|id| self.unit(*id))
    }

    pub fn unit_count(&self) -> usize {
        self.by_path.len()
    }

    pub fn find<F>(&self, predicate: F) -> Vec<&SourceUnit>
    where
        F: Fn(&SourceUnit) -> bool,
    {
        self.iter_units().filter(|unit| predicate(unit)).collect()
    }

    pub fn all_contracts(&self) -> impl Iterator<Item = &Contract> {
        self.iter_units().flat_map(|unit| unit.contracts.values())
    }

    /// The global by-name contract view. Same-named contracts from
    /// different files collapse here, last write wins; address contracts
    /// through their unit when that matters.
    pub fn contracts_by_name(&self) -> IndexMap<SmolStr, ContractId> {
        let mut map = IndexMap::new();
        for id in self.by_path.values() {
            let unit = self.unit(*id);
            for (index, name) in unit.contracts.keys().enumerate() {
                map.insert(name.clone(), ContractId::new(*id, index));
            }
        }
        map
    }

    pub fn find_contracts_by_name(&self, name: &str) -> Vec<&Contract> {
        self.iter_units()
            .filter_map(|unit| unit.contracts.get(name))
            .collect()
    }

    pub fn contract(&self, id: ContractId) -> Option<&Contract> {
        self.units
            .get(id.unit.index())?
            .contracts
            .get_index(id.index as usize)
            .map(|(_, contract)| contract)
    }

    pub(crate) fn contract_mut(&mut self, id: ContractId) -> Option<&mut Contract> {
        self.units
            .get_mut(id.unit.index())?
            .contracts
            .get_index_mut(id.index as usize)
            .map(|(_, contract)| contract)
    }

    /// First library with this name among the live units.
    pub fn find_library(&self, name: &str) -> Option<&Contract> {
        self.iter_units()
            .find_map(|unit| unit.contracts.get(name).filter(|c| c.is_library()))
    }

    /// Whether a known library named `name` declares a member `member`.
    pub fn library_exports(&self, name: &str, member: &str) -> bool {
        self.find_library(name)
            .is_some_and(|library| library.has_member(member))
    }

    pub fn has_non_library_contract(&self, name: &str) -> bool {
        self.iter_units()
            .any(|unit| unit.contracts.get(name).is_some_and(|c| !c.is_library()))
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// ABI signatures for one contract's externally visible functions.
    /// Requires resolved inheritance; without it every eligible function
    /// reports the precondition error instead of a wrong signature.
    pub fn function_signatures(&self, contract: &Contract) -> Vec<SignatureRecord> {
        let unit = self.unit(contract.unit);
        let resolver = TypeResolver { unit, contract };
        contract
            .functions
            .iter()
            .filter(|function| function.name.is_some() && function.is_public())
            .map(|function| {
                let name = function.name.clone().unwrap_or_default();
                let result = if !contract.resolved_inheritance {
                    Err(SignatureError::InheritanceNotResolved(contract.name.clone()))
                } else {
                    Self::signature_of(&resolver, &name, &function.params)
                };
                SignatureRecord {
                    contract: contract.name.clone(),
                    name,
                    result,
                }
            })
            .collect()
    }

    /// ABI signatures for every contract of a unit.
    pub fn all_function_signatures(&self, unit: &SourceUnit) -> Vec<SignatureRecord> {
        unit.contracts
            .values()
            .flat_map(|contract| self.function_signatures(contract))
            .collect()
    }

    fn signature_of(
        resolver: &TypeResolver<'_>,
        name: &SmolStr,
        params: &[crate::parser::ast::VariableDeclaration],
    ) -> Result<FunctionSignature, SignatureError> {
        let mut canonical = Vec::with_capacity(params.len());
        for param in params {
            canonical.push(resolver.resolve(
                &param.type_name,
                param.storage_location,
                false,
                false,
            )?);
        }
        let signature = format!("{}({})", name, canonical.join(","));
        let selector = selector(&signature);
        Ok(FunctionSignature {
            name: name.clone(),
            signature,
            selector,
        })
    }

    // =========================================================================
    // Flatten
    // =========================================================================

    /// Concatenate the resolved import closure of a unit, dependencies
    /// first, with import statements and SPDX markers commented out.
    pub fn flatten(&self, unit: &SourceUnit) -> Result<String, WorkspaceError> {
        let resolver = ImportResolver::new(&self.basedirs);
        let mut closure = Vec::new();
        let mut visited = FxHashSet::default();
        self.collect_import_closure(unit, &resolver, &mut visited, &mut closure);
        closure.reverse();

        let mut seen = FxHashSet::default();
        let mut output = String::new();
        for path in closure {
            if !seen.insert(path.clone()) {
                continue;
            }
            let content = read_source(&path)?;
            push_flattened(&mut output, &path, &content);
        }
        let own = read_source(&unit.path)?;
        push_flattened(&mut output, &unit.path, &own);
        Ok(output)
    }

    fn collect_import_closure(
        &self,
        unit: &SourceUnit,
        resolver: &ImportResolver<'_>,
        visited: &mut FxHashSet<PathBuf>,
        accumulator: &mut Vec<PathBuf>,
    ) {
        let direct: Vec<PathBuf> = unit
            .imports
            .iter()
            .filter_map(|import| resolver.resolve(&import.path, &unit.path))
            .collect();
        accumulator.extend(direct.iter().cloned());
        for path in direct {
            if !visited.insert(path.clone()) {
                continue;
            }
            if let Some(imported) = self.get(&path) {
                self.collect_import_closure(imported, resolver, visited, accumulator);
            }
        }
    }
}

fn read_source(path: &Path) -> Result<String, WorkspaceError> {
    std::fs::read_to_string(path).map_err(|error| WorkspaceError::Io {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

fn push_flattened(output: &mut String, path: &Path, content: &str) {
    output.push_str(&format!(
        "\n/** \n *  SourceUnit: {}\n */\n\n",
        path.display()
    ));
    output.push_str(&comment_out_imports(content));
    output.push('\n');
}

fn comment_out_imports(content: &str) -> String {
    let lines: Vec<String> = content
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("import ") || trimmed.starts_with("import\"") {
                format!("//// {line}")
            } else if line.contains("// SPDX-License-Identifier") {
                line.replace(
                    "// SPDX-License-Identifier",
                    "//// SPDX-License-Identifier-FLATTEN-SUPPRESS-WARNING",
                )
            } else {
                line.to_string()
            }
        })
        .collect();
    lines.join("\n")
}
