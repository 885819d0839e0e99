//! Stable identifiers for model entities.
//!
//! Source units live in an arena owned by the workspace model; contracts
//! live in their unit's contract table. Parent back-links are stored as
//! these IDs, never as owning references, so the object graph stays
//! acyclic. Superseded units keep their slot in the arena; only the
//! indices move, so old IDs stay valid for the whole session.

use std::fmt;

/// Index of a source unit in the workspace arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceUnitId(pub(crate) u32);

impl SourceUnitId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SourceUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "su#{}", self.0)
    }
}

/// Address of a contract: its unit plus its position in the unit's
/// contract table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContractId {
    pub unit: SourceUnitId,
    pub index: u32,
}

impl ContractId {
    pub(crate) fn new(unit: SourceUnitId, index: usize) -> Self {
        Self {
            unit,
            index: index as u32,
        }
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/c#{}", self.unit, self.index)
    }
}
