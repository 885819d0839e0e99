//! The semantic model: source units, contracts, functions, calls, and the
//! workspace that orchestrates them.

pub mod calls;
pub mod contract;
pub mod error;
pub mod function;
pub mod ids;
pub mod imports;
pub mod linearize;
pub(crate) mod populate;
pub mod signature;
pub mod source_unit;
pub mod workspace;

pub use calls::{CallKind, CallShape, CallTarget, CallType, FunctionCall};
pub use contract::{Ancestor, Contract, EventDef};
pub use error::WorkspaceError;
pub use function::{FunctionDef, IdentifierScope, IdentifierUse};
pub use ids::{ContractId, SourceUnitId};
pub use imports::ImportResolver;
pub use signature::{FunctionSignature, SignatureError, SignatureRecord};
pub use source_unit::SourceUnit;
pub use workspace::{AddOptions, Model, ReadyReport, Workspace, WorkspaceOptions};
