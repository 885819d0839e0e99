//! Workspace-level errors.
//!
//! Errors that flow through shared task cells are cloned to every waiter,
//! so all variants are `Clone`.

use smol_str::SmolStr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::parser::ParseError;

#[derive(Debug, Clone, Error)]
pub enum WorkspaceError {
    #[error("failed to read '{}': {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("parsing '{}' exceeded the {}ms deadline", path.display(), deadline.as_millis())]
    Timeout { path: PathBuf, deadline: Duration },

    #[error("parsing '{}' was cancelled", path.display())]
    Cancelled { path: PathBuf },

    #[error("could not find a consistent ancestor order for contract '{contract}'")]
    UnresolvedInheritanceOrder { contract: SmolStr },
}
