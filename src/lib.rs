//! # solspace
//!
//! Core library for Solidity source parsing, semantic modeling, and
//! cross-file call analysis.
//!
//! A [`semantic::Workspace`] ingests interdependent `.sol` files, follows
//! their import edges across heuristic search roots, linearizes
//! multiple-inheritance hierarchies, propagates inherited symbols, tags
//! every call expression as internal/external/ambiguous, and canonicalizes
//! function signatures into ABI selectors.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! semantic  → workspace orchestration, inheritance, call classification
//!   ↓
//! parser    → Logos lexer, recursive-descent parser, AST, traversal
//!   ↓
//! core      → LRU cache, task completion cells, deadline races
//!   ↓
//! base      → Primitives (Span, LineIndex, ContentHash, path utils)
//! ```

/// Foundation types: Span, Position, LineIndex, ContentHash, path helpers
pub mod base;

/// Shared machinery: bounded LRU cache, task cells, deadline/cancel races
pub mod core;

/// Parser: Logos lexer, recursive-descent parser, AST types, traversal
pub mod parser;

/// Semantic model: workspace, source units, contracts, calls, signatures
pub mod semantic;

// Re-export foundation types
pub use base::{ContentHash, LineIndex, Position, Span};

// Re-export the main entry points
pub use semantic::{SourceUnit, Workspace, WorkspaceError, WorkspaceOptions};
