//! emberc-util - Core Utilities and Foundation Types
//!
//! Shared infrastructure for the resolver: string interning, typed arena
//! indices, source spans, and diagnostic reporting. Every other crate in
//! the workspace depends on this one and nothing here depends back.

pub mod def_id;
pub mod diagnostic;
pub mod index_vec;
pub mod error;
pub mod span;
pub mod symbol;

pub use def_id::{DefId, DefIdGenerator};
pub use diagnostic::{Diagnostic, DiagnosticBuilder, DiagnosticCode, Handler, Level, SourceSnippet};
pub use error::{DiagnosticError, IndexVecError, SourceMapError, SymbolError};
pub use index_vec::{Idx, IndexVec};
pub use span::{FileId, SourceFile, SourceMap, Span};
pub use symbol::Symbol;

// Re-export commonly used hash-map/set types so callers don't need a
// separate `rustc-hash` dependency.
pub use rustc_hash::FxHashMap;
pub use rustc_hash::FxHashSet;
