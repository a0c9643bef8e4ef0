//! # ctxlog engine
//!
//! Context extraction for contextual debug logging in JavaScript and
//! TypeScript (JSX/TSX included).
//!
//! ## Philosophy
//!
//! A good debug statement logs what matters where it matters:
//! - It lands inside the right function, before control leaves it
//! - It groups values by role (props, state, refs, context, reducers, locals)
//! - It skips values nobody reads and values that must never be printed
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     │
//!     ├──> Tree-sitter Parsing → syntax tree (fails fast on syntax errors)
//!     │
//!     ├──> Scope Walker (single pass, explicit scope stack)
//!     │    ├─> Detect loggable scopes (functions, arrows, class methods)
//!     │    ├─> Classify declarations into buckets (hook-name table)
//!     │    ├─> Compute insertion points
//!     │    └─> Liveness + sensitivity filters
//!     │
//!     ├──> Parent re-linking by insertion line
//!     │
//!     └──> CodeContext[] → LogRenderer → apply_insertions
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ctxlog_engine::{all_contexts_in_file, LogConfig, LogRenderer};
//!
//! let config = LogConfig::default();
//! let code = r#"
//! function greet(name) {
//!     const message = `hi ${name}`;
//!     return message;
//! }
//! "#;
//!
//! let contexts = all_contexts_in_file(code, &config).unwrap();
//! let renderer = LogRenderer::new(&config);
//! for ctx in &contexts {
//!     println!("{}", renderer.render(ctx, "greet.js", None));
//! }
//! ```

mod analyzer;
mod bindings;
mod classifier;
mod config;
mod error;
mod filters;
mod insertion;
mod language;
mod patterns;
mod position;
mod render;
mod suggest;
mod syntax;
mod types;
mod walker;

pub use analyzer::{all_contexts_in_file, context_at_cursor, ContextAnalyzer};
pub use classifier::HookRole;
pub use config::{LogConfig, LogLevel, ARGS_LABEL};
pub use error::{EngineError, Result};
pub use insertion::{
    apply_insertions, is_duplicate_nearby, strip_tagged_lines, Cleaned, Insertion, DUPLICATE_WINDOW,
};
pub use language::Language;
pub use patterns::extract_bound_names;
pub use position::{compute_insert_position, contains_position, LineIndex, Position, SourceSpan};
pub use render::{selection_candidates, LogGroup, LogRenderer, Selection, SelectionCandidate};
pub use syntax::SyntaxKind;
pub use types::{
    Bucket, CodeContext, ContextId, ContextKind, ContextSet, CursorMatch, VariableBuckets,
};
pub use walker::ANONYMOUS;
