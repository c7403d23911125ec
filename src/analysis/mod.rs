//! Syntax-tree plumbing shared by the checkers.
//!
//! Python snippets are parsed once per analysis with tree-sitter and the
//! tree is handed to every tree-based checker through a [`SourceUnit`].
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ code + tag    │────▶│ SourceUnit   │────▶│ Checkers      │
//! └───────────────┘     │ (lazy parse) │     │ (visitors)    │
//!                       └──────────────┘     └───────────────┘
//!                                                    │
//!                                                    ▼
//!                                            ┌───────────────┐
//!                                            │ Finding lists │
//!                                            └───────────────┘
//! ```
//!
//! Checkers that walk the tree implement [`Visitor`] and are driven by
//! [`walk`], which is iterative so deeply nested input cannot exhaust the
//! stack.

mod parse;
mod traits;
mod visit;

pub use parse::{is_async_def, parse_python, python_language, ParsedSource, SyntaxError};
pub use traits::{Checker, SourceUnit};
pub use visit::{for_each_node, walk, Flow, Visitor};
