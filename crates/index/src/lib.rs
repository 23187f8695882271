//! # Retriever Index
//!
//! The multi-view index over a fixed set of code fragments.
//!
//! ## Views
//!
//! ```text
//! Vec<CodeFragment>
//!     │
//!     ├──> by_id        (identity lookup)
//!     ├──> by_kind      (kind grouping)
//!     ├──> by_package   (package grouping)
//!     ├──> inverted     (lowercase token -> fragment set)
//!     └──> dependencies (fragment id -> referenced type names)
//! ```
//!
//! All views are built in one pass at construction time and never recomputed
//! incrementally. The only post-construction mutation is
//! [`CodeIndex::attach_embeddings`], which must finish before queries start.

mod index;
mod tokenize;

pub use index::CodeIndex;
pub use tokenize::split_camel_case;
