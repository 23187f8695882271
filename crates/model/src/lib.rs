//! # Retriever Model
//!
//! Fragment records: the value type every other crate consumes.
//!
//! A [`CodeFragment`] describes one parsed code unit (class, interface,
//! method, field, enum) with its source text and metadata. Fragments are
//! produced once by a parser, optionally receive an embedding vector before
//! queries start, and are otherwise immutable.

mod fragment;

pub use fragment::{CodeFragment, FragmentKind};
