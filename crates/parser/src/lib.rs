//! # Retriever Parser
//!
//! Turns source trees into [`retriever_model::CodeFragment`]s.
//!
//! ```text
//! directory ──walk──> .java files ──scan──> classes / interfaces / enums
//!                                           methods / fields
//! ```
//!
//! Parsers implement [`SourceParser`]; only Java is supported today. The
//! Java scanner is deliberately lightweight and trades full grammar fidelity
//! for zero native dependencies.

mod error;
mod java;
mod parser;

pub use error::{ParserError, Result};
pub use java::JavaSourceParser;
pub use parser::SourceParser;
