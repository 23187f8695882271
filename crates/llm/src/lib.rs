//! # Retriever LLM
//!
//! Clients for the remote model providers: text generation for the `ask`
//! command and embedding generation for semantic retrieval.
//!
//! The engine treats these as fallible collaborators behind the [`LlmClient`]
//! trait. A client without credentials reports itself unavailable; callers
//! downgrade that to "signal unavailable" rather than an error. Retry policy,
//! if any, belongs here and not in the ranking engine.

mod client;
mod embed;
mod error;
mod gemini;
mod openai;
mod stub;

pub use client::{build_prompt, LlmClient};
pub use embed::{embed_index, EMBED_BATCH_SIZE};
pub use error::{LlmError, Result};
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use stub::StubClient;
