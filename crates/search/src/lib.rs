//! # Retriever Search
//!
//! The hybrid ranking engine: three independent retrieval strategies over a
//! shared [`retriever_index::CodeIndex`], fused into one ranked list.
//!
//! ```text
//! query
//!   │
//!   ├──> Keyword Strategy     (lexical: exact / substring / similarity)
//!   ├──> Dependency Strategy  (structural: seeds + bounded graph expansion)
//!   ├──> Embedding Strategy   (semantic: cosine over precomputed vectors)
//!   │
//!   └──> Hybrid Strategy
//!          ├─ positional weighting per sub-strategy
//!          ├─ query-pattern contextual boosts
//!          └─ top-K
//! ```
//!
//! Every `retrieve` call is a pure function of (query, index, max_results):
//! no strategy carries state across calls, and unavailable signals degrade to
//! empty result lists rather than errors.

mod dependency;
mod embedding;
mod hybrid;
mod keyword;
mod strategy;

pub use dependency::DependencyStrategy;
pub use embedding::{cosine_similarity, EmbeddingStrategy};
pub use hybrid::HybridStrategy;
pub use keyword::KeywordStrategy;
pub use strategy::RetrievalStrategy;
