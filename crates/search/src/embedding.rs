use crate::strategy::{rank_descending, RetrievalStrategy};
use retriever_index::CodeIndex;
use retriever_llm::LlmClient;
use retriever_model::CodeFragment;
use std::sync::Arc;

/// Semantic retrieval: embed the query, then rank fragments by cosine
/// similarity against their precomputed embedding vectors.
///
/// Fragments without an embedding never appear in the results. A missing or
/// failing embedding provider degrades to an empty result list.
pub struct EmbeddingStrategy {
    client: Arc<dyn LlmClient>,
}

impl EmbeddingStrategy {
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        match self.client.generate_embeddings(&[query.to_string()]) {
            Ok(mut vectors) if !vectors.is_empty() => Some(vectors.remove(0)),
            Ok(_) => {
                log::warn!("Embedding provider returned no vector for query");
                None
            }
            Err(err) => {
                log::warn!("Failed to embed query: {err}");
                None
            }
        }
    }
}

/// Cosine similarity between two vectors. Returns 0.0 when either vector has
/// zero norm or the lengths differ.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

impl RetrievalStrategy for EmbeddingStrategy {
    fn name(&self) -> &str {
        "Embedding-Based"
    }

    fn retrieve<'a>(
        &self,
        query: &str,
        index: &'a CodeIndex,
        max_results: usize,
    ) -> Vec<&'a CodeFragment> {
        if !self.client.is_available() {
            log::warn!(
                "Embedding provider '{}' is not available; returning no results",
                self.client.provider_name()
            );
            return Vec::new();
        }

        let Some(query_vector) = self.embed_query(query) else {
            return Vec::new();
        };

        // Negative similarities are kept; an embedded fragment always ranks
        // somewhere. Empty vectors count as not embedded.
        let scored: Vec<(&CodeFragment, f64)> = index
            .fragments()
            .iter()
            .filter_map(|fragment| {
                let vector = fragment.embedding.as_ref().filter(|v| !v.is_empty())?;
                Some((fragment, cosine_similarity(&query_vector, vector)))
            })
            .collect();

        rank_descending(scored, max_results)
    }
}
