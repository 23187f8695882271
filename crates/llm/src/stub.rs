use crate::client::LlmClient;
use crate::error::Result;
use retriever_model::CodeFragment;

/// Deterministic offline client for tests and demos.
///
/// Embeddings are derived from a rolling hash of the input text, so equal
/// texts always map to equal vectors and similar ranking runs are
/// reproducible without network access.
pub struct StubClient {
    dimension: usize,
}

impl StubClient {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut state: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            state ^= u64::from(byte);
            state = state.wrapping_mul(0x0000_0100_0000_01b3);
        }

        let mut vector = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            // Map the top 24 bits into [-1, 1].
            let value = ((state >> 40) as f32 / (1 << 24) as f32) * 2.0 - 1.0;
            vector.push(value);
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Default for StubClient {
    fn default() -> Self {
        Self::new(64)
    }
}

impl LlmClient for StubClient {
    fn is_available(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "Stub (offline)"
    }

    fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn query_with_context(&self, query: &str, context: &[CodeFragment]) -> Result<String> {
        Ok(format!(
            "[stub] {} context fragments retrieved for: {query}",
            context.len()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::{assert_eq, assert_ne};

    #[test]
    fn embeddings_are_deterministic_and_unit_length() {
        let client = StubClient::new(16);
        let texts = vec!["hello world".to_string(), "hello world".to_string()];
        let vectors = client.generate_embeddings(&texts).unwrap();

        assert_eq!(vectors[0], vectors[1]);
        assert_eq!(vectors[0].len(), 16);
        let norm: f32 = vectors[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn different_texts_get_different_vectors() {
        let client = StubClient::new(16);
        let vectors = client
            .generate_embeddings(&["alpha".to_string(), "beta".to_string()])
            .unwrap();
        assert_ne!(vectors[0], vectors[1]);
    }
}
