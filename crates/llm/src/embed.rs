use crate::client::LlmClient;
use crate::error::{LlmError, Result};
use retriever_index::CodeIndex;

/// Fragments per embedding request. A failed batch aborts the pass but
/// leaves vectors from earlier batches attached.
pub const EMBED_BATCH_SIZE: usize = 100;

/// Batch-embed every fragment in the index and attach the vectors.
///
/// This is the finalize phase of the two-phase index build: it takes the
/// index by `&mut` and must run before any queries are served. Returns the
/// number of fragments that received a vector.
pub fn embed_index(client: &dyn LlmClient, index: &mut CodeIndex) -> Result<usize> {
    if !client.is_available() {
        return Err(LlmError::NotConfigured("embedding provider"));
    }

    let texts: Vec<String> = index
        .fragments()
        .iter()
        .map(|f| f.to_context_string())
        .collect();
    let total = texts.len();

    let mut attached = 0;
    for (batch_no, batch) in texts.chunks(EMBED_BATCH_SIZE).enumerate() {
        let start = batch_no * EMBED_BATCH_SIZE;
        let vectors = client.generate_embeddings(batch)?;
        attached += vectors.len();
        index.attach_embeddings(start, vectors);
        log::info!("Generated embeddings for {attached}/{total} fragments");
    }

    Ok(attached)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubClient;
    use pretty_assertions::assert_eq;
    use retriever_model::{CodeFragment, FragmentKind};

    struct UnavailableClient;

    impl LlmClient for UnavailableClient {
        fn is_available(&self) -> bool {
            false
        }
        fn provider_name(&self) -> &str {
            "unavailable"
        }
        fn generate_embeddings(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(LlmError::NotConfigured("test"))
        }
        fn query_with_context(&self, _q: &str, _c: &[CodeFragment]) -> Result<String> {
            Err(LlmError::NotConfigured("test"))
        }
    }

    fn small_index() -> CodeIndex {
        let fragments = (0..3)
            .map(|i| CodeFragment::new(format!("pkg.F{i}"), FragmentKind::Class, format!("F{i}")))
            .collect();
        CodeIndex::build(fragments)
    }

    #[test]
    fn embeds_every_fragment() {
        let mut index = small_index();
        let client = StubClient::new(8);

        let attached = embed_index(&client, &mut index).unwrap();
        assert_eq!(attached, 3);
        assert!(index.fragments().iter().all(|f| f.embedding.is_some()));
    }

    #[test]
    fn unavailable_client_is_an_error_not_a_panic() {
        let mut index = small_index();
        let err = embed_index(&UnavailableClient, &mut index).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
        assert!(index.fragments().iter().all(|f| f.embedding.is_none()));
    }

    #[test]
    fn empty_index_embeds_nothing() {
        let mut index = CodeIndex::build(Vec::new());
        let attached = embed_index(&StubClient::new(8), &mut index).unwrap();
        assert_eq!(attached, 0);
    }
}
