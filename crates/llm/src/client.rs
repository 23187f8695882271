use crate::error::Result;
use retriever_model::CodeFragment;

/// Capability boundary to a remote model provider.
///
/// Implementations must be safe to call when unconfigured: `is_available`
/// returns `false` and the fallible methods return an error instead of
/// panicking. Callers in the ranking engine treat any failure as an empty
/// signal, never as a fatal condition.
pub trait LlmClient: Send + Sync {
    /// Whether the provider is configured and usable.
    fn is_available(&self) -> bool;

    /// Human-readable provider name for display.
    fn provider_name(&self) -> &str;

    /// Produce one embedding vector per input text, in input order.
    fn generate_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Answer a question using the given code fragments as context.
    fn query_with_context(&self, query: &str, context: &[CodeFragment]) -> Result<String>;
}

/// Assemble the RAG prompt: instructions, fragment context strings, and the
/// user query.
#[must_use]
pub fn build_prompt(query: &str, context: &[CodeFragment]) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are an expert programming assistant.\n");
    prompt.push_str("Your task is to answer questions about a user's codebase.\n");
    prompt.push_str("Use the provided code context to give a precise and helpful answer.\n\n");

    prompt.push_str("=== Relevant Code Context ===\n\n");
    if context.is_empty() {
        prompt.push_str("No relevant code context was found.\n");
    } else {
        for fragment in context {
            prompt.push_str(&fragment.to_context_string());
            prompt.push_str("--------------------\n");
        }
    }

    prompt.push_str("\n=== User Query ===\n");
    prompt.push_str(query);

    prompt
}
