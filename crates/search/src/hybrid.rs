use crate::dependency::DependencyStrategy;
use crate::embedding::EmbeddingStrategy;
use crate::keyword::KeywordStrategy;
use crate::strategy::{rank_descending, RetrievalStrategy};
use retriever_index::CodeIndex;
use retriever_llm::LlmClient;
use retriever_model::{CodeFragment, FragmentKind};
use std::collections::HashMap;
use std::sync::Arc;

const WEIGHT_KEYWORD: f64 = 0.3;
const WEIGHT_DEPENDENCY: f64 = 0.2;
const WEIGHT_EMBEDDING: f64 = 0.5;

/// Keyword and dependency weights renormalized to sum to one when the
/// semantic signal is switched off.
const WEIGHT_KEYWORD_NO_EMBED: f64 = 0.6;
const WEIGHT_DEPENDENCY_NO_EMBED: f64 = 0.4;

/// Fuses the keyword, dependency, and embedding strategies into one ranking.
///
/// Each sub-strategy contributes a positional score for the fragments it
/// returns; the fused scores then pass through query-pattern boosts before
/// the final cut.
pub struct HybridStrategy {
    keyword: KeywordStrategy,
    dependency: DependencyStrategy,
    embedding: Option<EmbeddingStrategy>,
    keyword_weight: f64,
    dependency_weight: f64,
    embedding_weight: f64,
}

impl HybridStrategy {
    #[must_use]
    pub fn new(client: Arc<dyn LlmClient>, use_embeddings: bool) -> Self {
        if use_embeddings {
            Self {
                keyword: KeywordStrategy::new(),
                dependency: DependencyStrategy::new(),
                embedding: Some(EmbeddingStrategy::new(client)),
                keyword_weight: WEIGHT_KEYWORD,
                dependency_weight: WEIGHT_DEPENDENCY,
                embedding_weight: WEIGHT_EMBEDDING,
            }
        } else {
            Self {
                keyword: KeywordStrategy::new(),
                dependency: DependencyStrategy::new(),
                embedding: None,
                keyword_weight: WEIGHT_KEYWORD_NO_EMBED,
                dependency_weight: WEIGHT_DEPENDENCY_NO_EMBED,
                embedding_weight: 0.0,
            }
        }
    }

    /// Fold one sub-strategy's ranked list into the fused scores. The i-th
    /// result out of n contributes `(1 - i/n) * weight`, so heads of lists
    /// count for nearly the full weight and tails for almost nothing.
    fn accumulate<'a>(
        ranked: Vec<&'a CodeFragment>,
        weight: f64,
        fused: &mut HashMap<&'a str, f64>,
        order: &mut Vec<&'a CodeFragment>,
    ) {
        let total = ranked.len();
        for (position, fragment) in ranked.into_iter().enumerate() {
            let positional = (1.0 - position as f64 / total as f64) * weight;
            match fused.get_mut(fragment.id.as_str()) {
                Some(score) => *score += positional,
                None => {
                    fused.insert(fragment.id.as_str(), positional);
                    order.push(fragment);
                }
            }
        }
    }

    /// Multiplicative boost from the shape of the query and the fragment's
    /// place in the codebase.
    fn contextual_boost(query: &str, fragment: &CodeFragment, index: &CodeIndex) -> f64 {
        let query = query.to_lowercase();
        let mut boost = 1.0;

        // Explanatory questions favor documented, high-level fragments.
        if query.contains("how") || query.contains("explain") {
            if fragment.has_documentation() {
                boost *= 1.5;
            }
            if fragment.kind == FragmentKind::Class {
                boost *= 1.3;
            }
        }

        // Implementation questions favor methods.
        if (query.contains("implement") || query.contains("add"))
            && fragment.kind == FragmentKind::Method
        {
            boost *= 1.4;
        }

        // Debugging questions favor error-handling code.
        if query.contains("bug") || query.contains("error") || query.contains("fix") {
            if let Some(content) = &fragment.content {
                if content.contains("catch") || content.contains("throw") {
                    boost *= 1.3;
                }
            }
        }

        if fragment.dependencies.len() > 3 {
            boost *= 1.2;
        }

        let dependents = index.find_dependents(&fragment.id).len();
        if dependents > 2 {
            boost *= 1.0 + 0.1 * (dependents as f64).ln();
        }

        boost
    }
}

impl RetrievalStrategy for HybridStrategy {
    fn name(&self) -> &str {
        if self.embedding.is_some() {
            "Hybrid (Keyword + Dependency + Semantic)"
        } else {
            "Hybrid (Keyword + Dependency)"
        }
    }

    fn retrieve<'a>(
        &self,
        query: &str,
        index: &'a CodeIndex,
        max_results: usize,
    ) -> Vec<&'a CodeFragment> {
        // Over-fetch from each sub-strategy so fusion has candidates beyond
        // the final cut.
        let fetch = max_results * 2;

        let mut fused: HashMap<&str, f64> = HashMap::new();
        let mut order: Vec<&CodeFragment> = Vec::new();

        Self::accumulate(
            self.keyword.retrieve(query, index, fetch),
            self.keyword_weight,
            &mut fused,
            &mut order,
        );
        Self::accumulate(
            self.dependency.retrieve(query, index, fetch),
            self.dependency_weight,
            &mut fused,
            &mut order,
        );
        if let Some(embedding) = &self.embedding {
            Self::accumulate(
                embedding.retrieve(query, index, fetch),
                self.embedding_weight,
                &mut fused,
                &mut order,
            );
        }

        let scored: Vec<(&CodeFragment, f64)> = order
            .into_iter()
            .map(|fragment| {
                let base = fused[fragment.id.as_str()];
                (fragment, base * Self::contextual_boost(query, fragment, index))
            })
            .collect();

        rank_descending(scored, max_results)
    }

    /// Weighted blend of the sub-strategy estimates. The semantic signal is
    /// excluded here; per-fragment relevance must stay cheap and offline.
    fn relevance(&self, query: &str, fragment: &CodeFragment) -> f64 {
        self.keyword.relevance(query, fragment) * self.keyword_weight
            + self.dependency.relevance(query, fragment) * self.dependency_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use retriever_llm::StubClient;

    fn fragment(id: &str, kind: FragmentKind, name: &str) -> CodeFragment {
        CodeFragment::new(id, kind, name)
    }

    fn strategy_without_embeddings() -> HybridStrategy {
        HybridStrategy::new(Arc::new(StubClient::new(8)), false)
    }

    #[test]
    fn name_reflects_active_signals() {
        let with = HybridStrategy::new(Arc::new(StubClient::new(8)), true);
        let without = strategy_without_embeddings();
        assert_eq!(with.name(), "Hybrid (Keyword + Dependency + Semantic)");
        assert_eq!(without.name(), "Hybrid (Keyword + Dependency)");
    }

    #[test]
    fn empty_index_yields_no_results() {
        let index = CodeIndex::build(Vec::new());
        let results = strategy_without_embeddings().retrieve("anything", &index, 10);
        assert!(results.is_empty());
    }

    #[test]
    fn retrieval_is_idempotent() {
        let mut repo = fragment("app.UserRepository", FragmentKind::Class, "UserRepository");
        repo.documentation = Some("Stores and loads users".to_string());
        repo.dependencies = vec!["Database".to_string()];
        let database = fragment("Database", FragmentKind::Class, "Database");
        let save = fragment("app.UserRepository.save", FragmentKind::Method, "save");

        let index = CodeIndex::build(vec![repo, database, save]);
        let strategy = strategy_without_embeddings();

        let first: Vec<String> = strategy
            .retrieve("user repository", &index, 10)
            .iter()
            .map(|f| f.id.clone())
            .collect();
        let second: Vec<String> = strategy
            .retrieve("user repository", &index, 10)
            .iter()
            .map(|f| f.id.clone())
            .collect();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn explanatory_queries_boost_documented_classes() {
        let mut documented = fragment("a.Cache", FragmentKind::Class, "Cache");
        documented.documentation = Some("Keeps hot entries in memory".to_string());
        let plain = fragment("b.cache", FragmentKind::Field, "cache");

        let index = CodeIndex::build(vec![plain, documented]);
        let results =
            strategy_without_embeddings().retrieve("explain how cache works", &index, 10);

        assert_eq!(results[0].id, "a.Cache");
    }

    #[test]
    fn implementation_queries_boost_methods() {
        // Identical names so only the query-pattern boost separates the
        // method from the field.
        let method = fragment("a.store", FragmentKind::Method, "store");
        let field = fragment("b.store", FragmentKind::Field, "store");

        let index = CodeIndex::build(vec![field, method]);
        let results = strategy_without_embeddings().retrieve("add store", &index, 10);

        assert_eq!(results[0].id, "a.store");
    }

    #[test]
    fn debugging_queries_boost_error_handling_code() {
        let index = CodeIndex::build(Vec::new());
        let mut handler = fragment("a.load", FragmentKind::Field, "load");
        handler.content = Some("try { read(); } catch (IOException e) { }".to_string());
        let plain = fragment("b.load", FragmentKind::Field, "load");

        let boosted = HybridStrategy::contextual_boost("fix load error", &handler, &index);
        let unboosted = HybridStrategy::contextual_boost("fix load error", &plain, &index);
        assert!((boosted - 1.3).abs() < 1e-9);
        assert!((unboosted - 1.0).abs() < 1e-9);
    }

    #[test]
    fn explanatory_boosts_stack_for_documented_classes() {
        let index = CodeIndex::build(Vec::new());
        let mut class = fragment("a.Cache", FragmentKind::Class, "Cache");
        class.documentation = Some("Keeps hot entries".to_string());

        let boost = HybridStrategy::contextual_boost("how does caching work", &class, &index);
        assert!((boost - 1.5 * 1.3).abs() < 1e-9);
    }

    #[test]
    fn heavily_depended_on_fragments_are_boosted() {
        let core = fragment("Core", FragmentKind::Field, "core");
        let mut fragments = vec![core];
        for i in 0..3 {
            let mut user = fragment(&format!("User{i}"), FragmentKind::Field, "unrelated");
            user.dependencies = vec!["Core".to_string()];
            fragments.push(user);
        }
        let index = CodeIndex::build(fragments);

        let boost = HybridStrategy::contextual_boost(
            "plain query",
            index.lookup_by_id("Core").unwrap(),
            &index,
        );
        assert!((boost - (1.0 + 0.1 * 3.0f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn dependency_heavy_fragments_are_boosted() {
        let index = CodeIndex::build(Vec::new());
        let mut hub = fragment("a.Hub", FragmentKind::Field, "hub");
        hub.dependencies = vec!["A", "B", "C", "D"].into_iter().map(String::from).collect();

        let boost = HybridStrategy::contextual_boost("plain query", &hub, &index);
        assert!((boost - 1.2).abs() < 1e-9);
    }

    #[test]
    fn relevance_blends_keyword_and_dependency_estimates() {
        let strategy = strategy_without_embeddings();
        let mut f = fragment("a.Cache", FragmentKind::Class, "Cache");
        f.dependencies = vec!["Store".to_string()];

        let expected = strategy.keyword.relevance("cache", &f) * WEIGHT_KEYWORD_NO_EMBED
            + 0.7 * WEIGHT_DEPENDENCY_NO_EMBED;
        assert!((strategy.relevance("cache", &f) - expected).abs() < 1e-9);
    }
}
