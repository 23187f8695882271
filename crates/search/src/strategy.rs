use retriever_index::CodeIndex;
use retriever_model::CodeFragment;
use std::cmp::Ordering;

/// A retrieval strategy: rank fragments of an index against a query.
///
/// Implementations are selected at construction time and hold no per-query
/// state. An empty result list means "no signal from this strategy", which
/// callers must not treat as an error.
pub trait RetrievalStrategy {
    /// Strategy name for display.
    fn name(&self) -> &str;

    /// Return up to `max_results` fragments, most relevant first.
    fn retrieve<'a>(
        &self,
        query: &str,
        index: &'a CodeIndex,
        max_results: usize,
    ) -> Vec<&'a CodeFragment>;

    /// Standalone relevance estimate for a single fragment, used as a
    /// fallback signal outside full retrieval. Roughly normalized; values
    /// above 1.0 mean an unusually strong match.
    fn relevance(&self, query: &str, fragment: &CodeFragment) -> f64 {
        let _ = (query, fragment);
        0.0
    }
}

/// Sort scored candidates by score descending and truncate.
///
/// The sort is stable, so fragments with equal scores keep their encounter
/// order.
pub(crate) fn rank_descending<'a>(
    mut scored: Vec<(&'a CodeFragment, f64)>,
    max_results: usize,
) -> Vec<&'a CodeFragment> {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(max_results);
    scored.into_iter().map(|(fragment, _)| fragment).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use retriever_model::{CodeFragment, FragmentKind};

    #[test]
    fn ranking_is_stable_for_ties() {
        let a = CodeFragment::new("a", FragmentKind::Class, "a");
        let b = CodeFragment::new("b", FragmentKind::Class, "b");
        let c = CodeFragment::new("c", FragmentKind::Class, "c");

        let ranked = rank_descending(vec![(&a, 1.0), (&b, 2.0), (&c, 1.0)], 10);
        let ids: Vec<&str> = ranked.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);

        let ranked = rank_descending(vec![(&a, 1.0), (&b, 2.0), (&c, 1.0)], 2);
        assert_eq!(ranked.len(), 2);
    }
}
