use crate::strategy::{rank_descending, RetrievalStrategy};
use retriever_index::CodeIndex;
use retriever_model::{CodeFragment, FragmentKind};
use strsim::jaro_winkler;

const EXACT_NAME_SCORE: f64 = 10.0;
const SUBSTRING_NAME_SCORE: f64 = 5.0;
const SIMILARITY_THRESHOLD: f64 = 0.8;
const SIMILARITY_WEIGHT: f64 = 3.0;
const CONTENT_MATCH_WEIGHT: f64 = 2.0;
const DOCUMENTED_MULTIPLIER: f64 = 1.1;

/// How much of the fragment body participates in content matching.
const CONTENT_PREVIEW_LEN: usize = 500;

/// Lexical retrieval: exact, substring, and Jaro-Winkler name matching plus
/// content containment, over a full scan of the index.
pub struct KeywordStrategy;

impl KeywordStrategy {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Name, signature, documentation, and the leading slice of the body,
    /// concatenated for containment checks.
    fn searchable_content(fragment: &CodeFragment) -> String {
        let mut text = String::new();
        text.push_str(&fragment.name);
        text.push(' ');

        if let Some(signature) = &fragment.signature {
            text.push_str(signature);
            text.push(' ');
        }
        if let Some(documentation) = &fragment.documentation {
            text.push_str(documentation);
            text.push(' ');
        }
        if let Some(content) = &fragment.content {
            let end = content
                .char_indices()
                .nth(CONTENT_PREVIEW_LEN)
                .map_or(content.len(), |(i, _)| i);
            text.push_str(&content[..end]);
        }

        text
    }

    /// The kind multiplier runs inside the per-term loop, so it compounds
    /// once per query term. That compounding is part of the scoring
    /// contract; do not hoist it out of the loop.
    fn apply_kind_multiplier(score: f64, kind: FragmentKind) -> f64 {
        match kind {
            FragmentKind::Class => score * 1.2,
            FragmentKind::Method => score * 1.1,
            _ => score,
        }
    }

    fn score_terms(terms: &[String], fragment: &CodeFragment) -> f64 {
        let mut score = 0.0;

        let name = fragment.name.to_lowercase();
        let content = Self::searchable_content(fragment).to_lowercase();

        for term in terms {
            if name == *term {
                score += EXACT_NAME_SCORE;
            } else if name.contains(term.as_str()) {
                score += SUBSTRING_NAME_SCORE;
            }

            let similarity = jaro_winkler(term, &name);
            if similarity > SIMILARITY_THRESHOLD {
                score += similarity * SIMILARITY_WEIGHT;
            }

            if let Some(first_occurrence) = content.find(term.as_str()) {
                // Earlier occurrences score higher.
                let position_factor = 1.0 - first_occurrence as f64 / content.len() as f64;
                score += CONTENT_MATCH_WEIGHT * (1.0 + position_factor);
            }

            score = Self::apply_kind_multiplier(score, fragment.kind);
        }

        if fragment.has_documentation() {
            score *= DOCUMENTED_MULTIPLIER;
        }

        score
    }
}

impl Default for KeywordStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetrievalStrategy for KeywordStrategy {
    fn name(&self) -> &str {
        "Keyword-Based"
    }

    fn retrieve<'a>(
        &self,
        query: &str,
        index: &'a CodeIndex,
        max_results: usize,
    ) -> Vec<&'a CodeFragment> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let scored: Vec<(&CodeFragment, f64)> = index
            .fragments()
            .iter()
            .filter_map(|fragment| {
                let score = Self::score_terms(&terms, fragment);
                (score > 0.0).then_some((fragment, score))
            })
            .collect();

        rank_descending(scored, max_results)
    }

    fn relevance(&self, query: &str, fragment: &CodeFragment) -> f64 {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self::score_terms(&terms, fragment) / EXACT_NAME_SCORE
    }
}
