use crate::strategy::{rank_descending, RetrievalStrategy};
use retriever_index::CodeIndex;
use retriever_model::{CodeFragment, FragmentKind};
use std::collections::{HashMap, HashSet, VecDeque};

/// Number of keyword pre-filter hits used as expansion seeds.
const SEED_COUNT: usize = 3;

/// Maximum hops from a seed during expansion.
const MAX_DEPTH: usize = 2;

/// Package siblings considered per visited fragment.
const SIBLING_LIMIT: usize = 3;

const SEED_SCORE: f64 = 10.0;
const DIRECT_CONNECTION_SCORE: f64 = 5.0;
const TRANSITIVE_CONNECTION_SCORE: f64 = 2.0;

/// Structural retrieval: seed from coarse keyword hits, expand through the
/// dependency graph and package siblings up to a bounded depth, and score by
/// proximity to the seeds.
pub struct DependencyStrategy;

impl DependencyStrategy {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Breadth-first expansion from the seed set. Each newly discovered
    /// fragment is recorded one hop deeper than its parent; the first-seen
    /// depth wins and nothing is re-queued. Returns seeds plus everything
    /// reached within [`MAX_DEPTH`] hops, in discovery order.
    fn expand<'a>(seeds: &[&'a CodeFragment], index: &'a CodeIndex) -> Vec<&'a CodeFragment> {
        let mut expanded: Vec<&CodeFragment> = seeds.to_vec();
        let mut depths: HashMap<&str, usize> =
            seeds.iter().map(|s| (s.id.as_str(), 0)).collect();
        let mut queue: VecDeque<&CodeFragment> = seeds.iter().copied().collect();

        while let Some(current) = queue.pop_front() {
            let depth = depths[current.id.as_str()];
            if depth >= MAX_DEPTH {
                continue;
            }

            let neighbors = index
                .find_dependencies(&current.id)
                .into_iter()
                .chain(index.find_dependents(&current.id))
                .chain(index.find_siblings(current).into_iter().take(SIBLING_LIMIT));

            for next in neighbors {
                if depths.contains_key(next.id.as_str()) {
                    continue;
                }
                depths.insert(next.id.as_str(), depth + 1);
                expanded.push(next);
                queue.push_back(next);
            }
        }

        log::debug!(
            "Expanded from {} seeds to {} related fragments",
            seeds.len(),
            expanded.len()
        );
        expanded
    }

    /// Sharing a named dependency reference in either direction, or living in
    /// the same package.
    fn directly_connected(a: &CodeFragment, b: &CodeFragment) -> bool {
        a.dependencies.iter().any(|d| d == &b.name)
            || b.dependencies.iter().any(|d| d == &a.name)
            || matches!(
                (&a.package_name, &b.package_name),
                (Some(pa), Some(pb)) if pa == pb
            )
    }

    fn score_by_proximity<'a>(
        seeds: &[&'a CodeFragment],
        related: Vec<&'a CodeFragment>,
    ) -> Vec<(&'a CodeFragment, f64)> {
        let seed_ids: HashSet<&str> = seeds.iter().map(|s| s.id.as_str()).collect();

        related
            .into_iter()
            .map(|fragment| {
                let mut score = if seed_ids.contains(fragment.id.as_str()) {
                    SEED_SCORE
                } else {
                    seeds
                        .iter()
                        .map(|seed| {
                            if Self::directly_connected(fragment, seed) {
                                DIRECT_CONNECTION_SCORE
                            } else {
                                TRANSITIVE_CONNECTION_SCORE
                            }
                        })
                        .sum()
                };

                score = match fragment.kind {
                    FragmentKind::Class => score * 1.3,
                    FragmentKind::Method => score * 1.2,
                    _ => score,
                };

                (fragment, score)
            })
            .collect()
    }
}

impl Default for DependencyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl RetrievalStrategy for DependencyStrategy {
    fn name(&self) -> &str {
        "Dependency-Based"
    }

    fn retrieve<'a>(
        &self,
        query: &str,
        index: &'a CodeIndex,
        max_results: usize,
    ) -> Vec<&'a CodeFragment> {
        let seeds: Vec<&CodeFragment> = index
            .search_by_keywords(query)
            .into_iter()
            .take(SEED_COUNT)
            .collect();

        if seeds.is_empty() {
            log::warn!("No seed fragments found for query: {query}");
            return Vec::new();
        }

        let expanded = Self::expand(&seeds, index);
        let scored = Self::score_by_proximity(&seeds, expanded);
        rank_descending(scored, max_results)
    }

    /// Coarse proxy, not query-sensitive: fragments with structural edges
    /// are assumed more relevant to dependency-flavored retrieval.
    fn relevance(&self, _query: &str, fragment: &CodeFragment) -> f64 {
        if fragment.dependencies.is_empty() {
            0.3
        } else {
            0.7
        }
    }
}
