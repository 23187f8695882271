use crate::tokenize::extract_tokens;
use retriever_model::{CodeFragment, FragmentKind};
use std::collections::{HashMap, HashSet};

/// Immutable multi-view index over a snapshot of code fragments.
///
/// Internal maps store positions into the owned snapshot; public lookups hand
/// out `&CodeFragment`. Fragment ids are assumed unique; behavior with
/// duplicate ids is undefined, not rejected.
pub struct CodeIndex {
    fragments: Vec<CodeFragment>,
    by_id: HashMap<String, usize>,
    by_kind: HashMap<FragmentKind, Vec<usize>>,
    by_package: HashMap<String, Vec<usize>>,
    /// lowercase token -> positions of fragments containing it
    inverted: HashMap<String, HashSet<usize>>,
    /// fragment id -> raw dependency names (only fragments with >= 1 dependency)
    dependency_graph: HashMap<String, HashSet<String>>,
}

impl CodeIndex {
    /// Build all views in a single pass over the fragment set.
    #[must_use]
    pub fn build(fragments: Vec<CodeFragment>) -> Self {
        let mut index = Self {
            fragments,
            by_id: HashMap::new(),
            by_kind: HashMap::new(),
            by_package: HashMap::new(),
            inverted: HashMap::new(),
            dependency_graph: HashMap::new(),
        };

        for (pos, fragment) in index.fragments.iter().enumerate() {
            index.by_id.insert(fragment.id.clone(), pos);
            index.by_kind.entry(fragment.kind).or_default().push(pos);

            if let Some(package) = &fragment.package_name {
                index.by_package.entry(package.clone()).or_default().push(pos);
            }

            for token in extract_tokens(fragment) {
                index.inverted.entry(token).or_default().insert(pos);
            }

            if !fragment.dependencies.is_empty() {
                index.dependency_graph.insert(
                    fragment.id.clone(),
                    fragment.dependencies.iter().cloned().collect(),
                );
            }
        }

        log::info!("Built index with {} fragments", index.fragments.len());
        index
    }

    /// Number of indexed fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The full snapshot, in parser order.
    #[must_use]
    pub fn fragments(&self) -> &[CodeFragment] {
        &self.fragments
    }

    #[must_use]
    pub fn lookup_by_id(&self, id: &str) -> Option<&CodeFragment> {
        self.by_id.get(id).map(|&pos| &self.fragments[pos])
    }

    #[must_use]
    pub fn by_kind(&self, kind: FragmentKind) -> Vec<&CodeFragment> {
        self.by_kind
            .get(&kind)
            .map(|positions| positions.iter().map(|&p| &self.fragments[p]).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn by_package(&self, package: &str) -> Vec<&CodeFragment> {
        self.by_package
            .get(package)
            .map(|positions| positions.iter().map(|&p| &self.fragments[p]).collect())
            .unwrap_or_default()
    }

    /// Coarse keyword pre-filter: lowercase whitespace terms, union the
    /// inverted-index hits per term, and rank fragments by hit count
    /// descending. Ties keep snapshot order.
    ///
    /// This is the seed source for the dependency strategy, not the primary
    /// keyword ranking.
    #[must_use]
    pub fn search_by_keywords(&self, query: &str) -> Vec<&CodeFragment> {
        let mut hits: HashMap<usize, usize> = HashMap::new();
        for term in query.to_lowercase().split_whitespace() {
            if let Some(positions) = self.inverted.get(term) {
                for &pos in positions {
                    *hits.entry(pos).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, usize)> = hits.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked
            .into_iter()
            .map(|(pos, _)| &self.fragments[pos])
            .collect()
    }

    /// Fragments whose dependency set contains `id`, in snapshot order.
    ///
    /// Dependency names are bare type names, so a match only occurs when such
    /// a name happens to equal the full id (see `find_dependencies`).
    #[must_use]
    pub fn find_dependents(&self, id: &str) -> Vec<&CodeFragment> {
        let mut positions: Vec<usize> = self
            .dependency_graph
            .iter()
            .filter(|(_, deps)| deps.contains(id))
            .filter_map(|(dependent_id, _)| self.by_id.get(dependent_id).copied())
            .collect();
        positions.sort_unstable();
        positions.into_iter().map(|p| &self.fragments[p]).collect()
    }

    /// Fragments that `id` depends on, resolved by matching raw dependency
    /// names against fragment ids. Unresolved names are dropped.
    #[must_use]
    pub fn find_dependencies(&self, id: &str) -> Vec<&CodeFragment> {
        let Some(deps) = self.dependency_graph.get(id) else {
            return Vec::new();
        };
        let mut positions: Vec<usize> = deps
            .iter()
            .filter_map(|name| self.by_id.get(name).copied())
            .collect();
        positions.sort_unstable();
        positions.into_iter().map(|p| &self.fragments[p]).collect()
    }

    /// All fragments sharing the package of `fragment`, excluding itself.
    #[must_use]
    pub fn find_siblings(&self, fragment: &CodeFragment) -> Vec<&CodeFragment> {
        let Some(package) = &fragment.package_name else {
            return Vec::new();
        };
        self.by_package(package)
            .into_iter()
            .filter(|sibling| sibling.id != fragment.id)
            .collect()
    }

    /// Attach embedding vectors to the snapshot slice starting at `start`,
    /// one vector per fragment in order. This is the finalize phase of the
    /// two-phase build and must complete before queries are served.
    pub fn attach_embeddings(&mut self, start: usize, vectors: Vec<Vec<f32>>) {
        for (offset, vector) in vectors.into_iter().enumerate() {
            if let Some(fragment) = self.fragments.get_mut(start + offset) {
                fragment.embedding = Some(vector);
            }
        }
    }
}
