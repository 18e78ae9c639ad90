//! Ordered entity collections with a bounded query cache.
//!
//! Each collection owns an LRU cache of query evaluations, guarded by a
//! single mutex so a shared collection stays coherent. Any structural
//! mutation (add/remove) clears the whole cache — a stale result must never
//! be observable after mutation. Exceeding capacity evicts the
//! least-recently-used entry before inserting.

use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::edge::Edge;
use crate::entity::Entity;
use crate::query::{CachedEval, Query, Step, Terminal};
use crate::vertex::Vertex;

/// Query-cache entries retained per collection.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

pub type VertexCollection = Collection<Vertex>;
pub type EdgeCollection = Collection<Edge>;

/// An ordered collection of vertices or edges, owned by a `Graph`.
pub struct Collection<T> {
    items: Vec<T>,
    cache: Mutex<LruCache<String, CachedEval>>,
}

impl<T: Entity> Collection<T> {
    pub(crate) fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub(crate) fn with_cache_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            items: Vec::new(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Start a query chain over this collection.
    pub fn query(&self) -> Query<'_, T> {
        Query::new(self)
    }

    /// Direct lookup by ident. Linear and uncached: diff and generator
    /// probes go through here so they never churn the query cache.
    pub fn by_ident(&self, ident: &str) -> Option<&T> {
        self.items.iter().find(|item| item.ident() == ident)
    }

    pub fn contains_ident(&self, ident: &str) -> bool {
        self.items.iter().any(|item| item.ident() == ident)
    }

    pub(crate) fn position_by_ident(&self, ident: &str) -> Option<usize> {
        self.items.iter().position(|item| item.ident() == ident)
    }

    pub(crate) fn item(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub(crate) fn push(&mut self, item: T) -> &T {
        self.invalidate();
        self.items.push(item);
        let last = self.items.len() - 1;
        &self.items[last]
    }

    pub(crate) fn remove_by_ident(&mut self, ident: &str) -> Option<T> {
        let position = self.position_by_ident(ident)?;
        self.invalidate();
        Some(self.items.remove(position))
    }

    /// Mutable access for in-place updates. Invalidates the cache up front:
    /// property edits can change what any memoized predicate matches.
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.invalidate();
        self.items.get_mut(index)
    }

    pub(crate) fn invalidate(&self) {
        self.cache.lock().clear();
    }

    #[cfg(test)]
    pub(crate) fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }

    pub(crate) fn evaluate(&self, steps: &[Step], terminal: Terminal) -> CachedEval {
        let key = Step::cache_key(steps, terminal);
        if let Some(hit) = self.cache.lock().get(&key) {
            return hit.clone();
        }

        let eval = match terminal {
            Terminal::All => CachedEval::Indices(self.matching_indices(steps, usize::MAX)),
            Terminal::First => CachedEval::Indices(self.matching_indices(steps, 1)),
            Terminal::Count => CachedEval::Count(self.matching_indices(steps, usize::MAX).len()),
        };
        self.cache.lock().put(key, eval.clone());
        eval
    }

    fn matching_indices(&self, steps: &[Step], limit: usize) -> Vec<usize> {
        let mut indices = Vec::new();
        for (index, item) in self.items.iter().enumerate() {
            if steps.iter().all(|step| step.matches(item)) {
                indices.push(index);
                if indices.len() >= limit {
                    break;
                }
            }
        }
        indices
    }
}

impl<T: Entity + fmt::Debug> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

impl<T: Entity + Clone> Clone for Collection<T> {
    fn clone(&self) -> Self {
        let capacity = self.cache.lock().cap();
        Self {
            items: self.items.clone(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl<T: Entity + PartialEq> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::ops::Index<usize> for Collection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::graph::Graph;
    use crate::properties::Properties;

    fn props(value: serde_json::Value) -> Properties {
        Properties::from_value(value).unwrap_or_default()
    }

    fn sample_graph() -> Graph {
        let mut graph = Graph::new("g");
        graph
            .add_vertex("Person", props(json!({"ident": "a", "city": "Oslo"})))
            .unwrap();
        graph
            .add_vertex("Person", props(json!({"ident": "b", "city": "Bergen"})))
            .unwrap();
        graph
            .add_vertex("Company", props(json!({"ident": "acme", "city": "Oslo"})))
            .unwrap();
        graph
            .add_edge("WORKS_AT", "a", "acme", props(json!({"ident": "w1"})))
            .unwrap();
        graph
            .add_edge("WORKS_AT", "b", "acme", props(json!({"ident": "w2"})))
            .unwrap();
        graph
    }

    #[test]
    fn test_chain_filters_in_collection_order() {
        let graph = sample_graph();
        let people = graph.vertices().query().label("Person").all();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].ident(), "a");
        assert_eq!(people[1].ident(), "b");

        let in_oslo = graph
            .vertices()
            .query()
            .label("Person")
            .prop("city", "Oslo")
            .all();
        assert_eq!(in_oslo.len(), 1);
        assert_eq!(in_oslo[0].ident(), "a");
    }

    #[test]
    fn test_prefix_is_reusable_across_terminals() {
        let graph = sample_graph();
        let prefix = graph.edges().query().label("WORKS_AT");

        assert_eq!(prefix.count(), 2);
        assert_eq!(prefix.clone().end_ident("acme").count(), 2);
        assert_eq!(
            prefix.clone().start_ident("b").first().map(|e| e.ident()),
            Some("w2")
        );
        // The original prefix is untouched by the branched chains.
        assert_eq!(prefix.all().len(), 2);
    }

    #[test]
    fn test_cached_result_equals_fresh_evaluation() {
        let graph = sample_graph();

        let fresh: Vec<String> = graph
            .vertices()
            .query()
            .label("Person")
            .all()
            .iter()
            .map(|v| v.ident().to_string())
            .collect();
        assert!(graph.vertices().cached_entries() > 0);

        // Second run hits the memoized entry.
        let cached: Vec<String> = graph
            .vertices()
            .query()
            .label("Person")
            .all()
            .iter()
            .map(|v| v.ident().to_string())
            .collect();
        assert_eq!(fresh, cached);
    }

    #[test]
    fn test_structural_mutation_invalidates_cache() {
        let mut graph = sample_graph();

        assert_eq!(graph.vertices().query().label("Person").count(), 2);
        assert!(graph.vertices().cached_entries() > 0);

        graph
            .add_vertex("Person", props(json!({"ident": "c"})))
            .unwrap();
        assert_eq!(graph.vertices().cached_entries(), 0);
        assert_eq!(graph.vertices().query().label("Person").count(), 3);

        graph.remove_vertex("c");
        assert_eq!(graph.vertices().query().label("Person").count(), 2);
    }

    #[test]
    fn test_terminals_memoize_separately() {
        let graph = sample_graph();
        let query = graph.vertices().query().label("Person");

        assert_eq!(query.count(), 2);
        assert_eq!(query.all().len(), 2);
        assert_eq!(query.first().map(|v| v.ident()), Some("a"));
        // One entry per (chain, terminal) pair.
        assert_eq!(graph.vertices().cached_entries(), 3);
    }

    #[test]
    fn test_lru_eviction_is_bounded() {
        let mut graph = Graph::new("g");
        for i in 0..10 {
            graph
                .add_vertex("Person", props(json!({"ident": format!("v{i}")})))
                .unwrap();
        }

        // Far more distinct chains than the cache holds.
        for i in 0..(super::DEFAULT_CACHE_CAPACITY + 50) {
            let ident = format!("v{}", i % 10);
            graph.vertices().query().ident(ident).prop("round", i as i64).count();
        }
        assert!(graph.vertices().cached_entries() <= super::DEFAULT_CACHE_CAPACITY);

        // Evicted or not, results stay correct.
        assert_eq!(graph.vertices().query().ident("v3").count(), 1);
    }
}
