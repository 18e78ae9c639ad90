//! Chainable, cached query builder over graph collections.
//!
//! Each predicate step returns a new builder carrying the accumulated chain;
//! builders are `Clone`, so a prefix can branch into several chains and each
//! chain can drain through multiple terminals. Evaluation results are
//! memoized per (step sequence, terminal) in the owning collection's LRU
//! cache — see `collection.rs` for the invalidation rules.

use serde_json::Value;

use crate::collection::Collection;
use crate::edge::Edge;
use crate::entity::Entity;
use crate::properties::{END_IDENT_KEY, START_IDENT_KEY};

/// One predicate in a query chain.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    Label(String),
    Ident(String),
    Prop(String, Value),
    StartIdent(String),
    EndIdent(String),
}

impl Step {
    pub(crate) fn matches<T: Entity>(&self, item: &T) -> bool {
        match self {
            Step::Label(label) => item.label() == label,
            Step::Ident(ident) => item.ident() == ident,
            Step::Prop(key, value) => item.properties().get(key) == Some(value),
            Step::StartIdent(ident) => {
                item.properties()
                    .get(START_IDENT_KEY)
                    .and_then(Value::as_str)
                    == Some(ident)
            }
            Step::EndIdent(ident) => {
                item.properties().get(END_IDENT_KEY).and_then(Value::as_str) == Some(ident)
            }
        }
    }

    fn key_part(&self) -> String {
        match self {
            Step::Label(label) => format!("label={label}"),
            Step::Ident(ident) => format!("ident={ident}"),
            Step::Prop(key, value) => format!("prop:{key}={value}"),
            Step::StartIdent(ident) => format!("start_ident={ident}"),
            Step::EndIdent(ident) => format!("end_ident={ident}"),
        }
    }

    /// Canonical serialization of a chain plus its terminal, used as the
    /// memoization key.
    pub(crate) fn cache_key(steps: &[Step], terminal: Terminal) -> String {
        let mut key = String::new();
        for step in steps {
            key.push_str(&step.key_part());
            key.push('|');
        }
        key.push('#');
        key.push_str(terminal.key_part());
        key
    }
}

/// The drain applied at the end of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Terminal {
    All,
    First,
    Count,
}

impl Terminal {
    fn key_part(self) -> &'static str {
        match self {
            Terminal::All => "all",
            Terminal::First => "first",
            Terminal::Count => "count",
        }
    }
}

/// A memoized evaluation: element positions for `all`/`first`, a plain
/// count for `count`. Positions stay valid until the next structural
/// mutation, which clears the cache wholesale.
#[derive(Debug, Clone)]
pub(crate) enum CachedEval {
    Indices(Vec<usize>),
    Count(usize),
}

/// A query chain over one collection.
pub struct Query<'a, T> {
    collection: &'a Collection<T>,
    steps: Vec<Step>,
}

impl<'a, T> Clone for Query<'a, T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection,
            steps: self.steps.clone(),
        }
    }
}

impl<'a, T: Entity> Query<'a, T> {
    pub(crate) fn new(collection: &'a Collection<T>) -> Self {
        Self {
            collection,
            steps: Vec::new(),
        }
    }

    fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    // ── Steps ────────────────────────────────────────────────────

    pub fn label(self, label: impl Into<String>) -> Self {
        self.step(Step::Label(label.into()))
    }

    pub fn ident(self, ident: impl Into<String>) -> Self {
        self.step(Step::Ident(ident.into()))
    }

    pub fn prop(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.step(Step::Prop(key.into(), value.into()))
    }

    // ── Terminals ────────────────────────────────────────────────

    /// All matching items, in collection order.
    pub fn all(&self) -> Vec<&'a T> {
        match self.collection.evaluate(&self.steps, Terminal::All) {
            CachedEval::Indices(indices) => indices
                .iter()
                .filter_map(|&i| self.collection.item(i))
                .collect(),
            CachedEval::Count(_) => Vec::new(),
        }
    }

    /// The first matching item.
    pub fn first(&self) -> Option<&'a T> {
        match self.collection.evaluate(&self.steps, Terminal::First) {
            CachedEval::Indices(indices) => {
                indices.first().and_then(|&i| self.collection.item(i))
            }
            CachedEval::Count(_) => None,
        }
    }

    /// Number of matching items.
    pub fn count(&self) -> usize {
        match self.collection.evaluate(&self.steps, Terminal::Count) {
            CachedEval::Count(count) => count,
            CachedEval::Indices(indices) => indices.len(),
        }
    }
}

impl<'a> Query<'a, Edge> {
    pub fn start_ident(self, ident: impl Into<String>) -> Self {
        self.step(Step::StartIdent(ident.into()))
    }

    pub fn end_ident(self, ident: impl Into<String>) -> Self {
        self.step(Step::EndIdent(ident.into()))
    }
}
