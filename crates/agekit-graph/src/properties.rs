//! Open property maps for vertices and edges.
//!
//! Identity keys (`ident`, and for edges `start_ident`/`end_ident`) live
//! inside the map itself; entities expose them through derived accessors so
//! there is never a stored field that can drift from its source of truth.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property key holding an entity's business key.
pub const IDENT_KEY: &str = "ident";
/// Property key holding an edge's start-vertex ident.
pub const START_IDENT_KEY: &str = "start_ident";
/// Property key holding an edge's end-vertex ident.
pub const END_IDENT_KEY: &str = "end_ident";

/// An open key→value map. Values are JSON values: string, number, bool,
/// null, ordered list, or nested map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(Map<String, Value>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, returning `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    // ── Identity accessors ───────────────────────────────────────

    /// The entity's business key. Blank strings count as absent.
    pub fn ident(&self) -> Option<&str> {
        self.string_key(IDENT_KEY)
    }

    pub fn start_ident(&self) -> Option<&str> {
        self.string_key(START_IDENT_KEY)
    }

    pub fn end_ident(&self) -> Option<&str> {
        self.string_key(END_IDENT_KEY)
    }

    pub fn set_ident(&mut self, ident: impl Into<String>) {
        self.0.insert(IDENT_KEY.to_string(), Value::String(ident.into()));
    }

    pub fn set_start_ident(&mut self, ident: impl Into<String>) {
        self.0
            .insert(START_IDENT_KEY.to_string(), Value::String(ident.into()));
    }

    pub fn set_end_ident(&mut self, ident: impl Into<String>) {
        self.0
            .insert(END_IDENT_KEY.to_string(), Value::String(ident.into()));
    }

    fn string_key(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    // ── Merging ──────────────────────────────────────────────────

    /// Key-level merge: every key in `other` overwrites; keys absent from
    /// `other` are preserved.
    pub fn merge(&mut self, other: &Properties) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

impl From<Map<String, Value>> for Properties {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
