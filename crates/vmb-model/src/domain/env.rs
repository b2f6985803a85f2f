use serde::{Deserialize, Serialize};

/// Single environment variable exported to a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    key: String,
    value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Extra environment for scripts run against the platform.
///
/// Entries are kept in insertion order; a later entry for the same key wins.
/// Serialized as a plain JSON object (`{"KEY": "value"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "std::collections::BTreeMap<String, String>")]
#[serde(into = "std::collections::BTreeMap<String, String>")]
pub struct Env(Vec<KeyValue>);

impl Env {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyValue> {
        self.0.iter()
    }

    /// Value for `key`, honoring last-write-wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|kv| kv.key() == key)
            .map(KeyValue::value)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(KeyValue::new(key, value));
    }

    /// Concatenate `other` after `self` so its entries take precedence.
    pub fn merged(&self, other: &Env) -> Env {
        let mut out = self.0.clone();
        out.extend(other.0.iter().cloned());
        Env(out)
    }
}

impl From<std::collections::BTreeMap<String, String>> for Env {
    fn from(map: std::collections::BTreeMap<String, String>) -> Self {
        Env(map.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect())
    }
}

impl From<Env> for std::collections::BTreeMap<String, String> {
    fn from(env: Env) -> Self {
        env.0.into_iter().map(|kv| (kv.key, kv.value)).collect()
    }
}
