//! # Build and parse hooks
//!
//! Two hook points sit between the caller's JSON tree and the SOAP XML:
//!
//! - `before_build` receives the [`FieldRecord`]s of one complex level of the
//!   request together with the element names the schema declares for it,
//!   right before they are turned into XML elements.
//! - `after_children_hash` receives each map decoded from the response,
//!   bottom-up, once all of its children have been decoded.
//!
//! [`Callbacks::default`] installs [`normalize_request`] and
//! [`normalize_response`]. Extra hooks run after them, in registration order.

mod request;
mod response;

pub use request::{fuzzy_matches, match_key, normalize_request};
pub use response::{LONG_WRAPPER_KEY, normalize_response};

use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// One field of a request level: a name and the values to emit under it.
///
/// Each arg becomes one occurrence of the element.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    pub name: String,
    pub args: Vec<Value>,
}

impl FieldRecord {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Record for a JSON object entry: arrays spread into one arg per item.
    pub fn from_entry(name: &str, value: &Value) -> Self {
        let args = match value {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        };
        Self::new(name, args)
    }
}

pub type BeforeBuildHook = dyn Fn(&mut Vec<FieldRecord>, &[String]) + Send + Sync;
pub type AfterChildrenHashHook = dyn Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync;

/// Hooks used by one client
#[derive(Clone)]
pub struct Callbacks {
    before_build: Vec<Arc<BeforeBuildHook>>,
    after_children_hash: Vec<Arc<AfterChildrenHashHook>>,
}

impl Default for Callbacks {
    fn default() -> Self {
        let mut callbacks = Self::empty();
        callbacks
            .on_before_build(|records, declared| normalize_request(records, declared))
            .on_after_children_hash(normalize_response);
        callbacks
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("before_build", &self.before_build.len())
            .field("after_children_hash", &self.after_children_hash.len())
            .finish()
    }
}

impl Callbacks {
    /// No hooks at all: names, order and keys are left as they come
    pub fn empty() -> Self {
        Self {
            before_build: Vec::new(),
            after_children_hash: Vec::new(),
        }
    }

    pub fn on_before_build<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(&mut Vec<FieldRecord>, &[String]) + Send + Sync + 'static,
    {
        self.before_build.push(Arc::new(hook));
        self
    }

    pub fn on_after_children_hash<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.after_children_hash.push(Arc::new(hook));
        self
    }

    pub fn before_build(&self, records: &mut Vec<FieldRecord>, declared_names: &[String]) {
        for hook in &self.before_build {
            hook(records, declared_names);
        }
    }

    pub fn after_children_hash(&self, hash: Map<String, Value>) -> Map<String, Value> {
        self.after_children_hash
            .iter()
            .fold(hash, |hash, hook| hook(hash))
    }

    pub fn before_build_count(&self) -> usize {
        self.before_build.len()
    }

    pub fn after_children_hash_count(&self) -> usize {
        self.after_children_hash.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    #[test]
    fn default_callbacks_normalize_both_ways() {
        let callbacks = Callbacks::default();

        let mut records = vec![FieldRecord::new("b", vec![]), FieldRecord::new("a", vec![])];
        callbacks.before_build(&mut records, &["A".to_string(), "B".to_string()]);
        assert_eq!(records[0].name, "A");
        assert_eq!(records[1].name, "B");

        let mut hash = Map::new();
        hash.insert("SomeKey".to_string(), json!(1));
        let hash = callbacks.after_children_hash(hash);
        assert!(hash.contains_key("some_key"));
    }

    #[test]
    fn extra_hooks_run_after_defaults() {
        let mut callbacks = Callbacks::default();
        callbacks.on_after_children_hash(|mut hash| {
            // la clé est déjà en snake_case ici
            let seen = hash.contains_key("some_key");
            hash.insert("seen_snake_case".to_string(), json!(seen));
            hash
        });

        let mut hash = Map::new();
        hash.insert("SomeKey".to_string(), json!(1));
        let hash = callbacks.after_children_hash(hash);
        assert_eq!(hash.get("seen_snake_case"), Some(&json!(true)));
    }

    #[test]
    fn from_entry_spreads_arrays() {
        let record = FieldRecord::from_entry("long", &json!([1, 2]));
        assert_eq!(record.args, vec![json!(1), json!(2)]);

        let record = FieldRecord::from_entry("name", &json!("x"));
        assert_eq!(record.args, vec![json!("x")]);
    }

    #[test]
    fn callbacks_are_independent_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                thread::spawn(move || {
                    let mut callbacks = Callbacks::default();
                    if i % 2 == 0 {
                        callbacks.on_before_build(|_, _| {});
                    }
                    (i, callbacks.before_build_count(), callbacks.after_children_hash_count())
                })
            })
            .collect();

        for handle in handles {
            let (i, before, after) = handle.join().unwrap();
            assert_eq!(before, if i % 2 == 0 { 2 } else { 1 });
            assert_eq!(after, 1);
        }
    }
}
