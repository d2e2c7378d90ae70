//! Generic entity store: folds status lines onto per-key snapshots and
//! reports which fields changed, so the routing table in `lib.rs` only
//! has to dispatch by source string once.

use std::collections::HashMap;
use std::hash::Hash;

use flex_protocol::StatusLine;

/// A type that knows how to build its next value from its previous
/// value (if any) and a status line's attributes, reporting which
/// fields the line actually touched.
///
/// Implementors should be permissive: an attribute that's missing or
/// unparsable leaves the corresponding field at its previous value (or
/// a sensible default on first sight) rather than failing the whole
/// line.
pub trait EntitySnapshot: Clone + PartialEq {
    /// Wire source name this snapshot is parsed from, for logging only.
    const SOURCE: &'static str;

    fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>);
}

/// What happened to one entity as the result of a status line.
#[derive(Clone, Debug)]
pub enum Change<S> {
    /// The entity was created or updated; `diff` names the fields the
    /// line actually changed (empty if the line repeated the current
    /// state verbatim).
    Updated { snapshot: S, diff: Vec<&'static str> },
    /// The entity was removed from the store.
    Removed,
}

/// A keyed table of one entity kind's snapshots.
#[derive(Debug)]
pub struct Store<K, S> {
    entries: HashMap<K, S>,
}

impl<K: Clone, S: Clone> Clone for Store<K, S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K, S> Default for Store<K, S> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K, S> Store<K, S>
where
    K: Eq + Hash + Clone,
    S: EntitySnapshot,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&S> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut S> {
        self.entries.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &S)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Fold a status line onto the entity identified by `key`, removing
    /// it if the line signals removal.
    pub fn apply(&mut self, key: K, line: &StatusLine) -> Change<S> {
        if line.is_removed() {
            self.entries.remove(&key);
            tracing::debug!(source = S::SOURCE, "entity removed");
            return Change::Removed;
        }
        let previous = self.entries.get(&key);
        let (next, diff) = S::apply(previous, line);
        self.entries.insert(key, next.clone());
        Change::Updated { snapshot: next, diff }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Default)]
    struct Counter {
        value: i64,
    }

    impl EntitySnapshot for Counter {
        const SOURCE: &'static str = "counter";

        fn apply(previous: Option<&Self>, line: &StatusLine) -> (Self, Vec<&'static str>) {
            let mut next = previous.cloned().unwrap_or_default();
            let mut diff = Vec::new();
            if let Some(raw) = line.attr("value") {
                if let Ok(v) = raw.parse::<i64>() {
                    if v != next.value {
                        next.value = v;
                        diff.push("value");
                    }
                }
            }
            (next, diff)
        }
    }

    fn line(payload: &str) -> StatusLine {
        flex_protocol::tokenize(payload)
    }

    #[test]
    fn first_line_creates_entry_with_full_diff() {
        let mut store: Store<String, Counter> = Store::new();
        let change = store.apply("a".to_string(), &line("counter a value=3"));
        match change {
            Change::Updated { snapshot, diff } => {
                assert_eq!(snapshot.value, 3);
                assert_eq!(diff, vec!["value"]);
            }
            Change::Removed => panic!("expected Updated"),
        }
    }

    #[test]
    fn identical_line_produces_empty_diff() {
        let mut store: Store<String, Counter> = Store::new();
        store.apply("a".to_string(), &line("counter a value=3"));
        let change = store.apply("a".to_string(), &line("counter a value=3"));
        match change {
            Change::Updated { diff, .. } => assert!(diff.is_empty()),
            Change::Removed => panic!("expected Updated"),
        }
    }

    #[test]
    fn removed_line_drops_entry() {
        let mut store: Store<String, Counter> = Store::new();
        store.apply("a".to_string(), &line("counter a value=3"));
        let change = store.apply("a".to_string(), &line("counter a removed"));
        assert!(matches!(change, Change::Removed));
        assert!(store.get(&"a".to_string()).is_none());
    }
}
