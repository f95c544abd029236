//! Prefix tree for longest-match recognition
//!
//! The tokenizer stores every multi-character operator and multi-word
//! keyword in a [`Trie`] and walks it one char at a time, so `<`, `<=` and
//! `<=>`, or `NOT` and `NOT LIKE`, are told apart in a single pass.

use std::collections::HashMap;

/// Outcome of walking a key through a trie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrieResult {
    /// No inserted key continues along this path
    Failed,
    /// The path is a strict prefix of some inserted key
    Prefix,
    /// The path is exactly an inserted key
    Exists,
}

/// A prefix tree keyed by chars, holding an optional value per terminal node.
///
/// ```
/// use sqlshift::trie::{Trie, TrieResult};
///
/// let mut trie = Trie::new();
/// trie.insert("<=", 1);
/// trie.insert("<=>", 2);
///
/// let (result, node) = trie.lookup("<=");
/// assert_eq!(result, TrieResult::Exists);
/// assert_eq!(node.and_then(|n| n.step('>').1).and_then(|n| n.value()), Some(&2));
/// assert_eq!(trie.lookup("<").0, TrieResult::Prefix);
/// assert_eq!(trie.lookup("=").0, TrieResult::Failed);
/// ```
#[derive(Debug, Clone)]
pub struct Trie<V> {
    children: HashMap<char, Trie<V>>,
    value: Option<V>,
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            value: None,
        }
    }

    /// Insert `key`, replacing any value already stored for it.
    pub fn insert(&mut self, key: &str, value: V) {
        let mut node = self;
        for ch in key.chars() {
            node = node.children.entry(ch).or_default();
        }
        node.value = Some(value);
    }

    /// Insert many keys at once.
    pub fn extend<K, I>(&mut self, entries: I)
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in entries {
            self.insert(key.as_ref(), value);
        }
    }

    /// Walk `key` from this node.
    ///
    /// Returns the classification together with the node reached, so a
    /// caller can keep walking with [`Trie::step`]. An empty key classifies
    /// as `Prefix` of a non-empty trie, since every key continues from it.
    pub fn lookup(&self, key: &str) -> (TrieResult, Option<&Trie<V>>) {
        let mut node = self;
        for ch in key.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return (TrieResult::Failed, None),
            }
        }
        (node.classify(), Some(node))
    }

    /// Advance one char from this node.
    pub fn step(&self, ch: char) -> (TrieResult, Option<&Trie<V>>) {
        match self.children.get(&ch) {
            Some(child) => (child.classify(), Some(child)),
            None => (TrieResult::Failed, None),
        }
    }

    /// Value stored for exactly `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        match self.lookup(key) {
            (TrieResult::Exists, Some(node)) => node.value.as_ref(),
            _ => None,
        }
    }

    /// Value stored at this node, if it terminates a key.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.value.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.value.is_none()
    }

    /// Every inserted key, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut prefix = String::new();
        self.collect_keys(&mut prefix, &mut out);
        out.sort();
        out
    }

    fn classify(&self) -> TrieResult {
        if self.value.is_some() {
            TrieResult::Exists
        } else if self.children.is_empty() {
            TrieResult::Failed
        } else {
            TrieResult::Prefix
        }
    }

    fn collect_keys(&self, prefix: &mut String, out: &mut Vec<String>) {
        if self.value.is_some() {
            out.push(prefix.clone());
        }
        for (ch, child) in &self.children {
            prefix.push(*ch);
            child.collect_keys(prefix, out);
            prefix.pop();
        }
    }
}

/// Build a trie of keys without values.
pub fn new_trie_from_keys<K, I>(keys: I) -> Trie<()>
where
    K: AsRef<str>,
    I: IntoIterator<Item = K>,
{
    let mut trie = Trie::new();
    for key in keys {
        trie.insert(key.as_ref(), ());
    }
    trie
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Trie<()> {
        new_trie_from_keys(["NOT", "NOT LIKE", "NOT BETWEEN", "<", "<=", "<>", "<=>"])
    }

    #[test]
    fn test_inserted_keys_exist() {
        let trie = sample();
        for key in trie.keys() {
            assert_eq!(trie.lookup(&key).0, TrieResult::Exists, "{key}");
        }
        assert_eq!(trie.keys().len(), 7);
    }

    #[test]
    fn test_strict_prefixes_are_prefix() {
        let trie = sample();
        assert_eq!(trie.lookup("NO").0, TrieResult::Prefix);
        assert_eq!(trie.lookup("NOT ").0, TrieResult::Prefix);
        assert_eq!(trie.lookup("NOT LIK").0, TrieResult::Prefix);
        assert_eq!(trie.lookup("NOT B").0, TrieResult::Prefix);
    }

    #[test]
    fn test_divergent_keys_fail() {
        let trie = sample();
        assert_eq!(trie.lookup("NOX").0, TrieResult::Failed);
        assert_eq!(trie.lookup("NOT LIKES").0, TrieResult::Failed);
        assert_eq!(trie.lookup(">").0, TrieResult::Failed);
    }

    #[test]
    fn test_incremental_walk_matches_lookup() {
        let trie = sample();
        let mut node = &trie;
        let mut results = Vec::new();
        for ch in "<=>".chars() {
            let (result, next) = node.step(ch);
            results.push(result);
            node = next.unwrap();
        }
        assert_eq!(results, vec![TrieResult::Prefix, TrieResult::Exists, TrieResult::Exists]);
        assert_eq!(node.step('x').0, TrieResult::Failed);
    }

    #[test]
    fn test_values_are_replaced() {
        let mut trie = Trie::new();
        trie.insert("cat", 1);
        trie.insert("car", 2);
        trie.insert("cat", 3);
        assert_eq!(trie.get("cat"), Some(&3));
        assert_eq!(trie.get("car"), Some(&2));
        assert_eq!(trie.get("ca"), None);
    }

    #[test]
    fn test_empty_trie() {
        let trie: Trie<()> = Trie::new();
        assert!(trie.is_empty());
        assert_eq!(trie.lookup("a").0, TrieResult::Failed);
        assert_eq!(trie.lookup("").0, TrieResult::Failed);
    }

    #[test]
    fn test_extend_with_values() {
        let mut trie = Trie::new();
        trie.extend([("->", 1), ("->>", 2)]);
        assert_eq!(trie.get("->"), Some(&1));
        assert_eq!(trie.get("->>"), Some(&2));
        assert_eq!(trie.lookup("-").0, TrieResult::Prefix);
    }
}
