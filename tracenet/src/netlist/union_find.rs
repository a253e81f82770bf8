//! Keyed union-find
//!
//! petgraph's [`UnionFind`](petgraph::unionfind::UnionFind) works on dense
//! integer indices. This wrapper maps arbitrary keys onto those indices so
//! callers can union element IDs directly. The key set is fixed at
//! construction.
//!
//! Reconciliation only needs `union` and `groups`; the query methods are
//! public for callers that track their own component sets.

use petgraph::unionfind::UnionFind as IndexUnionFind;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

pub struct UnionFind<K> {
    keys: Vec<K>,
    index: HashMap<K, usize>,
    sets: IndexUnionFind<usize>,
}

impl<K: Eq + Hash + Clone> UnionFind<K> {
    /// One singleton set per distinct key; duplicates are ignored
    pub fn new<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut ordered = Vec::new();
        let mut index = HashMap::new();
        for key in keys {
            if !index.contains_key(&key) {
                index.insert(key.clone(), ordered.len());
                ordered.push(key);
            }
        }
        let sets = IndexUnionFind::new(ordered.len());
        Self {
            keys: ordered,
            index,
            sets,
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Merge the sets holding `a` and `b`. Returns true when two distinct
    /// sets were merged; unknown keys are ignored.
    pub fn union<Q>(&mut self, a: &Q, b: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.sets.union(ia, ib),
            _ => false,
        }
    }

    /// Representative key of the set holding `key`
    pub fn find<Q>(&mut self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        let root = self.sets.find_mut(idx);
        self.keys.get(root)
    }

    pub fn connected<Q>(&mut self, a: &Q, b: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&ia), Some(&ib)) => self.sets.find_mut(ia) == self.sets.find_mut(ib),
            _ => false,
        }
    }

    /// All sets. Members keep insertion order, and sets are ordered by
    /// their first-inserted member.
    pub fn groups(&mut self) -> Vec<Vec<K>> {
        let mut slot_for_root: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<Vec<K>> = Vec::new();
        for i in 0..self.keys.len() {
            let root = self.sets.find_mut(i);
            let slot = *slot_for_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(self.keys[i].clone());
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut uf = UnionFind::new(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
        assert_eq!(uf.len(), 2);
        assert!(!uf.connected("a", "b"));
        assert_eq!(uf.groups().len(), 2);
    }

    #[test]
    fn test_union_and_find() {
        let mut uf = UnionFind::new(["t1", "t2", "t3", "v1"].map(String::from));
        assert!(uf.union("t1", "t2"));
        assert!(!uf.union("t2", "t1"));
        assert!(uf.union("t3", "v1"));

        assert!(uf.connected("t1", "t2"));
        assert!(!uf.connected("t1", "v1"));
        let root1 = uf.find("t1").cloned();
        let root2 = uf.find("t2").cloned();
        assert_eq!(root1, root2);

        let groups = uf.groups();
        assert_eq!(
            groups,
            vec![
                vec!["t1".to_string(), "t2".to_string()],
                vec!["t3".to_string(), "v1".to_string()],
            ]
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut uf = UnionFind::new(["a".to_string()]);
        assert!(!uf.union("a", "zzz"));
        assert!(uf.find("zzz").is_none());
        assert!(!uf.contains("zzz"));
        assert!(uf.contains("a"));
    }

    #[test]
    fn test_transitive() {
        let mut uf = UnionFind::new(0..6);
        uf.union(&0, &1);
        uf.union(&2, &3);
        uf.union(&1, &3);
        assert!(uf.connected(&0, &2));
        assert_eq!(uf.groups().len(), 3);
    }
}
