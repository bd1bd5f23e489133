//! Compressed prefix tree (radix trie) over normalized keys.
//!
//! Edges are labelled with byte strings, so a lookup costs O(key length)
//! regardless of how many keys are stored, and the long shared prefixes of
//! biomedical names ("interleukin 1", "interleukin 10", ...) are stored once.
//!
//! Every key maps to a sorted set of values. The trie is mutated only while
//! the index is built; afterwards it is read concurrently without locking.
//!
//! # Examples
//!
//! ```
//! use gazetteer::index::trie::RadixTrie;
//!
//! let mut trie = RadixTrie::new();
//! trie.put("il 1", 1u32);
//! trie.put("il 10", 2u32);
//! trie.put("il 1", 3u32);
//!
//! let hits: Vec<_> = trie.prefixes(b"il 10 receptor").collect();
//! assert_eq!(hits, vec![(4, &[1u32, 3][..]), (5, &[2u32][..])]);
//! ```

use serde::{Deserialize, Serialize};

/// A radix trie mapping byte-string keys to sorted value sets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RadixTrie<V> {
    root: Node<V>,
    len: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Node<V> {
    /// Label of the edge leading into this node.
    label: Box<[u8]>,
    /// Children sorted by the first byte of their label.
    children: Vec<Node<V>>,
    /// Values of the key ending here; empty when no key ends here.
    values: Vec<V>,
}

impl<V> Node<V> {
    fn new(label: &[u8]) -> Self {
        Node {
            label: label.into(),
            children: Vec::new(),
            values: Vec::new(),
        }
    }

    fn child_index(&self, first: u8) -> Result<usize, usize> {
        self.children
            .binary_search_by_key(&first, |child| child.label[0])
    }

    fn child(&self, first: u8) -> Option<&Node<V>> {
        self.child_index(first).ok().map(|i| &self.children[i])
    }

    /// Split this node's label at `at`, pushing the tail into a new child.
    fn split(&mut self, at: usize) {
        let tail = Node {
            label: self.label[at..].into(),
            children: std::mem::take(&mut self.children),
            values: std::mem::take(&mut self.values),
        };
        self.label = self.label[..at].into();
        self.children = vec![tail];
    }

    fn compact(&mut self) {
        self.children.shrink_to_fit();
        self.values.shrink_to_fit();
        for child in &mut self.children {
            child.compact();
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

impl<V> Default for RadixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RadixTrie<V> {
    /// Create an empty trie.
    pub fn new() -> Self {
        RadixTrie {
            root: Node::new(&[]),
            len: 0,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the trie holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.root.count()
    }

    /// Release spare capacity once construction is finished.
    pub fn compact(&mut self) {
        self.root.compact();
    }

    /// Get the value set stored at exactly `key`.
    pub fn get(&self, key: &str) -> Option<&[V]> {
        let mut node = &self.root;
        let mut rest = key.as_bytes();
        while !rest.is_empty() {
            let child = node.child(rest[0])?;
            if !rest.starts_with(&child.label) {
                return None;
            }
            rest = &rest[child.label.len()..];
            node = child;
        }
        if node.values.is_empty() {
            None
        } else {
            Some(&node.values)
        }
    }

    /// Iterate over every stored key that is a prefix of `text`.
    ///
    /// Hits are yielded shortest first as `(key length in bytes, values)`.
    pub fn prefixes<'a>(&'a self, text: &'a [u8]) -> Prefixes<'a, V> {
        Prefixes {
            node: Some(&self.root),
            text,
            depth: 0,
        }
    }

    /// Collect every `(key, values)` entry in key order.
    pub fn entries(&self) -> Vec<(String, &[V])> {
        let mut entries = Vec::with_capacity(self.len);
        let mut stack: Vec<(&Node<V>, Vec<u8>)> = vec![(&self.root, Vec::new())];
        while let Some((node, prefix)) = stack.pop() {
            if !node.values.is_empty() {
                entries.push((String::from_utf8_lossy(&prefix).into_owned(), &node.values[..]));
            }
            for child in node.children.iter().rev() {
                let mut key = prefix.clone();
                key.extend_from_slice(&child.label);
                stack.push((child, key));
            }
        }
        entries
    }
}

impl<V: Ord> RadixTrie<V> {
    /// Insert `value` into the set stored at `key`, creating the entry if absent.
    ///
    /// Returns `true` when the `(key, value)` pair is new. Empty keys are
    /// ignored, since they would prefix every text.
    pub fn put(&mut self, key: &str, value: V) -> bool {
        let mut rest = key.as_bytes();
        if rest.is_empty() {
            return false;
        }

        let mut node = &mut self.root;
        while !rest.is_empty() {
            match node.child_index(rest[0]) {
                Ok(i) => {
                    let common = common_prefix_len(&node.children[i].label, rest);
                    if common < node.children[i].label.len() {
                        node.children[i].split(common);
                    }
                    rest = &rest[common..];
                    node = &mut node.children[i];
                }
                Err(i) => {
                    node.children.insert(i, Node::new(rest));
                    rest = &[];
                    node = &mut node.children[i];
                }
            }
        }

        let new_key = node.values.is_empty();
        match node.values.binary_search(&value) {
            Ok(_) => false,
            Err(pos) => {
                node.values.insert(pos, value);
                if new_key {
                    self.len += 1;
                }
                true
            }
        }
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Iterator over the stored prefixes of a text. See [`RadixTrie::prefixes`].
pub struct Prefixes<'a, V> {
    node: Option<&'a Node<V>>,
    text: &'a [u8],
    depth: usize,
}

impl<'a, V> Iterator for Prefixes<'a, V> {
    type Item = (usize, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.node?;
            let rest = &self.text[self.depth..];
            let child = rest
                .first()
                .and_then(|&first| node.child(first))
                .filter(|child| rest.starts_with(&child.label));

            self.node = child;
            if let Some(child) = child {
                self.depth += child.label.len();
                if !child.values.is_empty() {
                    return Some((self.depth, &child.values[..]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let mut trie = RadixTrie::new();
        assert!(trie.put("brca1", 1u32));
        assert!(trie.put("brca2", 2u32));
        assert!(trie.put("brca", 3u32));
        assert!(trie.put("brca1", 4u32));

        assert_eq!(trie.len(), 3);
        assert_eq!(trie.get("brca1"), Some(&[1u32, 4][..]));
        assert_eq!(trie.get("brca2"), Some(&[2u32][..]));
        assert_eq!(trie.get("brca"), Some(&[3u32][..]));
        assert_eq!(trie.get("brc"), None);
        assert_eq!(trie.get("brca12"), None);
    }

    #[test]
    fn test_duplicate_pairs_are_noops() {
        let mut trie = RadixTrie::new();
        assert!(trie.put("p53", 7u32));
        assert!(!trie.put("p53", 7u32));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get("p53"), Some(&[7u32][..]));
    }

    #[test]
    fn test_empty_key_is_ignored() {
        let mut trie = RadixTrie::new();
        assert!(!trie.put("", 1u32));
        assert!(trie.is_empty());
        assert_eq!(trie.prefixes(b"anything").count(), 0);
    }

    #[test]
    fn test_split_preserves_existing_keys() {
        let mut trie = RadixTrie::new();
        trie.put("interleukin 10", 10u32);
        trie.put("interleukin 1", 1u32);
        trie.put("interferon", 99u32);

        assert_eq!(trie.get("interleukin 10"), Some(&[10u32][..]));
        assert_eq!(trie.get("interleukin 1"), Some(&[1u32][..]));
        assert_eq!(trie.get("interferon"), Some(&[99u32][..]));
        assert_eq!(trie.get("inter"), None);
    }

    #[test]
    fn test_prefix_scan() {
        let mut trie = RadixTrie::new();
        trie.put("nf", 1u32);
        trie.put("nf kappab", 2u32);
        trie.put("nf kappa", 3u32);
        trie.put("kappab", 4u32);

        let hits: Vec<_> = trie.prefixes(b"nf kappab activation").collect();
        assert_eq!(
            hits,
            vec![(2, &[1u32][..]), (8, &[3u32][..]), (9, &[2u32][..])]
        );

        assert_eq!(trie.prefixes(b"n").count(), 0);
        assert_eq!(trie.prefixes(b"").count(), 0);
    }

    #[test]
    fn test_multibyte_keys() {
        let mut trie = RadixTrie::new();
        trie.put("tnf α", 1u32);
        trie.put("tnf β", 2u32);

        let hits: Vec<_> = trie.prefixes("tnf β inhibitor".as_bytes()).collect();
        assert_eq!(hits, vec![("tnf β".len(), &[2u32][..])]);
    }

    #[test]
    fn test_entries_in_key_order() {
        let mut trie = RadixTrie::new();
        for (key, value) in [("b", 2u32), ("a", 1), ("ab", 3), ("abc", 4)] {
            trie.put(key, value);
        }
        let keys: Vec<_> = trie.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "ab", "abc", "b"]);
        assert!(trie.node_count() >= 5);
    }
}
