//! Character trie answering "longest key that prefixes this text".
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
struct Node {
    // Sorted by char; most nodes have one or two children.
    children: SmallVec<[(char, u32); 4]>,
    entry: Option<u32>,
}

impl Node {
    #[inline]
    fn child(&self, c: char) -> Option<u32> {
        self.children
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Flat arena of nodes; index 0 is the root.
#[derive(Debug, Clone)]
pub(crate) struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }
}

impl Trie {
    /// Associates `key` with `entry`. The first insertion of a key wins.
    pub(crate) fn insert(&mut self, key: &str, entry: u32) {
        let mut node = 0usize;
        for c in key.chars() {
            node = match self.nodes[node].child(c) {
                Some(next) => next as usize,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(Node::default());
                    let children = &mut self.nodes[node].children;
                    let at = children.partition_point(|&(k, _)| k < c);
                    children.insert(at, (c, next as u32));
                    next
                }
            };
        }
        self.nodes[node].entry.get_or_insert(entry);
    }

    /// Walks `text` from its start and returns the entry of the deepest key
    /// reached, with the key's length in bytes.
    pub(crate) fn longest_prefix(&self, text: &str) -> Option<(u32, usize)> {
        let mut node = &self.nodes[0];
        let mut best = None;
        for (i, c) in text.char_indices() {
            match node.child(c) {
                Some(next) => node = &self.nodes[next as usize],
                None => break,
            }
            if let Some(entry) = node.entry {
                best = Some((entry, i + c.len_utf8()));
            }
        }
        best
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
