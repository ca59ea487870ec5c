//! A binary trie over [`Tid48`] bits, used to compute minimal bit-prefixes that uniquely name a
//! mempool transaction and to resolve a received bit-prefix back to candidate transactions.
//!
//! The reference implementation this is grounded on builds one node per inserted id and recurses
//! on a colliding leaf without ever checking depth, which only terminates because 48-bit id
//! collisions were assumed not to happen in practice. Two transactions really can land on the same
//! `Tid48` under an adversarial or merely unlucky seed (end-to-end scenario F), and recursing past
//! bit 48 makes no progress — the shift `id >> depth` stops changing once `depth` exceeds the id's
//! width, so the original's approach would recurse forever. This tree instead caps descent at 48
//! bits and merges any leaf collision still unresolved at that depth into one multi-value leaf.

use crate::txid::{Tid48, TID48_BITS};
use crate::Error;

enum Node<T> {
    Empty,
    Leaf(Tid48, Vec<T>),
    Inner(Box<Node<T>>, Box<Node<T>>),
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node::Empty
    }
}

/// A binary prefix trie keyed by [`Tid48`], storing an arbitrary payload per transaction.
#[derive(Default)]
pub struct PrefixTree<T> {
    root: Node<T>,
}

impl<T> PrefixTree<T> {
    /// An empty tree.
    pub fn new() -> Self {
        PrefixTree { root: Node::Empty }
    }

    /// Insert a transaction's id and payload.
    ///
    /// Two distinct ids diverge at the first differing bit and each get their own leaf; two
    /// genuinely equal ids (or two ids that still haven't diverged after 48 bits, i.e. a true
    /// collision) share one leaf holding every inserted payload.
    pub fn insert(&mut self, id: Tid48, value: T) {
        let root = std::mem::take(&mut self.root);
        self.root = Self::insert_into(root, id, value, 0);
    }

    fn insert_into(node: Node<T>, id: Tid48, value: T, depth: u32) -> Node<T> {
        match node {
            Node::Empty => Node::Leaf(id, vec![value]),
            Node::Leaf(existing_id, mut values) => {
                if existing_id == id || depth >= TID48_BITS {
                    values.push(value);
                    return Node::Leaf(existing_id, values);
                }
                let mut inner = Node::Inner(Box::new(Node::Empty), Box::new(Node::Empty));
                for v in values {
                    inner = Self::insert_into(inner, existing_id, v, depth);
                }
                Self::insert_into(inner, id, value, depth)
            }
            Node::Inner(zero, one) => {
                let side = (id.id() >> depth) & 1;
                if side == 0 {
                    Node::Inner(Box::new(Self::insert_into(*zero, id, value, depth + 1)), one)
                } else {
                    Node::Inner(zero, Box::new(Self::insert_into(*one, id, value, depth + 1)))
                }
            }
        }
    }

    /// The shortest bit-prefix (least-significant bit first) that uniquely identifies `id` in this
    /// tree. Fails with [`Error::NotInMempool`] if `id` was never inserted.
    pub fn get_unique_prefix(&self, id: Tid48) -> Result<Vec<bool>, Error> {
        let mut bits = Vec::new();
        let mut node = &self.root;
        for depth in 0..TID48_BITS {
            match node {
                Node::Empty => return Err(Error::NotInMempool),
                Node::Leaf(leaf_id, _) => {
                    return if *leaf_id == id {
                        Ok(bits)
                    } else {
                        Err(Error::NotInMempool)
                    };
                }
                Node::Inner(zero, one) => {
                    let side = (id.id() >> depth) & 1;
                    bits.push(side == 1);
                    node = if side == 0 { zero } else { one };
                }
            }
        }
        match node {
            Node::Leaf(leaf_id, _) if *leaf_id == id => Ok(bits),
            _ => Err(Error::NotInMempool),
        }
    }

    /// All payloads whose id matches `bits` (tested bit-for-bit, least-significant first).
    ///
    /// Descending past the end of `bits` at an inner node returns every leaf below it; reaching a
    /// leaf before `bits` is exhausted returns that leaf's payloads only if its id still matches
    /// the remaining prefix bits.
    pub fn lookup_prefix(&self, bits: &[bool]) -> Vec<&T> {
        let mut out = Vec::new();
        Self::walk(&self.root, bits, &mut out);
        out
    }

    fn walk<'a>(node: &'a Node<T>, bits: &[bool], out: &mut Vec<&'a T>) {
        match node {
            Node::Empty => {}
            Node::Leaf(id, values) => {
                if id.matches(bits) {
                    out.extend(values.iter());
                }
            }
            Node::Inner(zero, one) => match bits.split_first() {
                None => {
                    Self::collect_all(zero, out);
                    Self::collect_all(one, out);
                }
                Some((&false, rest)) => Self::walk(zero, rest, out),
                Some((&true, rest)) => Self::walk(one, rest, out),
            },
        }
    }

    fn collect_all<'a>(node: &'a Node<T>, out: &mut Vec<&'a T>) {
        match node {
            Node::Empty => {}
            Node::Leaf(_, values) => out.extend(values.iter()),
            Node::Inner(zero, one) => {
                Self::collect_all(zero, out);
                Self::collect_all(one, out);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::txid::{Seed, Txid};
    use bitcoin_hashes::Hash;

    fn id_for(seed: u64, data: &[u8]) -> Tid48 {
        let txid = Txid::from_hash(bitcoin_hashes::sha256d::Hash::hash(data));
        Tid48::derive(Seed::new(seed).unwrap(), &txid)
    }

    #[test]
    fn unique_prefix_round_trips_through_lookup() {
        let mut tree = PrefixTree::new();
        let ids: Vec<Tid48> = (0..50u64).map(|i| id_for(7, format!("tx {i}").as_bytes())).collect();
        for (i, &id) in ids.iter().enumerate() {
            tree.insert(id, i);
        }
        for (i, &id) in ids.iter().enumerate() {
            let prefix = tree.get_unique_prefix(id).unwrap();
            let found = tree.lookup_prefix(&prefix);
            assert_eq!(found, vec![&i]);
        }
    }

    #[test]
    fn absent_id_is_not_in_mempool() {
        let mut tree = PrefixTree::new();
        tree.insert(id_for(1, b"present"), "present");
        assert_eq!(
            tree.get_unique_prefix(id_for(1, b"absent")),
            Err(Error::NotInMempool)
        );
    }

    #[test]
    fn empty_prefix_at_inner_node_returns_every_leaf_below_it() {
        let mut tree = PrefixTree::new();
        tree.insert(id_for(3, b"a"), 1);
        tree.insert(id_for(3, b"b"), 2);
        tree.insert(id_for(3, b"c"), 3);
        let mut all = tree.lookup_prefix(&[]);
        all.sort();
        assert_eq!(all, vec![&1, &2, &3]);
    }

    #[test]
    fn true_collisions_merge_into_one_multi_value_leaf() {
        // Two different transactions landing on the same Tid48 (scenario F) looks, from the
        // tree's perspective, like inserting the same id twice: both values end up under one leaf
        // instead of recursing forever trying to find a differing bit that doesn't exist.
        let mut tree = PrefixTree::new();
        let id = id_for(5, b"colliding");
        tree.insert(id, "first");
        tree.insert(id, "second");
        let prefix = tree.get_unique_prefix(id).unwrap();
        let mut found = tree.lookup_prefix(&prefix);
        found.sort();
        assert_eq!(found, vec![&"first", &"second"]);
    }
}
