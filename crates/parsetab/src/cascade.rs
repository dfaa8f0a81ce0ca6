//! Propagation of sets along a possibly cyclic graph.

use crate::types::Map;
use bit_set::BitSet;
use std::{cmp, hash::Hash, mem};

/// The bucket type stored in a [`CascadeSetMap`].
pub trait Set: Default + Clone {
    type Item;

    fn insert(&mut self, item: Self::Item) -> bool;

    fn union_with(&mut self, other: &Self);
}

impl<T> Set for crate::types::Set<T>
where
    T: Clone + Eq + Hash,
{
    type Item = T;

    fn insert(&mut self, item: T) -> bool {
        crate::types::Set::insert(self, item)
    }

    fn union_with(&mut self, other: &Self) {
        self.extend(other.iter().cloned())
    }
}

impl<B> Set for bit_set::BitSet<B>
where
    B: bit_vec::BitBlock,
{
    type Item = usize;

    fn insert(&mut self, item: usize) -> bool {
        bit_set::BitSet::insert(self, item)
    }

    fn union_with(&mut self, other: &Self) {
        bit_set::BitSet::union_with(self, other)
    }
}

/// Named buckets of items plus edges along which the items are inherited.
///
/// An edge `from -> to` means that `to` eventually contains everything placed
/// into `from`. [`cascade`](Self::cascade) resolves the edges, including
/// cycles, in a single pass over the strongly connected components.
#[derive(Debug, Clone)]
pub struct CascadeSetMap<K, S> {
    buckets: Map<K, S>,
    edges: Vec<Vec<usize>>,
}

impl<K, S> Default for CascadeSetMap<K, S> {
    fn default() -> Self {
        Self {
            buckets: Map::default(),
            edges: vec![],
        }
    }
}

impl<K, S> CascadeSetMap<K, S>
where
    K: Clone + Eq + Hash,
    S: Set,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&mut self, key: K) -> usize {
        let entry = self.buckets.entry(key);
        let index = entry.index();
        entry.or_default();
        if index >= self.edges.len() {
            self.edges.resize_with(index + 1, Vec::new);
        }
        index
    }

    /// Return the bucket of `key`, creating an empty one if missing.
    pub fn bucket_mut(&mut self, key: K) -> &mut S {
        let index = self.index_of(key);
        &mut self.buckets[index]
    }

    /// Place `item` into the bucket of `key`.
    pub fn add(&mut self, key: K, item: S::Item) -> &mut Self {
        self.bucket_mut(key).insert(item);
        self
    }

    /// Make `to` inherit every item of `from`.
    pub fn add_edge(&mut self, from: K, to: K) -> &mut Self {
        let from = self.index_of(from);
        let to = self.index_of(to);
        if from != to && !self.edges[from].contains(&to) {
            self.edges[from].push(to);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Compute the final content of every bucket.
    ///
    /// This does not modify the map, so calling it repeatedly yields
    /// identical results.
    pub fn cascade(&self) -> Map<K, S> {
        let components = Tarjan::run(&self.edges);
        tracing::debug!(
            "cascade {} buckets in {} components",
            self.buckets.len(),
            components.len()
        );

        let mut component_of = vec![0; self.buckets.len()];
        for (c, members) in components.iter().enumerate() {
            for &v in members {
                component_of[v] = c;
            }
        }

        let mut sets: Vec<S> = components
            .iter()
            .map(|members| {
                let mut set = S::default();
                for &v in members {
                    set.union_with(&self.buckets[v]);
                }
                set
            })
            .collect();

        // Tarjan emits the components in reverse topological order.
        for c in (0..components.len()).rev() {
            let current = mem::take(&mut sets[c]);
            for &v in &components[c] {
                for &w in &self.edges[v] {
                    let d = component_of[w];
                    if d != c {
                        sets[d].union_with(&current);
                    }
                }
            }
            sets[c] = current;
        }

        self.buckets
            .keys()
            .enumerate()
            .map(|(v, key)| (key.clone(), sets[component_of[v]].clone()))
            .collect()
    }
}

/// Tarjan's strongly connected components algorithm.
struct Tarjan<'a> {
    edges: &'a [Vec<usize>],
    index: Vec<usize>,
    lowlink: Vec<usize>,
    on_stack: BitSet,
    stack: Vec<usize>,
    next_index: usize,
    components: Vec<Vec<usize>>,
}

impl<'a> Tarjan<'a> {
    const UNVISITED: usize = usize::MAX;

    fn run(edges: &'a [Vec<usize>]) -> Vec<Vec<usize>> {
        let mut tarjan = Tarjan {
            edges,
            index: vec![Self::UNVISITED; edges.len()],
            lowlink: vec![0; edges.len()],
            on_stack: BitSet::with_capacity(edges.len()),
            stack: vec![],
            next_index: 0,
            components: vec![],
        };
        for v in 0..edges.len() {
            if tarjan.index[v] == Self::UNVISITED {
                tarjan.visit(v);
            }
        }
        tarjan.components
    }

    fn visit(&mut self, v: usize) {
        self.index[v] = self.next_index;
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);

        let edges = self.edges;
        for &w in &edges[v] {
            if self.index[w] == Self::UNVISITED {
                self.visit(w);
                self.lowlink[v] = cmp::min(self.lowlink[v], self.lowlink[w]);
            } else if self.on_stack.contains(w) {
                self.lowlink[v] = cmp::min(self.lowlink[v], self.index[w]);
            }
        }

        if self.lowlink[v] != self.index[v] {
            return;
        }

        let mut component = vec![];
        while let Some(w) = self.stack.pop() {
            self.on_stack.remove(w);
            component.push(w);
            if w == v {
                break;
            }
        }
        self.components.push(component);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;

    type Buckets = CascadeSetMap<&'static str, types::Set<u32>>;

    fn set(items: &[u32]) -> types::Set<u32> {
        items.iter().copied().collect()
    }

    fn add_all(map: &mut Buckets, key: &'static str, items: &[u32]) {
        for &item in items {
            map.add(key, item);
        }
    }

    fn sorted(set: &types::Set<u32>) -> Vec<u32> {
        let mut items: Vec<_> = set.iter().copied().collect();
        items.sort_unstable();
        items
    }

    #[test]
    fn chain() {
        let mut map = Buckets::new();
        add_all(&mut map, "A", &[1, 2]);
        add_all(&mut map, "B", &[1, 3]);
        add_all(&mut map, "C", &[1, 4]);
        map.add_edge("A", "B").add_edge("B", "C");

        let result = map.cascade();
        assert_eq!(result.len(), 3);
        assert_eq!(sorted(&result["A"]), [1, 2]);
        assert_eq!(sorted(&result["B"]), [1, 2, 3]);
        assert_eq!(sorted(&result["C"]), [1, 2, 3, 4]);
    }

    #[test]
    fn chain_with_cycle() {
        let mut map = Buckets::new();
        add_all(&mut map, "A", &[1, 2]);
        add_all(&mut map, "B", &[1, 3]);
        add_all(&mut map, "C", &[1, 4]);
        add_all(&mut map, "D", &[5, 6]);
        add_all(&mut map, "E", &[7, 8]);
        map.add_edge("A", "B")
            .add_edge("B", "C")
            .add_edge("C", "A")
            .add_edge("D", "B")
            .add_edge("C", "E");

        let result = map.cascade();
        assert_eq!(result.len(), 5);
        for key in ["A", "B", "C"] {
            assert_eq!(sorted(&result[key]), [1, 2, 3, 4, 5, 6], "bucket {}", key);
        }
        assert_eq!(sorted(&result["D"]), [5, 6]);
        assert_eq!(sorted(&result["E"]), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn nested_cycles_and_separate_component() {
        let mut map = Buckets::new();
        add_all(&mut map, "A", &[1, 2]);
        add_all(&mut map, "B", &[3, 4]);
        add_all(&mut map, "C", &[1, 3]);
        add_all(&mut map, "D", &[5, 6]);
        add_all(&mut map, "E", &[6, 7]);
        map.add_edge("A", "B")
            .add_edge("B", "C")
            .add_edge("C", "A")
            .add_edge("B", "D")
            .add_edge("D", "E")
            .add_edge("E", "C");
        add_all(&mut map, "F", &[8, 9]);
        add_all(&mut map, "G", &[9, 10]);
        map.add_edge("F", "G");

        let result = map.cascade();
        assert_eq!(result.len(), 7);
        for key in ["A", "B", "C", "D", "E"] {
            assert_eq!(sorted(&result[key]), [1, 2, 3, 4, 5, 6, 7], "bucket {}", key);
        }
        assert_eq!(sorted(&result["F"]), [8, 9]);
        assert_eq!(sorted(&result["G"]), [8, 9, 10]);
    }

    #[test]
    fn self_loops_and_isolated_buckets() {
        let mut map = Buckets::new();
        add_all(&mut map, "A", &[1]);
        map.add_edge("A", "A");
        map.bucket_mut("B");
        let result = map.cascade();
        assert_eq!(result["A"], set(&[1]));
        assert!(result["B"].is_empty());
    }

    #[test]
    fn cascade_is_pure() {
        let mut map = Buckets::new();
        add_all(&mut map, "A", &[1]);
        add_all(&mut map, "B", &[2]);
        map.add_edge("A", "B").add_edge("B", "A");
        let first = map.cascade();
        let second = map.cascade();
        assert_eq!(first, second);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn bit_set_buckets() {
        let mut map = CascadeSetMap::<u32, BitSet>::new();
        map.add(0, 1).add(1, 2).add(2, 3);
        map.add_edge(0, 1).add_edge(1, 2);
        let result = map.cascade();
        assert_eq!(result[&2u32].iter().collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(result[&0u32].iter().collect::<Vec<_>>(), [1]);
    }
}
