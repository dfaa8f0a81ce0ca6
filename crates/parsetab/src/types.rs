//! Deterministic collections shared by the construction algorithms.

use std::hash::Hash;

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion-ordered map; iteration order is part of the output of every builder.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;

/// Worklist that visits every distinct value exactly once.
///
/// Values are popped in discovery order. Pushing a value seen before, popped
/// or not, does nothing, so the visited set doubles as the result of a
/// closure computation.
#[derive(Debug, Clone)]
pub struct Worklist<T> {
    visited: Set<T>,
    cursor: usize,
}

impl<T> Default for Worklist<T> {
    fn default() -> Self {
        Self {
            visited: Set::default(),
            cursor: 0,
        }
    }
}

impl<T> Worklist<T>
where
    T: Clone + Eq + Hash,
{
    /// Schedule `value`, returning whether it was not seen before.
    pub fn push(&mut self, value: T) -> bool {
        self.visited.insert(value)
    }

    pub fn pop(&mut self) -> Option<T> {
        let value = self.visited.get_index(self.cursor)?.clone();
        self.cursor += 1;
        Some(value)
    }

    pub fn is_empty(&self) -> bool {
        self.cursor >= self.visited.len()
    }

    /// Every value pushed so far, in discovery order.
    pub fn into_visited(self) -> Set<T> {
        self.visited
    }
}

impl<T> FromIterator<T> for Worklist<T>
where
    T: Clone + Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut worklist = Self::default();
        for value in iter {
            worklist.push(value);
        }
        worklist
    }
}
