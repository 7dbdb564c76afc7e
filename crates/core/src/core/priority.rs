//! Indexed priority queue for BPE merge candidates.
//!
//! The heap keeps a position map next to its backing array so the count of
//! any pair can be adjusted in place and re-heapified in O(log n), instead of
//! pushing duplicates and discarding stale entries on pop.

use crate::core::merges::{MergedPair, Pair};
use ahash::AHashMap;
use std::cmp::Ordering;

/// A merge candidate during BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbol IDs to merge
    pub pair: Pair,
    /// The symbols behind `pair`, used for tie-breaking
    pub merged: MergedPair,
    /// Occurrences of this pair across all words (weighted by word count)
    pub count: i64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, merged: MergedPair, count: i64) -> Self {
        Self {
            pair,
            merged,
            count,
        }
    }
}

// Higher count wins; ties go to the greater joined symbol, then the greater
// parents, so the order is total and independent of insertion order.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| self.merged.joined.cmp(&other.merged.joined))
            .then_with(|| self.merged.parent1.cmp(&other.merged.parent1))
            .then_with(|| self.merged.parent2.cmp(&other.merged.parent2))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary max-heap over merge candidates with a pair -> slot index.
#[derive(Debug, Clone, Default)]
pub struct MergeHeap {
    /// Heap-ordered candidates
    nodes: Vec<MergeCandidate>,
    /// Slot of every pair currently in `nodes`
    slots: AHashMap<Pair, usize>,
}

impl MergeHeap {
    /// Create a new empty heap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a heap from candidates in O(n).
    ///
    /// A pair appearing more than once keeps its last candidate.
    pub fn from_candidates(candidates: impl IntoIterator<Item = MergeCandidate>) -> Self {
        let mut heap = Self::new();
        for candidate in candidates {
            match heap.slots.get(&candidate.pair) {
                Some(&slot) => heap.nodes[slot] = candidate,
                None => {
                    heap.slots.insert(candidate.pair, heap.nodes.len());
                    heap.nodes.push(candidate);
                }
            }
        }
        for slot in (0..heap.nodes.len() / 2).rev() {
            heap.sift_down(slot);
        }
        heap
    }

    /// Insert a candidate, replacing the count of an existing pair.
    pub fn push(&mut self, candidate: MergeCandidate) {
        match self.slots.get(&candidate.pair) {
            Some(&slot) => {
                self.nodes[slot].count = candidate.count;
                self.fix(slot);
            }
            None => {
                let slot = self.nodes.len();
                self.slots.insert(candidate.pair, slot);
                self.nodes.push(candidate);
                self.sift_up(slot);
            }
        }
    }

    /// Add `delta` to the count of `pair`, inserting it if absent.
    ///
    /// `merged` is only called when the pair is new. Returns the new count.
    pub fn adjust(&mut self, pair: Pair, delta: i64, merged: impl FnOnce() -> MergedPair) -> i64 {
        match self.slots.get(&pair) {
            Some(&slot) => {
                self.nodes[slot].count += delta;
                let count = self.nodes[slot].count;
                self.fix(slot);
                count
            }
            None => {
                self.push(MergeCandidate::new(pair, merged(), delta));
                delta
            }
        }
    }

    /// Peek at the highest priority candidate without removing it.
    pub fn peek(&self) -> Option<&MergeCandidate> {
        self.nodes.first()
    }

    /// Pop the highest priority candidate.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        if self.nodes.is_empty() {
            return None;
        }
        self.remove_slot(0)
    }

    /// Remove a pair from the heap.
    pub fn remove(&mut self, pair: Pair) -> Option<MergeCandidate> {
        let slot = *self.slots.get(&pair)?;
        self.remove_slot(slot)
    }

    /// Get the current count for a pair.
    pub fn count(&self, pair: Pair) -> Option<i64> {
        self.slots.get(&pair).map(|&slot| self.nodes[slot].count)
    }

    /// Get the number of pairs in the heap.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn remove_slot(&mut self, slot: usize) -> Option<MergeCandidate> {
        let last = self.nodes.len() - 1;
        self.swap(slot, last);
        let removed = self.nodes.pop()?;
        self.slots.remove(&removed.pair);
        if slot < self.nodes.len() {
            self.fix(slot);
        }
        Some(removed)
    }

    fn fix(&mut self, slot: usize) {
        if !self.sift_up(slot) {
            self.sift_down(slot);
        }
    }

    /// Returns true if the candidate moved.
    fn sift_up(&mut self, mut slot: usize) -> bool {
        let start = slot;
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.nodes[slot] <= self.nodes[parent] {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot != start
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.nodes.len();
        loop {
            let left = 2 * slot + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && self.nodes[right] > self.nodes[left] {
                child = right;
            }
            if self.nodes[child] <= self.nodes[slot] {
                break;
            }
            self.swap(slot, child);
            slot = child;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.nodes.swap(a, b);
        self.slots.insert(self.nodes[a].pair, a);
        self.slots.insert(self.nodes[b].pair, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::symbol::Symbol;

    fn candidate(pair: Pair, left: &str, right: &str, count: i64) -> MergeCandidate {
        MergeCandidate::new(
            pair,
            MergedPair::new(Symbol::from(left), Symbol::from(right)),
            count,
        )
    }

    fn merged(left: &str, right: &str) -> MergedPair {
        MergedPair::new(Symbol::from(left), Symbol::from(right))
    }

    #[test]
    fn test_push_pop() {
        let mut heap = MergeHeap::new();

        heap.push(candidate((0, 1), "a", "b", 10));
        heap.push(candidate((1, 2), "b", "c", 20));
        heap.push(candidate((2, 3), "c", "d", 15));

        assert_eq!(heap.pop().unwrap().pair, (1, 2));
        assert_eq!(heap.pop().unwrap().pair, (2, 3));
        assert_eq!(heap.pop().unwrap().pair, (0, 1));
        assert!(heap.pop().is_none());
    }

    #[test]
    fn test_tie_break_on_joined_symbol() {
        let mut heap = MergeHeap::new();

        heap.push(candidate((0, 1), "f", "o", 3));
        heap.push(candidate((2, 3), "⌘", "o", 3));
        heap.push(candidate((1, 2), "o", "⌘", 3));

        assert_eq!(heap.pop().unwrap().merged.joined, "⌘o");
        assert_eq!(heap.pop().unwrap().merged.joined, "o⌘");
        assert_eq!(heap.pop().unwrap().merged.joined, "fo");
    }

    #[test]
    fn test_tie_break_on_parents() {
        let mut heap = MergeHeap::new();

        heap.push(candidate((0, 1), "ab", "c", 2));
        heap.push(candidate((2, 3), "a", "bc", 2));

        assert_eq!(heap.pop().unwrap().merged.parent1, "ab");
        assert_eq!(heap.pop().unwrap().merged.parent1, "a");
    }

    #[test]
    fn test_adjust_in_place() {
        let mut heap = MergeHeap::new();

        heap.push(candidate((0, 1), "a", "b", 10));
        heap.push(candidate((1, 2), "b", "c", 20));

        assert_eq!(heap.adjust((0, 1), 15, || merged("a", "b")), 25);
        assert_eq!(heap.len(), 2);
        assert_eq!(heap.peek().unwrap().pair, (0, 1));

        assert_eq!(heap.adjust((0, 1), -25, || merged("a", "b")), 0);
        assert_eq!(heap.peek().unwrap().pair, (1, 2));
        assert_eq!(heap.count((0, 1)), Some(0));
    }

    #[test]
    fn test_adjust_inserts_missing_pair() {
        let mut heap = MergeHeap::new();
        heap.push(candidate((0, 1), "a", "b", 1));

        assert_eq!(heap.adjust((4, 5), 7, || merged("x", "y")), 7);
        let top = heap.peek().unwrap();
        assert_eq!(top.pair, (4, 5));
        assert_eq!(top.merged.joined, "xy");
    }

    #[test]
    fn test_remove() {
        let mut heap = MergeHeap::new();
        for (i, count) in [5, 9, 1, 7, 3].iter().enumerate() {
            let i = i as u32;
            heap.push(candidate((i, i + 1), "a", "b", *count));
        }

        assert_eq!(heap.remove((1, 2)).unwrap().count, 9);
        assert!(heap.remove((1, 2)).is_none());
        assert_eq!(heap.count((1, 2)), None);

        let counts: Vec<i64> = std::iter::from_fn(|| heap.pop().map(|c| c.count)).collect();
        assert_eq!(counts, vec![7, 5, 3, 1]);
    }

    #[test]
    fn test_from_candidates() {
        let heap = MergeHeap::from_candidates(vec![
            candidate((0, 1), "a", "b", 4),
            candidate((1, 2), "b", "c", 8),
            candidate((2, 3), "c", "d", 6),
        ]);

        assert_eq!(heap.len(), 3);
        assert_eq!(heap.peek().unwrap().count, 8);
        assert_eq!(heap.count((2, 3)), Some(6));
    }
}
