//! Ascending priority queue used while building Huffman trees.
//!
//! Items with equal priority come out in insertion order.

use core::cmp::Ordering;
use std::collections::BinaryHeap;

/// Anything that can be ordered by the queue.
pub trait Prioritized {
    fn priority(&self) -> u64;
}

struct Entry<T> {
    priority: u64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    // BinaryHeap is a max-heap, so both keys are reversed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

pub struct PriorityQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T: Prioritized> PriorityQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn insert(&mut self, item: T) {
        let entry = Entry {
            priority: item.priority(),
            seq: self.next_seq,
            item,
        };
        self.next_seq += 1;
        self.heap.push(entry);
    }

    /// Removes the lowest-priority item, or returns `None` when the queue is empty.
    pub fn extract_min(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T: Prioritized> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Job(u64, &'static str);

    impl Prioritized for Job {
        fn priority(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn extracts_in_ascending_order() {
        let mut queue = PriorityQueue::new();
        for weight in [5, 1, 4, 2, 3] {
            queue.insert(Job(weight, ""));
        }
        assert_eq!(queue.size(), 5);

        let order: Vec<u64> = core::iter::from_fn(|| queue.extract_min()).map(|j| j.0).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
        assert!(queue.is_empty());
    }

    #[test]
    fn ties_are_first_in_first_out() {
        let mut queue = PriorityQueue::new();
        queue.insert(Job(2, "a"));
        queue.insert(Job(1, "b"));
        queue.insert(Job(2, "c"));
        queue.insert(Job(1, "d"));
        queue.insert(Job(2, "e"));

        let order: Vec<&str> = core::iter::from_fn(|| queue.extract_min()).map(|j| j.1).collect();
        assert_eq!(order, vec!["b", "d", "a", "c", "e"]);
    }

    #[test]
    fn empty_queue_signals_none() {
        let mut queue: PriorityQueue<Job> = PriorityQueue::default();
        assert_eq!(queue.extract_min(), None);

        queue.insert(Job(7, "x"));
        assert_eq!(queue.size(), 1);
        assert_eq!(queue.extract_min(), Some(Job(7, "x")));
        assert_eq!(queue.extract_min(), None);
        assert_eq!(queue.size(), 0);
    }
}
