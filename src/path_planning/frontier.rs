//! Min-priority frontier shared by the grid searches
//!
//! Entries carry the key they were pushed with. Instead of a decrease-key
//! operation a cell is simply pushed again when its score improves, and
//! [`Frontier::pop_current`] drops entries whose key no longer matches the
//! caller's score map. Equal keys pop in insertion order.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ordered_float::NotNan;

#[derive(Debug)]
struct FrontierEntry<T> {
    key: NotNan<f64>,
    sequence: u64,
    item: T,
}

impl<T> Eq for FrontierEntry<T> {}

impl<T> PartialEq for FrontierEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.sequence == other.sequence
    }
}

impl<T> Ord for FrontierEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        Reverse((self.key, self.sequence)).cmp(&Reverse((other.key, other.sequence)))
    }
}

impl<T> PartialOrd for FrontierEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug)]
pub struct Frontier<T> {
    heap: BinaryHeap<FrontierEntry<T>>,
    next_sequence: u64,
}

impl<T: Copy> Frontier<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Admit `item` with priority `key`. NaN keys are ignored.
    pub fn push(&mut self, item: T, key: f64) {
        let key = match NotNan::new(key) {
            Ok(key) => key,
            Err(_) => return,
        };
        self.heap.push(FrontierEntry {
            key,
            sequence: self.next_sequence,
            item,
        });
        self.next_sequence += 1;
    }

    /// Pop the lowest-key entry whose key still equals `current_key(item)`.
    ///
    /// Entries superseded by a later push of the same item are discarded.
    pub fn pop_current<F>(&mut self, current_key: F) -> Option<(T, f64)>
    where
        F: Fn(&T) -> Option<f64>,
    {
        while let Some(entry) = self.heap.pop() {
            let key = entry.key.into_inner();
            if current_key(&entry.item) == Some(key) {
                return Some((entry.item, key));
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T: Copy> Default for Frontier<T> {
    fn default() -> Self {
        Self::new()
    }
}
