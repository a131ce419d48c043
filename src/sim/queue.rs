//! Time-ordered event queue
//!
//! Min-heap keyed on `(time, rank, seq)`. `rank` lets a caller order
//! different kinds of work due at the same cycle; within a rank, entries
//! come out in insertion order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Entry<T> {
    time: u64,
    rank: u8,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for Entry<T> {}

impl<T> Entry<T> {
    fn key(&self) -> (u64, u8, u64) {
        (self.time, self.rank, self.seq)
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other.key().cmp(&self.key())
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Discrete-event queue
#[derive(Debug)]
pub struct EventQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Queue `item` at absolute cycle `time` with the default rank 0
    pub fn push(&mut self, time: u64, item: T) {
        self.push_ranked(time, 0, item);
    }

    /// Queue `item` at `time`; lower ranks fire first within a cycle
    pub fn push_ranked(&mut self, time: u64, rank: u8, item: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            time,
            rank,
            seq,
            item,
        });
    }

    /// Time of the earliest entry
    pub fn peek_time(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.time)
    }

    /// Remove the earliest entry
    pub fn pop(&mut self) -> Option<(u64, T)> {
        self.heap.pop().map(|e| (e.time, e.item))
    }

    /// Remove the earliest entry if it is due at or before `deadline`
    pub fn pop_due(&mut self, deadline: u64) -> Option<(u64, T)> {
        match self.peek_time() {
            Some(time) if time <= deadline => self.pop(),
            _ => None,
        }
    }

    /// Whether any entry satisfies `pred`
    pub fn any(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.heap.iter().any(|e| pred(&e.item))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
