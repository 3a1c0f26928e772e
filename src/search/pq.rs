// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

const ABSENT: usize = usize::MAX;

/// An indexed minimum priority queue over dense integer keys `0..capacity`,
/// with `f64` priorities.
///
/// Supports the operations needed by the relaxation loops of
/// [Dijkstra](super::Dijkstra) and [Astar](super::Astar): insert,
/// delete-minimum, decrease-key and membership testing, each in
/// `O(log n)` or better.
///
/// Priorities must not be NaN; both search drivers guarantee this by
/// validating edge costs up front.
#[derive(Debug, Clone)]
pub struct IndexMinPq {
    /// Binary heap of indices, 1-based (`pq[0]` is unused).
    pq: Vec<usize>,
    /// Inverse of `pq`: `qp[i]` is the heap position of index `i`,
    /// or `ABSENT` when `i` is not on the queue.
    qp: Vec<usize>,
    keys: Vec<f64>,
    n: usize,
}

impl IndexMinPq {
    /// Creates an empty queue accepting indices `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            pq: vec![0; capacity + 1],
            qp: vec![ABSENT; capacity],
            keys: vec![0.0; capacity],
            n: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn len(&self) -> usize {
        self.n
    }

    /// Returns `true` if index `i` is on the queue.
    pub fn contains(&self, i: usize) -> bool {
        self.qp[i] != ABSENT
    }

    /// Inserts index `i` with the given priority.
    /// `i` must not already be on the queue.
    pub fn insert(&mut self, i: usize, key: f64) {
        debug_assert!(!self.contains(i), "index {i} is already on the queue");
        self.n += 1;
        self.qp[i] = self.n;
        self.pq[self.n] = i;
        self.keys[i] = key;
        self.swim(self.n);
    }

    /// Lowers the priority of index `i`, which must be on the queue.
    pub fn decrease_key(&mut self, i: usize, key: f64) {
        debug_assert!(self.contains(i), "index {i} is not on the queue");
        debug_assert!(key <= self.keys[i]);
        self.keys[i] = key;
        self.swim(self.qp[i]);
    }

    /// Removes and returns the index with the smallest priority,
    /// together with that priority.
    pub fn del_min(&mut self) -> Option<(usize, f64)> {
        if self.n == 0 {
            return None;
        }
        let min = self.pq[1];
        self.exch(1, self.n);
        self.n -= 1;
        self.sink(1);
        self.qp[min] = ABSENT;
        Some((min, self.keys[min]))
    }

    fn greater(&self, a: usize, b: usize) -> bool {
        self.keys[self.pq[a]] > self.keys[self.pq[b]]
    }

    fn exch(&mut self, a: usize, b: usize) {
        self.pq.swap(a, b);
        self.qp[self.pq[a]] = a;
        self.qp[self.pq[b]] = b;
    }

    fn swim(&mut self, mut k: usize) {
        while k > 1 && self.greater(k / 2, k) {
            self.exch(k / 2, k);
            k /= 2;
        }
    }

    fn sink(&mut self, mut k: usize) {
        while 2 * k <= self.n {
            let mut j = 2 * k;
            if j < self.n && self.greater(j, j + 1) {
                j += 1;
            }
            if !self.greater(k, j) {
                break;
            }
            self.exch(k, j);
            k = j;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_in_priority_order() {
        let mut pq = IndexMinPq::new(8);
        pq.insert(3, 3.0);
        pq.insert(0, 5.0);
        pq.insert(7, 1.0);
        pq.insert(4, 4.0);

        assert_eq!(pq.del_min(), Some((7, 1.0)));
        assert_eq!(pq.del_min(), Some((3, 3.0)));
        assert_eq!(pq.del_min(), Some((4, 4.0)));
        assert_eq!(pq.del_min(), Some((0, 5.0)));
        assert_eq!(pq.del_min(), None);
    }

    #[test]
    fn decrease_key_reorders() {
        let mut pq = IndexMinPq::new(4);
        pq.insert(0, 10.0);
        pq.insert(1, 20.0);
        pq.insert(2, 30.0);

        pq.decrease_key(2, 5.0);
        assert_eq!(pq.del_min(), Some((2, 5.0)));
        assert_eq!(pq.del_min(), Some((0, 10.0)));
    }

    #[test]
    fn contains_tracks_membership() {
        let mut pq = IndexMinPq::new(2);
        assert!(!pq.contains(1));
        pq.insert(1, 1.0);
        assert!(pq.contains(1));
        pq.del_min();
        assert!(!pq.contains(1));
        assert!(pq.is_empty());
    }

    #[test]
    fn interleaved_operations() {
        let mut pq = IndexMinPq::new(16);
        for i in 0..16 {
            pq.insert(i, (16 - i) as f64);
        }
        assert_eq!(pq.len(), 16);
        assert_eq!(pq.del_min(), Some((15, 1.0)));

        pq.decrease_key(0, 0.5);
        assert_eq!(pq.del_min(), Some((0, 0.5)));

        let mut last = f64::NEG_INFINITY;
        while let Some((_, key)) = pq.del_min() {
            assert!(key >= last);
            last = key;
        }
    }
}
