//! Generic circular buffer with overwrite-oldest eviction.

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Capacity used when a buffer is requested with a capacity of zero.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Point-in-time snapshot of a buffer's occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingStats {
    /// Number of items currently stored.
    pub count: usize,
    /// Maximum number of items the buffer can hold.
    pub capacity: usize,
    /// Fill ratio in `0.0..=1.0`.
    pub usage: f64,
    /// Whether the buffer has wrapped around at least once.
    pub is_full: bool,
}

/// A thread-safe circular buffer with a fixed maximum capacity.
///
/// Insertion is O(1) and never fails: once the buffer is full, every push
/// evicts the oldest item. Retrieval is always ordered oldest to newest.
///
/// Writers (`push`, `push_batch`, `clear`) take an exclusive lock; readers
/// share a read lock and may run concurrently with each other. A poisoned
/// lock is recovered rather than propagated, keeping every operation
/// infallible.
///
/// # Example
///
/// ```
/// use shared::buffer::RingBuffer;
///
/// let buffer = RingBuffer::new(2);
/// buffer.push("a");
/// buffer.push("b");
/// buffer.push("c"); // evicts "a"
///
/// assert_eq!(buffer.get_all(), vec!["b", "c"]);
/// ```
#[derive(Debug)]
pub struct RingBuffer<T> {
    state: RwLock<RingState<T>>,
    capacity: usize,
}

#[derive(Debug)]
struct RingState<T> {
    items: Vec<Option<T>>,
    /// Next write position.
    head: usize,
    /// Oldest stored item.
    tail: usize,
    count: usize,
    full: bool,
}

impl<T> RingState<T> {
    fn insert(&mut self, item: T, capacity: usize) {
        self.items[self.head] = Some(item);
        self.head = (self.head + 1) % capacity;

        if self.full {
            // Overwriting: the oldest item moves forward in lockstep.
            self.tail = (self.tail + 1) % capacity;
        } else {
            self.count += 1;
            if self.count == capacity {
                self.full = true;
            }
        }
    }
}

impl<T> RingBuffer<T> {
    /// Creates a buffer holding at most `capacity` items.
    ///
    /// A capacity of zero is corrected to [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };

        Self {
            state: RwLock::new(RingState {
                items: (0..capacity).map(|_| None).collect(),
                head: 0,
                tail: 0,
                count: 0,
                full: false,
            }),
            capacity,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, RingState<T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RingState<T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an item, evicting the oldest one if the buffer is full.
    pub fn push(&self, item: T) {
        self.write().insert(item, self.capacity);
    }

    /// Adds every item in order under a single lock acquisition.
    pub fn push_batch(&self, items: Vec<T>) {
        if items.is_empty() {
            return;
        }

        let mut state = self.write();
        for item in items {
            state.insert(item, self.capacity);
        }
    }

    /// Removes all items and resets the cursors in one step.
    ///
    /// Stored items are dropped eagerly so their memory is reclaimed without
    /// waiting for later overwrites.
    pub fn clear(&self) {
        let mut state = self.write();
        state.head = 0;
        state.tail = 0;
        state.count = 0;
        state.full = false;
        for slot in &mut state.items {
            *slot = None;
        }
    }

    /// Visits items oldest to newest, stopping when `f` returns `false`.
    ///
    /// Useful for scan-based consumers that want to avoid copying the whole
    /// buffer. The read lock is held for the duration of the scan.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let state = self.read();
        for i in 0..state.count {
            let idx = (state.tail + i) % self.capacity;
            if let Some(item) = &state.items[idx] {
                if !f(item) {
                    break;
                }
            }
        }
    }

    /// Number of items currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().count
    }

    /// Whether the buffer contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().count == 0
    }

    /// Whether the buffer has reached its capacity.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.read().full
    }

    /// Maximum number of items the buffer can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the buffer's occupancy.
    #[must_use]
    pub fn stats(&self) -> RingStats {
        let state = self.read();
        RingStats {
            count: state.count,
            capacity: self.capacity,
            usage: state.count as f64 / self.capacity as f64,
            is_full: state.full,
        }
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Returns a copy of every item, ordered oldest to newest.
    #[must_use]
    pub fn get_all(&self) -> Vec<T> {
        let state = self.read();
        let mut result = Vec::with_capacity(state.count);
        for i in 0..state.count {
            let idx = (state.tail + i) % self.capacity;
            if let Some(item) = &state.items[idx] {
                result.push(item.clone());
            }
        }
        result
    }

    /// Returns the newest `n` items, ordered oldest to newest among the tail.
    ///
    /// If `n` exceeds the current count, all items are returned; `n == 0`
    /// yields an empty vec.
    #[must_use]
    pub fn get_last(&self, n: usize) -> Vec<T> {
        let state = self.read();
        if state.count == 0 || n == 0 {
            return Vec::new();
        }

        let n = n.min(state.count);
        let start = (state.tail + state.count - n) % self.capacity;
        let mut result = Vec::with_capacity(n);
        for i in 0..n {
            let idx = (start + i) % self.capacity;
            if let Some(item) = &state.items[idx] {
                result.push(item.clone());
            }
        }
        result
    }

    /// Returns the most recently pushed item, or `None` if empty.
    #[must_use]
    pub fn get_latest(&self) -> Option<T> {
        let state = self.read();
        if state.count == 0 {
            return None;
        }

        let idx = (state.head + self.capacity - 1) % self.capacity;
        state.items[idx].clone()
    }
}
