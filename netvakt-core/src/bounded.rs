//! Fixed-capacity containers used by the monitoring state.
//!
//! Both containers evict their oldest element on overflow, so a burst of
//! events can never grow memory past the configured capacity.

use std::collections::VecDeque;

/// Ordered log with a hard capacity, stored newest-first.
///
/// Pushing at capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct BoundedLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl BoundedLog {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be non-zero");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepends an entry, evicting the oldest one if the log is full.
    pub fn push(&mut self, entry: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_back();
        }
        self.entries.push_front(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries newest-first.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

/// Fixed-length window of per-tick samples.
///
/// The window always holds exactly `len` values; pushing slides it by
/// dropping the oldest sample. A fresh window is zero-filled so consumers
/// can chart it before the first tick.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: VecDeque<u64>,
}

impl SlidingWindow {
    pub fn zeroed(len: usize) -> Self {
        assert!(len > 0, "window length must be non-zero");
        Self {
            samples: std::iter::repeat(0).take(len).collect(),
        }
    }

    pub fn push(&mut self, sample: u64) {
        self.samples.pop_front();
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples oldest-first.
    pub fn to_vec(&self) -> Vec<u64> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> u64 {
        self.samples.back().copied().unwrap_or(0)
    }
}
