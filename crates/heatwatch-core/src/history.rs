//! Bounded rolling history of readings.
//!
//! A [`HistoryWindow`] keeps the most recent readings for one location in
//! insertion order. Once full, every append evicts exactly one entry from
//! the head. Entries are never re-sorted, so [`HistoryWindow::all`] can be
//! charted or exported as-is.
//!
//! # Example
//!
//! ```
//! use heatwatch_core::history::{HistoryWindow, DEFAULT_CAPACITY};
//!
//! let window = HistoryWindow::new();
//! assert_eq!(window.capacity(), DEFAULT_CAPACITY);
//! assert!(window.latest().is_none());
//! ```

use std::collections::VecDeque;

use heatwatch_types::{Location, LocationKey};

use crate::readings::Reading;

/// Default number of readings retained.
pub const DEFAULT_CAPACITY: usize = 24;

/// Fixed-capacity, oldest-evicted sequence of readings.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    entries: VecDeque<Reading>,
    capacity: usize,
    location: Option<LocationKey>,
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryWindow {
    /// Create an empty window with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty window holding at most `capacity` readings.
    ///
    /// A capacity of zero is raised to one so the latest reading is always kept.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            location: None,
        }
    }

    /// Create an empty window bound to a location.
    pub fn for_location(location: &Location, capacity: usize) -> Self {
        let mut window = Self::with_capacity(capacity);
        window.location = Some(location.key());
        window
    }

    /// Append a reading, evicting the oldest entry when full.
    pub fn append(&mut self, reading: Reading) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(reading);
    }

    /// The most recently appended reading.
    pub fn latest(&self) -> Option<&Reading> {
        self.entries.back()
    }

    /// The reading appended just before [`latest`](Self::latest).
    pub fn previous(&self) -> Option<&Reading> {
        self.entries.len().checked_sub(2).and_then(|i| self.entries.get(i))
    }

    /// All readings, oldest first.
    pub fn all(&self) -> Vec<Reading> {
        self.entries.iter().cloned().collect()
    }

    /// Iterate readings, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Number of readings held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window holds no readings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of readings held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Identity of the location this window tracks, if bound.
    pub fn location(&self) -> Option<&LocationKey> {
        self.location.as_ref()
    }

    /// Whether this window tracks `location`.
    pub fn tracks(&self, location: &Location) -> bool {
        self.location.as_ref() == Some(&location.key())
    }

    /// Discard all readings and bind the window to `location`.
    pub fn reset_for(&mut self, location: &Location) {
        self.entries.clear();
        self.location = Some(location.key());
    }
}

impl<'a> IntoIterator for &'a HistoryWindow {
    type Item = &'a Reading;
    type IntoIter = std::collections::vec_deque::Iter<'a, Reading>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
