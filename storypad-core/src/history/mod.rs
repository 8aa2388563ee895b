//! # History
//!
//! A bounded, linear undo/redo buffer. Every entry is a complete state (for drawing, a full
//! [`Snapshot`](crate::canvas::Snapshot) of the canvas) rather than a diff, so the buffer is capped
//! to a fixed capacity and the oldest entries fall off the front as new ones are recorded.
//!
//! History is linear - recording while some states have been undone discards those states for good.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Capacity used when nothing else is configured.
pub const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("history capacity must be at least one")]
    ZeroCapacity,
}

#[derive(Clone, Debug)]
pub struct BoundedHistory<T> {
    /// Oldest first.
    entries: VecDeque<T>,
    /// Position of the present state in `entries`. None iff `entries` is empty.
    index: Option<usize>,
    capacity: NonZeroUsize,
}
impl<T> BoundedHistory<T> {
    /// Create an empty history holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, HistoryError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(HistoryError::ZeroCapacity)?;
        Ok(Self::with_capacity(capacity))
    }
    #[must_use]
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            // Grows as needed, don't reserve the whole window up front for huge capacities.
            entries: VecDeque::with_capacity(capacity.get().min(64)),
            index: None,
            capacity,
        }
    }
    /// Create a history whose only entry is `initial`.
    #[must_use]
    pub fn with_initial(capacity: NonZeroUsize, initial: T) -> Self {
        let mut this = Self::with_capacity(capacity);
        this.initialize(initial);
        this
    }
    /// Discard everything, leaving `initial` as the sole and present entry.
    pub fn initialize(&mut self, initial: T) {
        self.entries.clear();
        self.entries.push_back(initial);
        self.index = Some(0);
    }
    /// Make `entry` the present state.
    ///
    /// Any redo branch is dropped first. If the history is then over capacity, the oldest entries are
    /// evicted. Afterwards, `entry` is always the last entry and there is nothing to redo.
    pub fn record(&mut self, entry: T) {
        let Some(index) = self.index else {
            self.initialize(entry);
            return;
        };
        let discarded = self.entries.len() - (index + 1);
        self.entries.truncate(index + 1);
        self.entries.push_back(entry);

        let mut evicted = 0usize;
        while self.entries.len() > self.capacity.get() {
            self.entries.pop_front();
            evicted += 1;
        }
        self.index = Some(self.entries.len() - 1);

        log::trace!(
            "Recorded history entry {}/{} (discarded {discarded} redo, evicted {evicted})",
            self.entries.len(),
            self.capacity,
        );
    }
    /// Step back one entry, returning the new present state.
    /// None, and no change, if there is nothing to undo.
    pub fn undo(&mut self) -> Option<&T> {
        let index = self.index?.checked_sub(1)?;
        self.index = Some(index);
        self.entries.get(index)
    }
    /// Step forward one entry, returning the new present state.
    /// None, and no change, if there is nothing to redo.
    pub fn redo(&mut self) -> Option<&T> {
        let index = self.index? + 1;
        if index >= self.entries.len() {
            return None;
        }
        self.index = Some(index);
        self.entries.get(index)
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|index| index > 0)
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index
            .is_some_and(|index| index + 1 < self.entries.len())
    }
    /// The present state, or None if nothing has been recorded.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.entries.get(self.index?)
    }
    /// Position of the present state, oldest retained entry being 0.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }
    /// Iterate every retained entry, oldest first. Includes the redo branch.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + DoubleEndedIterator + '_ {
        self.entries.iter()
    }
}
