//! Generation counter for the document set.

use std::sync::atomic::{AtomicU64, Ordering};

/// Number of accepted refresh signals since startup.
pub type Generation = u64;

/// Process-wide document-set generation.
///
/// Starts at 0 and only moves forward by one per [`bump`](Self::bump).
/// Shared by `Arc` between the refresh path and the notification stream.
#[derive(Debug, Default)]
pub struct VersionCounter {
    value: AtomicU64,
}

impl VersionCounter {
    /// Create a counter at generation 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a counter that resumes from a known generation.
    pub fn starting_at(generation: Generation) -> Self {
        Self {
            value: AtomicU64::new(generation),
        }
    }

    /// Latest committed generation.
    pub fn current(&self) -> Generation {
        self.value.load(Ordering::Acquire)
    }

    /// Increment and return the new generation.
    ///
    /// Every caller gets a distinct value; across all callers the results
    /// are exactly the next consecutive integers.
    pub fn bump(&self) -> Generation {
        self.value.fetch_add(1, Ordering::AcqRel) + 1
    }
}
