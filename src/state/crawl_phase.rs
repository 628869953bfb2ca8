//! Lifecycle states of a crawl run
//!
//! A run moves strictly forward through these phases, one step at a time.

use std::fmt;

/// Represents the current phase of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Coordinator built, nothing queued yet
    Idle,

    /// Seed task being counted and queued
    Seeding,

    /// Workers are consuming tasks; the coordinator waits for the
    /// outstanding-work counter to reach zero
    Running,

    /// Task queue closed; workers are observing closure and exiting
    Draining,

    /// Every worker has exited
    Terminated,
}

impl CrawlPhase {
    /// Returns true if the run can move from this phase to `next`
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Seeding)
                | (Self::Seeding, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Terminated)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
