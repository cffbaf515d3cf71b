/// Crawl phase definitions for tracking the lifecycle of a crawl run
///
/// A crawler moves `Idle -> Initialized -> Running -> Finished`, or
/// `Initialized -> Aborted` when the renderer cannot be started.
use std::fmt;

/// Represents the lifecycle phase of a crawler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// No parameters have been supplied yet
    Idle,

    /// Parameters supplied and crawl state built, waiting for `crawl`
    Initialized,

    /// The crawl loop is running
    Running,

    /// The crawl loop ended and the run was finalized
    Finished,

    /// The renderer could not be started, nothing was crawled
    Aborted,
}

impl CrawlPhase {
    /// Returns true if the transition from `self` to `next` is allowed
    ///
    /// `Finished` and `Aborted` may be re-initialized for another run.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Initialized)
                | (Self::Initialized, Self::Initialized)
                | (Self::Initialized, Self::Running)
                | (Self::Initialized, Self::Aborted)
                | (Self::Running, Self::Finished)
                | (Self::Finished, Self::Initialized)
                | (Self::Aborted, Self::Initialized)
        )
    }

    /// Returns true if this phase ends a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Aborted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initialized => "initialized",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(CrawlPhase::Idle.can_transition_to(CrawlPhase::Initialized));
        assert!(CrawlPhase::Initialized.can_transition_to(CrawlPhase::Running));
        assert!(CrawlPhase::Running.can_transition_to(CrawlPhase::Finished));
    }

    #[test]
    fn test_abort_only_from_initialized() {
        assert!(CrawlPhase::Initialized.can_transition_to(CrawlPhase::Aborted));
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Aborted));
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Aborted));
    }

    #[test]
    fn test_cannot_run_without_initialize() {
        assert!(!CrawlPhase::Idle.can_transition_to(CrawlPhase::Running));
        assert!(!CrawlPhase::Finished.can_transition_to(CrawlPhase::Running));
        assert!(!CrawlPhase::Aborted.can_transition_to(CrawlPhase::Running));
    }

    #[test]
    fn test_reinitialize_after_terminal() {
        assert!(CrawlPhase::Finished.can_transition_to(CrawlPhase::Initialized));
        assert!(CrawlPhase::Aborted.can_transition_to(CrawlPhase::Initialized));
        assert!(!CrawlPhase::Running.can_transition_to(CrawlPhase::Initialized));
    }

    #[test]
    fn test_is_terminal() {
        assert!(CrawlPhase::Finished.is_terminal());
        assert!(CrawlPhase::Aborted.is_terminal());
        assert!(!CrawlPhase::Idle.is_terminal());
        assert!(!CrawlPhase::Initialized.is_terminal());
        assert!(!CrawlPhase::Running.is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", CrawlPhase::Running), "running");
        assert_eq!(format!("{}", CrawlPhase::Aborted), "aborted");
    }
}
