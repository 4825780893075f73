use std::time::Duration;

pub mod election;
pub mod vote_request_processor;

/// Source of election timeouts.
pub trait ElectionTimer: Send + 'static {
    /// Timeout before the next election attempt. Drawn anew on every reset.
    fn next_elections_timeout(&self) -> Duration;

    /// Lower bound of the timeouts this timer returns.
    fn min_elections_timeout(&self) -> Duration;
}
