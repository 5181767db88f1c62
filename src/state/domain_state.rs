use std::time::{Duration, Instant};

/// Tracks the request history of one domain during crawling
///
/// The politeness rule is a minimum delay between consecutive requests to
/// the same domain; the delay value itself comes from configuration.
#[derive(Debug, Clone)]
pub struct DomainState {
    /// Number of requests made to this domain in the current process
    pub request_count: u64,

    /// Timestamp of the last request to this domain
    pub last_request_time: Option<Instant>,
}

impl DomainState {
    /// Creates a new DomainState with no request history
    pub fn new() -> Self {
        Self {
            request_count: 0,
            last_request_time: None,
        }
    }

    /// Checks if a request can be made to this domain right now
    pub fn can_request(&self, min_delay: Duration, now: Instant) -> bool {
        match self.last_request_time {
            Some(last) => now.duration_since(last) >= min_delay,
            None => true,
        }
    }

    /// Records that a request was made to this domain
    pub fn record_request(&mut self, now: Instant) {
        self.request_count += 1;
        self.last_request_time = Some(now);
    }

    /// Calculates the time until the next request can be made
    ///
    /// Returns None if a request can be made now.
    pub fn time_until_next_request(&self, min_delay: Duration, now: Instant) -> Option<Duration> {
        if let Some(last) = self.last_request_time {
            let elapsed = now.duration_since(last);
            if elapsed < min_delay {
                return Some(min_delay - elapsed);
            }
        }
        None
    }
}

impl Default for DomainState {
    fn default() -> Self {
        Self::new()
    }
}
