//! Debounce for upstream change notifications.
//!
//! Every notification restarts the quiet period; a rebuild fires once no
//! notification has arrived for `delay`. Time is passed in explicitly.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_event: None,
        }
    }

    /// Record a change notification.
    pub fn notify(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    /// True exactly once per burst, when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.saturating_duration_since(last) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}
