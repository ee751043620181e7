//! Single-flight deferred work: the frame-aligned render request and the
//! delay-aligned save timer. Arming either one replaces whatever was pending.

use std::time::{Duration, Instant};

/// A request to run something on the next display frame.
#[derive(Debug, Default)]
pub struct FrameSlot {
    pending: bool,
}

impl FrameSlot {
    /// Arm for the next frame, cancelling an earlier request.
    /// Returns `true` when an earlier request was replaced.
    pub fn request(&mut self) -> bool {
        std::mem::replace(&mut self.pending, true)
    }

    pub fn cancel(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Consume the request if one is pending; called once per frame.
    pub fn take(&mut self) -> bool {
        self.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// Restartable delay: only the most recent `arm` survives.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm and return `true` once the deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
