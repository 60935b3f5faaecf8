use std::time::{Duration, Instant};

/// Quiescence interval used when `serve.toml` does not set one.
pub const DEBOUNCE_MS: u64 = 500;

/// How long the actor sleeps when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

/// Pure trailing-edge debouncer: only handles timing.
///
/// Starts idle, so registering watches never fires a rebuild by itself.
/// Every accepted event pushes the deadline out by one interval; the
/// deadline passing with no further event fires exactly once.
#[derive(Debug)]
pub(super) struct Debouncer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub(super) fn add_event(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// `true` exactly once per burst, when the quiet period has elapsed.
    pub(super) fn take_if_ready(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub(super) fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Precise sleep duration until the deadline.
    pub(super) fn sleep_duration(&self, now: Instant) -> Duration {
        match self.deadline {
            Some(deadline) => deadline
                .saturating_duration_since(now)
                .max(Duration::from_millis(1)),
            None => IDLE,
        }
    }
}
