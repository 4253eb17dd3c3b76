//! Wall-clock adapter

use chrono::{DateTime, Utc};
use gigachat_application::Clock;

/// Wall-clock implementation of the `Clock` port.
///
/// Production wiring uses this; tests substitute a manual clock to drive
/// token expiry without waiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
