//! Monotonic timestamp generation.
//!
//! Timestamps are strings so they embed directly into record keys. They are
//! fixed-width (13-digit epoch milliseconds plus a 6-digit sequence), which
//! makes lexicographic key order match generation order. The sequence bumps
//! when two calls land on the same millisecond or the wall clock steps
//! backwards, so every timestamp issued within one process is strictly
//! greater than the last.

use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Wall-clock milliseconds since the epoch.
#[inline]
pub(crate) fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub(crate) struct MonotonicClock {
    last: Mutex<(u64, u32)>,
}

impl MonotonicClock {
    pub(crate) fn new() -> Self {
        Self {
            last: Mutex::new((0, 0)),
        }
    }

    /// Next strictly increasing, sortable timestamp string.
    pub(crate) fn next(&self) -> String {
        let now = wall_clock_ms();
        let mut last = self.last.lock();
        if now > last.0 {
            *last = (now, 0);
        } else if last.1 < 999_999 {
            last.1 += 1;
        } else {
            // A million calls in one millisecond; spill into the next one.
            *last = (last.0 + 1, 0);
        }
        format!("{:013}.{:06}", last.0, last.1)
    }
}
