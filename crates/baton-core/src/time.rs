//! Wall-clock access.
//!
//! The session store and the handoff timestamp gate must read the same
//! clock; both go through [`now_ms`].

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as epoch milliseconds.
#[must_use]
pub fn now_ms() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_ms_is_monotonic_enough() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000); // later than 2020
    }
}
