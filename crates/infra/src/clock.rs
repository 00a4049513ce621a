//! Wall-clock time source.

use cadence_core::Clock;
use chrono::{DateTime, SubsecRound, Utc};

/// Current UTC time, truncated to whole seconds to match what the store keeps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Timelike;

    use super::*;

    #[test]
    fn has_no_subsecond_component() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }
}
