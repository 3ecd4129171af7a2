use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(chrono::NaiveDateTime);
impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::Utc::now().naive_utc())
    }

    pub fn unix_millis(&self) -> i64 {
        self.0.and_utc().timestamp_millis()
    }

    /// Whether `self` lies within `window` before `now`.
    pub fn is_within(&self, window: chrono::Duration, now: Timestamp) -> bool {
        now.0 - window < self.0
    }
}

impl From<chrono::NaiveDateTime> for Timestamp {
    fn from(dt: chrono::NaiveDateTime) -> Self {
        Self(dt)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{}", self.0.format("%Y-%m-%d %H:%M:%S")))
    }
}

impl core::ops::Sub<chrono::Duration> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: chrono::Duration) -> Self::Output {
        Self(self.0 - rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_check() {
        let now = Timestamp::now();
        let hour_ago = now - chrono::Duration::hours(1);
        let two_days_ago = now - chrono::Duration::days(2);

        assert!(hour_ago.is_within(chrono::Duration::days(1), now));
        assert!(!two_days_ago.is_within(chrono::Duration::days(1), now));
        assert!(hour_ago.unix_millis() < now.unix_millis());
    }
}
