use serde_derive::{Deserialize, Serialize};
use std::fmt::Display;

/// Interval between two poll cycles, in milliseconds. Always positive.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollFrequency(u64);
impl PollFrequency {
    pub fn from_millis(millis: u64) -> Result<Self, FrequencyError> {
        if millis == 0 {
            Err(FrequencyError)
        } else {
            Ok(Self(millis))
        }
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.0)
    }
}

impl Display for PollFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Options accepted by `Poller::configure`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerOptions {
    /// Milliseconds between two cycles.
    pub poll_frequency: u64,
}
impl PollerOptions {
    pub fn every_millis(poll_frequency: u64) -> Self {
        Self { poll_frequency }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyError;
impl Display for FrequencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("poll frequency must be a positive number of milliseconds")
    }
}

impl std::error::Error for FrequencyError {}
