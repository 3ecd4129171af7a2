use serde_derive::{Deserialize, Serialize};

use crate::domain::{Hash, Timestamp};

/// What the status store keeps for one poller.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub digest: Option<Hash>,
    pub last_updated: Option<Timestamp>,
    pub last_checked: Timestamp,
    pub last_error: Option<String>,
    /// Consecutive failures since the last success.
    #[serde(default)]
    pub failures: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    Success { digest: Hash, at: Timestamp },
    Failure { message: String, at: Timestamp },
}

impl Status {
    /// Folds `observation` into the previous status, if any.
    ///
    /// Returns the new status and whether the stored digest changed.
    pub fn observe(previous: Option<&Status>, observation: Observation) -> (Status, bool) {
        match observation {
            Observation::Success { digest, at } => {
                let updated = previous.and_then(|x| x.digest) != Some(digest);
                let last_updated = if updated {
                    Some(at)
                } else {
                    previous.and_then(|x| x.last_updated)
                };
                let status = Status {
                    digest: Some(digest),
                    last_updated,
                    last_checked: at,
                    last_error: None,
                    failures: 0,
                };
                (status, updated)
            }
            Observation::Failure { message, at } => {
                let status = Status {
                    digest: previous.and_then(|x| x.digest),
                    last_updated: previous.and_then(|x| x.last_updated),
                    last_checked: at,
                    last_error: Some(message),
                    failures: previous.map(|x| x.failures).unwrap_or(0) + 1,
                };
                (status, false)
            }
        }
    }
}
