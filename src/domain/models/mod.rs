pub mod endpoint;
pub mod event;
pub mod frequency;
pub mod hash;
pub mod id;
pub mod status;
pub mod timestamp;
pub mod url;

pub use self::endpoint::Endpoint;
pub use self::event::{EventKind, Payload, PollEvent};
pub use self::frequency::{PollFrequency, PollerOptions};
pub use self::hash::Hash;
pub use self::id::PollerId;
pub use self::status::{Observation, Status};
pub use self::timestamp::Timestamp;
pub use self::url::Url;

use serde_derive::{Deserialize, Serialize};

/// One poller definition as read from configuration.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    pub endpoint: Endpoint,
    /// Milliseconds; the caller's default applies when absent.
    pub poll_frequency: Option<u64>,
}
