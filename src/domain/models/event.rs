use std::fmt::Display;

use crate::domain::{FetchError, Hash, Timestamp};

pub type Payload = serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Start,
    Stop,
    Success,
    Failure,
}
impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Start,
        EventKind::Stop,
        EventKind::Success,
        EventKind::Failure,
    ];
}
impl Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EventKind::Start => "start",
            EventKind::Stop => "stop",
            EventKind::Success => "success",
            EventKind::Failure => "failure",
        })
    }
}

#[derive(Debug)]
pub enum PollEvent {
    Start,
    Stop,
    Success {
        payload: Payload,
        digest: Hash,
        /// The digest differs from the previous successful cycle of this poller.
        changed: bool,
        fetched_at: Timestamp,
    },
    Failure {
        error: FetchError,
        failed_at: Timestamp,
    },
}
impl PollEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PollEvent::Start => EventKind::Start,
            PollEvent::Stop => EventKind::Stop,
            PollEvent::Success { .. } => EventKind::Success,
            PollEvent::Failure { .. } => EventKind::Failure,
        }
    }
}
