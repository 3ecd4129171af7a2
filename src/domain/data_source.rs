use std::fmt::Display;

use crate::domain::Payload;

/// One remote read per call, no caching.
///
/// Implementations do not coordinate concurrent calls; a poller may have
/// several fetches outstanding at once.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self) -> Result<Payload, FetchError>;

    /// Short human readable target, used in log lines.
    fn describe(&self) -> String {
        String::from("data source")
    }
}

#[derive(Debug)]
pub enum FetchError {
    /// `fetch` was called before the source knew its target.
    NotConfigured,
    Status(u16),
    Transport(Box<dyn std::error::Error + Send + Sync>),
    Decode(String),
    /// The fetch future panicked.
    Panicked(String),
}
impl Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::NotConfigured => f.write_str("data source is not configured."),
            FetchError::Status(code) => f.write_fmt(format_args!("unexpected status: {code}")),
            FetchError::Transport(e) => f.write_fmt(format_args!("transport error: {e}")),
            FetchError::Decode(e) => f.write_fmt(format_args!("failed to decode the body: {e}")),
            FetchError::Panicked(e) => f.write_fmt(format_args!("fetch panicked: {e}")),
        }
    }
}
impl std::error::Error for FetchError {}
