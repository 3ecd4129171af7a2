use crate::domain::{PollerConfig, PollerId};

#[async_trait::async_trait]
pub trait ConfigRepository {
    type Error: std::error::Error + Send;

    /// Every configured poller, in definition order.
    async fn get_all(&mut self) -> Result<Vec<(PollerId, PollerConfig)>, Self::Error>;
}
