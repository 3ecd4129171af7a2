use crate::domain::{Observation, PollerId, Status};
use std::collections::BTreeMap;

#[async_trait::async_trait]
pub trait StatusRepository {
    type Error: std::error::Error + Send;

    async fn get(&mut self, id: PollerId) -> Result<Option<Status>, Self::Error>;
    async fn get_all(&mut self) -> Result<BTreeMap<PollerId, Status>, Self::Error>;

    async fn record(&mut self, id: PollerId, observation: Observation) -> Result<(), Self::Error>;

    async fn delete(&mut self, id: PollerId) -> Result<Option<Status>, Self::Error>;
}
