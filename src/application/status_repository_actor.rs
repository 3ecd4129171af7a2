use std::{collections::BTreeMap, fmt::Display};

use log::warn;
use tokio::sync::{mpsc, oneshot};

use crate::domain::{self, Observation, PollerId, Status};

/// Owns a status repository on its own task.
///
/// Poller listeners are synchronous; they hand observations to the actor
/// through `StatusRepositoryActorClient::notify` without waiting.
pub struct StatusRepositoryActor<StatusRepository> {
    inner: StatusRepository,
}
impl<StatusRepository> StatusRepositoryActor<StatusRepository>
where
    StatusRepository: domain::StatusRepository + Send + 'static,
{
    pub fn new(inner: StatusRepository) -> Self {
        Self { inner }
    }

    pub fn start(mut self) -> StatusRepositoryActorClient<StatusRepository> {
        let (tx_message, mut rx_message) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(message) = rx_message.recv().await {
                match message {
                    Message::Get { tx, id } => {
                        let result = self.inner.get(id).await;
                        let _ = tx.send(result);
                    }
                    Message::GetAll { tx } => {
                        let result = self.inner.get_all().await;
                        let _ = tx.send(result);
                    }
                    Message::Record {
                        tx,
                        id,
                        observation,
                    } => {
                        let result = self.inner.record(id.clone(), observation).await;
                        match tx {
                            Some(tx) => {
                                let _ = tx.send(result);
                            }
                            None => {
                                if let Err(why) = result {
                                    warn!("[{id}]: failed to record the status: {why}");
                                }
                            }
                        }
                    }
                    Message::Delete { tx, id } => {
                        let result = self.inner.delete(id).await;
                        let _ = tx.send(result);
                    }
                }
            }
        });

        StatusRepositoryActorClient { tx_message }
    }
}

enum Message<E> {
    Get {
        tx: oneshot::Sender<Result<Option<Status>, E>>,
        id: PollerId,
    },
    GetAll {
        tx: oneshot::Sender<Result<BTreeMap<PollerId, Status>, E>>,
    },
    Record {
        /// `None` for fire-and-forget notifications.
        tx: Option<oneshot::Sender<Result<(), E>>>,
        id: PollerId,
        observation: Observation,
    },
    Delete {
        tx: oneshot::Sender<Result<Option<Status>, E>>,
        id: PollerId,
    },
}

pub struct StatusRepositoryActorClient<StatusRepository: domain::StatusRepository> {
    tx_message: mpsc::UnboundedSender<Message<StatusRepository::Error>>,
}
impl<StatusRepository: domain::StatusRepository> Clone
    for StatusRepositoryActorClient<StatusRepository>
{
    fn clone(&self) -> Self {
        let tx_message = self.tx_message.clone();
        Self { tx_message }
    }
}
impl<StatusRepository: domain::StatusRepository> StatusRepositoryActorClient<StatusRepository> {
    /// Queues an observation without waiting for it to be stored.
    pub fn notify(&self, id: PollerId, observation: Observation) -> Result<(), ActorMessageError> {
        self.tx_message
            .send(Message::Record {
                tx: None,
                id,
                observation,
            })
            .map_err(|_| ActorMessageError::SendError)
    }

    async fn request<T>(
        &self,
        message: Message<StatusRepository::Error>,
        rx: oneshot::Receiver<Result<T, StatusRepository::Error>>,
    ) -> Result<T, Error<StatusRepository::Error>> {
        if let Err(_e) = self.tx_message.send(message) {
            return Err(Error::ActorMessageError(ActorMessageError::SendError));
        }

        match rx.await {
            Ok(result) => result.map_err(Error::StatusRepositoryError),
            Err(_e) => Err(Error::ActorMessageError(ActorMessageError::RecvError)),
        }
    }
}

#[async_trait::async_trait]
impl<StatusRepository> domain::StatusRepository for StatusRepositoryActorClient<StatusRepository>
where
    StatusRepository: domain::StatusRepository,
{
    type Error = Error<StatusRepository::Error>;

    async fn get(&mut self, id: PollerId) -> Result<Option<Status>, Self::Error> {
        let (tx, rx) = oneshot::channel();
        self.request(Message::Get { tx, id }, rx).await
    }

    async fn get_all(&mut self) -> Result<BTreeMap<PollerId, Status>, Self::Error> {
        let (tx, rx) = oneshot::channel();
        self.request(Message::GetAll { tx }, rx).await
    }

    async fn record(&mut self, id: PollerId, observation: Observation) -> Result<(), Self::Error> {
        let (tx, rx) = oneshot::channel();
        let message = Message::Record {
            tx: Some(tx),
            id,
            observation,
        };
        self.request(message, rx).await
    }

    async fn delete(&mut self, id: PollerId) -> Result<Option<Status>, Self::Error> {
        let (tx, rx) = oneshot::channel();
        self.request(Message::Delete { tx, id }, rx).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Error<E: std::error::Error> {
    ActorMessageError(ActorMessageError),
    StatusRepositoryError(E),
}
impl<E: std::error::Error> Display for Error<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ActorMessageError(e) => f.write_fmt(format_args!("Actor message error: {e}")),
            Error::StatusRepositoryError(e) => {
                f.write_fmt(format_args!("StatusRepository error: {e}"))
            }
        }
    }
}
impl<E: std::error::Error> std::error::Error for Error<E> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorMessageError {
    SendError,
    RecvError,
}
impl Display for ActorMessageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorMessageError::SendError => {
                f.write_fmt(format_args!("failed to send the message to the actor."))
            }
            ActorMessageError::RecvError => f.write_fmt(format_args!(
                "failed to receive the message from the actor."
            )),
        }
    }
}
impl std::error::Error for ActorMessageError {}
