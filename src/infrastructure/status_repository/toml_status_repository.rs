use std::{collections::BTreeMap, fmt::Display};

use log::debug;

use crate::domain::{Observation, PollerId, Status, StatusRepository};
use crate::infrastructure::toml_file_proxy::{Error as TomlProxyError, TomlFileProxy};

/// Keeps one `Status` per poller in a TOML file, rewritten after every change.
pub struct TomlStatusRepository {
    proxy: TomlFileProxy<BTreeMap<PollerId, Status>>,
}
impl TomlStatusRepository {
    pub async fn new(path: &str) -> Result<Self, Error> {
        let mut proxy = TomlFileProxy::new(path).await?;
        proxy.load().await?;

        Ok(Self { proxy })
    }

    /// Updates the inner map and returns what to put back if saving fails.
    fn update_map(&mut self, id: PollerId, observation: Observation) -> Result<RestoreInfo, Error> {
        let map = self.proxy.cache_mut()?;
        let (status, updated) = Status::observe(map.get(&id), observation);
        if updated {
            debug!("[{id}]: content changed since the last record.");
        }
        debug!("[{id}]: {status:?}");

        let old = map.insert(id.clone(), status);
        Ok(RestoreInfo { id, status: old })
    }

    fn restore(&mut self, restore_info: RestoreInfo) -> Result<(), Error> {
        let RestoreInfo { id, status } = restore_info;
        let map = self.proxy.cache_mut()?;
        match status {
            Some(status) => {
                let _ = map.insert(id, status);
            }
            None => {
                let _ = map.remove(&id);
            }
        }
        Ok(())
    }

    async fn save_or_restore(&mut self, restore_info: RestoreInfo) -> Result<Option<Status>, Error> {
        if let Err(e) = self.proxy.save().await {
            self.restore(restore_info)?;
            Err(e.into())
        } else {
            Ok(restore_info.status)
        }
    }
}

#[async_trait::async_trait]
impl StatusRepository for TomlStatusRepository {
    type Error = Error;

    async fn get(&mut self, id: PollerId) -> Result<Option<Status>, Self::Error> {
        Ok(self.proxy.cache()?.get(&id).cloned())
    }

    async fn get_all(&mut self) -> Result<BTreeMap<PollerId, Status>, Self::Error> {
        Ok(self.proxy.cache()?.clone())
    }

    async fn record(&mut self, id: PollerId, observation: Observation) -> Result<(), Self::Error> {
        let restore_info = self.update_map(id, observation)?;
        let _ = self.save_or_restore(restore_info).await?;
        Ok(())
    }

    async fn delete(&mut self, id: PollerId) -> Result<Option<Status>, Self::Error> {
        let old = self.proxy.cache_mut()?.remove(&id);
        if old.is_none() {
            return Ok(None);
        }

        self.save_or_restore(RestoreInfo { id, status: old }).await
    }
}

struct RestoreInfo {
    id: PollerId,
    status: Option<Status>,
}

#[derive(Debug)]
pub enum Error {
    TomlProxyError(TomlProxyError),
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TomlProxyError(e) => f.write_fmt(format_args!("status file: {e}")),
        }
    }
}
impl std::error::Error for Error {}
impl From<TomlProxyError> for Error {
    fn from(e: TomlProxyError) -> Self {
        Error::TomlProxyError(e)
    }
}
