use std::{collections::BTreeMap, fmt::Display};

use serde_derive::{Deserialize, Serialize};

use crate::infrastructure::toml_file_proxy::{Error as TomlProxyError, TomlFileProxy};

use crate::domain::{config_repository::ConfigRepository, Endpoint, PollerConfig, PollerId, Url};

#[derive(Deserialize, Serialize, Default)]
struct TomlConfigFile {
    #[serde(default)]
    poller: Vec<TomlPoller>,
}

#[derive(Deserialize, Serialize, Clone)]
struct TomlPoller {
    id: PollerId,
    url: Url,
    poll_frequency: Option<u64>,
    timeout_secs: Option<u16>,
    #[serde(default)]
    query: BTreeMap<String, String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}
impl From<TomlPoller> for (PollerId, PollerConfig) {
    fn from(p: TomlPoller) -> Self {
        let TomlPoller {
            id,
            url,
            poll_frequency,
            timeout_secs,
            query,
            headers,
        } = p;
        let endpoint = Endpoint {
            url,
            query,
            headers,
            timeout_secs,
        };
        (
            id,
            PollerConfig {
                endpoint,
                poll_frequency,
            },
        )
    }
}

/// Reads `[[poller]]` tables from a TOML file.
pub struct TomlConfigRepository {
    proxy: TomlFileProxy<TomlConfigFile>,
}
impl TomlConfigRepository {
    pub async fn new(path: &str) -> Result<Self, Error> {
        let mut proxy = TomlFileProxy::new(path).await?;
        proxy.load().await?;

        Ok(Self { proxy })
    }
}

#[async_trait::async_trait]
impl ConfigRepository for TomlConfigRepository {
    type Error = Error;

    async fn get_all(&mut self) -> Result<Vec<(PollerId, PollerConfig)>, Self::Error> {
        let file = self.proxy.load().await?;
        Ok(file.poller.iter().cloned().map(Into::into).collect())
    }
}

#[derive(Debug)]
pub enum Error {
    TomlProxyError(TomlProxyError),
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TomlProxyError(e) => f.write_fmt(format_args!("failed to read the config: {e}")),
        }
    }
}
impl std::error::Error for Error {}
impl From<TomlProxyError> for Error {
    fn from(e: TomlProxyError) -> Self {
        Error::TomlProxyError(e)
    }
}
