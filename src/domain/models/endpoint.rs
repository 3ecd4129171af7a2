use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

use crate::domain::Url;

/// Where a data source reads from.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: Option<u16>,
}
impl Endpoint {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            timeout_secs: None,
        }
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        self.timeout_secs
            .map(|secs| std::time::Duration::from_secs(secs as u64))
    }
}
