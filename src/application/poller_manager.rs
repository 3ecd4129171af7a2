use std::{collections::HashMap, sync::Arc};

use log::{debug, info};

use crate::application::Poller;
use crate::domain::{DataSource, Error, PollerId, Timer};

/// Registry of pollers keyed by id.
///
/// Ids are unique; registering one twice is an error. `poller_ids` follows
/// registration order. Every poller created here shares the manager's timer.
pub struct PollerManager {
    timer: Arc<dyn Timer>,
    pollers: HashMap<PollerId, Poller>,
    order: Vec<PollerId>,
}

impl PollerManager {
    pub fn new(timer: Arc<dyn Timer>) -> Self {
        Self {
            timer,
            pollers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers a new, unconfigured poller bound to `source`.
    pub fn init_poller(&mut self, id: &str, source: Arc<dyn DataSource>) -> Result<Poller, Error> {
        let id = parse_id(id)?;
        if self.pollers.contains_key(&id) {
            return Err(Error::DuplicateId(id));
        }

        debug!("[{id}]: registered ({})", source.describe());
        let poller = Poller::new(id.to_string(), source, self.timer.clone());
        let _ = self.pollers.insert(id.clone(), poller.clone());
        self.order.push(id);
        Ok(poller)
    }

    pub fn lookup_poller(&self, id: &str) -> Result<Option<Poller>, Error> {
        let id = parse_id(id)?;
        Ok(self.pollers.get(&id).cloned())
    }

    pub fn poller_ids(&self) -> Vec<PollerId> {
        self.order.clone()
    }

    /// Stops the poller, drops its listeners and forgets it. Unknown ids are ignored.
    pub fn delete_poller(&mut self, id: &str) -> Result<(), Error> {
        let id = parse_id(id)?;
        let Some(poller) = self.pollers.remove(&id) else {
            return Ok(());
        };
        self.order.retain(|x| *x != id);

        poller.stop();
        poller.remove_all_listeners();
        debug!("[{id}]: deleted.");
        Ok(())
    }

    pub fn delete_all(&mut self) {
        if self.order.is_empty() {
            return;
        }

        let count = self.order.len();
        for id in std::mem::take(&mut self.order) {
            if let Some(poller) = self.pollers.remove(&id) {
                poller.stop();
                poller.remove_all_listeners();
            }
        }
        self.pollers.clear();
        info!("deleted {count} poller(s).");
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn parse_id(id: &str) -> Result<PollerId, Error> {
    PollerId::new(id).map_err(|e| Error::invalid_argument(1, e))
}
