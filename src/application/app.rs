use std::{collections::BTreeMap, collections::HashSet, future::Future, sync::Arc};

use log::{debug, info, warn};
use prettytable::{Cell, Row, Table};

use crate::application::{
    status_repository_actor, Poller, PollerManager, StatusRepositoryActor,
    StatusRepositoryActorClient,
};
use crate::domain::{
    self, DataSource, Endpoint, EventKind, Observation, PollEvent, PollFrequency, PollerId,
    PollerOptions, Status, StatusRepository as _, Timer, Timestamp,
};

pub struct App<ConfigRepository, StatusRepository, Connect> {
    config_repo: ConfigRepository,
    status_repo: StatusRepository,
    connect: Connect,
    timer: Arc<dyn Timer>,
    default_frequency: PollFrequency,
}

impl<ConfigRepository, StatusRepository, Connect> App<ConfigRepository, StatusRepository, Connect>
where
    ConfigRepository: domain::ConfigRepository,
    StatusRepository: domain::StatusRepository + Send + 'static,
    Connect: Fn(Endpoint) -> Arc<dyn DataSource>,
{
    /// `connect` builds the data source for each configured endpoint.
    pub fn new(
        config_repo: ConfigRepository,
        status_repo: StatusRepository,
        connect: Connect,
        timer: Arc<dyn Timer>,
        default_frequency: PollFrequency,
    ) -> Self {
        Self {
            config_repo,
            status_repo,
            connect,
            timer,
            default_frequency,
        }
    }

    /// Polls every configured endpoint until `shutdown` resolves.
    pub async fn run<Shutdown>(
        self,
        shutdown: Shutdown,
    ) -> Result<BTreeMap<PollerId, Status>, Error<ConfigRepository::Error, StatusRepository::Error>>
    where
        Shutdown: Future<Output = ()>,
    {
        let Self {
            mut config_repo,
            mut status_repo,
            connect,
            timer,
            default_frequency,
        } = self;

        let configs = config_repo
            .get_all()
            .await
            .map_err(Error::ConfigRepositoryError)?;
        if configs.is_empty() {
            warn!("no pollers are configured.");
        }

        let configured: HashSet<_> = configs.iter().map(|(id, _)| id.clone()).collect();
        let stored = status_repo
            .get_all()
            .await
            .map_err(Error::StatusRepositoryError)?;
        for id in stored.into_keys().filter(|x| !configured.contains(x)) {
            debug!("[{id}]: dropping the status of an unconfigured poller.");
            let _ = status_repo
                .delete(id)
                .await
                .map_err(Error::StatusRepositoryError)?;
        }

        let mut status = StatusRepositoryActor::new(status_repo).start();
        let mut manager = PollerManager::new(timer);

        let mut pollers = Vec::with_capacity(configs.len());
        for (id, config) in configs.into_iter() {
            let frequency = config
                .poll_frequency
                .unwrap_or(default_frequency.as_millis());
            let source = connect(config.endpoint);

            let poller = manager
                .init_poller(id.as_str(), source)
                .and_then(|poller| {
                    poller.configure(PollerOptions::every_millis(frequency))?;
                    Ok(poller)
                });
            let poller = match poller {
                Ok(x) => x,
                Err(why) => {
                    manager.delete_all();
                    return Err(Error::PollerError(why));
                }
            };

            subscribe(&poller, &id, &status);
            pollers.push(poller);
        }

        for poller in pollers.iter() {
            poller.start().map_err(Error::PollerError)?;
        }
        info!("polling {} endpoint(s).", manager.len());

        shutdown.await;

        info!("shutting down.");
        manager.delete_all();

        let statuses = status.get_all().await.map_err(Error::StatusActorError)?;
        for line in summary(&statuses, Timestamp::now()).to_string().lines() {
            info!("{line}");
        }

        Ok(statuses)
    }
}

/// Logs every event and forwards cycle outcomes to the status store.
fn subscribe<StatusRepository>(
    poller: &Poller,
    id: &PollerId,
    status: &StatusRepositoryActorClient<StatusRepository>,
) where
    StatusRepository: domain::StatusRepository + 'static,
{
    let frequency = poller.poll_frequency();
    {
        let id = id.clone();
        poller.on(EventKind::Start, move |_| match frequency {
            Some(x) => info!("[{id}]: started, every {x}."),
            None => info!("[{id}]: started."),
        });
    }
    {
        let id = id.clone();
        poller.on(EventKind::Stop, move |_| info!("[{id}]: stopped."));
    }
    {
        let id = id.clone();
        let status = status.clone();
        poller.on(EventKind::Success, move |event| {
            let PollEvent::Success {
                payload,
                digest,
                changed,
                fetched_at,
            } = event
            else {
                return;
            };

            if *changed {
                info!(
                    "[{id}]: {} ({})",
                    ansi_term::Color::Fixed(15).bold().paint("updated."),
                    digest.short()
                );
            } else {
                info!(
                    "[{id}]: {}",
                    ansi_term::Color::Fixed(8).paint("not yet updated.")
                );
            }
            debug!("[{id}]:\n{payload}");

            let observation = Observation::Success {
                digest: *digest,
                at: *fetched_at,
            };
            if let Err(why) = status.notify(id.clone(), observation) {
                warn!("[{id}]: {why}");
            }
        });
    }
    {
        let id = id.clone();
        let status = status.clone();
        poller.on(EventKind::Failure, move |event| {
            let PollEvent::Failure { error, failed_at } = event else {
                return;
            };

            warn!("[{id}]: {error}");
            let observation = Observation::Failure {
                message: error.to_string(),
                at: *failed_at,
            };
            if let Err(why) = status.notify(id.clone(), observation) {
                warn!("[{id}]: {why}");
            }
        });
    }
}

/// Status table, most recently updated last.
pub fn summary(statuses: &BTreeMap<PollerId, Status>, now: Timestamp) -> Table {
    let mut list: Vec<_> = statuses.iter().collect();
    list.sort_by_key(|x| x.1.last_updated);

    let mut table = Table::new();
    table.set_titles(Row::new(
        ["id", "last checked", "last updated", "recent", "failures", "last error"]
            .iter()
            .map(|x| Cell::new(x))
            .collect(),
    ));

    for (id, status) in list {
        let recent = status
            .last_updated
            .map_or(false, |x| x.is_within(chrono::Duration::days(1), now));
        let last_updated = status
            .last_updated
            .map(|x| x.to_string())
            .unwrap_or_else(|| String::from("-"));

        table.add_row(Row::new(vec![
            Cell::new(id.as_str()),
            Cell::new(&status.last_checked.to_string()),
            Cell::new(&last_updated),
            Cell::new(if recent { "*" } else { "" }),
            Cell::new(&status.failures.to_string()),
            Cell::new(status.last_error.as_deref().unwrap_or("")),
        ]));
    }

    table
}

#[derive(Debug)]
pub enum Error<ConfigRepositoryError, StatusRepositoryError>
where
    ConfigRepositoryError: std::error::Error,
    StatusRepositoryError: std::error::Error,
{
    ConfigRepositoryError(ConfigRepositoryError),
    StatusRepositoryError(StatusRepositoryError),
    StatusActorError(status_repository_actor::Error<StatusRepositoryError>),
    PollerError(domain::Error),
}
impl<ConfigRepositoryError, StatusRepositoryError> std::fmt::Display
    for Error<ConfigRepositoryError, StatusRepositoryError>
where
    ConfigRepositoryError: std::error::Error,
    StatusRepositoryError: std::error::Error,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ConfigRepositoryError(e) => f.write_fmt(format_args!("config error: {e}")),
            Error::StatusRepositoryError(e) => f.write_fmt(format_args!("status error: {e}")),
            Error::StatusActorError(e) => f.write_fmt(format_args!("status error: {e}")),
            Error::PollerError(e) => f.write_fmt(format_args!("poller error: {e}")),
        }
    }
}

impl<ConfigRepositoryError, StatusRepositoryError> std::error::Error
    for Error<ConfigRepositoryError, StatusRepositoryError>
where
    ConfigRepositoryError: std::error::Error,
    StatusRepositoryError: std::error::Error,
{
}
