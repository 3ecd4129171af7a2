pub mod app;
pub mod listeners;
pub mod poller;
pub mod poller_manager;
pub mod status_repository_actor;

pub use app::App;
pub use listeners::{Listener, ListenerId};
pub use poller::Poller;
pub use poller_manager::PollerManager;
pub use status_repository_actor::{StatusRepositoryActor, StatusRepositoryActorClient};
