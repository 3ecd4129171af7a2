pub mod config_repository;
pub mod data_source;
pub mod error;
pub mod models;
pub mod status_repository;
pub mod timer;

pub use self::config_repository::*;
pub use self::data_source::*;
pub use self::error::Error;
pub use self::models::*;
pub use self::status_repository::*;
pub use self::timer::*;
