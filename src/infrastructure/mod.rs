pub mod config_repository;
pub mod data_source;
pub mod status_repository;
pub mod timer;
pub mod toml_file_proxy;

pub use self::config_repository::*;
pub use self::data_source::*;
pub use self::status_repository::*;
pub use self::timer::*;

pub use toml_file_proxy::TomlFileProxy;
