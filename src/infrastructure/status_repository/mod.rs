pub mod toml_status_repository;

pub use self::toml_status_repository::TomlStatusRepository;
