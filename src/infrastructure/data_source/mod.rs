pub mod http_data_source;

pub use self::http_data_source::HttpDataSource;
