pub mod tokio_timer;

pub use self::tokio_timer::TokioTimer;
