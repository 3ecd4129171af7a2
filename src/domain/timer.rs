use std::fmt::Display;

pub type Tick = Box<dyn Fn() + Send + Sync + 'static>;

/// Repeating timer capability.
///
/// `set_recurring` calls `tick` every `period`, the first time one `period`
/// after the call, until the returned handle is cancelled.
pub trait Timer: Send + Sync {
    fn set_recurring(
        &self,
        period: std::time::Duration,
        tick: Tick,
    ) -> Result<Box<dyn TimerHandle>, TimerError>;
}

pub trait TimerHandle: Send {
    /// Stops further ticks. Calling it twice is harmless.
    fn cancel(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The timer needs a runtime that is not available on this thread.
    NoRuntime(String),
}
impl Display for TimerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerError::NoRuntime(e) => f.write_fmt(format_args!("timer cannot be armed: {e}")),
        }
    }
}
impl std::error::Error for TimerError {}
