use std::time::Duration;

use tokio::{task::JoinHandle, time::MissedTickBehavior};

use crate::domain::{Tick, Timer, TimerError, TimerHandle};

/// `Timer` backed by a spawned `tokio::time::Interval`.
///
/// Late ticks are delayed rather than bursted. Arming fails outside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl TokioTimer {
    pub fn new() -> Self {
        Self
    }
}

impl Timer for TokioTimer {
    fn set_recurring(
        &self,
        period: Duration,
        tick: Tick,
    ) -> Result<Box<dyn TimerHandle>, TimerError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TimerError::NoRuntime(e.to_string()))?;

        let start = tokio::time::Instant::now() + period;
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let _ = interval.tick().await;
                tick();
            }
        });

        Ok(Box::new(TokioTimerHandle(task)))
    }
}

#[derive(Debug)]
pub struct TokioTimerHandle(JoinHandle<()>);

impl TimerHandle for TokioTimerHandle {
    fn cancel(&mut self) {
        self.0.abort();
    }
}

impl Drop for TokioTimerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}
