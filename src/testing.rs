//! Fakes shared by the unit tests.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::domain::{DataSource, FetchError, Payload, Tick, Timer, TimerError, TimerHandle};

/// Lets spawned tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Timer that only ticks when told to.
#[derive(Default)]
pub struct ManualTimer {
    entries: Mutex<Vec<Entry>>,
}

struct Entry {
    period: Duration,
    tick: Arc<dyn Fn() + Send + Sync>,
    cancelled: Arc<AtomicBool>,
}

impl ManualTimer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Ticks every live timer once.
    pub fn fire(&self) {
        let ticks: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|x| !x.cancelled.load(Ordering::SeqCst))
            .map(|x| x.tick.clone())
            .collect();
        for tick in ticks {
            tick();
        }
    }

    /// How many timers were ever armed.
    pub fn armed(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn live(&self) -> usize {
        self.periods().len()
    }

    pub fn periods(&self) -> Vec<Duration> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|x| !x.cancelled.load(Ordering::SeqCst))
            .map(|x| x.period)
            .collect()
    }
}

impl Timer for ManualTimer {
    fn set_recurring(
        &self,
        period: Duration,
        tick: Tick,
    ) -> Result<Box<dyn TimerHandle>, TimerError> {
        let cancelled = Arc::new(AtomicBool::new(false));
        self.entries.lock().unwrap().push(Entry {
            period,
            tick: Arc::from(tick),
            cancelled: cancelled.clone(),
        });
        Ok(Box::new(ManualHandle(cancelled)))
    }
}

struct ManualHandle(Arc<AtomicBool>);
impl TimerHandle for ManualHandle {
    fn cancel(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Always answers with the same payload.
pub struct StaticSource {
    payload: Payload,
    calls: AtomicUsize,
}
impl StaticSource {
    pub fn new(payload: Payload) -> Arc<Self> {
        Arc::new(Self {
            payload,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
#[async_trait::async_trait]
impl DataSource for StaticSource {
    async fn fetch(&self) -> Result<Payload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

#[derive(Default)]
pub struct FailingSource {
    calls: AtomicUsize,
}
impl FailingSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
#[async_trait::async_trait]
impl DataSource for FailingSource {
    async fn fetch(&self) -> Result<Payload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::Status(503))
    }
}

/// Each fetch waits for a permit handed out by `release`.
pub struct GatedSource {
    gate: Semaphore,
    calls: AtomicUsize,
}
impl GatedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
#[async_trait::async_trait]
impl DataSource for GatedSource {
    async fn fetch(&self) -> Result<Payload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.gate.acquire().await {
            Ok(permit) => permit.forget(),
            Err(_) => return Err(FetchError::NotConfigured),
        }
        Ok(serde_json::Value::Null)
    }
}
