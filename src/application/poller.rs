use std::{
    panic::AssertUnwindSafe,
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use futures_util::FutureExt;
use log::{debug, error};

use crate::application::listeners::{panic_message, ListenerId, Listeners};
use crate::domain::{
    DataSource, Error, EventKind, FetchError, Hash, PollEvent, PollFrequency, PollerOptions,
    Timer, TimerError, TimerHandle, Timestamp,
};

/// Drives one data source on a fixed interval and reports every cycle to
/// its listeners.
///
/// `Poller` is a cheap handle; clones share the same state. Ticks spawn
/// their fetch onto the current tokio runtime. Cycles may overlap when a
/// fetch takes longer than the interval.
#[derive(Clone)]
pub struct Poller {
    shared: Arc<Shared>,
}

struct Shared {
    label: String,
    source: Arc<dyn DataSource>,
    timer: Arc<dyn Timer>,
    listeners: Listeners,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    frequency: Option<PollFrequency>,
    /// Period the current timer was armed with.
    armed_with: Option<PollFrequency>,
    handle: Option<Box<dyn TimerHandle>>,
    /// Bumped on every start; cycles of an older epoch are discarded.
    epoch: u64,
    last_digest: Option<Hash>,
}

impl Poller {
    pub(crate) fn new(label: String, source: Arc<dyn DataSource>, timer: Arc<dyn Timer>) -> Self {
        Self {
            shared: Arc::new(Shared {
                label,
                source,
                timer,
                listeners: Listeners::default(),
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Sets the interval. While active, the new value applies from the next tick.
    pub fn configure(&self, options: PollerOptions) -> Result<(), Error> {
        let frequency = PollFrequency::from_millis(options.poll_frequency)
            .map_err(|e| Error::invalid_argument(1, e))?;
        self.shared.lock().frequency = Some(frequency);
        debug!("[{}]: poll frequency set to {frequency}", self.shared.label);
        Ok(())
    }

    pub fn poll_frequency(&self) -> Option<PollFrequency> {
        self.shared.lock().frequency
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock().handle.is_some()
    }

    /// Arms the timer; the first cycle runs one interval from now.
    ///
    /// Fails with `InvalidState` when unconfigured or when the timer cannot be armed.
    pub fn start(&self) -> Result<(), Error> {
        {
            let mut state = self.shared.lock();
            if state.handle.is_some() {
                return Ok(());
            }
            let frequency = state.frequency.ok_or_else(|| {
                Error::InvalidState(String::from("poll frequency is not configured"))
            })?;

            let epoch = state.epoch + 1;
            let handle = Shared::arm(&self.shared, frequency, epoch)
                .map_err(|e| Error::InvalidState(e.to_string()))?;
            state.epoch = epoch;
            state.handle = Some(handle);
            state.armed_with = Some(frequency);
        }

        debug!("[{}]: started.", self.shared.label);
        self.shared.listeners.emit(&self.shared.label, &PollEvent::Start);
        Ok(())
    }

    /// Cancels the timer. Fetches already running finish, but nobody hears about them.
    pub fn stop(&self) {
        let handle = self.shared.lock().handle.take();
        let Some(mut handle) = handle else {
            return;
        };
        handle.cancel();

        debug!("[{}]: stopped.", self.shared.label);
        self.shared.listeners.emit(&self.shared.label, &PollEvent::Stop);
    }

    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&PollEvent) + Send + Sync + 'static,
    {
        self.shared.listeners.add(kind, Arc::new(listener))
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.shared.listeners.remove(id)
    }

    pub fn remove_all_listeners(&self) {
        self.shared.listeners.clear();
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.shared.listeners.count(kind)
    }

    /// Whether both handles refer to the same poller.
    pub fn ptr_eq(&self, other: &Poller) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Poller")
            .field("label", &self.shared.label)
            .field("frequency", &state.frequency)
            .field("active", &state.handle.is_some())
            .finish()
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn arm(
        this: &Arc<Shared>,
        frequency: PollFrequency,
        epoch: u64,
    ) -> Result<Box<dyn TimerHandle>, TimerError> {
        // Weak: the timer handle lives inside `Shared`.
        let weak: Weak<Shared> = Arc::downgrade(this);
        this.timer.set_recurring(
            frequency.as_duration(),
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    Shared::tick(&shared, epoch);
                }
            }),
        )
    }

    fn tick(this: &Arc<Shared>, epoch: u64) {
        {
            let mut state = this.lock();
            if state.handle.is_none() || state.epoch != epoch {
                return;
            }

            if let (Some(frequency), Some(armed_with)) = (state.frequency, state.armed_with) {
                if frequency != armed_with {
                    debug!("[{}]: re-arming with {frequency}", this.label);
                    match Shared::arm(this, frequency, epoch) {
                        Ok(handle) => {
                            if let Some(mut old) = state.handle.replace(handle) {
                                old.cancel();
                            }
                            state.armed_with = Some(frequency);
                        }
                        Err(why) => {
                            error!("[{}]: keeping {armed_with}: {why}", this.label);
                        }
                    }
                }
            }
        }

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(x) => x,
            Err(why) => {
                error!("[{}]: cannot fetch outside a tokio runtime: {why}", this.label);
                return;
            }
        };

        let shared = this.clone();
        let _ = runtime.spawn(async move {
            let source = shared.source.clone();
            debug!("[{}]: fetching {}", shared.label, source.describe());
            let result = AssertUnwindSafe(source.fetch())
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(FetchError::Panicked(panic_message(panic.as_ref()))));
            Shared::complete(&shared, epoch, result);
        });
    }

    fn complete(this: &Arc<Shared>, epoch: u64, result: Result<serde_json::Value, FetchError>) {
        let event = {
            let mut state = this.lock();
            if state.handle.is_none() || state.epoch != epoch {
                debug!("[{}]: discarding the result of a stopped cycle.", this.label);
                return;
            }

            match result {
                Ok(payload) => {
                    let digest = Hash::of_payload(&payload);
                    let changed = state.last_digest != Some(digest);
                    state.last_digest = Some(digest);
                    PollEvent::Success {
                        payload,
                        digest,
                        changed,
                        fetched_at: Timestamp::now(),
                    }
                }
                Err(error) => PollEvent::Failure {
                    error,
                    failed_at: Timestamp::now(),
                },
            }
        };

        this.listeners.emit(&this.label, &event);
    }
}
