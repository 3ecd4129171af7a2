use std::{
    collections::HashMap,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard},
};

use log::warn;

use crate::domain::{EventKind, PollEvent};

pub type Listener = Arc<dyn Fn(&PollEvent) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Event name to ordered listener list.
///
/// Listeners are called in registration order. A panicking listener is
/// logged and skipped; the ones after it still run.
#[derive(Default)]
pub struct Listeners {
    inner: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    by_kind: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
}

impl Listeners {
    pub fn add(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let mut registry = self.lock();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.by_kind.entry(kind).or_default().push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) -> bool {
        let mut registry = self.lock();
        for list in registry.by_kind.values_mut() {
            if let Some(pos) = list.iter().position(|(x, _)| *x == id) {
                let _ = list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn clear(&self) {
        self.lock().by_kind.clear();
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.lock().by_kind.get(&kind).map_or(0, |x| x.len())
    }

    /// Runs every listener of the event's kind. `label` prefixes log lines.
    pub fn emit(&self, label: &str, event: &PollEvent) {
        // Snapshot so listeners may register, remove or stop without deadlocking.
        let listeners: Vec<Listener> = self
            .lock()
            .by_kind
            .get(&event.kind())
            .map(|x| x.iter().map(|(_, l)| l.clone()).collect())
            .unwrap_or_default();

        for listener in listeners {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| listener(event))) {
                warn!(
                    "[{label}]: {} listener panicked: {}",
                    event.kind(),
                    panic_message(panic.as_ref())
                );
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // A listener never runs while the lock is held, so poisoning carries no torn state.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("non-string panic payload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> Listener {
        let log = log.clone();
        Arc::new(move |_| log.lock().unwrap().push(name))
    }

    #[test]
    fn calls_in_registration_order() {
        let listeners = Listeners::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        listeners.add(EventKind::Start, recorder(&log, "a"));
        listeners.add(EventKind::Start, recorder(&log, "b"));
        listeners.add(EventKind::Stop, recorder(&log, "c"));

        listeners.emit("test", &PollEvent::Start);

        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn panicking_listener_does_not_stop_the_rest() {
        let listeners = Listeners::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        listeners.add(EventKind::Stop, Arc::new(|_| panic!("listener failure")));
        listeners.add(EventKind::Stop, recorder(&log, "after"));

        listeners.emit("test", &PollEvent::Stop);
        listeners.emit("test", &PollEvent::Stop);

        assert_eq!(*log.lock().unwrap(), vec!["after", "after"]);
    }

    #[test]
    fn remove_and_clear() {
        let listeners = Listeners::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter: Listener = {
            let calls = calls.clone();
            Arc::new(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            })
        };

        let first = listeners.add(EventKind::Start, counter.clone());
        listeners.add(EventKind::Start, counter.clone());
        listeners.add(EventKind::Stop, counter);

        assert!(listeners.remove(first));
        assert!(!listeners.remove(first));
        assert_eq!(listeners.count(EventKind::Start), 1);

        listeners.emit("test", &PollEvent::Start);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        listeners.clear();
        listeners.clear();
        for kind in EventKind::ALL {
            assert_eq!(listeners.count(kind), 0);
        }
    }

    #[test]
    fn listener_may_register_another_listener_while_running() {
        let listeners = Arc::new(Listeners::default());
        let inner = listeners.clone();
        listeners.add(
            EventKind::Start,
            Arc::new(move |_| {
                inner.add(EventKind::Stop, Arc::new(|_| ()));
            }),
        );

        listeners.emit("test", &PollEvent::Start);

        assert_eq!(listeners.count(EventKind::Stop), 1);
    }
}
