use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use pollmux::application::PollerManager;
use pollmux::domain::{
    DataSource, Error, EventKind, FetchError, Payload, PollEvent, PollerOptions,
};
use pollmux::infrastructure::TokioTimer;

#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}
impl CountingSource {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
#[async_trait::async_trait]
impl DataSource for CountingSource {
    async fn fetch(&self) -> Result<Payload, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(serde_json::json!({ "n": n }))
    }
}

async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

async fn elapse(millis: u64) {
    tokio::time::advance(Duration::from_millis(millis)).await;
    settle().await;
}

fn manager() -> PollerManager {
    PollerManager::new(Arc::new(TokioTimer::new()))
}

#[tokio::test(start_paused = true)]
async fn one_fetch_per_interval_and_none_after_stop() {
    let mut manager = manager();
    let source = Arc::new(CountingSource::default());
    let poller = manager.init_poller("status", source.clone()).unwrap();
    poller.configure(PollerOptions::every_millis(100)).unwrap();

    poller.start().unwrap();
    settle().await;
    assert_eq!(source.calls(), 0);

    elapse(100).await;
    assert_eq!(source.calls(), 1);

    poller.stop();
    elapse(100).await;
    elapse(100).await;
    assert_eq!(source.calls(), 1);
    assert!(!poller.is_active());
}

#[tokio::test(start_paused = true)]
async fn configured_frequency_drives_the_schedule() {
    for millis in [1u64, 35, 100, 1_000] {
        let mut manager = manager();
        let source = Arc::new(CountingSource::default());
        let poller = manager.init_poller("status", source.clone()).unwrap();
        poller.configure(PollerOptions::every_millis(millis)).unwrap();
        assert_eq!(poller.poll_frequency().unwrap().as_millis(), millis);

        poller.start().unwrap();
        if millis > 1 {
            elapse(millis - 1).await;
            assert_eq!(source.calls(), 0, "fired early at {millis}ms");
            elapse(1).await;
        } else {
            elapse(1).await;
        }
        assert_eq!(source.calls(), 1, "interval {millis}ms");

        elapse(millis).await;
        assert_eq!(source.calls(), 2, "interval {millis}ms");

        manager.delete_all();
    }
}

#[tokio::test(start_paused = true)]
async fn events_arrive_in_lifecycle_order() {
    let mut manager = manager();
    let source = Arc::new(CountingSource::default());
    let poller = manager.init_poller("status", source.clone()).unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    for kind in EventKind::ALL {
        let log = log.clone();
        poller.on(kind, move |event| {
            let entry = match event {
                PollEvent::Success { payload, changed, .. } => {
                    format!("success {} {changed}", payload["n"])
                }
                other => other.kind().to_string(),
            };
            log.lock().unwrap().push(entry);
        });
    }
    poller.configure(PollerOptions::every_millis(100)).unwrap();

    poller.start().unwrap();
    elapse(100).await;
    elapse(100).await;
    manager.delete_poller("status").unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["start", "success 1 true", "success 2 true", "stop"]
    );
}

#[tokio::test(start_paused = true)]
async fn delete_all_stops_active_pollers() {
    let mut manager = manager();
    let stops = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();
    for i in 1..=5 {
        let source = Arc::new(CountingSource::default());
        let poller = manager
            .init_poller(&format!("poller_{i}"), source.clone())
            .unwrap();
        let stops = stops.clone();
        poller.on(EventKind::Stop, move |_| {
            stops.fetch_add(1, Ordering::SeqCst);
        });
        poller.configure(PollerOptions::every_millis(100)).unwrap();
        poller.start().unwrap();
        handles.push((poller, source));
    }

    elapse(100).await;
    for (_, source) in handles.iter() {
        assert_eq!(source.calls(), 1);
    }

    manager.delete_all();
    assert_eq!(stops.load(Ordering::SeqCst), 5);
    assert!(manager.poller_ids().is_empty());

    elapse(500).await;
    for (poller, source) in handles.iter() {
        assert_eq!(source.calls(), 1);
        assert!(!poller.is_active());
        assert_eq!(poller.listener_count(EventKind::Stop), 0);
    }
}

#[tokio::test(start_paused = true)]
async fn reconfigure_while_active_takes_effect_after_the_next_tick() {
    let mut manager = manager();
    let source = Arc::new(CountingSource::default());
    let poller = manager.init_poller("status", source.clone()).unwrap();
    poller.configure(PollerOptions::every_millis(100)).unwrap();
    poller.start().unwrap();

    poller.configure(PollerOptions::every_millis(250)).unwrap();
    elapse(99).await;
    assert_eq!(source.calls(), 0);
    elapse(1).await;
    assert_eq!(source.calls(), 1);

    // the old 100ms interval must not tick again at 200ms
    elapse(249).await;
    assert_eq!(source.calls(), 1);
    elapse(1).await;
    assert_eq!(source.calls(), 2);

    elapse(250).await;
    assert_eq!(source.calls(), 3);
    assert!(poller.is_active());

    manager.delete_all();
}

#[test]
fn start_outside_a_runtime_is_refused() {
    let mut manager = manager();
    let source = Arc::new(CountingSource::default());
    let poller = manager.init_poller("status", source).unwrap();
    let starts = Arc::new(AtomicUsize::new(0));
    {
        let starts = starts.clone();
        poller.on(EventKind::Start, move |_| {
            starts.fetch_add(1, Ordering::SeqCst);
        });
    }
    poller.configure(PollerOptions::every_millis(100)).unwrap();

    assert!(matches!(poller.start(), Err(Error::InvalidState(_))));
    assert!(!poller.is_active());
    assert_eq!(starts.load(Ordering::SeqCst), 0);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        poller.start().unwrap();
        assert!(poller.is_active());
        manager.delete_all();
    });
    assert_eq!(starts.load(Ordering::SeqCst), 1);
}
