//! End-to-end tests for both dispatchers.
//!
//! Timing-sensitive checks use generous margins: a deliberately slow
//! handler sleeps for `SLOW`, assertions about "not yet" run immediately
//! after `fire`, assertions about "eventually" wait several times `SLOW`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use eventor::{
    Dispatch, DispatchError, EventType, Handler, HandlerError, HandlerFn, HandlerRef, PoolConfig,
    PooledDispatcher, ProgressChangedEvent, SimpleEvent, SyncDispatcher, ValueChangedEvent,
    WorkerPool,
};

const SLOW: Duration = Duration::from_millis(150);

/// Handler that counts its invocations.
struct Counting {
    hits: AtomicUsize,
}

impl Counting {
    fn arc() -> Arc<Self> {
        Arc::new(Self {
            hits: AtomicUsize::new(0),
        })
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler<SimpleEvent> for Counting {
    async fn handle(&self, _event: Arc<SimpleEvent>) -> Result<(), HandlerError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Handler that always panics.
struct Panicking;

#[async_trait]
impl Handler<SimpleEvent> for Panicking {
    async fn handle(&self, _event: Arc<SimpleEvent>) -> Result<(), HandlerError> {
        panic!("handler blew up");
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

fn recording(log: &Arc<Mutex<Vec<u32>>>, id: u32) -> HandlerRef<SimpleEvent> {
    let log = Arc::clone(log);
    HandlerFn::arc("recording", move |_event: Arc<SimpleEvent>| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(id);
            Ok::<_, HandlerError>(())
        }
    })
}

fn failing() -> HandlerRef<SimpleEvent> {
    HandlerFn::arc("failing", |_event: Arc<SimpleEvent>| async {
        Err(HandlerError::fail("boom"))
    })
}

// ---------------------------------------------------------------------
// Registration surface (both dispatchers, through the shared trait)
// ---------------------------------------------------------------------

fn check_add_remove_lookup<D: Dispatch>(dispatcher: &D) {
    assert!(dispatcher.handlers_of::<SimpleEvent>().unwrap().is_none());

    let handlers: Vec<HandlerRef<SimpleEvent>> = (0..3)
        .map(|_| -> HandlerRef<SimpleEvent> { Counting::arc() })
        .collect();
    for (count, handler) in handlers.iter().enumerate() {
        dispatcher
            .add_handler::<SimpleEvent>(Arc::clone(handler))
            .unwrap();
        assert_eq!(
            dispatcher
                .handlers_of::<SimpleEvent>()
                .unwrap()
                .unwrap()
                .len(),
            count + 1,
            "each add must grow the list by exactly one"
        );
    }

    // Unrelated type stays untouched.
    assert!(
        dispatcher
            .handlers_of::<ProgressChangedEvent>()
            .unwrap()
            .is_none()
    );

    // Removing an unknown handler, or from an unknown type, is a no-op.
    let unknown: HandlerRef<SimpleEvent> = Counting::arc();
    dispatcher.remove_handler::<SimpleEvent>(&unknown).unwrap();
    let never: HandlerRef<ProgressChangedEvent> =
        HandlerFn::arc("never", |_e: Arc<ProgressChangedEvent>| async {
            Ok::<_, HandlerError>(())
        });
    dispatcher
        .remove_handler::<ProgressChangedEvent>(&never)
        .unwrap();
    assert_eq!(
        dispatcher
            .handlers_of::<SimpleEvent>()
            .unwrap()
            .unwrap()
            .len(),
        3
    );

    // Removal shrinks one at a time.
    for (removed, handler) in handlers.iter().enumerate() {
        dispatcher.remove_handler::<SimpleEvent>(handler).unwrap();
        assert_eq!(
            dispatcher
                .handlers_of::<SimpleEvent>()
                .unwrap()
                .unwrap()
                .len(),
            handlers.len() - removed - 1
        );
    }

    let types = dispatcher.supported_event_types().unwrap();
    assert!(types.contains(&EventType::of::<SimpleEvent>()));

    dispatcher.clear();
    assert!(dispatcher.supported_event_types().unwrap().is_empty());
}

#[tokio::test]
async fn test_sync_add_remove_lookup() {
    check_add_remove_lookup(&SyncDispatcher::new());
}

#[tokio::test]
async fn test_pooled_add_remove_lookup() {
    let dispatcher = PooledDispatcher::new();
    check_add_remove_lookup(&dispatcher);
    dispatcher.dispose().await;
}

// ---------------------------------------------------------------------
// Synchronous dispatch
// ---------------------------------------------------------------------

#[tokio::test]
async fn test_sync_fire_runs_inline() {
    let dispatcher = SyncDispatcher::new();
    let handler = Counting::arc();
    dispatcher
        .add_handler::<SimpleEvent>(handler.clone())
        .unwrap();

    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    assert_eq!(handler.hits(), 1);
}

#[tokio::test]
async fn test_sync_fire_registration_order() {
    let dispatcher = SyncDispatcher::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    for id in 0..5 {
        dispatcher
            .add_handler::<SimpleEvent>(recording(&log, id))
            .unwrap();
    }

    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_sync_fire_fail_fast() {
    let dispatcher = SyncDispatcher::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    dispatcher
        .add_handler::<SimpleEvent>(recording(&log, 1))
        .unwrap();
    dispatcher.add_handler::<SimpleEvent>(failing()).unwrap();
    dispatcher
        .add_handler::<SimpleEvent>(recording(&log, 3))
        .unwrap();

    let err = dispatcher.fire(SimpleEvent::new("test")).await.unwrap_err();
    assert!(matches!(err, DispatchError::Handler(_)));
    assert_eq!(
        *log.lock().unwrap(),
        vec![1],
        "handlers after the failing one must not run"
    );
}

#[tokio::test]
async fn test_fire_without_handlers_is_inert() {
    let dispatcher = SyncDispatcher::new();
    let handler = Counting::arc();
    dispatcher
        .add_handler::<SimpleEvent>(handler.clone())
        .unwrap();

    // A different event type with no registrations at all.
    dispatcher
        .fire(ProgressChangedEvent::new("test", 0.1, 0.2).unwrap())
        .await
        .unwrap();
    assert_eq!(handler.hits(), 0);
}

#[tokio::test]
async fn test_exact_type_dispatch_for_value_parameters() {
    let dispatcher = SyncDispatcher::new();
    let seen = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&seen);
    dispatcher
        .add_handler::<ValueChangedEvent<u32>>(HandlerFn::arc(
            "u32-only",
            move |_e: Arc<ValueChangedEvent<u32>>| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, HandlerError>(())
                }
            },
        ))
        .unwrap();

    // Same nominal event, different value parameter: different key.
    dispatcher
        .fire(ValueChangedEvent::new("test", 1i64, 2i64))
        .await
        .unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 0);

    dispatcher
        .fire(ValueChangedEvent::new("test", 1u32, 2u32))
        .await
        .unwrap();
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

// ---------------------------------------------------------------------
// Pooled dispatch
// ---------------------------------------------------------------------

#[tokio::test]
async fn test_pooled_fire_returns_before_slow_handler() {
    let dispatcher = PooledDispatcher::new();
    let done = Arc::new(AtomicUsize::new(0));

    let seen = Arc::clone(&done);
    dispatcher
        .add_handler::<SimpleEvent>(HandlerFn::arc("slow", move |_e: Arc<SimpleEvent>| {
            let seen = Arc::clone(&seen);
            async move {
                sleep(SLOW).await;
                seen.fetch_add(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(())
            }
        }))
        .unwrap();

    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    assert_eq!(
        done.load(Ordering::SeqCst),
        0,
        "fire must not wait for the handler"
    );

    sleep(SLOW * 4).await;
    assert_eq!(done.load(Ordering::SeqCst), 1, "effect must land eventually");
    dispatcher.dispose().await;
}

#[tokio::test]
async fn test_pooled_two_handlers_run_once_each() {
    let dispatcher = PooledDispatcher::new();
    let h1 = Counting::arc();
    let h2 = Counting::arc();
    dispatcher
        .add_handler::<SimpleEvent>(h1.clone())
        .unwrap();
    dispatcher
        .add_handler::<SimpleEvent>(h2.clone())
        .unwrap();

    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    sleep(SLOW).await;

    assert_eq!(h1.hits(), 1);
    assert_eq!(h2.hits(), 1);
    // Firing does not consume registrations.
    assert_eq!(
        dispatcher
            .handlers_of::<SimpleEvent>()
            .unwrap()
            .unwrap()
            .len(),
        2
    );
    dispatcher.dispose().await;
}

#[tokio::test]
async fn test_pooled_failure_is_isolated() {
    let dispatcher = PooledDispatcher::new();
    let sibling = Counting::arc();

    dispatcher.add_handler::<SimpleEvent>(failing()).unwrap();
    dispatcher
        .add_handler::<SimpleEvent>(sibling.clone())
        .unwrap();

    // The caller never observes the handler failure.
    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    sleep(SLOW).await;
    assert_eq!(sibling.hits(), 1, "sibling unit of work must still run");
    dispatcher.dispose().await;
}

#[tokio::test]
async fn test_pooled_panic_is_isolated() {
    let dispatcher = PooledDispatcher::with_max_workers(1);
    let sibling = Counting::arc();

    dispatcher
        .add_handler::<SimpleEvent>(Arc::new(Panicking))
        .unwrap();
    dispatcher
        .add_handler::<SimpleEvent>(sibling.clone())
        .unwrap();

    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    // A second fire still works on the same (single) worker.
    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    sleep(SLOW).await;

    assert_eq!(sibling.hits(), 2, "panics must not kill the worker");
    dispatcher.dispose().await;
}

#[tokio::test]
async fn test_single_worker_preserves_submission_order() {
    let dispatcher = PooledDispatcher::with_max_workers(1);
    let log = Arc::new(Mutex::new(Vec::new()));

    for id in 0..4 {
        dispatcher
            .add_handler::<SimpleEvent>(recording(&log, id))
            .unwrap();
    }
    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();

    dispatcher.dispose().await;
    assert_eq!(
        *log.lock().unwrap(),
        vec![0, 1, 2, 3, 0, 1, 2, 3],
        "one worker must drain the backlog strictly in submission order"
    );
}

#[tokio::test]
async fn test_dispose_drains_queued_work() {
    let dispatcher = PooledDispatcher::with_max_workers(2);
    let done = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let seen = Arc::clone(&done);
        dispatcher
            .add_handler::<SimpleEvent>(HandlerFn::arc("slowish", move |_e: Arc<SimpleEvent>| {
                let seen = Arc::clone(&seen);
                async move {
                    sleep(Duration::from_millis(30)).await;
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, HandlerError>(())
                }
            }))
            .unwrap();
    }

    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();
    dispatcher.dispose().await;
    assert_eq!(
        done.load(Ordering::SeqCst),
        4,
        "graceful disposal must let already-enqueued work finish"
    );
}

// ---------------------------------------------------------------------
// Disposal lifecycle
// ---------------------------------------------------------------------

#[tokio::test]
async fn test_dispose_is_idempotent() {
    let dispatcher = PooledDispatcher::new();
    assert!(!dispatcher.is_disposed());

    dispatcher.dispose().await;
    assert!(dispatcher.is_disposed());
    dispatcher.dispose().await;
    dispatcher.dispose().await;
    assert!(dispatcher.is_disposed());
}

#[tokio::test]
async fn test_gated_operations_fail_after_dispose() {
    let dispatcher = PooledDispatcher::new();
    dispatcher.dispose().await;

    let handler: HandlerRef<SimpleEvent> = Counting::arc();
    assert!(matches!(
        dispatcher.add_handler::<SimpleEvent>(Arc::clone(&handler)),
        Err(DispatchError::Disposed)
    ));
    assert!(matches!(
        dispatcher.remove_handler::<SimpleEvent>(&handler),
        Err(DispatchError::Disposed)
    ));
    assert!(matches!(
        dispatcher.fire(SimpleEvent::new("test")).await,
        Err(DispatchError::Disposed)
    ));
    assert!(matches!(
        dispatcher.handlers_of::<SimpleEvent>(),
        Err(DispatchError::Disposed)
    ));
    assert!(matches!(
        dispatcher.supported_event_types(),
        Err(DispatchError::Disposed)
    ));

    // clear() and is_disposed() stay callable.
    dispatcher.clear();
    assert!(dispatcher.is_disposed());
}

#[tokio::test]
async fn test_concurrent_dispose_calls_return_cleanly() {
    let dispatcher = Arc::new(PooledDispatcher::new());
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let dispatcher = Arc::clone(&dispatcher);
        tasks.push(tokio::spawn(async move { dispatcher.dispose().await }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    assert!(dispatcher.is_disposed());
}

#[tokio::test]
async fn test_external_pool_survives_dispose() {
    let pool = Arc::new(WorkerPool::new(2));
    let dispatcher = PooledDispatcher::with_pool(Arc::clone(&pool), false);

    dispatcher.dispose().await;
    assert!(dispatcher.is_disposed());
    assert!(
        !pool.is_closed(),
        "externally supplied pool must keep running"
    );

    // Still usable by its actual owner.
    let done = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&done);
    assert!(pool.submit(async move {
        seen.fetch_add(1, Ordering::SeqCst);
    }));
    assert!(pool.shutdown(Duration::from_secs(2)).await);
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_external_pool_shutdown_on_dispose() {
    let pool = Arc::new(WorkerPool::new(2));
    let dispatcher = PooledDispatcher::with_pool(Arc::clone(&pool), true);

    dispatcher.dispose().await;
    assert!(pool.is_closed(), "flagged external pool must be shut down");
}

#[tokio::test]
async fn test_forced_shutdown_after_grace() {
    let dispatcher = PooledDispatcher::with_config(PoolConfig {
        max_workers: 1,
        grace: Duration::from_millis(50),
        ..PoolConfig::default()
    });

    dispatcher
        .add_handler::<SimpleEvent>(HandlerFn::arc("stuck", |_e: Arc<SimpleEvent>| async {
            sleep(Duration::from_secs(60)).await;
            Ok::<_, HandlerError>(())
        }))
        .unwrap();
    dispatcher.fire(SimpleEvent::new("test")).await.unwrap();

    // Must come back in roughly the grace window, not after a minute.
    tokio::time::timeout(Duration::from_secs(5), dispatcher.dispose())
        .await
        .expect("dispose must force-cancel stuck work after the grace window");
    assert!(dispatcher.is_disposed());
}
