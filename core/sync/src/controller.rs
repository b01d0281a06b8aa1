//! Debounced, single-flight auto-sync of editor snapshots.
//!
//! The controller observes a snapshot owned by the caller (usually a form)
//! and persists it through a [`SaveHandler`] once edits have been quiet
//! for the configured delay. At most one save runs at a time; a save that
//! would overlap is dropped, not queued.

use serde::Serialize;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use tascboard_common::Error;

use crate::config::AutoSyncConfig;
use crate::handler::SaveHandler;
use crate::snapshot::CanonicalSnapshot;
use crate::state::SyncState;

/// Callback invoked with the record returned by a successful save.
pub type SuccessCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callback invoked with the error of a failed save.
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// Options for an [`AutoSyncController`].
pub struct AutoSyncOptions<T> {
    /// Timing configuration.
    pub config: AutoSyncConfig,
    on_success: Option<SuccessCallback<T>>,
    on_error: Option<ErrorCallback>,
}

impl<T> AutoSyncOptions<T> {
    /// Create options from a configuration, without callbacks.
    pub fn new(config: AutoSyncConfig) -> Self {
        Self {
            config,
            on_success: None,
            on_error: None,
        }
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.config = self.config.with_debounce_delay(delay);
        self
    }

    /// Enable or disable the trailing save.
    pub fn with_trailing_save(mut self, trailing_save: bool) -> Self {
        self.config = self.config.with_trailing_save(trailing_save);
        self
    }

    /// Set the callback run after a successful save.
    pub fn on_success(mut self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Set the callback run after a failed save.
    pub fn on_error(mut self, callback: impl Fn(&Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl<T> Default for AutoSyncOptions<T> {
    fn default() -> Self {
        Self::new(AutoSyncConfig::default())
    }
}

/// Mutable controller state, guarded by one mutex.
struct Shared<S> {
    /// Latest values pushed by the caller.
    values: S,
    is_dirty: bool,
    /// Serialized form of the last successfully saved values.
    last_saved: CanonicalSnapshot,
    in_flight: bool,
    timer: Option<JoinHandle<()>>,
    /// Bumped whenever the timer is replaced or cancelled. A timer task
    /// that already woke up cannot be aborted, so it checks this instead.
    timer_generation: u64,
    disposed: bool,
}

impl<S> Shared<S> {
    fn cancel_timer(&mut self) -> bool {
        self.timer_generation = self.timer_generation.wrapping_add(1);
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }
}

struct Inner<S, H: SaveHandler<S>> {
    handler: H,
    config: AutoSyncConfig,
    on_success: Option<SuccessCallback<H::Output>>,
    on_error: Option<ErrorCallback>,
    status: watch::Sender<SyncState>,
    shared: Mutex<Shared<S>>,
}

impl<S, H> Inner<S, H>
where
    S: Serialize + Debug + Clone + Send + 'static,
    H: SaveHandler<S> + 'static,
{
    fn lock(&self) -> MutexGuard<'_, Shared<S>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> SyncState {
        *self.status.borrow()
    }

    fn transition(&self, to: SyncState) {
        self.status.send_if_modified(|current| {
            if *current == to {
                return false;
            }
            debug!("Sync state {} -> {}", current, to);
            *current = to;
            true
        });
    }

    /// Start the debounce timer. The caller has cancelled any previous one.
    fn schedule(self: &Arc<Self>, shared: &mut Shared<S>) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let delay = self.config.debounce_delay();
        shared.timer_generation = shared.timer_generation.wrapping_add(1);
        let generation = shared.timer_generation;
        shared.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.debounce_elapsed(generation);
            }
        }));
    }

    fn debounce_elapsed(self: &Arc<Self>, generation: u64) {
        let mut shared = self.lock();
        if shared.timer_generation != generation {
            debug!("Stale debounce timer woke up, ignoring");
            return;
        }
        shared.timer = None;
        if shared.disposed {
            return;
        }

        // Re-read the latest values; more edits may have landed since scheduling.
        let current = CanonicalSnapshot::of(&shared.values);
        if current == shared.last_saved {
            debug!("Debounce elapsed with nothing new to save");
            return;
        }
        self.start_save(&mut shared, current);
    }

    /// Guarded save. Returns false if a save is already in flight.
    fn start_save(self: &Arc<Self>, shared: &mut Shared<S>, snapshot: CanonicalSnapshot) -> bool {
        if shared.in_flight {
            debug!("Save already in flight, dropping save request");
            return false;
        }

        shared.in_flight = true;
        self.transition(SyncState::Saving);

        let values = shared.values.clone();
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run_save(values, snapshot).await;
        });
        true
    }

    async fn run_save(self: Arc<Self>, values: S, snapshot: CanonicalSnapshot) {
        let result = self.handler.save(values).await;

        {
            let mut shared = self.lock();
            shared.in_flight = false;
            match &result {
                Ok(_) => {
                    debug!("Auto-save succeeded");
                    shared.last_saved = snapshot;
                }
                Err(err) if err.is_transient() => warn!("Auto-save failed: {}", err),
                Err(err) => error!("Auto-save failed: {}", err),
            }

            // Failure also lands on Synced; callers surface it via on_error.
            self.transition(SyncState::Synced);

            if self.config.trailing_save {
                self.schedule_trailing(&mut shared);
            }
        }

        match result {
            Ok(record) => {
                if let Some(callback) = &self.on_success {
                    callback(&record);
                }
            }
            Err(err) => {
                if let Some(callback) = &self.on_error {
                    callback(&err);
                }
            }
        }
    }

    fn schedule_trailing(self: &Arc<Self>, shared: &mut Shared<S>) {
        if shared.disposed || !shared.is_dirty || shared.timer.is_some() {
            return;
        }
        if CanonicalSnapshot::of(&shared.values) == shared.last_saved {
            return;
        }
        debug!("Values changed while saving, scheduling trailing save");
        self.transition(SyncState::Unsaved);
        self.schedule(shared);
    }
}

/// Keeps a caller-owned snapshot persisted with debounce and single-flight
/// semantics.
///
/// # State machine
/// `Synced` -> `Unsaved` on a dirty edit, `Unsaved` -> `Saving` when the
/// debounce timer fires with values that differ from the last save, and
/// `Saving` -> `Synced` when the save resolves, whether it succeeded or not.
///
/// Dropping the controller disposes it.
pub struct AutoSyncController<S, H>
where
    S: Serialize + Debug + Clone + Send + 'static,
    H: SaveHandler<S> + 'static,
{
    inner: Arc<Inner<S, H>>,
}

impl<S, H> AutoSyncController<S, H>
where
    S: Serialize + Debug + Clone + Send + 'static,
    H: SaveHandler<S> + 'static,
{
    /// Create a controller whose baseline is `initial`.
    ///
    /// # Postconditions
    /// - Status is `Synced`
    /// - The last saved snapshot is the serialized `initial`
    pub fn new(initial: S, handler: H, options: AutoSyncOptions<H::Output>) -> Self {
        let (status, _) = watch::channel(SyncState::Synced);
        let shared = Shared {
            last_saved: CanonicalSnapshot::of(&initial),
            values: initial,
            is_dirty: false,
            in_flight: false,
            timer: None,
            timer_generation: 0,
            disposed: false,
        };

        Self {
            inner: Arc::new(Inner {
                handler,
                config: options.config,
                on_success: options.on_success,
                on_error: options.on_error,
                status,
                shared: Mutex::new(shared),
            }),
        }
    }

    /// Report a change to the values or the dirty flag.
    ///
    /// # Preconditions
    /// - Must be called from within a Tokio runtime
    ///
    /// # Postconditions
    /// - Any pending debounce timer is cancelled
    /// - If dirty and different from the last save, a new timer is running
    pub fn update(&self, values: S, is_dirty: bool) {
        let inner = &self.inner;
        let mut shared = inner.lock();
        if shared.disposed {
            debug!("Ignoring update on disposed controller");
            return;
        }

        shared.cancel_timer();
        shared.values = values;
        shared.is_dirty = is_dirty;
        if !is_dirty {
            return;
        }

        let current = CanonicalSnapshot::of(&shared.values);
        if current == shared.last_saved {
            // Edited and reverted within the window.
            inner.transition(SyncState::Synced);
            return;
        }

        if inner.state() == SyncState::Synced {
            inner.transition(SyncState::Unsaved);
        }
        inner.schedule(&mut shared);
    }

    /// Save immediately if the latest values differ from the last save.
    ///
    /// Returns true if a save was started. When a save is already in
    /// flight nothing is cancelled and false is returned.
    pub fn flush(&self) -> bool {
        let inner = &self.inner;
        let mut shared = inner.lock();
        if shared.disposed || shared.in_flight {
            return false;
        }

        shared.cancel_timer();
        let current = CanonicalSnapshot::of(&shared.values);
        if current == shared.last_saved {
            inner.transition(SyncState::Synced);
            return false;
        }
        inner.start_save(&mut shared, current)
    }

    /// Adopt a freshly loaded baseline as the last saved state.
    ///
    /// Cancels any pending timer and returns to `Synced`. A save still in
    /// flight keeps the status at `Saving` and, on success, records its own
    /// snapshot as the last save when it completes.
    pub fn reset(&self, baseline: S) {
        let inner = &self.inner;
        let mut shared = inner.lock();
        if shared.disposed {
            return;
        }

        shared.cancel_timer();
        shared.last_saved = CanonicalSnapshot::of(&baseline);
        shared.values = baseline;
        shared.is_dirty = false;
        if !shared.in_flight {
            inner.transition(SyncState::Synced);
        }
    }

    /// Cancel any pending debounce timer and stop reacting to updates.
    ///
    /// A save already in flight is not cancelled; its completion still
    /// updates the last saved snapshot and runs the callbacks.
    pub fn dispose(&self) {
        let mut shared = self.inner.lock();
        if shared.disposed {
            return;
        }
        shared.disposed = true;
        if shared.cancel_timer() {
            debug!("Disposed with a pending debounce timer, save cancelled");
        }
    }

    /// Current sync status.
    pub fn status(&self) -> SyncState {
        self.inner.state()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.inner.status.subscribe()
    }

    /// Serialized form of the last successfully saved values.
    pub fn last_saved(&self) -> CanonicalSnapshot {
        self.inner.lock().last_saved.clone()
    }

    /// Whether a save call is currently in flight.
    pub fn is_saving(&self) -> bool {
        self.inner.lock().in_flight
    }

    /// Whether the controller has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.lock().disposed
    }

    /// The configuration in use.
    pub fn config(&self) -> &AutoSyncConfig {
        &self.inner.config
    }
}

impl<S, H> Drop for AutoSyncController<S, H>
where
    S: Serialize + Debug + Clone + Send + 'static,
    H: SaveHandler<S> + 'static,
{
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tascboard_common::Result;
    use tokio::time::sleep;

    /// Records every save call; optionally slow, optionally failing.
    #[derive(Clone, Default)]
    struct RecordingHandler {
        calls: Arc<Mutex<Vec<Value>>>,
        delay: Duration,
        failures_left: Arc<AtomicUsize>,
    }

    impl RecordingHandler {
        fn with_delay(delay: Duration) -> Self {
            Self {
                delay,
                ..Default::default()
            }
        }

        fn failing_first(count: usize) -> Self {
            let handler = Self::default();
            handler.failures_left.store(count, Ordering::SeqCst);
            handler
        }

        fn calls(&self) -> Vec<Value> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SaveHandler<Value> for RecordingHandler {
        type Output = Value;

        async fn save(&self, values: Value) -> Result<Value> {
            self.calls.lock().unwrap().push(values.clone());
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(Error::Network("connection reset".to_string()));
            }
            Ok(values)
        }
    }

    fn options(debounce_ms: u64) -> AutoSyncOptions<Value> {
        AutoSyncOptions::default().with_debounce_delay(Duration::from_millis(debounce_ms))
    }

    fn name(value: &str) -> Value {
        json!({ "name": value })
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_edit_is_saved_after_quiet_period() {
        let handler = RecordingHandler::with_delay(Duration::from_millis(50));
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));
        assert_eq!(controller.status(), SyncState::Synced);

        controller.update(name("B"), true);
        assert_eq!(controller.status(), SyncState::Unsaved);

        sleep(Duration::from_millis(210)).await;
        assert_eq!(controller.status(), SyncState::Saving);
        assert_eq!(handler.calls(), vec![name("B")]);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(controller.status(), SyncState::Synced);
        assert_eq!(handler.calls(), vec![name("B")]);
        assert_eq!(controller.last_saved(), CanonicalSnapshot::of(&name("B")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_woken_before_later_edit_is_ignored() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));

        controller.update(name("B"), true);
        let woken = controller.inner.lock().timer_generation;

        // The first timer has woken and waits on the lock while "C" lands.
        controller.update(name("C"), true);
        controller.inner.debounce_elapsed(woken);

        assert!(handler.calls().is_empty());
        assert!(controller.inner.lock().timer.is_some());
        assert_eq!(controller.status(), SyncState::Unsaved);

        sleep(Duration::from_millis(150)).await;
        assert!(handler.calls().is_empty());

        sleep(Duration::from_millis(100)).await;
        assert_eq!(handler.calls(), vec![name("C")]);

        controller.update(name("D"), true);
        controller.dispose();
        sleep(Duration::from_millis(500)).await;
        assert_eq!(handler.calls(), vec![name("C")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_adopts_reloaded_baseline() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));

        controller.update(name("B"), true);
        assert_eq!(controller.status(), SyncState::Unsaved);

        controller.reset(name("R"));
        assert_eq!(controller.status(), SyncState::Synced);
        assert_eq!(controller.last_saved(), CanonicalSnapshot::of(&name("R")));

        sleep(Duration::from_millis(500)).await;
        assert!(handler.calls().is_empty());

        controller.update(name("R"), true);
        assert_eq!(controller.status(), SyncState::Synced);
        controller.update(name("S"), true);
        sleep(Duration::from_millis(250)).await;
        assert_eq!(handler.calls(), vec![name("S")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_window_resets_timer() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));

        controller.update(name("B"), true);
        sleep(Duration::from_millis(100)).await;
        controller.update(name("C"), true);

        sleep(Duration::from_millis(150)).await;
        assert!(handler.calls().is_empty());
        assert_eq!(controller.status(), SyncState::Unsaved);

        sleep(Duration::from_millis(100)).await;
        assert_eq!(handler.calls(), vec![name("C")]);
        assert_eq!(controller.status(), SyncState::Synced);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_is_coalesced() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name(""), handler.clone(), options(200));

        let mut typed = String::new();
        for ch in "Roadmap".chars() {
            typed.push(ch);
            controller.update(name(&typed), true);
            sleep(Duration::from_millis(30)).await;
        }

        sleep(Duration::from_millis(500)).await;
        assert_eq!(handler.calls(), vec![name("Roadmap")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revert_within_window_skips_save() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));

        controller.update(name("B"), true);
        assert_eq!(controller.status(), SyncState::Unsaved);
        sleep(Duration::from_millis(100)).await;

        controller.update(name("A"), true);
        assert_eq!(controller.status(), SyncState::Synced);

        sleep(Duration::from_millis(500)).await;
        assert!(handler.calls().is_empty());
        assert_eq!(controller.status(), SyncState::Synced);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clean_form_schedules_nothing() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));

        controller.update(name("B"), false);
        assert_eq!(controller.status(), SyncState::Synced);

        sleep(Duration::from_millis(500)).await;
        assert!(handler.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_save_is_dropped() {
        let handler = RecordingHandler::with_delay(Duration::from_millis(1000));
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));

        controller.update(name("B"), true);
        sleep(Duration::from_millis(250)).await;
        assert!(controller.is_saving());

        // Timer fires at t=450 while the first save is still running.
        controller.update(name("C"), true);
        sleep(Duration::from_millis(250)).await;
        assert_eq!(handler.calls(), vec![name("B")]);
        assert_eq!(controller.status(), SyncState::Saving);

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(handler.calls(), vec![name("B")]);
        assert_eq!(controller.status(), SyncState::Synced);
        assert_eq!(controller.last_saved(), CanonicalSnapshot::of(&name("B")));

        // The next change event picks the edit up again.
        controller.update(name("C"), true);
        assert_eq!(controller.status(), SyncState::Unsaved);
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(handler.calls(), vec![name("B"), name("C")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trailing_save_picks_up_dropped_edit() {
        let handler = RecordingHandler::with_delay(Duration::from_millis(1000));
        let controller = AutoSyncController::new(
            name("A"),
            handler.clone(),
            options(200).with_trailing_save(true),
        );

        controller.update(name("B"), true);
        sleep(Duration::from_millis(250)).await;
        controller.update(name("C"), true);

        // B completes at t=1200, trailing timer fires at t=1400.
        sleep(Duration::from_millis(1000)).await;
        assert_eq!(controller.status(), SyncState::Unsaved);

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(handler.calls(), vec![name("B"), name("C")]);
        assert_eq!(controller.status(), SyncState::Synced);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reports_and_does_not_block() {
        let handler = RecordingHandler::failing_first(1);
        let errors = Arc::new(AtomicUsize::new(0));
        let successes = Arc::new(AtomicUsize::new(0));
        let errors_seen = errors.clone();
        let successes_seen = successes.clone();
        let controller = AutoSyncController::new(
            name("A"),
            handler.clone(),
            options(200)
                .on_error(move |err| {
                    assert!(matches!(err, Error::Network(_)));
                    errors_seen.fetch_add(1, Ordering::SeqCst);
                })
                .on_success(move |record: &Value| {
                    assert_eq!(record, &json!({ "name": "C" }));
                    successes_seen.fetch_add(1, Ordering::SeqCst);
                }),
        );

        controller.update(name("B"), true);
        sleep(Duration::from_millis(250)).await;
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(controller.status(), SyncState::Synced);
        assert_eq!(controller.last_saved(), CanonicalSnapshot::of(&name("A")));

        controller.update(name("C"), true);
        sleep(Duration::from_millis(250)).await;
        assert_eq!(handler.calls(), vec![name("B"), name("C")]);
        assert_eq!(successes.load(Ordering::SeqCst), 1);
        assert_eq!(controller.last_saved(), CanonicalSnapshot::of(&name("C")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_pending_timer() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));

        controller.update(name("B"), true);
        controller.dispose();
        assert!(controller.is_disposed());

        sleep(Duration::from_millis(500)).await;
        assert!(handler.calls().is_empty());

        controller.update(name("C"), true);
        sleep(Duration::from_millis(500)).await;
        assert!(handler.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let handler = RecordingHandler::default();
        {
            let controller = AutoSyncController::new(name("A"), handler.clone(), options(200));
            controller.update(name("B"), true);
        }
        sleep(Duration::from_millis(500)).await;
        assert!(handler.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_immediately() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler.clone(), options(2000));

        assert!(!controller.flush());

        controller.update(name("B"), true);
        assert!(controller.flush());
        assert_eq!(controller.status(), SyncState::Saving);

        sleep(Duration::from_millis(10)).await;
        assert_eq!(handler.calls(), vec![name("B")]);
        assert_eq!(controller.status(), SyncState::Synced);

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(handler.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_observe_status() {
        let handler = RecordingHandler::default();
        let controller = AutoSyncController::new(name("A"), handler, options(200));
        let mut rx = controller.subscribe();

        controller.update(name("B"), true);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SyncState::Unsaved);

        rx.wait_for(|state| *state == SyncState::Synced).await.unwrap();
        assert_eq!(controller.last_saved(), CanonicalSnapshot::of(&name("B")));
    }
}
