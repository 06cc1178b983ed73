//! # Flow
//!
//! Switches a single display surface between registered screens.
//!
//! ```text
//!   any thread                         apply worker (one per flow)
//!   ──────────                         ───────────────────────────
//!   register(k, gen) ──┐
//!   navigate_to(k) ────┼─► state lock ─► target := k ─► wake ──┐
//!                      │                                       ▼
//!   current() / next() ┘                  lock, read target, clone gen, unlock
//!                                         gen()                  (no lock held)
//!                                         surface.set_content(tree)
//!                                         lock, current := k, unlock
//! ```
//!
//! Navigation is asynchronous: `navigate_to` only records the new target and
//! wakes the worker. If several requests land before the worker gets to them,
//! only the latest one is applied. The worker is the only thread that ever
//! touches the surface.
//!
//! Generators run without the flow lock held, so they are free to call
//! `navigate_to`, read `current()`, or use the shared state store.
//!
//! A generator that captures a [`Flow`] keeps the flow alive until
//! [`Flow::close`] is called. Capture a [`Navigator`] instead when the screen
//! only needs to navigate.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use tokio::runtime::Runtime;
use tokio::sync::{Notify, watch};

use crate::core::error::FlowError;
use crate::core::state::{IntCell, SharedState, StringCell};
use crate::core::surface::Surface;

/// Thread name used by [`Flow::new`].
pub const DEFAULT_WORKER_NAME: &str = "screenflow-apply";

/// Anything usable as a screen identifier.
pub trait ScreenKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> ScreenKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Builds the content tree for one screen.
pub type Generator<C> = Arc<dyn Fn() -> C + Send + Sync>;

struct FlowState<K, C> {
    current: Option<K>,
    target: Option<K>,
    screens: HashMap<K, Generator<C>>,
    closed: bool,
}

/// What the worker should do next.
enum Step<K, C> {
    Apply(K, Generator<C>),
    Idle,
    Stop,
}

/// State shared between the handles and the apply worker.
struct Shared<K, C> {
    state: Mutex<FlowState<K, C>>,
    wake: Notify,
    committed: watch::Sender<Option<K>>,
    store: Arc<SharedState>,
}

impl<K: ScreenKey, C> Shared<K, C> {
    fn navigate_to(&self, key: K) -> Result<(), FlowError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(FlowError::Closed);
        }
        if state.current.as_ref() == Some(&key) {
            return Ok(());
        }
        if !state.screens.contains_key(&key) {
            return Err(FlowError::key_not_found(&key));
        }

        let superseded = state
            .target
            .replace(key.clone())
            .filter(|pending| Some(pending) != state.current.as_ref() && *pending != key);
        drop(state);

        if let Some(pending) = superseded {
            debug!("Navigation to {:?} superseded by {:?}", pending, key);
        } else {
            debug!("Navigation requested: {:?}", key);
        }
        self.wake.notify_one();
        Ok(())
    }

    fn current(&self) -> Option<K> {
        self.state.lock().current.clone()
    }

    fn next(&self) -> Option<K> {
        self.state.lock().target.clone()
    }

    fn next_step(&self) -> Step<K, C> {
        let state = self.state.lock();
        if state.closed {
            return Step::Stop;
        }
        let Some(target) = state.target.as_ref() else {
            return Step::Idle;
        };
        if state.current.as_ref() == Some(target) {
            return Step::Idle;
        }
        match state.screens.get(target) {
            Some(generator) => Step::Apply(target.clone(), Arc::clone(generator)),
            None => {
                warn!("No generator for target {:?}, skipping apply", target);
                Step::Idle
            }
        }
    }

    fn commit(&self, key: K) {
        let mut state = self.state.lock();
        state.current = Some(key.clone());
        self.committed.send_replace(Some(key));
    }
}

async fn apply_loop<K: ScreenKey, S: Surface>(shared: &Shared<K, S::Content>, mut surface: S) {
    loop {
        match shared.next_step() {
            Step::Apply(key, generator) => {
                debug!("Applying screen {:?}", key);
                let content = generator();
                surface.set_content(content);
                shared.commit(key);
            }
            Step::Idle => shared.wake.notified().await,
            Step::Stop => break,
        }
    }
    info!("Apply worker stopped");
}

/// Builds the apply worker's runtime on the calling thread so a failure
/// surfaces from `Flow::new` instead of inside the worker.
fn apply_runtime() -> Result<Runtime, FlowError> {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(FlowError::Worker)
}

fn spawn_worker<K: ScreenKey, S: Surface>(
    name: &str,
    runtime: Runtime,
    shared: Arc<Shared<K, S::Content>>,
    surface: S,
) -> Result<JoinHandle<()>, FlowError> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || runtime.block_on(apply_loop(&shared, surface)))
        .map_err(FlowError::Worker)
}

struct Inner<K: ScreenKey, C> {
    shared: Arc<Shared<K, C>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl<K: ScreenKey, C> Inner<K, C> {
    fn close(&self) {
        let screens = {
            let mut state = self.shared.state.lock();
            if state.closed {
                None
            } else {
                state.closed = true;
                Some(std::mem::take(&mut state.screens))
            }
        };
        if let Some(screens) = screens {
            // Generators may own flow handles; drop them outside the lock.
            drop(screens);
            self.shared.store.clear();
            self.shared.wake.notify_one();
            info!("Flow closed");
        }

        // A generator closing its own flow cannot wait for itself.
        if thread::current().id() == self.worker_id {
            return;
        }
        // Concurrent callers block here until the worker has been joined.
        let mut worker = self.worker.lock();
        if let Some(handle) = worker.take()
            && handle.join().is_err()
        {
            warn!("Apply worker panicked");
        }
    }
}

impl<K: ScreenKey, C> Drop for Inner<K, C> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Navigation controller bound to one display surface.
///
/// `Flow` is a cheap handle: clones share the same controller. The controller
/// closes when [`close`](Flow::close) is called or the last handle is dropped.
pub struct Flow<K: ScreenKey, C> {
    inner: Arc<Inner<K, C>>,
}

impl<K: ScreenKey, C> Clone for Flow<K, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: ScreenKey, C: Send + 'static> Flow<K, C> {
    /// Creates a flow that displays on `surface` and starts its apply worker.
    /// Nothing is shown until the first screen is registered.
    pub fn new<S>(surface: S) -> Result<Self, FlowError>
    where
        S: Surface<Content = C>,
    {
        Self::named(DEFAULT_WORKER_NAME, surface)
    }

    /// Like [`Flow::new`], with a custom name for the worker thread.
    pub fn named<S>(worker_name: &str, surface: S) -> Result<Self, FlowError>
    where
        S: Surface<Content = C>,
    {
        let (committed, _) = watch::channel(None);
        let shared = Arc::new(Shared {
            state: Mutex::new(FlowState {
                current: None,
                target: None,
                screens: HashMap::new(),
                closed: false,
            }),
            wake: Notify::new(),
            committed,
            store: Arc::new(SharedState::new()),
        });

        let runtime = apply_runtime()?;
        let worker = spawn_worker(worker_name, runtime, Arc::clone(&shared), surface)?;
        info!("Flow started (worker thread '{}')", worker_name);

        Ok(Self {
            inner: Arc::new(Inner {
                shared,
                worker_id: worker.thread().id(),
                worker: Mutex::new(Some(worker)),
            }),
        })
    }
}

impl<K: ScreenKey, C> Flow<K, C> {
    /// Registers `generator` under `key`, replacing any previous generator.
    ///
    /// The first screen ever registered becomes the home screen and is
    /// displayed without an explicit `navigate_to`.
    pub fn register<G>(&self, key: K, generator: G) -> Result<(), FlowError>
    where
        G: Fn() -> C + Send + Sync + 'static,
    {
        let shared = &self.inner.shared;
        let mut state = shared.state.lock();
        if state.closed {
            return Err(FlowError::Closed);
        }
        let first = state.screens.is_empty();
        let replaced = state.screens.insert(key.clone(), Arc::new(generator));
        if first {
            state.target = Some(key.clone());
        }
        drop(state);

        if replaced.is_some() {
            debug!("Replaced generator for {:?}", key);
        }
        drop(replaced);

        if first {
            debug!("First screen registered, showing {:?}", key);
            shared.wake.notify_one();
        }
        Ok(())
    }

    /// Requests a switch to `key`. Returns as soon as the request is recorded;
    /// the surface is updated on the worker thread.
    ///
    /// Navigating to the screen already displayed does nothing. An
    /// unregistered key fails with [`FlowError::KeyNotFound`] and leaves the
    /// flow untouched.
    pub fn navigate_to(&self, key: K) -> Result<(), FlowError> {
        self.inner.shared.navigate_to(key)
    }

    /// Key of the screen currently displayed, `None` before the first apply.
    pub fn current(&self) -> Option<K> {
        self.inner.shared.current()
    }

    /// Key of the screen that should be displayed next. Equal to
    /// [`current`](Flow::current) once the worker has caught up.
    pub fn next(&self) -> Option<K> {
        self.inner.shared.next()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.shared.state.lock().screens.contains_key(key)
    }

    pub fn is_closed(&self) -> bool {
        self.inner.shared.state.lock().closed
    }

    /// Observes committed transitions. The receiver's value is the key most
    /// recently handed to the surface.
    pub fn watch_current(&self) -> watch::Receiver<Option<K>> {
        self.inner.shared.committed.subscribe()
    }

    /// A handle for navigating from inside screen callbacks.
    pub fn navigator(&self) -> Navigator<K, C> {
        Navigator {
            shared: Arc::clone(&self.inner.shared),
        }
    }

    /// The shared state store of this flow.
    pub fn state(&self) -> Arc<SharedState> {
        Arc::clone(&self.inner.shared.store)
    }

    pub fn use_string(&self, name: &str, default: impl Into<String>) -> StringCell {
        self.inner.shared.store.use_string(name, default)
    }

    pub fn use_int(&self, name: &str, default: i64) -> IntCell {
        self.inner.shared.store.use_int(name, default)
    }

    /// Stops the worker once any in-flight apply finishes, forgets every
    /// registered screen and every shared cell. The surface is left showing
    /// whatever it last received.
    ///
    /// Calling `close` again only waits for the worker, like the first call.
    /// After closing, `register` and `navigate_to` fail with
    /// [`FlowError::Closed`].
    pub fn close(&self) {
        self.inner.close();
    }
}

/// Navigation-only handle to a flow.
///
/// Unlike [`Flow`], dropping a navigator never closes the flow, and holding
/// one does not keep it open: once the last `Flow` is gone, navigation fails
/// with [`FlowError::Closed`].
pub struct Navigator<K, C> {
    shared: Arc<Shared<K, C>>,
}

impl<K, C> Clone for Navigator<K, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: ScreenKey, C> Navigator<K, C> {
    /// See [`Flow::navigate_to`].
    pub fn navigate_to(&self, key: K) -> Result<(), FlowError> {
        self.shared.navigate_to(key)
    }

    pub fn current(&self) -> Option<K> {
        self.shared.current()
    }

    pub fn next(&self) -> Option<K> {
        self.shared.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{counting, recording_surface, settle};
    use std::sync::Barrier;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_registration_is_shown() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        assert_eq!(flow.current(), None);
        assert_eq!(flow.next(), None);

        let (home, home_calls) = counting("home");
        flow.register("home", home).unwrap();
        settle(&flow, "home").await;

        assert_eq!(flow.current(), Some("home"));
        assert_eq!(home_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*shown.lock(), vec!["home"]);
    }

    #[tokio::test]
    async fn test_later_registrations_do_not_navigate() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        flow.register("a", || "a").unwrap();
        flow.register("b", || "b").unwrap();
        settle(&flow, "a").await;

        assert_eq!(flow.next(), Some("a"));
        assert_eq!(*shown.lock(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_navigate_to_current_is_noop() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        let (home, home_calls) = counting("home");
        flow.register("home", home).unwrap();
        settle(&flow, "home").await;

        for _ in 0..5 {
            flow.navigate_to("home").unwrap();
        }
        flow.register("other", || "other").unwrap();
        flow.navigate_to("other").unwrap();
        settle(&flow, "other").await;

        assert_eq!(home_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*shown.lock(), vec!["home", "other"]);
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let (surface, _shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        flow.register("home", || "home").unwrap();
        settle(&flow, "home").await;

        let err = flow.navigate_to("missing").unwrap_err();
        assert!(matches!(err, FlowError::KeyNotFound { ref key } if key == "\"missing\""));
        assert_eq!(flow.current(), Some("home"));
        assert_eq!(flow.next(), Some("home"));
    }

    #[tokio::test]
    async fn test_unknown_key_on_empty_flow() {
        let (surface, shown) = recording_surface::<&'static str>();
        let flow: Flow<u8, &'static str> = Flow::new(surface).unwrap();
        assert!(matches!(
            flow.navigate_to(3),
            Err(FlowError::KeyNotFound { .. })
        ));
        assert_eq!(flow.next(), None);
        assert!(shown.lock().is_empty());
    }

    #[tokio::test]
    async fn test_requests_during_apply_coalesce() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        flow.register("home", || "home").unwrap();
        settle(&flow, "home").await;

        let (slow_entered, slow_release) = (Arc::clone(&entered), Arc::clone(&release));
        flow.register("slow", move || {
            slow_entered.wait();
            slow_release.wait();
            "slow"
        })
        .unwrap();
        let (b, b_calls) = counting("b");
        flow.register("b", b).unwrap();
        flow.register("c", || "c").unwrap();

        flow.navigate_to("slow").unwrap();
        entered.wait();

        // The worker is stuck inside the slow generator.
        flow.navigate_to("b").unwrap();
        flow.navigate_to("c").unwrap();
        assert_eq!(flow.current(), Some("home"));
        assert_eq!(flow.next(), Some("c"));

        release.wait();
        settle(&flow, "c").await;

        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
        assert_eq!(*shown.lock(), vec!["home", "slow", "c"]);
    }

    #[tokio::test]
    async fn test_renavigating_to_in_flight_target_is_not_lost() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        let entered = Arc::new(Barrier::new(2));
        let release = Arc::new(Barrier::new(2));

        flow.register("home", || "home").unwrap();
        settle(&flow, "home").await;

        let (slow_entered, slow_release) = (Arc::clone(&entered), Arc::clone(&release));
        flow.register("slow", move || {
            slow_entered.wait();
            slow_release.wait();
            "slow"
        })
        .unwrap();

        flow.navigate_to("slow").unwrap();
        entered.wait();
        // current is still "home", so this is a real request, not a no-op.
        flow.navigate_to("slow").unwrap();
        release.wait();
        settle(&flow, "slow").await;

        assert_eq!(flow.current(), Some("slow"));
        assert_eq!(shown.lock().last(), Some(&"slow"));
    }

    #[tokio::test]
    async fn test_reregistering_replaces_generator() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        flow.register("a", || "a-v1").unwrap();
        flow.register("b", || "b").unwrap();
        settle(&flow, "a").await;

        flow.register("a", || "a-v2").unwrap();
        flow.navigate_to("b").unwrap();
        settle(&flow, "b").await;
        flow.navigate_to("a").unwrap();
        settle(&flow, "a").await;

        assert_eq!(*shown.lock(), vec!["a-v1", "b", "a-v2"]);
    }

    #[tokio::test]
    async fn test_generators_can_use_shared_state() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        let state = flow.state();
        flow.register("a", move || {
            let visits = state.use_int("visits", 0);
            visits.update(|v| *v += 1);
            format!("visits={}", visits.get())
        })
        .unwrap();
        settle(&flow, "a").await;

        assert_eq!(flow.use_int("visits", 100).get(), 1);
        assert_eq!(*shown.lock(), vec!["visits=1".to_string()]);
    }

    #[tokio::test]
    async fn test_generator_can_navigate() {
        let (surface, shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        let nav = flow.navigator();
        flow.register("splash", move || {
            nav.navigate_to("main").unwrap();
            "splash"
        })
        .unwrap();
        flow.register("main", || "main").unwrap();
        settle(&flow, "main").await;

        assert_eq!(*shown.lock(), vec!["splash", "main"]);
    }

    #[tokio::test]
    async fn test_close_clears_and_refuses() {
        let (surface, _shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        flow.register("home", || "home").unwrap();
        settle(&flow, "home").await;
        let cell = flow.use_string("txt", "x");

        flow.close();
        assert!(flow.is_closed());
        assert!(!flow.contains(&"home"));
        assert!(flow.state().is_empty());
        assert!(matches!(flow.navigate_to("home"), Err(FlowError::Closed)));
        assert!(matches!(
            flow.register("home", || "home"),
            Err(FlowError::Closed)
        ));
        assert_eq!(flow.current(), Some("home"));
        assert_eq!(cell.get(), "x");

        // Second close is a no-op.
        flow.close();
    }

    #[tokio::test]
    async fn test_close_from_generator() {
        let (surface, _shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        let handle = flow.clone();
        flow.register("last", move || {
            handle.close();
            "last"
        })
        .unwrap();
        settle(&flow, "last").await;
        assert!(flow.is_closed());
    }

    #[tokio::test]
    async fn test_navigator_after_drop_reports_closed() {
        let (surface, _shown) = recording_surface();
        let flow = Flow::new(surface).unwrap();
        flow.register("home", || "home").unwrap();
        settle(&flow, "home").await;

        let nav = flow.navigator();
        assert_eq!(nav.current(), Some("home"));
        drop(flow);
        assert!(matches!(nav.navigate_to("home"), Err(FlowError::Closed)));
    }

    #[test]
    fn test_worker_thread_is_named() {
        let (surface, shown) = recording_surface::<String>();
        let flow: Flow<&'static str, String> = Flow::named("custom-worker", surface).unwrap();
        flow.register("who", || thread::current().name().unwrap_or_default().to_string())
            .unwrap();

        let mut rx = flow.watch_current();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let reached = runtime.block_on(async {
            matches!(
                tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|c| c.is_some())).await,
                Ok(Ok(_))
            )
        });
        assert!(reached, "worker never committed a screen");
        drop(rx);
        flow.close();
        assert_eq!(*shown.lock(), vec!["custom-worker".to_string()]);
    }

    #[test]
    fn test_apply_runtime_moves_to_worker_thread() {
        let runtime = apply_runtime().unwrap();
        let ran = thread::spawn(move || runtime.block_on(async { 7 }))
            .join()
            .unwrap();
        assert_eq!(ran, 7);
    }
}
