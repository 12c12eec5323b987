//! Store: owns the state of one reducer and runs the effects it returns.

use crate::error::StoreError;
use mealdesk_core::environment::Navigator;
use mealdesk_core::{effect::Effect, reducer::Reducer};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, watch};

const SHUTDOWN_POLL: Duration = Duration::from_millis(20);

/// Completion of the effects started by one [`Store::send`]
///
/// An effect that feeds an action back counts as finished only once the
/// store has reduced that action and finished its effects in turn, so a
/// caller that waits here observes every consequence of its action.
///
/// ```ignore
/// let mut handle = store.send(QueryAction::Created { entity }).await?;
/// handle.wait().await;
/// // The list has been refetched and the navigator moved
/// ```
#[derive(Clone, Debug)]
pub struct EffectHandle {
    running: watch::Receiver<usize>,
}

impl EffectHandle {
    fn new() -> (Self, EffectTracking) {
        let (sender, running) = watch::channel(0);
        (Self { running }, EffectTracking(Arc::new(sender)))
    }

    /// Effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.running.borrow()
    }

    /// Wait until every effect has finished
    pub async fn wait(&mut self) {
        // Closed means every tracker is gone, so nothing is left running
        let _ = self.running.wait_for(|running| *running == 0).await;
    }
}

#[derive(Clone)]
struct EffectTracking(Arc<watch::Sender<usize>>);

impl EffectTracking {
    fn start(&self, store_pending: &Arc<AtomicUsize>) -> RunningEffect {
        self.0.send_modify(|running| *running += 1);
        store_pending.fetch_add(1, Ordering::SeqCst);
        RunningEffect {
            tracking: self.clone(),
            store_pending: Arc::clone(store_pending),
        }
    }
}

/// Marks one effect finished when dropped, including when its task panics
struct RunningEffect {
    tracking: EffectTracking,
    store_pending: Arc<AtomicUsize>,
}

impl Drop for RunningEffect {
    fn drop(&mut self) {
        self.store_pending.fetch_sub(1, Ordering::SeqCst);
        self.tracking.0.send_modify(|running| *running -= 1);
    }
}

/// Runtime for one reducer
///
/// State lives behind an async `RwLock`: [`send`](Self::send) reduces under
/// the write lock and [`state`](Self::state) reads under the read lock, so
/// readers never see a half-applied action. Clones share state.
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: Arc<RwLock<S>>,
    reducer: R,
    environment: E,
    navigator: Option<Arc<dyn Navigator>>,
    closing: Arc<AtomicBool>,
    pending: Arc<AtomicUsize>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    A: Send + 'static,
    S: Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Store over `initial_state`
    ///
    /// Without a navigator, `Effect::Navigate` is logged and dropped.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            navigator: None,
            closing: Arc::new(AtomicBool::new(false)),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Run `Effect::Navigate` through `navigator`
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Effects running across every handle
    #[must_use]
    pub fn pending_effects(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Reject new actions, then wait for running effects
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effects are still running
    /// after `timeout`.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
        self.closing.store(true, Ordering::Release);
        let deadline = tokio::time::Instant::now() + timeout;

        while self.pending_effects() > 0 {
            if tokio::time::Instant::now() >= deadline {
                let pending = self.pending_effects();
                tracing::error!(pending, "Store shutdown timed out");
                return Err(StoreError::ShutdownTimeout(pending));
            }
            tokio::time::sleep(SHUTDOWN_POLL).await;
        }

        tracing::debug!("Store shut down");
        Ok(())
    }

    /// Reduce `action` and start its effects
    ///
    /// Returns once the effects are started; wait on the handle for them
    /// to finish.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after
    /// [`shutdown`](Self::shutdown) was called.
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
        if self.closing.load(Ordering::Acquire) {
            tracing::warn!("Action rejected: store is shutting down");
            return Err(StoreError::ShutdownInProgress);
        }

        let effects = {
            let mut state = self.state.write().await;
            self.reducer.reduce(&mut state, action, &self.environment)
        };

        let (handle, tracking) = EffectHandle::new();
        for effect in effects {
            self.execute(effect, &tracking);
        }
        Ok(handle)
    }

    /// Read the state through `f`
    pub async fn state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        let state = self.state.read().await;
        f(&state)
    }

    fn execute(&self, effect: Effect<A>, tracking: &EffectTracking) {
        match effect {
            Effect::None => {},

            Effect::Navigate(route) => match &self.navigator {
                Some(navigator) => {
                    tracing::debug!(%route, "Navigating");
                    navigator.navigate(&route);
                },
                None => tracing::warn!(%route, "No navigator installed, navigation dropped"),
            },

            Effect::Parallel(effects) => {
                for effect in effects {
                    self.execute(effect, tracking);
                }
            },

            Effect::Future(future) => {
                let running = tracking.start(&self.pending);
                let store = self.clone();

                tokio::spawn(async move {
                    let _running = running;
                    let Some(action) = future.await else {
                        return;
                    };
                    match store.send(action).await {
                        Ok(mut handle) => handle.wait().await,
                        Err(error) => {
                            tracing::error!(%error, "Effect produced an action the store rejected");
                        },
                    }
                });
            },

            Effect::Sequential(effects) => {
                let running = tracking.start(&self.pending);
                let store = self.clone();

                tokio::spawn(async move {
                    let _running = running;
                    for effect in effects {
                        let (mut step, step_tracking) = EffectHandle::new();
                        store.execute(effect, &step_tracking);
                        drop(step_tracking);
                        step.wait().await;
                    }
                });
            },
        }
    }
}

impl<S, A, E, R> Clone for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            navigator: self.navigator.clone(),
            closing: Arc::clone(&self.closing),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<S, A, E, R> fmt::Debug for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("pending_effects", &self.pending.load(Ordering::Acquire))
            .field("closing", &self.closing.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}
