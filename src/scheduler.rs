//! Silence-triggered suggestion scheduler.
//!
//! A single-slot debounce timer: `request` arms (or re-arms) one pending
//! firing, `cancel` retires it. Only the most recent `request` can ever
//! fire, and a firing clears the slot before the action runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Deadline used when `now + delay` overflows the clock (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Action invoked when a scheduled delay elapses.
pub type FireAction =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// The one outstanding firing, if any.
struct PendingSuggestion {
    /// Identifies the timer task that currently owns the slot.
    generation: u64,
    task: JoinHandle<()>,
}

struct SchedulerState {
    pending: Option<PendingSuggestion>,
    next_generation: u64,
}

/// Debounce scheduler owning at most one live timer.
///
/// Must be used from within a Tokio runtime; timers run as spawned tasks.
#[derive(Clone)]
pub struct SuggestionScheduler {
    state: Arc<Mutex<SchedulerState>>,
    on_fire: FireAction,
}

impl SuggestionScheduler {
    /// Create an idle scheduler that runs `action` on each firing.
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let on_fire: FireAction =
            Arc::new(move || -> Pin<Box<dyn Future<Output = ()> + Send>> { Box::pin(action()) });
        Self {
            state: Arc::new(Mutex::new(SchedulerState {
                pending: None,
                next_generation: 0,
            })),
            on_fire,
        }
    }

    /// Arm the timer for `delay`, replacing any pending one.
    ///
    /// The deadline is measured from this call, so repeated requests keep
    /// pushing the firing out (debounce, not throttle).
    pub fn request(&self, delay: Duration) {
        let now = Instant::now();
        let deadline = now
            .checked_add(delay)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let mut st = self.lock();

        if let Some(prev) = st.pending.take() {
            prev.task.abort();
            trace!(generation = prev.generation, "Replaced pending suggestion");
        }

        let generation = st.next_generation;
        st.next_generation = st.next_generation.wrapping_add(1);

        let state = Arc::clone(&self.state);
        let on_fire = Arc::clone(&self.on_fire);
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;

            // Clear the slot before running the action so a cancel racing
            // with the firing is a no-op.
            {
                let mut st = state.lock().unwrap_or_else(|e| e.into_inner());
                match &st.pending {
                    Some(p) if p.generation == generation => {
                        st.pending = None;
                    }
                    _ => return,
                }
            }

            debug!(generation, "Silence delay elapsed, firing suggestion");
            on_fire().await;
        });

        st.pending = Some(PendingSuggestion { generation, task });
        debug!(generation, delay_ms = delay.as_millis() as u64, "Suggestion armed");
    }

    /// Retire the pending timer, if any. Idempotent.
    pub fn cancel(&self) {
        let mut st = self.lock();
        if let Some(prev) = st.pending.take() {
            prev.task.abort();
            debug!(generation = prev.generation, "Suggestion cancelled");
        }
    }

    /// Whether a firing is currently pending.
    pub fn is_armed(&self) -> bool {
        self.lock().pending.is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SuggestionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionScheduler")
            .field("armed", &self.is_armed())
            .finish()
    }
}
