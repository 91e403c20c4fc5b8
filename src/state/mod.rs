pub mod session;
mod sse;
pub mod state_machine;
pub mod transitions;

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, RwLock, watch};
use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig, dao::ledger_store::LedgerStore, error::ServiceError, state::session::Session,
};

pub use self::sse::SseHub;
pub use self::state_machine::{AbortError, ApplyError, Plan, PlanError, PlanId, Snapshot};
use self::{
    sse::SseState,
    state_machine::{SessionEvent, SessionPhase, SessionStateMachine},
};

/// Cheaply clonable handle on the application state.
pub type SharedState = Arc<AppState>;

/// Upper bound on the storage work performed inside one planned transition.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);

/// Central application state: the session singleton, its state machine, the SSE
/// fan-out hub, and the durable ledger store handle.
pub struct AppState {
    config: AppConfig,
    ledger_store: RwLock<Option<Arc<dyn LedgerStore>>>,
    sse: SseState,
    machine: RwLock<SessionStateMachine>,
    session: RwLock<Option<Session>>,
    degraded: watch::Sender<bool>,
    transition_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            config,
            ledger_store: RwLock::new(None),
            sse: SseState::new(16),
            machine: RwLock::new(SessionStateMachine::new()),
            session: RwLock::new(None),
            degraded: degraded_tx,
            transition_gate: Mutex::new(()),
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current ledger store, if one is installed.
    pub async fn ledger_store(&self) -> Option<Arc<dyn LedgerStore>> {
        let guard = self.ledger_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the ledger store or fail with the degraded-mode error.
    pub async fn require_ledger_store(&self) -> Result<Arc<dyn LedgerStore>, ServiceError> {
        self.ledger_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new ledger store implementation and leave degraded mode.
    pub async fn set_ledger_store(&self, store: Arc<dyn LedgerStore>) {
        {
            let mut guard = self.ledger_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        if self.is_degraded().await == value {
            return;
        }

        let _ = self.degraded.send(value);
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub used for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        self.sse.public()
    }

    /// Snapshot the current phase of the session state machine.
    pub async fn phase(&self) -> SessionPhase {
        self.machine.read().await.phase()
    }

    /// Snapshot of the session state machine, including any pending transition.
    pub async fn machine_snapshot(&self) -> Snapshot {
        let machine = self.machine.read().await;
        machine.snapshot()
    }

    /// Run a closure over the session slot (which is `None` while idle).
    pub async fn read_session<F, T>(&self, f: F) -> T
    where
        F: FnOnce(Option<&Session>) -> T,
    {
        let guard = self.session.read().await;
        f(guard.as_ref())
    }

    /// Run a closure over the mutable session slot.
    pub async fn with_session_slot<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Option<Session>) -> T,
    {
        let mut guard = self.session.write().await;
        f(&mut guard)
    }

    /// Plan a transition on the session state machine, returning the plan.
    async fn plan_transition(&self, event: SessionEvent) -> Result<Plan, PlanError> {
        let mut machine = self.machine.write().await;
        machine.plan(event)
    }

    /// Apply the planned transition, returning the next phase.
    async fn apply_planned_transition(&self, plan_id: PlanId) -> Result<SessionPhase, ApplyError> {
        let mut machine = self.machine.write().await;
        machine.apply(plan_id)
    }

    /// Abort a planned transition of the session state machine.
    async fn abort_transition(&self, plan_id: PlanId) -> Result<(), AbortError> {
        let mut machine = self.machine.write().await;
        machine.abort(plan_id)
    }

    /// Plan `event`, run `work`, then apply the transition; abort on failure or
    /// timeout. The gate serialises transitions so two admin devices racing the
    /// same lifecycle change resolve to one winner and one clean rejection.
    pub async fn run_transition<F, Fut, T>(
        &self,
        event: SessionEvent,
        work: F,
    ) -> Result<(T, SessionPhase), ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;
        let Plan { id: plan_id, .. } = self.plan_transition(event).await?;

        let work_future = work();
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(plan_id).await {
                        warn!(
                            event = ?event,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    drop(gate);
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = self.apply_planned_transition(plan_id).await?;
                drop(gate);
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(plan_id).await {
                    warn!(
                        event = ?event,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                drop(gate);
                Err(err)
            }
        }
    }
}
