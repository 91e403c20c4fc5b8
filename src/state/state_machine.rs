use std::time::Instant;

use thiserror::Error;
use uuid::Uuid;

/// High-level phases the shared session can be in.
///
/// The session object only exists while the machine is out of [`SessionPhase::Idle`],
/// so the illegal "players recorded while idle" combination cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session is running; the roster and history can be browsed freely.
    Idle,
    /// A lobby is open and participants are joining or being removed.
    Forming,
    /// The game is underway; levels are being adjusted round by round.
    Active,
}

/// Events that can be applied to the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// First participant picks a seat, opening the lobby.
    OpenLobby,
    /// Admin abandons the lobby without playing.
    CancelLobby,
    /// Admin starts the game with the current lobby.
    StartGame,
    /// Admin terminates the game, with or without archiving a result.
    EndGame,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the state machine was in when the invalid event was received.
    pub from: SessionPhase,
    /// The event that cannot be applied from this phase.
    pub event: SessionEvent,
}

/// Errors that can occur when planning a state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A transition is already pending and must be applied or aborted.
    AlreadyPending,
    /// The requested transition is not valid from the current phase.
    InvalidTransition(InvalidTransition),
}

/// Errors that can occur when applying a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
    /// State machine phase changed since the plan was created.
    PhaseMismatch {
        /// Phase when plan was created.
        expected: SessionPhase,
        /// Current phase.
        actual: SessionPhase,
    },
    /// State machine version changed since the plan was created.
    VersionMismatch {
        /// Version when plan was created.
        expected: usize,
        /// Current version.
        actual: usize,
    },
}

/// Errors that can occur when aborting a planned state machine transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortError {
    /// No transition is currently pending.
    NoPending,
    /// Plan ID does not match the pending plan.
    IdMismatch {
        /// Expected plan ID.
        expected: PlanId,
        /// Provided plan ID.
        got: PlanId,
    },
}

/// Unique identifier for a planned state transition.
pub type PlanId = Uuid;

/// A planned state machine transition that has been validated but not yet applied.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Unique identifier for this plan.
    pub id: PlanId,
    /// Phase the state machine is currently in.
    pub from: SessionPhase,
    /// Phase the state machine will transition to.
    pub to: SessionPhase,
    /// Event that triggered this transition.
    pub event: SessionEvent,
    /// Version number after applying this transition.
    pub version_next: usize,
    /// Timestamp when this plan was created.
    pub pending_since: Instant,
}

/// Snapshot of the current state machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: SessionPhase,
    /// Version number of the state machine (increments on each transition).
    pub version: usize,
    /// Pending transition phase, if a transition is planned but not yet applied.
    pub pending: Option<SessionPhase>,
}

/// State machine guarding the lifecycle of the shared session singleton.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: SessionPhase,
    version: usize,
    pending: Option<Plan>,
}

impl Default for SessionStateMachine {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            version: 0,
            pending: None,
        }
    }
}

impl SessionStateMachine {
    /// Create a new state machine initialised in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Create a snapshot of the current state machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            version: self.version,
            pending: self.pending.as_ref().map(|plan| plan.to),
        }
    }

    /// Plan a transition by validating that the event can be applied from the current phase.
    /// Returns a Plan that can later be applied or aborted.
    pub fn plan(&mut self, event: SessionEvent) -> Result<Plan, PlanError> {
        if self.pending.is_some() {
            return Err(PlanError::AlreadyPending);
        }

        let next = self
            .compute_transition(event)
            .map_err(PlanError::InvalidTransition)?;

        let plan = Plan {
            id: Uuid::new_v4(),
            from: self.phase,
            to: next,
            event,
            version_next: self.version + 1,
            pending_since: Instant::now(),
        };

        self.pending = Some(plan.clone());

        Ok(plan)
    }

    /// Apply a planned transition, moving the state machine to the next phase.
    /// Returns the new phase after the transition.
    pub fn apply(&mut self, plan_id: PlanId) -> Result<SessionPhase, ApplyError> {
        let plan = self.pending.take().ok_or(ApplyError::NoPending)?;

        if plan.id != plan_id {
            let expected_plan_id = plan.id;
            self.pending = Some(plan);
            return Err(ApplyError::IdMismatch {
                expected: expected_plan_id,
                got: plan_id,
            });
        }

        if self.phase != plan.from {
            return Err(ApplyError::PhaseMismatch {
                expected: plan.from,
                actual: self.phase,
            });
        }

        if self.version + 1 != plan.version_next {
            return Err(ApplyError::VersionMismatch {
                expected: plan.version_next,
                actual: self.version + 1,
            });
        }

        self.phase = plan.to;
        self.version = plan.version_next;
        self.pending = None;

        Ok(self.phase)
    }

    /// Abort a planned transition without applying it, returning the state machine to its previous state.
    pub fn abort(&mut self, plan_id: PlanId) -> Result<(), AbortError> {
        let plan = self.pending.as_ref().ok_or(AbortError::NoPending)?;

        if plan.id != plan_id {
            return Err(AbortError::IdMismatch {
                expected: plan.id,
                got: plan_id,
            });
        }

        self.pending = None;
        Ok(())
    }

    /// Compute a transition from an event if the transition is valid.
    fn compute_transition(&self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (SessionPhase::Idle, SessionEvent::OpenLobby) => SessionPhase::Forming,
            (SessionPhase::Forming, SessionEvent::CancelLobby) => SessionPhase::Idle,
            (SessionPhase::Forming, SessionEvent::StartGame) => SessionPhase::Active,
            (SessionPhase::Active, SessionEvent::EndGame) => SessionPhase::Idle,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(sm: &mut SessionStateMachine, event: SessionEvent) -> SessionPhase {
        let plan = sm.plan(event).unwrap();
        sm.apply(plan.id).unwrap()
    }

    #[test]
    fn initial_state_is_idle() {
        let sm = SessionStateMachine::new();
        assert_eq!(sm.phase(), SessionPhase::Idle);
    }

    #[test]
    fn full_happy_path_through_session() {
        let mut sm = SessionStateMachine::new();

        assert_eq!(apply(&mut sm, SessionEvent::OpenLobby), SessionPhase::Forming);
        assert_eq!(apply(&mut sm, SessionEvent::StartGame), SessionPhase::Active);
        assert_eq!(apply(&mut sm, SessionEvent::EndGame), SessionPhase::Idle);
    }

    #[test]
    fn lobby_can_be_abandoned() {
        let mut sm = SessionStateMachine::new();

        apply(&mut sm, SessionEvent::OpenLobby);
        assert_eq!(apply(&mut sm, SessionEvent::CancelLobby), SessionPhase::Idle);
    }

    #[test]
    fn starting_from_idle_is_rejected() {
        let mut sm = SessionStateMachine::new();
        let err = sm.plan(SessionEvent::StartGame).unwrap_err();
        match err {
            PlanError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, SessionPhase::Idle);
                assert_eq!(invalid.event, SessionEvent::StartGame);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ending_while_forming_is_rejected() {
        let mut sm = SessionStateMachine::new();
        apply(&mut sm, SessionEvent::OpenLobby);

        let err = sm.plan(SessionEvent::EndGame).unwrap_err();
        match err {
            PlanError::InvalidTransition(invalid) => {
                assert_eq!(invalid.from, SessionPhase::Forming);
                assert_eq!(invalid.event, SessionEvent::EndGame);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn plan_while_pending_is_rejected() {
        let mut sm = SessionStateMachine::new();
        let _plan = sm.plan(SessionEvent::OpenLobby).unwrap();
        assert_eq!(
            sm.plan(SessionEvent::OpenLobby).unwrap_err(),
            PlanError::AlreadyPending
        );
    }

    #[test]
    fn apply_with_wrong_id_keeps_plan_pending() {
        let mut sm = SessionStateMachine::new();
        let plan = sm.plan(SessionEvent::OpenLobby).unwrap();

        let err = sm.apply(Uuid::new_v4()).unwrap_err();
        match err {
            ApplyError::IdMismatch { expected, .. } => assert_eq!(expected, plan.id),
            other => panic!("unexpected error: {other:?}"),
        }

        // The original plan must still be applicable.
        assert_eq!(sm.apply(plan.id).unwrap(), SessionPhase::Forming);
    }

    #[test]
    fn abort_clears_pending() {
        let mut sm = SessionStateMachine::new();
        let plan = sm.plan(SessionEvent::OpenLobby).unwrap();
        sm.abort(plan.id).unwrap();
        assert!(sm.pending.is_none());
        assert_eq!(sm.phase(), SessionPhase::Idle);
    }
}
