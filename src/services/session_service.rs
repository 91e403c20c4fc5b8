//! Business logic driving the shared session lifecycle: lobby formation,
//! level mutation, win derivation, and termination with optional archival.

use std::time::SystemTime;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::models::HistoryEntryEntity,
    dto::{
        common::SessionSnapshot,
        session::{ActionResponse, AddRoundResponse, LevelUpdateResponse},
    },
    error::ServiceError,
    services::{roster_service, sse_events},
    state::{
        SharedState,
        session::{PlayerProgress, Session},
        state_machine::{SessionEvent, SessionPhase},
        transitions::run_transition_with_broadcast,
    },
};

/// Build the observer-facing snapshot of the current session state.
pub async fn capture_snapshot(state: &SharedState) -> SessionSnapshot {
    let phase = state.phase().await;
    let degraded = state.is_degraded().await;
    state
        .read_session(|session| SessionSnapshot::build(phase, session, degraded))
        .await
}

/// Seat a participant in the lobby, opening it when no session exists yet.
///
/// Re-joining while forming resets that one seat; joining a game already in
/// progress is rejected outright.
pub async fn join(state: &SharedState, name: &str) -> Result<SessionSnapshot, ServiceError> {
    let name = name.trim().to_owned();

    let roster = roster_service::roster(state).await?;
    if !roster.iter().any(|entry| *entry == name) {
        return Err(ServiceError::NotFound(format!(
            "`{name}` is not on the roster"
        )));
    }

    match state.phase().await {
        SessionPhase::Idle => {
            let target = state.config().default_target_score();
            run_transition_with_broadcast(state, SessionEvent::OpenLobby, move || async move {
                state
                    .with_session_slot(|slot| {
                        let mut session = Session::new(target);
                        session.join(&name);
                        *slot = Some(session);
                    })
                    .await;
                Ok(())
            })
            .await?;
        }
        SessionPhase::Forming => {
            state
                .with_session_slot(|slot| match slot {
                    Some(session) => {
                        session.join(&name);
                        Ok(())
                    }
                    None => Err(ServiceError::InvalidState(
                        "lobby has not been initialised".into(),
                    )),
                })
                .await?;
            sse_events::broadcast_session_changed(state).await;
        }
        SessionPhase::Active => {
            return Err(ServiceError::InvalidState(
                "cannot join a game already in progress".into(),
            ));
        }
    }

    Ok(capture_snapshot(state).await)
}

/// Remove a seated participant from the lobby.
pub async fn leave(state: &SharedState, name: &str) -> Result<SessionSnapshot, ServiceError> {
    ensure_phase(state, SessionPhase::Forming, "removing a participant").await?;

    let removed = state
        .with_session_slot(|slot| {
            slot.as_mut()
                .map(|session| session.leave(name))
                .unwrap_or(false)
        })
        .await;

    if !removed {
        return Err(ServiceError::NotFound(format!(
            "`{name}` is not seated in the lobby"
        )));
    }

    sse_events::broadcast_session_changed(state).await;
    Ok(capture_snapshot(state).await)
}

/// Abandon the lobby without playing, returning to idle.
pub async fn cancel_lobby(state: &SharedState) -> Result<ActionResponse, ServiceError> {
    run_transition_with_broadcast(state, SessionEvent::CancelLobby, move || async move {
        state
            .with_session_slot(|slot| {
                slot.take();
            })
            .await;
        Ok(())
    })
    .await?;

    Ok(ActionResponse::done("lobby abandoned"))
}

/// Begin the game with the current lobby. Rejected when nobody is seated.
pub async fn start(state: &SharedState) -> Result<SessionSnapshot, ServiceError> {
    let seated = state
        .read_session(|session| session.map(|s| s.players.len()).unwrap_or(0))
        .await;
    if seated == 0 {
        return Err(ServiceError::InvalidState(
            "cannot start a game with an empty lobby".into(),
        ));
    }

    run_transition_with_broadcast(state, SessionEvent::StartGame, || async { Ok(()) }).await?;

    Ok(capture_snapshot(state).await)
}

/// Add `delta` to one participant's value for one round.
pub async fn adjust_level(
    state: &SharedState,
    name: &str,
    round: usize,
    delta: i32,
) -> Result<LevelUpdateResponse, ServiceError> {
    apply_level(state, name, round, LevelWrite::Adjust(delta)).await
}

/// Overwrite one participant's value for one round (absolute-entry convenience).
pub async fn set_level(
    state: &SharedState,
    name: &str,
    round: usize,
    value: i32,
) -> Result<LevelUpdateResponse, ServiceError> {
    apply_level(state, name, round, LevelWrite::Set(value)).await
}

/// Extend the session by one round for every participant.
pub async fn add_round(state: &SharedState) -> Result<AddRoundResponse, ServiceError> {
    ensure_phase(state, SessionPhase::Active, "adding a round").await?;

    let rounds = state
        .with_session_slot(|slot| match slot {
            Some(session) => Ok(session.add_round()),
            None => Err(ServiceError::InvalidState("no active session".into())),
        })
        .await?;

    sse_events::broadcast_session_changed(state).await;
    Ok(AddRoundResponse { rounds })
}

/// Change the target score of the active session.
///
/// The passphrase is re-confirmed here even though the route is already
/// admin-gated; a mid-game target change is a deliberate double-gated action.
pub async fn set_target_score(
    state: &SharedState,
    passphrase: &str,
    value: i32,
) -> Result<SessionSnapshot, ServiceError> {
    ensure_phase(state, SessionPhase::Active, "changing the target score").await?;

    if passphrase != state.config().admin_passphrase() {
        return Err(ServiceError::Unauthorized("passphrase mismatch".into()));
    }

    if !state.config().is_allowed_target(value) {
        return Err(ServiceError::InvalidInput(format!(
            "target score {value} is not among the configured options {:?}",
            state.config().target_score_options()
        )));
    }

    state
        .with_session_slot(|slot| match slot {
            Some(session) => {
                session.target_score = value;
                Ok(())
            }
            None => Err(ServiceError::InvalidState("no active session".into())),
        })
        .await?;

    sse_events::broadcast_session_changed(state).await;
    Ok(capture_snapshot(state).await)
}

/// Terminate the active session.
///
/// A non-empty winner list archives one ledger record before the reset; an
/// empty list resets without saving. When the archive write fails the
/// transition aborts and the session stays active.
pub async fn end(
    state: &SharedState,
    winners: Vec<String>,
) -> Result<ActionResponse, ServiceError> {
    let winners: Vec<String> = winners
        .into_iter()
        .map(|winner| winner.trim().to_owned())
        .collect();

    if winners.is_empty() {
        run_transition_with_broadcast(state, SessionEvent::EndGame, move || async move {
            state
                .with_session_slot(|slot| {
                    slot.take();
                })
                .await;
            Ok(())
        })
        .await?;

        return Ok(ActionResponse::done("session ended without archiving"));
    }

    let seated = state
        .read_session(|session| {
            session
                .map(|s| s.participant_names())
                .unwrap_or_default()
        })
        .await;
    for winner in &winners {
        if !seated.iter().any(|name| name == winner) {
            return Err(ServiceError::InvalidInput(format!(
                "winner `{winner}` is not part of the session"
            )));
        }
    }

    let entity = run_transition_with_broadcast(state, SessionEvent::EndGame, move || async move {
        let store = state.require_ledger_store().await?;

        let entity = state
            .read_session(|session| session.map(|s| build_history_entity(s, &winners)))
            .await
            .ok_or_else(|| ServiceError::InvalidState("no session to archive".into()))?;

        store.append_history(entity.clone()).await?;

        state
            .with_session_slot(|slot| {
                slot.take();
            })
            .await;

        Ok(entity)
    })
    .await?;

    sse_events::broadcast_history_archived(state, entity.into());
    Ok(ActionResponse::done("session archived"))
}

enum LevelWrite {
    Adjust(i32),
    Set(i32),
}

async fn apply_level(
    state: &SharedState,
    name: &str,
    round: usize,
    write: LevelWrite,
) -> Result<LevelUpdateResponse, ServiceError> {
    ensure_phase(state, SessionPhase::Active, "adjusting a level").await?;

    let response = state
        .with_session_slot(|slot| {
            let session = match slot {
                Some(session) => session,
                None => return Err(ServiceError::InvalidState("no active session".into())),
            };

            if round >= session.rounds {
                return Err(ServiceError::InvalidInput(format!(
                    "round {round} is not part of the session yet ({} known)",
                    session.rounds
                )));
            }

            let value = match write {
                LevelWrite::Adjust(delta) => session.adjust_level(name, round, delta),
                LevelWrite::Set(value) => session.set_level(name, round, value),
            }
            .ok_or_else(|| {
                ServiceError::NotFound(format!("`{name}` is not part of the session"))
            })?;

            let total = session
                .players
                .get(name)
                .map(PlayerProgress::total)
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("`{name}` is not part of the session"))
                })?;

            Ok(LevelUpdateResponse {
                name: name.to_owned(),
                round,
                value,
                total,
                winners: session.winners(),
            })
        })
        .await?;

    sse_events::broadcast_session_changed(state).await;
    Ok(response)
}

async fn ensure_phase(
    state: &SharedState,
    expected: SessionPhase,
    action: &str,
) -> Result<(), ServiceError> {
    let phase = state.phase().await;
    if phase != expected {
        return Err(ServiceError::InvalidState(format!(
            "{action} requires the {expected:?} phase, current phase {phase:?}"
        )));
    }
    Ok(())
}

fn build_history_entity(session: &Session, winners: &[String]) -> HistoryEntryEntity {
    let recorded_at = SystemTime::now();
    HistoryEntryEntity {
        id: Uuid::new_v4(),
        recorded_at,
        date: format_archive_date(recorded_at),
        participants: session.participant_names(),
        winners: winners.to_vec(),
        details: Some(session.player_details()),
        final_target: Some(session.target_score),
        legacy: None,
    }
}

/// Short display date, e.g. `7 Aug 21:14`. Chronological ordering relies on
/// the numeric `recorded_at` field instead.
fn format_archive_date(at: SystemTime) -> String {
    let at = OffsetDateTime::from(at);
    let month = at.month().to_string();
    let month_short: String = month.chars().take(3).collect();
    format!(
        "{} {} {:02}:{:02}",
        at.day(),
        month_short,
        at.hour(),
        at.minute()
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{ledger_store::LedgerStore, storage::StorageResult},
        dto::common::VisibleSessionPhase,
        state::AppState,
    };

    /// In-memory ledger double; operations never fail.
    #[derive(Clone, Default)]
    struct MemoryLedger {
        inner: Arc<MemoryInner>,
    }

    #[derive(Default)]
    struct MemoryInner {
        roster: Mutex<Option<Vec<String>>>,
        history: Mutex<Vec<HistoryEntryEntity>>,
    }

    impl MemoryLedger {
        fn history(&self) -> Vec<HistoryEntryEntity> {
            self.inner.history.lock().unwrap().clone()
        }
    }

    impl LedgerStore for MemoryLedger {
        fn load_roster(&self) -> BoxFuture<'static, StorageResult<Option<Vec<String>>>> {
            let inner = self.inner.clone();
            Box::pin(async move { Ok(inner.roster.lock().unwrap().clone()) })
        }

        fn save_roster(&self, names: Vec<String>) -> BoxFuture<'static, StorageResult<()>> {
            let inner = self.inner.clone();
            Box::pin(async move {
                *inner.roster.lock().unwrap() = Some(names);
                Ok(())
            })
        }

        fn append_history(
            &self,
            entry: HistoryEntryEntity,
        ) -> BoxFuture<'static, StorageResult<()>> {
            let inner = self.inner.clone();
            Box::pin(async move {
                inner.history.lock().unwrap().push(entry);
                Ok(())
            })
        }

        fn list_history(&self) -> BoxFuture<'static, StorageResult<Vec<HistoryEntryEntity>>> {
            let inner = self.inner.clone();
            Box::pin(async move { Ok(inner.history.lock().unwrap().clone()) })
        }

        fn delete_history(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            let inner = self.inner.clone();
            Box::pin(async move {
                let mut history = inner.history.lock().unwrap();
                let before = history.len();
                history.retain(|entry| entry.id != id);
                Ok(history.len() < before)
            })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }
    }

    async fn state_with_roster(names: &[&str]) -> (crate::state::SharedState, MemoryLedger) {
        let state = AppState::new(AppConfig::default());
        let ledger = MemoryLedger::default();
        *ledger.inner.roster.lock().unwrap() =
            Some(names.iter().map(|n| n.to_string()).collect());
        state.set_ledger_store(Arc::new(ledger.clone())).await;
        (state, ledger)
    }

    #[tokio::test]
    async fn first_join_opens_the_lobby() {
        let (state, _ledger) = state_with_roster(&["Ann", "Bob"]).await;

        let snapshot = join(&state, "Ann").await.unwrap();

        assert_eq!(snapshot.phase, VisibleSessionPhase::Forming);
        assert_eq!(snapshot.target_score, Some(10));
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].total, 1);
    }

    #[tokio::test]
    async fn join_rejects_names_off_the_roster() {
        let (state, _ledger) = state_with_roster(&["Ann"]).await;

        let err = join(&state, "Zed").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn join_rejected_once_the_game_is_active() {
        let (state, _ledger) = state_with_roster(&["Ann", "Bob"]).await;

        join(&state, "Ann").await.unwrap();
        start(&state).await.unwrap();

        let err = join(&state, "Bob").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn start_requires_a_seated_participant() {
        let (state, _ledger) = state_with_roster(&["Ann"]).await;

        let err = start(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn leave_is_lobby_only() {
        let (state, _ledger) = state_with_roster(&["Ann", "Bob"]).await;

        join(&state, "Ann").await.unwrap();
        join(&state, "Bob").await.unwrap();
        let snapshot = leave(&state, "Bob").await.unwrap();
        assert_eq!(snapshot.players.len(), 1);

        start(&state).await.unwrap();
        let err = leave(&state, "Ann").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn end_without_winners_resets_without_archiving() {
        let (state, ledger) = state_with_roster(&["Ann"]).await;

        join(&state, "Ann").await.unwrap();
        start(&state).await.unwrap();
        end(&state, Vec::new()).await.unwrap();

        assert!(ledger.history().is_empty());
        let snapshot = capture_snapshot(&state).await;
        assert_eq!(snapshot.phase, VisibleSessionPhase::Idle);
        assert!(snapshot.players.is_empty());
    }

    #[tokio::test]
    async fn end_with_winner_archives_exactly_one_entry() {
        let (state, ledger) = state_with_roster(&["Ann", "Bob"]).await;

        join(&state, "Ann").await.unwrap();
        join(&state, "Bob").await.unwrap();
        start(&state).await.unwrap();
        adjust_level(&state, "Ann", 0, 9).await.unwrap();

        end(&state, vec!["Ann".to_owned()]).await.unwrap();

        let history = ledger.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].winners, vec!["Ann"]);
        assert_eq!(history[0].participants, vec!["Ann", "Bob"]);

        let snapshot = capture_snapshot(&state).await;
        assert_eq!(snapshot.phase, VisibleSessionPhase::Idle);
        assert!(snapshot.players.is_empty());
    }

    #[tokio::test]
    async fn end_rejects_a_winner_that_never_played() {
        let (state, ledger) = state_with_roster(&["Ann", "Bob"]).await;

        join(&state, "Ann").await.unwrap();
        start(&state).await.unwrap();

        let err = end(&state, vec!["Bob".to_owned()]).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(ledger.history().is_empty());
        assert_eq!(state.phase().await, SessionPhase::Active);
    }

    #[tokio::test]
    async fn level_adjustments_surface_winners() {
        let (state, _ledger) = state_with_roster(&["Ann", "Bob"]).await;

        join(&state, "Ann").await.unwrap();
        join(&state, "Bob").await.unwrap();
        start(&state).await.unwrap();

        let update = adjust_level(&state, "Ann", 0, 8).await.unwrap();
        assert_eq!(update.total, 9);
        assert!(update.winners.is_empty());

        let update = adjust_level(&state, "Ann", 0, 1).await.unwrap();
        assert_eq!(update.total, 10);
        assert_eq!(update.winners, vec!["Ann"]);

        // Scores may keep moving while the win banner is showing.
        let update = adjust_level(&state, "Ann", 0, -1).await.unwrap();
        assert!(update.winners.is_empty());
    }

    #[tokio::test]
    async fn target_change_is_double_gated() {
        let (state, _ledger) = state_with_roster(&["Ann"]).await;

        join(&state, "Ann").await.unwrap();
        start(&state).await.unwrap();

        let err = set_target_score(&state, "wrong", 11).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let err = set_target_score(&state, "1234", 12).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let snapshot = set_target_score(&state, "1234", 11).await.unwrap();
        assert_eq!(snapshot.target_score, Some(11));
    }

    #[test]
    fn archive_date_is_short_and_humane() {
        let at = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        // 2023-11-14 22:13:20 UTC
        assert_eq!(format_archive_date(at), "14 Nov 22:13");
    }

    #[test]
    fn history_entity_captures_session_in_join_order() {
        let mut session = Session::new(11);
        session.join("Ann");
        session.join("Bob");
        session.add_round();
        session.set_level("Bob", 1, 10);

        let entity = build_history_entity(&session, &["Bob".to_owned()]);

        assert_eq!(entity.participants, vec!["Ann", "Bob"]);
        assert_eq!(entity.winners, vec!["Bob"]);
        assert_eq!(entity.final_target, Some(11));
        assert!(!entity.is_legacy());

        let details = entity.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[1].levels, vec![0, 10]);
    }
}
