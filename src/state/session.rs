use indexmap::IndexMap;

use crate::dao::models::PlayerDetailEntity;

/// Level deltas recorded for one participant, one slot per round.
///
/// The vector always has exactly `Session::rounds` entries; a round a player has
/// not scored in yet holds an explicit 0 rather than a missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProgress {
    /// Display name, matching the participant's roster entry.
    pub name: String,
    /// Per-round level deltas. Deltas can be negative (level loss).
    pub levels: Vec<i32>,
}

impl PlayerProgress {
    fn new(name: String, rounds: usize) -> Self {
        Self {
            name,
            levels: vec![0; rounds],
        }
    }

    /// Current level: the fixed baseline of 1 plus all recorded deltas.
    pub fn total(&self) -> i32 {
        1 + self.levels.iter().sum::<i32>()
    }
}

/// The single in-progress game session.
///
/// Only ever instantiated while the state machine is forming or active, which is
/// what keeps "players recorded while idle" unrepresentable.
#[derive(Debug, Clone)]
pub struct Session {
    /// Level a participant must reach for the win condition to trigger.
    pub target_score: i32,
    /// Number of rounds known to the session so far.
    pub rounds: usize,
    /// Participants in join order, keyed by name.
    pub players: IndexMap<String, PlayerProgress>,
}

impl Session {
    /// Open a fresh lobby with no participants and a single round.
    pub fn new(target_score: i32) -> Self {
        Self {
            target_score,
            rounds: 1,
            players: IndexMap::new(),
        }
    }

    /// Insert a participant, or reset their slot when the name is already seated.
    ///
    /// Other participants' progress is never touched.
    pub fn join(&mut self, name: &str) {
        self.players
            .insert(name.to_owned(), PlayerProgress::new(name.to_owned(), self.rounds));
    }

    /// Remove a participant's slot entirely. Returns false when the name is not seated.
    pub fn leave(&mut self, name: &str) -> bool {
        self.players.shift_remove(name).is_some()
    }

    /// Whether a participant with this exact name is seated.
    pub fn contains(&self, name: &str) -> bool {
        self.players.contains_key(name)
    }

    /// Add `delta` to the participant's recorded value for `round`.
    ///
    /// Returns the new value for that round, or `None` when the participant or
    /// round is unknown. No floor is applied; deltas can drive a round negative.
    pub fn adjust_level(&mut self, name: &str, round: usize, delta: i32) -> Option<i32> {
        if round >= self.rounds {
            return None;
        }
        let progress = self.players.get_mut(name)?;
        let slot = &mut progress.levels[round];
        *slot += delta;
        Some(*slot)
    }

    /// Overwrite the participant's recorded value for `round`.
    ///
    /// Convenience form equivalent to typing an absolute value; same bounds as
    /// [`Session::adjust_level`].
    pub fn set_level(&mut self, name: &str, round: usize, value: i32) -> Option<i32> {
        if round >= self.rounds {
            return None;
        }
        let progress = self.players.get_mut(name)?;
        progress.levels[round] = value;
        Some(value)
    }

    /// Extend the known round count by one, growing every participant's level
    /// vector uniformly with an explicit 0.
    pub fn add_round(&mut self) -> usize {
        self.rounds += 1;
        for progress in self.players.values_mut() {
            progress.levels.push(0);
        }
        self.rounds
    }

    /// Names of every participant whose total has reached the target, in join order.
    ///
    /// Derived on every call, never stored; mutating a level while a win is
    /// pending simply changes what the next call returns.
    pub fn winners(&self) -> Vec<String> {
        self.players
            .values()
            .filter(|progress| progress.total() >= self.target_score)
            .map(|progress| progress.name.clone())
            .collect()
    }

    /// Participant names in join order.
    pub fn participant_names(&self) -> Vec<String> {
        self.players.keys().cloned().collect()
    }

    /// Full per-participant breakdown for archival.
    pub fn player_details(&self) -> Vec<PlayerDetailEntity> {
        self.players
            .values()
            .map(|progress| PlayerDetailEntity {
                name: progress.name.clone(),
                levels: progress.levels.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(names: &[&str]) -> Session {
        let mut session = Session::new(10);
        for name in names {
            session.join(name);
        }
        session
    }

    #[test]
    fn join_and_leave_net_effect() {
        let mut session = session_with(&["Ann", "Bob"]);
        session.join("Cleo");
        session.leave("Bob");
        session.join("Ann"); // idempotent re-join

        assert_eq!(session.participant_names(), vec!["Ann", "Cleo"]);
    }

    #[test]
    fn rejoin_resets_the_slot_only() {
        let mut session = session_with(&["Ann", "Bob"]);
        session.add_round();
        session.adjust_level("Ann", 1, 3);
        session.adjust_level("Bob", 0, 2);

        session.join("Ann");

        assert_eq!(session.players["Ann"].levels, vec![0, 0]);
        assert_eq!(session.players["Bob"].levels, vec![2, 0]);
    }

    #[test]
    fn total_is_one_plus_deltas() {
        let mut session = session_with(&["Ann"]);
        assert_eq!(session.players["Ann"].total(), 1);

        session.add_round();
        session.adjust_level("Ann", 0, 4);
        session.adjust_level("Ann", 1, -2);
        assert_eq!(session.players["Ann"].total(), 3);
    }

    #[test]
    fn adjust_up_then_down_restores_value() {
        let mut session = session_with(&["Ann"]);
        session.set_level("Ann", 0, 5);

        session.adjust_level("Ann", 0, 1);
        session.adjust_level("Ann", 0, -1);

        assert_eq!(session.players["Ann"].levels[0], 5);
    }

    #[test]
    fn adjust_rejects_unknown_round_and_player() {
        let mut session = session_with(&["Ann"]);
        assert_eq!(session.adjust_level("Ann", 1, 1), None);
        assert_eq!(session.adjust_level("Zed", 0, 1), None);
    }

    #[test]
    fn deltas_may_go_negative() {
        let mut session = session_with(&["Ann"]);
        session.adjust_level("Ann", 0, -3);
        assert_eq!(session.players["Ann"].levels[0], -3);
        assert_eq!(session.players["Ann"].total(), -2);
    }

    #[test]
    fn add_round_extends_every_participant() {
        let mut session = session_with(&["Ann", "Bob"]);
        assert_eq!(session.add_round(), 2);

        for progress in session.players.values() {
            assert_eq!(progress.levels.len(), 2);
            assert_eq!(progress.levels[1], 0);
        }
    }

    #[test]
    fn winners_require_total_at_target() {
        let mut session = session_with(&["Ann", "Bob"]);
        session.set_level("Ann", 0, 8); // total 9
        session.set_level("Bob", 0, 9); // total 10

        assert_eq!(session.winners(), vec!["Bob"]);
    }

    #[test]
    fn winners_support_simultaneous_ties() {
        let mut session = session_with(&["Ann", "Bob", "Cleo"]);
        session.set_level("Ann", 0, 9);
        session.set_level("Bob", 0, 11);
        session.set_level("Cleo", 0, 3);

        assert_eq!(session.winners(), vec!["Ann", "Bob"]);
    }

    #[test]
    fn lowering_target_can_surface_winners() {
        let mut session = session_with(&["Ann"]);
        session.set_level("Ann", 0, 9); // total 10, target 10
        assert_eq!(session.winners(), vec!["Ann"]);

        session.target_score = 11;
        assert!(session.winners().is_empty());
    }
}
