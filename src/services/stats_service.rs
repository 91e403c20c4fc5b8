//! Statistics aggregation: folds the history ledger over the roster into
//! per-participant standings and leaderboard extractions.

use indexmap::IndexMap;

use crate::{dao::models::HistoryEntryEntity, error::ServiceError, state::SharedState};

/// Aggregated record of one roster participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStanding {
    /// Roster name.
    pub name: String,
    /// Games played, legacy aggregates included.
    pub matches: u32,
    /// Games won, counting repeated legacy winner occurrences.
    pub wins: u32,
    /// Rounded win percentage; 0 without matches.
    pub rate: u32,
}

/// Metric a leaderboard extraction ranks by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaderboardMetric {
    /// Total games played.
    Matches,
    /// Total games won.
    Wins,
    /// Rounded win percentage.
    Rate,
}

/// All participants tied at the maximum of one metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardSlot {
    /// Tied names, in standings order.
    pub names: Vec<String>,
    /// The shared metric value.
    pub value: u32,
}

/// Fold the ledger over the roster into ranked standings.
///
/// Deterministic and order-independent over `history`; ties keep roster order
/// because the final sort is stable.
pub fn compute_standings(
    roster: &[String],
    history: &[HistoryEntryEntity],
) -> Vec<PlayerStanding> {
    let mut table: IndexMap<&str, (u32, u32)> = roster
        .iter()
        .map(|name| (name.as_str(), (0u32, 0u32)))
        .collect();

    for entry in history {
        match &entry.legacy {
            Some(aggregate) => {
                for (name, count) in &aggregate.matches_count {
                    if let Some((matches, _)) = table.get_mut(name.as_str()) {
                        *matches += count;
                    }
                }
                // Legacy records compress several wins into repeated names:
                // count occurrences, not membership.
                for winner in &entry.winners {
                    if let Some((_, wins)) = table.get_mut(winner.as_str()) {
                        *wins += 1;
                    }
                }
            }
            None => {
                for participant in &entry.participants {
                    if let Some((matches, wins)) = table.get_mut(participant.as_str()) {
                        *matches += 1;
                        if entry.winners.iter().any(|winner| winner == participant) {
                            *wins += 1;
                        }
                    }
                }
            }
        }
    }

    let mut standings: Vec<PlayerStanding> = table
        .into_iter()
        .map(|(name, (matches, wins))| PlayerStanding {
            name: name.to_owned(),
            matches,
            wins,
            rate: win_rate(wins, matches),
        })
        .collect();

    standings.sort_by(|a, b| b.wins.cmp(&a.wins).then(b.rate.cmp(&a.rate)));
    standings
}

/// Extract every participant tied at the maximum of `metric`, ignoring anyone
/// who has never played. `None` when nobody has a match on record.
pub fn leaderboard(
    standings: &[PlayerStanding],
    metric: LeaderboardMetric,
) -> Option<LeaderboardSlot> {
    let active: Vec<&PlayerStanding> = standings
        .iter()
        .filter(|standing| standing.matches > 0)
        .collect();

    let max = active
        .iter()
        .map(|standing| metric_value(standing, metric))
        .max()?;

    let names = active
        .iter()
        .filter(|standing| metric_value(standing, metric) == max)
        .map(|standing| standing.name.clone())
        .collect();

    Some(LeaderboardSlot { names, value: max })
}

/// Load roster and ledger from storage and compute the standings.
pub async fn standings(state: &SharedState) -> Result<Vec<PlayerStanding>, ServiceError> {
    let store = state.require_ledger_store().await?;
    let roster = store.load_roster().await?.unwrap_or_default();
    let history = store.list_history().await?;
    Ok(compute_standings(&roster, &history))
}

fn metric_value(standing: &PlayerStanding, metric: LeaderboardMetric) -> u32 {
    match metric {
        LeaderboardMetric::Matches => standing.matches,
        LeaderboardMetric::Wins => standing.wins,
        LeaderboardMetric::Rate => standing.rate,
    }
}

fn win_rate(wins: u32, matches: u32) -> u32 {
    if matches == 0 {
        return 0;
    }
    ((wins as f64 / matches as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use uuid::Uuid;

    use super::*;
    use crate::dao::models::LegacyAggregateEntity;

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn game(participants: &[&str], winners: &[&str]) -> HistoryEntryEntity {
        HistoryEntryEntity {
            id: Uuid::new_v4(),
            recorded_at: SystemTime::UNIX_EPOCH,
            date: "test".into(),
            participants: participants.iter().map(|n| n.to_string()).collect(),
            winners: winners.iter().map(|n| n.to_string()).collect(),
            details: None,
            final_target: Some(10),
            legacy: None,
        }
    }

    fn legacy(matches: &[(&str, u32)], winners: &[&str]) -> HistoryEntryEntity {
        let mut entry = game(&[], winners);
        entry.legacy = Some(LegacyAggregateEntity {
            matches_count: matches
                .iter()
                .map(|(name, count)| (name.to_string(), *count))
                .collect(),
        });
        entry
    }

    #[test]
    fn two_game_round_trip_splits_evenly() {
        let history = vec![game(&["A", "B"], &["A"]), game(&["A", "B"], &["B"])];
        let standings = compute_standings(&roster(&["A", "B"]), &history);

        for standing in &standings {
            assert_eq!(standing.matches, 2);
            assert_eq!(standing.wins, 1);
            assert_eq!(standing.rate, 50);
        }

        let slot = leaderboard(&standings, LeaderboardMetric::Wins).unwrap();
        assert_eq!(slot.names, vec!["A", "B"]);
        assert_eq!(slot.value, 1);
    }

    #[test]
    fn legacy_entries_count_winner_occurrences() {
        let history = vec![legacy(&[("A", 5)], &["A", "A", "A"])];
        let standings = compute_standings(&roster(&["A"]), &history);

        assert_eq!(standings[0].matches, 5);
        assert_eq!(standings[0].wins, 3);
        assert_eq!(standings[0].rate, 60);
    }

    #[test]
    fn names_off_the_roster_are_ignored() {
        let history = vec![game(&["A", "Ghost"], &["Ghost"])];
        let standings = compute_standings(&roster(&["A"]), &history);

        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].matches, 1);
        assert_eq!(standings[0].wins, 0);
    }

    #[test]
    fn sorted_by_wins_then_rate() {
        let history = vec![
            game(&["A", "B", "C"], &["A"]),
            game(&["A", "B"], &["B"]),
            game(&["B", "C"], &["B"]),
        ];
        // B: 3 matches 2 wins; A: 2 matches 1 win (50%); C: 2 matches 0 wins.
        let standings = compute_standings(&roster(&["A", "B", "C"]), &history);

        let names: Vec<&str> = standings.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn equal_wins_break_ties_by_rate() {
        let history = vec![
            game(&["A", "B"], &["A"]),
            game(&["A", "B"], &["B"]),
            game(&["A"], &[]),
        ];
        // Both one win; B played fewer games so rates differ (A 33, B 50).
        let standings = compute_standings(&roster(&["A", "B"]), &history);

        assert_eq!(standings[0].name, "B");
        assert_eq!(standings[0].rate, 50);
        assert_eq!(standings[1].rate, 33);
    }

    #[test]
    fn rate_rounds_to_nearest_percent() {
        assert_eq!(win_rate(1, 3), 33);
        assert_eq!(win_rate(2, 3), 67);
        assert_eq!(win_rate(0, 7), 0);
        assert_eq!(win_rate(0, 0), 0);
    }

    #[test]
    fn leaderboard_skips_idle_participants() {
        let history = vec![game(&["A"], &["A"])];
        let standings = compute_standings(&roster(&["A", "Bench"]), &history);

        let slot = leaderboard(&standings, LeaderboardMetric::Matches).unwrap();
        assert_eq!(slot.names, vec!["A"]);

        // Bench has rate 0 but never played, so a rate board still excludes them.
        let rate_slot = leaderboard(&standings, LeaderboardMetric::Rate).unwrap();
        assert_eq!(rate_slot.names, vec!["A"]);
        assert_eq!(rate_slot.value, 100);
    }

    #[test]
    fn leaderboard_empty_without_any_matches() {
        let standings = compute_standings(&roster(&["A", "B"]), &[]);
        assert!(leaderboard(&standings, LeaderboardMetric::Wins).is_none());
    }
}
