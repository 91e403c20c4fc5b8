//! Durable roster operations: seeding, listing, and admin-gated edits.
//!
//! Every write replaces the full list in one operation, which keeps concurrent
//! seed races idempotent (both writers produce identical content).

use tracing::info;

use crate::{error::ServiceError, services::sse_events, state::SharedState};

/// Current roster, empty when never written.
pub async fn roster(state: &SharedState) -> Result<Vec<String>, ServiceError> {
    let store = state.require_ledger_store().await?;
    Ok(store.load_roster().await?.unwrap_or_default())
}

/// Write the configured default list when the roster is observed empty/absent.
///
/// Safe to call on every storage (re)connect: a non-empty roster is left alone.
pub async fn seed_if_empty(state: &SharedState) -> Result<(), ServiceError> {
    let defaults = state.config().default_roster();
    if defaults.is_empty() {
        return Ok(());
    }

    let store = state.require_ledger_store().await?;
    let existing = store.load_roster().await?;
    if existing.is_some_and(|names| !names.is_empty()) {
        return Ok(());
    }

    let names = defaults.to_vec();
    store.save_roster(names.clone()).await?;
    info!(count = names.len(), "seeded empty roster with defaults");
    sse_events::broadcast_roster_changed(state, &names);
    Ok(())
}

/// Append one name, rejecting blanks and case-sensitive duplicates.
pub async fn add(state: &SharedState, name: &str) -> Result<Vec<String>, ServiceError> {
    let store = state.require_ledger_store().await?;
    let names = store.load_roster().await?.unwrap_or_default();

    let names = with_added(names, name)?;
    store.save_roster(names.clone()).await?;
    sse_events::broadcast_roster_changed(state, &names);
    Ok(names)
}

/// Remove one name, failing when it is not present.
pub async fn remove(state: &SharedState, name: &str) -> Result<Vec<String>, ServiceError> {
    let store = state.require_ledger_store().await?;
    let names = store.load_roster().await?.unwrap_or_default();

    let names = with_removed(names, name)?;
    store.save_roster(names.clone()).await?;
    sse_events::broadcast_roster_changed(state, &names);
    Ok(names)
}

fn with_added(mut names: Vec<String>, name: &str) -> Result<Vec<String>, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput(
            "roster name must not be empty".into(),
        ));
    }

    if names.iter().any(|existing| existing == trimmed) {
        return Err(ServiceError::InvalidInput(format!(
            "`{trimmed}` is already on the roster"
        )));
    }

    names.push(trimmed.to_owned());
    Ok(names)
}

fn with_removed(names: Vec<String>, name: &str) -> Result<Vec<String>, ServiceError> {
    if !names.iter().any(|existing| existing == name) {
        return Err(ServiceError::NotFound(format!(
            "`{name}` is not on the roster"
        )));
    }

    Ok(names.into_iter().filter(|existing| existing != name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_of(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn add_appends_trimmed_name() {
        let names = with_added(roster_of(&["Ann"]), "  Bob ").unwrap();
        assert_eq!(names, vec!["Ann", "Bob"]);
    }

    #[test]
    fn add_rejects_exact_duplicates_without_mutating() {
        let err = with_added(roster_of(&["Ann", "Bob"]), "Bob").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        // Case-sensitive comparison: a different casing is a different name.
        let names = with_added(roster_of(&["Ann", "Bob"]), "bob").unwrap();
        assert_eq!(names, vec!["Ann", "Bob", "bob"]);
    }

    #[test]
    fn add_rejects_blank_names() {
        assert!(matches!(
            with_added(Vec::new(), "   "),
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[test]
    fn remove_filters_the_name_out() {
        let names = with_removed(roster_of(&["Ann", "Bob"]), "Ann").unwrap();
        assert_eq!(names, vec!["Bob"]);
    }

    #[test]
    fn remove_unknown_name_is_reported() {
        assert!(matches!(
            with_removed(roster_of(&["Ann"]), "Zed"),
            Err(ServiceError::NotFound(_))
        ));
    }
}
