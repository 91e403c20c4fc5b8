//! Persistence layer: entities, backend-neutral errors, and the ledger store
//! abstraction with its database implementations.

pub mod ledger_store;
pub mod models;
pub mod storage;
