#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::HistoryEntryEntity;
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for the roster and the history ledger.
pub trait LedgerStore: Send + Sync {
    /// Load the durable roster, `None` when it has never been written.
    fn load_roster(&self) -> BoxFuture<'static, StorageResult<Option<Vec<String>>>>;
    /// Replace the durable roster with the given full list.
    fn save_roster(&self, names: Vec<String>) -> BoxFuture<'static, StorageResult<()>>;
    /// Append one concluded-session record to the ledger.
    fn append_history(&self, entry: HistoryEntryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// All ledger records, oldest first.
    fn list_history(&self) -> BoxFuture<'static, StorageResult<Vec<HistoryEntryEntity>>>;
    /// Delete one ledger record; returns whether it existed.
    fn delete_history(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Cheap connectivity probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
