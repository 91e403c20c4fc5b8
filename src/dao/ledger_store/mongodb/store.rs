use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoHistoryDocument, MongoRosterDocument, ROSTER_DOC_ID, doc_id},
};
use crate::dao::{ledger_store::LedgerStore, models::HistoryEntryEntity, storage::StorageResult};

const ROSTER_COLLECTION_NAME: &str = "roster";
const HISTORY_COLLECTION_NAME: &str = "games_history";

/// Ledger store persisting the roster and history in MongoDB collections.
#[derive(Clone)]
pub struct MongoLedgerStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoLedgerStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let collection = self.history_collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"recorded_at": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("history_recorded_at_idx".to_owned()))
                    .build(),
            )
            .build();

        collection
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: HISTORY_COLLECTION_NAME,
                index: "recorded_at",
                source,
            })?;

        Ok(())
    }

    async fn roster_collection(&self) -> Collection<MongoRosterDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoRosterDocument>(ROSTER_COLLECTION_NAME)
    }

    async fn history_collection(&self) -> Collection<MongoHistoryDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoHistoryDocument>(HISTORY_COLLECTION_NAME)
    }

    async fn load_roster(&self) -> MongoResult<Option<Vec<String>>> {
        let collection = self.roster_collection().await;

        let document = collection
            .find_one(doc! {"_id": ROSTER_DOC_ID})
            .await
            .map_err(|source| MongoDaoError::LoadRoster { source })?;

        Ok(document.map(MongoRosterDocument::into_names))
    }

    async fn save_roster(&self, names: Vec<String>) -> MongoResult<()> {
        let collection = self.roster_collection().await;

        // Full-document replacement mirrors the full-list write contract of the
        // roster: last writer wins with identical content on seed races.
        collection
            .replace_one(
                doc! {"_id": ROSTER_DOC_ID},
                MongoRosterDocument::new(names),
            )
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveRoster { source })?;

        Ok(())
    }

    async fn append_history(&self, entry: HistoryEntryEntity) -> MongoResult<()> {
        let id = entry.id;
        let document: MongoHistoryDocument = entry.into();
        let collection = self.history_collection().await;

        collection
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::AppendHistory { id, source })?;

        Ok(())
    }

    async fn list_history(&self) -> MongoResult<Vec<HistoryEntryEntity>> {
        let collection = self.history_collection().await;

        let documents: Vec<MongoHistoryDocument> = collection
            .find(doc! {})
            .sort(doc! {"recorded_at": 1})
            .await
            .map_err(|source| MongoDaoError::ListHistory { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListHistory { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn delete_history(&self, id: Uuid) -> MongoResult<bool> {
        let collection = self.history_collection().await;
        let result = collection
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteHistory { id, source })?;
        Ok(result.deleted_count > 0)
    }
}

impl LedgerStore for MongoLedgerStore {
    fn load_roster(&self) -> BoxFuture<'static, StorageResult<Option<Vec<String>>>> {
        let store = self.clone();
        Box::pin(async move { store.load_roster().await.map_err(Into::into) })
    }

    fn save_roster(&self, names: Vec<String>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_roster(names).await.map_err(Into::into) })
    }

    fn append_history(&self, entry: HistoryEntryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.append_history(entry).await.map_err(Into::into) })
    }

    fn list_history(&self) -> BoxFuture<'static, StorageResult<Vec<HistoryEntryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_history().await.map_err(Into::into) })
    }

    fn delete_history(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_history(id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
