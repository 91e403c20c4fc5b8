use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{HistoryEntryEntity, LegacyAggregateEntity, PlayerDetailEntity};

/// Fixed `_id` of the single roster document.
pub const ROSTER_DOC_ID: &str = "roster";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRosterDocument {
    #[serde(rename = "_id")]
    id: String,
    names: Vec<String>,
}

impl MongoRosterDocument {
    pub fn new(names: Vec<String>) -> Self {
        Self {
            id: ROSTER_DOC_ID.to_owned(),
            names,
        }
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoHistoryDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    recorded_at: DateTime,
    date: String,
    participants: Vec<String>,
    winners: Vec<String>,
    #[serde(default)]
    details: Option<Vec<PlayerDetailEntity>>,
    #[serde(default)]
    final_target: Option<i32>,
    #[serde(default)]
    legacy: Option<LegacyAggregateEntity>,
}

impl From<HistoryEntryEntity> for MongoHistoryDocument {
    fn from(value: HistoryEntryEntity) -> Self {
        Self {
            id: value.id,
            recorded_at: DateTime::from_system_time(value.recorded_at),
            date: value.date,
            participants: value.participants,
            winners: value.winners,
            details: value.details,
            final_target: value.final_target,
            legacy: value.legacy,
        }
    }
}

impl From<MongoHistoryDocument> for HistoryEntryEntity {
    fn from(value: MongoHistoryDocument) -> Self {
        Self {
            id: value.id,
            recorded_at: value.recorded_at.to_system_time(),
            date: value.date,
            participants: value.participants,
            winners: value.winners,
            details: value.details,
            final_target: value.final_target,
            legacy: value.legacy,
        }
    }
}

fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
