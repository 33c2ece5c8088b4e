//! MongoDB driver backend
//!
//! Speaks to a cluster through the driver's blocking API, using the same
//! query documents as the Data API client. Results come back as BSON and are
//! decoded through relaxed extended JSON, so both backends share one
//! document shape.

use mongodb::bson::{self, doc, Bson, Document};
use mongodb::sync::{Client, Collection};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shelf_domain::{Book, RawBook, SortKey};

use super::translate::{
    count_pipeline, filter_document, first_count, genre_names, genre_pipeline, sort_document,
    CountRow, GenreRow,
};
use super::{BookFilter, DocumentCollection, RemoteResult};
use crate::config::RemoteConfig;
use crate::error::RemoteError;

const SELECTION_TIMEOUT_OPTION: &str = "serverSelectionTimeoutMS";

pub struct MongoCollection {
    collection: Collection<Document>,
    location: String,
}

impl MongoCollection {
    /// Open a client for `uri` and ping the configured database.
    pub fn connect(uri: &str, settings: &RemoteConfig) -> RemoteResult<Self> {
        let uri = with_selection_timeout(uri, settings.timeout_secs);
        let client = Client::with_uri_str(&uri)?;
        let database = client.database(&settings.database);
        database.run_command(doc! { "ping": 1 }).run()?;

        let hosts = uri
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or_default();
        let hosts = hosts.rsplit_once('@').map_or(hosts, |(_, hosts)| hosts);
        let hosts = hosts.split(['/', '?']).next().unwrap_or_default();

        let collection = Self {
            collection: database.collection(&settings.collection),
            location: format!("{hosts}/{}.{}", settings.database, settings.collection),
        };
        tracing::info!(store = %collection.location, "connected to remote store");
        Ok(collection)
    }

    fn decode_all<T: DeserializeOwned>(
        cursor: impl Iterator<Item = mongodb::error::Result<Document>>,
    ) -> RemoteResult<Vec<T>> {
        cursor.map(|doc| from_bson(doc?)).collect()
    }
}

impl DocumentCollection for MongoCollection {
    fn describe(&self) -> String {
        self.location.clone()
    }

    fn ping(&self) -> RemoteResult<()> {
        self.collection.find_one(doc! {}).run()?;
        Ok(())
    }

    fn find(&self, filter: &BookFilter, sort: Option<SortKey>) -> RemoteResult<Vec<RawBook>> {
        let mut action = self.collection.find(to_bson(&filter_document(filter))?);
        if let Some(key) = sort {
            action = action.sort(to_bson(&sort_document(key))?);
        }
        Self::decode_all(action.run()?)
    }

    fn find_one(&self, id: &str) -> RemoteResult<Option<RawBook>> {
        self.collection
            .find_one(doc! { "id": id })
            .run()?
            .map(from_bson)
            .transpose()
    }

    fn insert_one(&self, book: &Book) -> RemoteResult<()> {
        let document = bson::to_document(&RawBook::from(book))?;
        self.collection.insert_one(document).run()?;
        Ok(())
    }

    fn delete_one(&self, id: &str) -> RemoteResult<u64> {
        Ok(self.collection.delete_one(doc! { "id": id }).run()?.deleted_count)
    }

    fn delete_all(&self) -> RemoteResult<u64> {
        Ok(self.collection.delete_many(doc! {}).run()?.deleted_count)
    }

    fn set_read(&self, id: &str, read: bool) -> RemoteResult<u64> {
        let result = self
            .collection
            .update_one(doc! { "id": id }, doc! { "$set": { "read": read } })
            .run()?;
        Ok(result.matched_count)
    }

    fn count(&self, filter: &BookFilter) -> RemoteResult<u64> {
        let rows: Vec<CountRow> = Self::decode_all(
            self.collection
                .aggregate(to_pipeline(&count_pipeline(filter))?)
                .run()?,
        )?;
        Ok(first_count(&rows))
    }

    fn distinct_genres(&self) -> RemoteResult<Vec<String>> {
        let rows: Vec<GenreRow> = Self::decode_all(
            self.collection
                .aggregate(to_pipeline(&genre_pipeline())?)
                .run()?,
        )?;
        Ok(genre_names(rows))
    }
}

/// Add a server selection timeout to `uri` unless it already names one.
fn with_selection_timeout(uri: &str, timeout_secs: u64) -> String {
    let uri = uri.trim();
    if uri
        .to_ascii_lowercase()
        .contains(&SELECTION_TIMEOUT_OPTION.to_ascii_lowercase())
    {
        return uri.to_string();
    }

    let option = format!("{SELECTION_TIMEOUT_OPTION}={}", timeout_secs * 1000);
    let rest = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    if uri.ends_with('?') || uri.ends_with('&') {
        format!("{uri}{option}")
    } else if rest.contains('?') {
        format!("{uri}&{option}")
    } else if rest.contains('/') {
        format!("{uri}?{option}")
    } else {
        format!("{uri}/?{option}")
    }
}

fn to_bson(value: &Value) -> RemoteResult<Document> {
    Ok(bson::to_document(value)?)
}

fn to_pipeline(value: &Value) -> RemoteResult<Vec<Document>> {
    match value {
        Value::Array(stages) => stages.iter().map(to_bson).collect(),
        other => Err(RemoteError::Decode(format!("pipeline is not an array: {other}"))),
    }
}

fn from_bson<T: DeserializeOwned>(document: Document) -> RemoteResult<T> {
    let json = Bson::Document(document).into_relaxed_extjson();
    Ok(serde_json::from_value(json)?)
}
