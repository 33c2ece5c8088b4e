//! Blocking client for a MongoDB Data API style HTTP endpoint
//!
//! Every action is `POST {base}/action/{name}` with a JSON body naming the
//! data source, database and collection, authenticated by an `api-key`
//! header. Counting and genre grouping go through `aggregate` pipelines.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use shelf_domain::{Book, RawBook, SortKey};
use url::Url;

use super::translate::{
    count_pipeline, filter_document, first_count, genre_names, genre_pipeline, sort_document,
    CountRow, GenreRow,
};
use super::{BookFilter, DocumentCollection, RemoteResult};
use crate::config::RemoteConfig;
use crate::error::RemoteError;

/// Parsed connection secret: `https://<api-key>@<host>/<data-api-path>`.
///
/// An optional `dataSource` query parameter overrides the configured data
/// source.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub base_url: Url,
    pub api_key: String,
    pub data_source: Option<String>,
}

impl FromStr for ConnectionString {
    type Err = RemoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut url = Url::parse(s.trim())?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(RemoteError::InvalidConnectionString(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        let api_key = urlencoding::decode(url.username())
            .map_err(|err| RemoteError::InvalidConnectionString(err.to_string()))?
            .into_owned();
        if api_key.is_empty() {
            return Err(RemoteError::InvalidConnectionString(
                "missing api key before '@'".to_string(),
            ));
        }

        let data_source = url
            .query_pairs()
            .find(|(key, _)| key == "dataSource")
            .map(|(_, value)| value.into_owned());

        let cleared = url.set_username("").is_ok() && url.set_password(None).is_ok();
        if !cleared {
            return Err(RemoteError::InvalidConnectionString(
                "connection string has no host".to_string(),
            ));
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self {
            base_url: url,
            api_key,
            data_source,
        })
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("data_source", &self.data_source)
            .finish()
    }
}

pub struct DataApiCollection {
    client: Client,
    base_url: Url,
    api_key: String,
    data_source: String,
    database: String,
    collection: String,
}

impl DataApiCollection {
    /// Build the client and confirm the store answers.
    pub fn connect(connection: &ConnectionString, settings: &RemoteConfig) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let collection = Self {
            client,
            base_url: connection.base_url.clone(),
            api_key: connection.api_key.clone(),
            data_source: connection
                .data_source
                .clone()
                .unwrap_or_else(|| settings.data_source.clone()),
            database: settings.database.clone(),
            collection: settings.collection.clone(),
        };
        collection.ping()?;
        tracing::info!(store = %collection.describe(), "connected to remote store");
        Ok(collection)
    }

    fn action_url(&self, action: &str) -> String {
        format!(
            "{}/action/{}",
            self.base_url.as_str().trim_end_matches('/'),
            action
        )
    }

    fn call<T: DeserializeOwned>(&self, action: &str, args: Value) -> RemoteResult<T> {
        let mut body = Map::new();
        body.insert("dataSource".into(), Value::String(self.data_source.clone()));
        body.insert("database".into(), Value::String(self.database.clone()));
        body.insert("collection".into(), Value::String(self.collection.clone()));
        if let Value::Object(args) = args {
            body.extend(args);
        }

        tracing::debug!(action, store = %self.describe(), "remote call");
        let response = self
            .client
            .post(self.action_url(action))
            .header("api-key", &self.api_key)
            .json(&Value::Object(body))
            .send()?;

        let status = response.status().as_u16();
        let text = response.text()?;
        decode_response(status, &text)
    }
}

/// Map a response status and body to the expected payload.
fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> RemoteResult<T> {
    if !(200..300).contains(&status) {
        return Err(RemoteError::Status {
            status,
            body: body.to_string(),
        });
    }
    Ok(serde_json::from_str(body)?)
}

impl DocumentCollection for DataApiCollection {
    fn describe(&self) -> String {
        format!(
            "{}/{}.{}",
            self.base_url.host_str().unwrap_or("?"),
            self.database,
            self.collection
        )
    }

    fn ping(&self) -> RemoteResult<()> {
        let _: FindOneResponse = self.call("findOne", json!({ "filter": {} }))?;
        Ok(())
    }

    fn find(&self, filter: &BookFilter, sort: Option<SortKey>) -> RemoteResult<Vec<RawBook>> {
        let mut args = json!({ "filter": filter_document(filter) });
        if let Some(key) = sort {
            args["sort"] = sort_document(key);
        }
        let response: DocumentsResponse<RawBook> = self.call("find", args)?;
        Ok(response.documents)
    }

    fn find_one(&self, id: &str) -> RemoteResult<Option<RawBook>> {
        let response: FindOneResponse = self.call("findOne", json!({ "filter": { "id": id } }))?;
        Ok(response.document)
    }

    fn insert_one(&self, book: &Book) -> RemoteResult<()> {
        let _: Value = self.call("insertOne", json!({ "document": RawBook::from(book) }))?;
        Ok(())
    }

    fn delete_one(&self, id: &str) -> RemoteResult<u64> {
        let response: DeleteResponse =
            self.call("deleteOne", json!({ "filter": { "id": id } }))?;
        Ok(response.deleted_count)
    }

    fn delete_all(&self) -> RemoteResult<u64> {
        let response: DeleteResponse = self.call("deleteMany", json!({ "filter": {} }))?;
        Ok(response.deleted_count)
    }

    fn set_read(&self, id: &str, read: bool) -> RemoteResult<u64> {
        let response: UpdateResponse = self.call(
            "updateOne",
            json!({ "filter": { "id": id }, "update": { "$set": { "read": read } } }),
        )?;
        Ok(response.matched_count)
    }

    fn count(&self, filter: &BookFilter) -> RemoteResult<u64> {
        let response: DocumentsResponse<CountRow> =
            self.call("aggregate", json!({ "pipeline": count_pipeline(filter) }))?;
        Ok(first_count(&response.documents))
    }

    fn distinct_genres(&self) -> RemoteResult<Vec<String>> {
        let response: DocumentsResponse<GenreRow> =
            self.call("aggregate", json!({ "pipeline": genre_pipeline() }))?;
        Ok(genre_names(response.documents))
    }
}

#[derive(Debug, Deserialize)]
struct DocumentsResponse<T> {
    documents: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct FindOneResponse {
    document: Option<RawBook>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    deleted_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    matched_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_parse_connection_string() {
        let conn: ConnectionString =
            "https://s3cr3t@data.example.com/app/shelf-abc/endpoint/data/v1?dataSource=Books"
                .parse()
                .unwrap();
        assert_eq!(conn.api_key, "s3cr3t");
        assert_eq!(conn.data_source.as_deref(), Some("Books"));
        assert_eq!(
            conn.base_url.as_str(),
            "https://data.example.com/app/shelf-abc/endpoint/data/v1"
        );
    }

    #[test]
    fn test_connection_string_key_is_percent_decoded() {
        let conn: ConnectionString = "https://a%2Bb@data.example.com/v1".parse().unwrap();
        assert_eq!(conn.api_key, "a+b");
        assert!(conn.data_source.is_none());
    }

    #[test]
    fn test_connection_string_rejects() {
        assert!("https://data.example.com/v1".parse::<ConnectionString>().is_err());
        assert!("mongodb+srv://user:pw@cluster0.example.net"
            .parse::<ConnectionString>()
            .is_err());
        assert!("not a url".parse::<ConnectionString>().is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let conn: ConnectionString = "https://s3cr3t@data.example.com/v1".parse().unwrap();
        let debug = format!("{conn:?}");
        assert!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn test_decode_find_response() {
        let body = r#"{"documents": [
            {"_id": "65f0c0ffee", "id": "b1", "title": "Dune", "year": 1965, "read": true},
            {"title": "Legacy", "year": "1901"}
        ]}"#;
        let response: DocumentsResponse<RawBook> = decode_response(200, body).unwrap();
        assert_eq!(response.documents.len(), 2);
        assert_eq!(response.documents[0].id.as_deref(), Some("b1"));
        assert_eq!(response.documents[1].year, Some(1901));
        assert!(response.documents[1].read.is_none());
    }

    #[test]
    fn test_decode_find_one_missing() {
        let response: FindOneResponse = decode_response(200, r#"{"document": null}"#).unwrap();
        assert!(response.document.is_none());
    }

    #[test]
    fn test_decode_write_counts() {
        let deleted: DeleteResponse = decode_response(200, r#"{"deletedCount": 3}"#).unwrap();
        assert_eq!(deleted.deleted_count, 3);

        let updated: UpdateResponse =
            decode_response(200, r#"{"matchedCount": 1, "modifiedCount": 0}"#).unwrap();
        assert_eq!(updated.matched_count, 1);
    }

    #[test]
    fn test_decode_aggregate_rows() {
        let counts: DocumentsResponse<CountRow> =
            decode_response(200, r#"{"documents": []}"#).unwrap();
        assert_eq!(first_count(&counts.documents), 0);

        let counts: DocumentsResponse<CountRow> =
            decode_response(200, r#"{"documents": [{"n": 12}]}"#).unwrap();
        assert_eq!(first_count(&counts.documents), 12);

        let genres: DocumentsResponse<GenreRow> =
            decode_response(200, r#"{"documents": [{"_id": null}, {"_id": "Sci-Fi"}]}"#).unwrap();
        assert_eq!(genre_names(genres.documents), vec!["Sci-Fi"]);
    }

    #[test]
    fn test_decode_error_status_keeps_body() {
        let result: RemoteResult<DeleteResponse> =
            decode_response(401, r#"{"error": "invalid session"}"#);
        match result {
            Err(RemoteError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid session"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_unexpected_shape() {
        let result: RemoteResult<DeleteResponse> = decode_response(200, r#"{"ok": 1}"#);
        assert!(matches!(result, Err(RemoteError::Decode(_))));
    }

    #[test]
    fn test_connect_to_closed_port_fails() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let conn: ConnectionString = format!("http://key@127.0.0.1:{port}/v1").parse().unwrap();
        let settings = RemoteConfig {
            timeout_secs: 2,
            ..RemoteConfig::default()
        };
        assert!(DataApiCollection::connect(&conn, &settings).is_err());
    }
}
