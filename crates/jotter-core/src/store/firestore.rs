//! Cloud Firestore (REST v1) document store.
//!
//! The REST surface has no push listener, so live queries poll `runQuery`
//! and only forward a batch when the owner's result set changed.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::MissedTickBehavior;
use url::Url;

use super::{DocumentStore, StoreError, StoreResult, Subscription};
use crate::auth::AccessTokenSource;
use crate::models::{Note, NoteId, NoteWrite};
use crate::util::is_http_url;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";
pub const DEFAULT_COLLECTION: &str = "notes";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Notes collection in one Firestore database.
#[derive(Clone)]
pub struct FirestoreStore {
    client: Client,
    base_url: String,
    api_key: String,
    database_path: String,
    collection: String,
    poll_interval: Duration,
    tokens: Option<Arc<dyn AccessTokenSource>>,
}

impl FirestoreStore {
    pub fn new(
        project_id: impl AsRef<str>,
        database: impl AsRef<str>,
        api_key: impl AsRef<str>,
    ) -> StoreResult<Self> {
        Self::with_base_url(FIRESTORE_URL, project_id, database, api_key)
    }

    /// Point the store at another endpoint, e.g. the Firestore emulator.
    pub fn with_base_url(
        base_url: impl AsRef<str>,
        project_id: impl AsRef<str>,
        database: impl AsRef<str>,
        api_key: impl AsRef<str>,
    ) -> StoreResult<Self> {
        let base_url = base_url.as_ref().trim().trim_end_matches('/');
        if !is_http_url(base_url) {
            return Err(StoreError::InvalidConfiguration(
                "Firestore endpoint must include http:// or https://".to_string(),
            ));
        }
        let project_id = required("Firebase project id", project_id.as_ref())?;
        let database = required("Firestore database", database.as_ref())?;
        let api_key = required("Firebase API key", api_key.as_ref())?;

        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.to_string(),
            api_key,
            database_path: format!("projects/{project_id}/databases/{database}/documents"),
            collection: DEFAULT_COLLECTION.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            tokens: None,
        })
    }

    #[must_use]
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(100));
        self
    }

    /// Authenticate requests with bearer tokens from `tokens`.
    #[must_use]
    pub fn with_token_source(mut self, tokens: Arc<dyn AccessTokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    fn documents_url(&self) -> String {
        format!("{}/{}", self.base_url, self.database_path)
    }

    /// REST URL of one note; the id is percent-encoded as a single segment.
    fn document_url(&self, id: &NoteId) -> StoreResult<Url> {
        let mut url = Url::parse(&self.documents_url()).map_err(|error| {
            StoreError::InvalidConfiguration(format!("invalid Firestore endpoint: {error}"))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::InvalidConfiguration(format!(
                    "Firestore endpoint cannot take a path: {}",
                    self.base_url
                ))
            })?
            .push(&self.collection)
            .push(id.as_str());
        Ok(url)
    }

    fn document_name(&self, id: &NoteId) -> String {
        format!("{}/{}/{}", self.database_path, self.collection, id)
    }

    async fn authorize(&self, request: RequestBuilder) -> StoreResult<RequestBuilder> {
        let request = request.query(&[("key", &self.api_key)]);
        let Some(tokens) = &self.tokens else {
            return Ok(request);
        };
        Ok(match tokens.access_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    /// One-shot read of every note owned by `uid`.
    pub async fn query_owned(&self, uid: &str) -> StoreResult<Vec<Note>> {
        let payload = owner_query(&self.collection, uid);
        let request = self
            .client
            .post(format!("{}:runQuery", self.documents_url()))
            .json(&payload);
        let request = self.authorize(request).await?;

        let rows: Vec<RunQueryRow> = send_json(request).await?;
        rows.into_iter()
            .filter_map(|row| row.document)
            .map(decode_document)
            .collect()
    }

    async fn commit(&self, write: Value) -> StoreResult<()> {
        let request = self
            .client
            .post(format!("{}:commit", self.documents_url()))
            .json(&json!({ "writes": [write] }));
        let request = self.authorize(request).await?;
        let _: Value = send_json(request).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn subscribe_owned(&self, uid: &str) -> StoreResult<Subscription> {
        let (tx, builder) = Subscription::channel(uid);
        let store = self.clone();
        let owner = uid.to_string();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(store.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last: Option<Vec<Note>> = None;

            loop {
                ticker.tick().await;
                match store.query_owned(&owner).await {
                    Ok(notes) => {
                        if last.as_ref() == Some(&notes) {
                            continue;
                        }
                        if tx.send(Ok(notes.clone())).await.is_err() {
                            break;
                        }
                        last = Some(notes);
                    }
                    Err(error) => {
                        tracing::warn!("Live query for {} failed: {}", owner, error);
                        let _ = tx.send(Err(error)).await;
                        break;
                    }
                }
            }
        });

        Ok(builder.driven_by(task))
    }

    async fn get(&self, id: &NoteId) -> StoreResult<Option<Note>> {
        let request = self.client.get(self.document_url(id)?);
        let request = self.authorize(request).await?;

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let document: FirestoreDocument = read_json(response).await?;
        let note = decode_document(document)?;
        if &note.id != id {
            tracing::warn!("Requested note {} but the store answered with {}", id, note.id);
            return Ok(None);
        }
        Ok(Some(note))
    }

    async fn insert(&self, write: &NoteWrite) -> StoreResult<NoteId> {
        let id = NoteId::generate();
        self.commit(json!({
            "update": {
                "name": self.document_name(&id),
                "fields": encode_fields(write),
            },
            "currentDocument": { "exists": false },
            "updateTransforms": [
                server_time("createdAt"),
                server_time("updatedAt"),
            ],
        }))
        .await?;
        tracing::debug!("Inserted note {}", id);
        Ok(id)
    }

    async fn merge(&self, id: &NoteId, write: &NoteWrite) -> StoreResult<()> {
        self.commit(json!({
            "update": {
                "name": self.document_name(id),
                "fields": encode_fields(write),
            },
            "updateMask": { "fieldPaths": ["title", "content", "uid"] },
            "updateTransforms": [server_time("updatedAt")],
        }))
        .await?;
        tracing::debug!("Merged note {}", id);
        Ok(())
    }
}

fn required(label: &str, value: &str) -> StoreResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::InvalidConfiguration(format!(
            "{label} must not be empty"
        )));
    }
    Ok(value.to_string())
}

fn owner_query(collection: &str, uid: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "uid" },
                    "op": "EQUAL",
                    "value": { "stringValue": uid },
                }
            }
        }
    })
}

fn server_time(field: &str) -> Value {
    json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" })
}

fn encode_fields(write: &NoteWrite) -> Value {
    json!({
        "title": { "stringValue": write.title },
        "content": { "stringValue": write.content },
        "uid": { "stringValue": write.uid },
    })
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: BTreeMap<String, Value>,
}

fn decode_document(document: FirestoreDocument) -> StoreResult<Note> {
    let id = document
        .name
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .parse::<NoteId>()
        .map_err(|_| StoreError::InvalidDocument(document.name.clone()))?;
    let fields = &document.fields;

    Ok(Note {
        id,
        title: string_field(fields, "title").unwrap_or_default(),
        content: string_field(fields, "content").unwrap_or_default(),
        uid: string_field(fields, "uid").unwrap_or_default(),
        created_at: timestamp_field(fields, "createdAt"),
        updated_at: timestamp_field(fields, "updatedAt"),
    })
}

fn string_field(fields: &BTreeMap<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(ToString::to_string)
}

/// Server timestamps come back as RFC 3339 text. Integer values are taken as
/// Unix milliseconds. Anything else reads as "not yet resolved".
fn timestamp_field(fields: &BTreeMap<String, Value>, key: &str) -> Option<i64> {
    let value = fields.get(key)?;
    if let Some(raw) = value.get("timestampValue").and_then(Value::as_str) {
        return DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|moment| moment.timestamp_millis());
    }
    value
        .get("integerValue")
        .and_then(Value::as_str)
        .and_then(|raw| raw.parse::<i64>().ok())
}

async fn send_json<T: serde::de::DeserializeOwned>(request: RequestBuilder) -> StoreResult<T> {
    read_json(request.send().await?).await
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> StoreResult<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(parse_api_error(status, &body));
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorResponse {
    error: FirestoreErrorBody,
}

#[derive(Debug, Deserialize)]
struct FirestoreErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> StoreError {
    if let Ok(payload) = serde_json::from_str::<FirestoreErrorResponse>(body) {
        let message = payload
            .error
            .message
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty());
        if let Some(message) = message {
            return match payload.error.status {
                Some(code) => StoreError::Api(format!("{message} ({code})")),
                None => StoreError::Api(format!("{message} ({})", status.as_u16())),
            };
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        StoreError::Api(format!("HTTP {}", status.as_u16()))
    } else {
        StoreError::Api(format!("{} ({})", trimmed, status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    fn document(raw: &str) -> FirestoreDocument {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn decodes_document_fields_and_server_timestamps() {
        let note = decode_document(document(
            r#"{
                "name": "projects/p/databases/(default)/documents/notes/abc123",
                "fields": {
                    "title": {"stringValue": "<b>Groceries</b>"},
                    "content": {"stringValue": "Milk"},
                    "uid": {"stringValue": "u1"},
                    "createdAt": {"timestampValue": "2024-03-05T14:07:00Z"},
                    "updatedAt": {"timestampValue": "2024-03-05T14:07:00.250Z"}
                },
                "createTime": "2024-03-05T14:07:00Z",
                "updateTime": "2024-03-05T14:07:00Z"
            }"#,
        ))
        .unwrap();

        assert_eq!(note.id.as_str(), "abc123");
        assert_eq!(note.title, "<b>Groceries</b>");
        assert_eq!(note.content, "Milk");
        assert_eq!(note.uid, "u1");
        assert_eq!(note.created_at, Some(1_709_647_620_000));
        assert_eq!(note.updated_at, Some(1_709_647_620_250));
    }

    #[test]
    fn missing_fields_decode_to_defaults() {
        let note = decode_document(document(
            r#"{"name": "projects/p/databases/(default)/documents/notes/n1"}"#,
        ))
        .unwrap();
        assert_eq!(note.title, "");
        assert_eq!(note.content, "");
        assert_eq!(note.updated_at, None);
        assert_eq!(note.recency(), 0);
    }

    #[test]
    fn unreadable_timestamps_are_treated_as_missing() {
        let note = decode_document(document(
            r#"{
                "name": "projects/p/databases/(default)/documents/notes/n1",
                "fields": {
                    "updatedAt": {"timestampValue": "yesterday"},
                    "createdAt": {"nullValue": null}
                }
            }"#,
        ))
        .unwrap();
        assert_eq!(note.updated_at, None);
        assert_eq!(note.created_at, None);
    }

    #[test]
    fn integer_timestamps_are_milliseconds() {
        let note = decode_document(document(
            r#"{
                "name": "projects/p/databases/(default)/documents/notes/n1",
                "fields": {"updatedAt": {"integerValue": "1700000000000"}}
            }"#,
        ))
        .unwrap();
        assert_eq!(note.updated_at, Some(1_700_000_000_000));
    }

    #[test]
    fn run_query_rows_without_documents_are_skipped() {
        let rows: Vec<RunQueryRow> =
            serde_json::from_str(r#"[{"readTime": "2024-03-05T14:07:00Z"}]"#).unwrap();
        assert!(rows.into_iter().all(|row| row.document.is_none()));
    }

    #[test]
    fn owner_query_filters_on_uid() {
        let query = owner_query("notes", "u1");
        assert_eq!(
            query["structuredQuery"]["where"]["fieldFilter"]["value"]["stringValue"],
            "u1"
        );
        assert_eq!(
            query["structuredQuery"]["from"][0]["collectionId"],
            "notes"
        );
    }

    #[test]
    fn encode_fields_carries_only_written_fields() {
        let fields = encode_fields(&NoteWrite::new("", "Milk", "u1"));
        assert_eq!(fields["title"]["stringValue"], "Untitled");
        assert_eq!(fields["content"]["stringValue"], "Milk");
        assert!(fields.get("updatedAt").is_none());
    }

    #[test]
    fn document_names_are_scoped_to_collection() {
        let store = FirestoreStore::new("demo", DEFAULT_DATABASE, "key")
            .unwrap()
            .with_collection("drafts");
        let id: NoteId = "abc".parse().unwrap();
        assert_eq!(
            store.document_name(&id),
            "projects/demo/databases/(default)/documents/drafts/abc"
        );
    }

    /// Answer one HTTP request with `status` and `body`, yielding the request
    /// line and body the client sent.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/v1", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut chunk = [0_u8; 4096];
            let header_end = loop {
                let read = socket.read(&mut chunk).await.unwrap();
                assert!(read > 0, "client closed before sending headers");
                received.extend_from_slice(&chunk[..read]);
                if let Some(at) = received.windows(4).position(|w| w == b"\r\n\r\n") {
                    break at + 4;
                }
            };
            let head = String::from_utf8_lossy(&received[..header_end]).into_owned();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while received.len() < header_end + content_length {
                let read = socket.read(&mut chunk).await.unwrap();
                assert!(read > 0, "client closed mid-body");
                received.extend_from_slice(&chunk[..read]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            let request_line = head.lines().next().unwrap_or_default().to_string();
            let request_body = String::from_utf8_lossy(&received[header_end..]).into_owned();
            format!("{request_line}\n{request_body}")
        });
        (base_url, server)
    }

    fn store_at(base_url: &str) -> FirestoreStore {
        FirestoreStore::with_base_url(base_url, "demo", DEFAULT_DATABASE, "key").unwrap()
    }

    fn stored_document(id: &str, title: &str) -> String {
        json!({
            "name": format!("projects/demo/databases/(default)/documents/notes/{id}"),
            "fields": {
                "title": {"stringValue": title},
                "content": {"stringValue": "body"},
                "uid": {"stringValue": "u1"},
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn get_reads_the_named_document() {
        let (base_url, server) = serve_once("200 OK", stored_document("abc", "Groceries")).await;
        let id: NoteId = "abc".parse().unwrap();

        let note = store_at(&base_url).get(&id).await.unwrap().unwrap();
        let request = server.await.unwrap();

        assert_eq!(note.title, "Groceries");
        assert!(
            request.starts_with(
                "GET /v1/projects/demo/databases/(default)/documents/notes/abc?key=key "
            ),
            "{request}"
        );
    }

    #[tokio::test]
    async fn get_encodes_query_characters_in_the_id() {
        let cases = [
            ("abc?x=1", "notes/abc%3Fx=1?key=key"),
            ("abc#frag", "notes/abc%23frag?key=key"),
            ("abc%2F..", "notes/abc%252F..?key=key"),
        ];
        for (raw, encoded) in cases {
            let (base_url, server) = serve_once("200 OK", stored_document("abc", "Secret")).await;
            let id: NoteId = raw.parse().unwrap();

            let result = store_at(&base_url).get(&id).await.unwrap();
            let request = server.await.unwrap();

            assert!(request.contains(encoded), "{request}");
            assert_eq!(result, None, "{raw} must not load another note");
        }
    }

    #[tokio::test]
    async fn get_treats_missing_document_as_none() {
        let body = r#"{"error":{"code":404,"message":"not found","status":"NOT_FOUND"}}"#;
        let (base_url, server) = serve_once("404 Not Found", body.to_string()).await;
        let id: NoteId = "gone".parse().unwrap();

        assert_eq!(store_at(&base_url).get(&id).await.unwrap(), None);
        assert!(server.await.unwrap().contains("documents/notes/gone"));
    }

    #[tokio::test]
    async fn query_owned_posts_owner_filter() {
        let rows = format!(
            r#"[{{"document": {}}}, {{"readTime": "2024-03-05T14:07:00Z"}}]"#,
            stored_document("n1", "Mine")
        );
        let (base_url, server) = serve_once("200 OK", rows).await;

        let notes = store_at(&base_url).query_owned("u1").await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id.as_str(), "n1");
        assert!(request.starts_with(
            "POST /v1/projects/demo/databases/(default)/documents:runQuery?key=key "
        ));
        assert!(request.contains(r#""stringValue":"u1""#), "{request}");
    }

    #[tokio::test]
    async fn merge_commits_with_update_mask() {
        let (base_url, server) = serve_once("200 OK", "{}".to_string()).await;
        let id: NoteId = "n1".parse().unwrap();

        store_at(&base_url)
            .merge(&id, &NoteWrite::new("Title", "Body", "u1"))
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with(
            "POST /v1/projects/demo/databases/(default)/documents:commit?key=key "
        ));
        assert!(request.contains("documents/notes/n1"), "{request}");
        assert!(request.contains(r#""fieldPaths":["title","content","uid"]"#), "{request}");
    }

    #[tokio::test]
    async fn insert_requires_a_fresh_document() {
        let (base_url, server) = serve_once("200 OK", "{}".to_string()).await;

        let id = store_at(&base_url)
            .insert(&NoteWrite::new("", "Body", "u1"))
            .await
            .unwrap();
        let request = server.await.unwrap();

        assert!(request.contains(&format!("documents/notes/{id}")), "{request}");
        assert!(request.contains(r#""exists":false"#), "{request}");
        assert!(request.contains(r#""stringValue":"Untitled""#), "{request}");
    }

    #[test]
    fn rejects_blank_configuration() {
        assert!(matches!(
            FirestoreStore::new(" ", DEFAULT_DATABASE, "key"),
            Err(StoreError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            FirestoreStore::with_base_url("localhost:8080", "demo", DEFAULT_DATABASE, "key"),
            Err(StoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn parse_api_error_prefers_reported_message() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        let error = parse_api_error(StatusCode::FORBIDDEN, body);
        assert_eq!(
            error.to_string(),
            "Missing or insufficient permissions. (PERMISSION_DENIED)"
        );

        let error = parse_api_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(error.to_string(), "HTTP 503");
    }
}
