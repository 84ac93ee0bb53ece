//! Firestore document store over the REST v1 API.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::google_auth::{GoogleAuthError, ServiceAccountTokenSource};
use super::{generate_id, CollectionPath, Direction, Document, DocumentQuery, DocumentStore};
use crate::error::{classify_backend_message, StoreError};
use crate::metrics::StoreTimer;

const BACKEND: &str = "firestore";
const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub database_id: String,
    /// API root, e.g. `https://firestore.googleapis.com/v1` or an emulator.
    pub base_url: String,
    /// Service account key JSON or a path to it. Without it requests are
    /// sent unauthenticated, which only the emulator accepts.
    pub credentials: Option<String>,
    pub timeout_ms: u64,
}

enum Auth {
    Anonymous,
    ServiceAccount(ServiceAccountTokenSource),
}

pub struct FirestoreDocumentStore {
    client: Client,
    documents_url: String,
    database_path: String,
    auth: Auth,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    document: Option<FirestoreDocument>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl FirestoreDocumentStore {
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StoreError::Backend(format!("Failed to build HTTP client: {}", e)))?;

        let auth = match config.credentials.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(credentials) => Auth::ServiceAccount(
                ServiceAccountTokenSource::new(client.clone(), credentials, DATASTORE_SCOPE)
                    .map_err(auth_error)?,
            ),
            None => Auth::Anonymous,
        };

        let database_path = format!(
            "projects/{}/databases/{}/documents",
            config.project_id, config.database_id
        );
        Ok(Self {
            documents_url: format!("{}/{}", config.base_url.trim_end_matches('/'), database_path),
            database_path,
            client,
            auth,
        })
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, StoreError> {
        match &self.auth {
            Auth::Anonymous => Ok(request),
            Auth::ServiceAccount(source) => {
                let token = source.token().await.map_err(auth_error)?;
                Ok(request.bearer_auth(token))
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        self.authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("Firestore request failed: {}", e)))
    }

    fn document_url(&self, collection: &CollectionPath, id: &str) -> String {
        format!("{}/{}", self.documents_url, collection.document(id))
    }

    async fn read_document(
        &self,
        collection: &CollectionPath,
        response: Response,
    ) -> Result<Document, StoreError> {
        let doc: FirestoreDocument = response
            .json()
            .await
            .map_err(|e| StoreError::invalid_data(collection.as_str(), e))?;
        Ok(decode_document(doc))
    }
}

fn auth_error(e: GoogleAuthError) -> StoreError {
    StoreError::Backend(format!("Firestore authentication failed: {}", e))
}

/// Converts a failed response into a classified error.
async fn error_from_response(path: &str, response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => format!("{}: {}", envelope.error.status, envelope.error.message),
        Err(_) => format!("HTTP {}: {}", status, body),
    };
    classify_backend_message(path, &message)
}

/// Splits `a/b/c` into the parent document path (`a/b`) and collection id
/// (`c`). Root collections have an empty parent.
fn split_collection(collection: &CollectionPath) -> (&str, &str) {
    match collection.as_str().rsplit_once('/') {
        Some((parent, id)) => (parent, id),
        None => ("", collection.as_str()),
    }
}

fn structured_query(collection_id: &str, query: &DocumentQuery) -> Value {
    let mut structured = json!({ "from": [{ "collectionId": collection_id }] });

    let filters: Vec<Value> = query
        .filters
        .iter()
        .map(|f| {
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": f.field },
                    "op": "EQUAL",
                    "value": encode_value(&f.value),
                }
            })
        })
        .collect();

    match filters.len() {
        0 => {}
        1 => structured["where"] = filters.into_iter().next().unwrap_or(Value::Null),
        _ => {
            structured["where"] = json!({
                "compositeFilter": { "op": "AND", "filters": filters }
            })
        }
    }

    if let Some(order) = &query.order_by {
        let direction = match order.direction {
            Direction::Ascending => "ASCENDING",
            Direction::Descending => "DESCENDING",
        };
        structured["orderBy"] = json!([{
            "field": { "fieldPath": order.field },
            "direction": direction,
        }]);
    }

    if let Some(limit) = query.limit {
        structured["limit"] = json!(limit);
    }
    structured
}

/// Encodes a JSON value in Firestore's typed value format.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or(0.0) }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

pub fn encode_fields(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect()
}

/// Decodes a Firestore typed value back into plain JSON.
pub fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };
    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" => inner.clone(),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Value::from)
            .unwrap_or_else(|| inner.clone()),
        "doubleValue" => inner.clone(),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "geoPointValue" => inner.clone(),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(
            inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .unwrap_or_default(),
        ),
        _ => Value::Null,
    }
}

pub fn decode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields.iter().map(|(k, v)| (k.clone(), decode_value(v))).collect()
}

fn decode_document(doc: FirestoreDocument) -> Document {
    let id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
    Document {
        id,
        data: decode_fields(&doc.fields),
    }
}

#[async_trait]
impl DocumentStore for FirestoreDocumentStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn list(
        &self,
        collection: &CollectionPath,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        let timer = StoreTimer::new(BACKEND, "list");
        let result: Result<Vec<Document>, StoreError> = async {
            let (parent, collection_id) = split_collection(collection);
            let url = if parent.is_empty() {
                format!("{}:runQuery", self.documents_url)
            } else {
                format!("{}/{}:runQuery", self.documents_url, parent)
            };
            let body = json!({ "structuredQuery": structured_query(collection_id, query) });

            let response = self.send(self.client.post(&url).json(&body)).await?;
            if !response.status().is_success() {
                return Err(error_from_response(collection.as_str(), response).await);
            }

            let items: Vec<RunQueryItem> = response
                .json()
                .await
                .map_err(|e| StoreError::invalid_data(collection.as_str(), e))?;
            Ok(items
                .into_iter()
                .filter_map(|item| item.document)
                .map(decode_document)
                .collect())
        }
        .await;
        timer.finish(result)
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let timer = StoreTimer::new(BACKEND, "get");
        let result: Result<Option<Document>, StoreError> = async {
            let url = self.document_url(collection, id);
            let response = self.send(self.client.get(&url)).await?;
            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                s if s.is_success() => self.read_document(collection, response).await.map(Some),
                _ => Err(error_from_response(collection.as_str(), response).await),
            }
        }
        .await;
        timer.finish(result)
    }

    async fn insert(
        &self,
        collection: &CollectionPath,
        id: Option<&str>,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let timer = StoreTimer::new(BACKEND, "insert");
        let result: Result<Document, StoreError> = async {
            let id = id.map(str::to_string).unwrap_or_else(generate_id);
            let url = format!("{}/{}", self.documents_url, collection);
            let request = self
                .client
                .post(&url)
                .query(&[("documentId", id.as_str())])
                .json(&json!({ "fields": encode_fields(&data) }));

            let response = self.send(request).await?;
            if !response.status().is_success() {
                return Err(error_from_response(collection.as_str(), response).await);
            }
            self.read_document(collection, response).await
        }
        .await;
        timer.finish(result)
    }

    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let timer = StoreTimer::new(BACKEND, "set");
        let result: Result<Document, StoreError> = async {
            let request = self
                .client
                .patch(self.document_url(collection, id))
                .json(&json!({ "fields": encode_fields(&data) }));

            let response = self.send(request).await?;
            if !response.status().is_success() {
                return Err(error_from_response(collection.as_str(), response).await);
            }
            self.read_document(collection, response).await
        }
        .await;
        timer.finish(result)
    }

    async fn patch(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, StoreError> {
        let timer = StoreTimer::new(BACKEND, "patch");
        let result: Result<Document, StoreError> = async {
            let mut params: Vec<(&str, &str)> = fields
                .keys()
                .map(|k| ("updateMask.fieldPaths", k.as_str()))
                .collect();
            params.push(("currentDocument.exists", "true"));

            let request = self
                .client
                .patch(self.document_url(collection, id))
                .query(&params)
                .json(&json!({ "fields": encode_fields(&fields) }));

            let response = self.send(request).await?;
            match response.status() {
                StatusCode::NOT_FOUND => Err(StoreError::not_found(collection.as_str(), id)),
                s if s.is_success() => self.read_document(collection, response).await,
                _ => Err(error_from_response(collection.as_str(), response).await),
            }
        }
        .await;
        timer.finish(result)
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<bool, StoreError> {
        let timer = StoreTimer::new(BACKEND, "delete");
        let result: Result<bool, StoreError> = async {
            let request = self
                .client
                .delete(self.document_url(collection, id))
                .query(&[("currentDocument.exists", "true")]);

            let response = self.send(request).await?;
            match response.status() {
                StatusCode::NOT_FOUND => Ok(false),
                s if s.is_success() => Ok(true),
                _ => Err(error_from_response(collection.as_str(), response).await),
            }
        }
        .await;
        timer.finish(result)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = format!("{}:listCollectionIds", self.documents_url);
        let response = self
            .send(self.client.post(&url).json(&json!({ "pageSize": 1 })))
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(&self.database_path, response).await)
        }
    }
}
