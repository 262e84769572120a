// ABOUTME: HTTP adapter for the hosted record service
// ABOUTME: Serializes structured predicates and surfaces server rejections as typed errors

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SyncError;
use crate::records::{Record, RecordCollection};
use crate::stores::{FieldPredicate, Layer, RemoteStore};

#[derive(Debug, Deserialize)]
struct LayersResponse {
    layers: Vec<Layer>,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    fields: Vec<String>,
    records: Vec<Record>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    field: &'a str,
    values: &'a [String],
}

#[derive(Debug, Serialize)]
struct InsertRequest<'a> {
    records: &'a [Record],
}

#[derive(Debug, Deserialize)]
struct MutationResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// JSON client for a hosted record service.
///
/// Endpoints:
/// - `GET  {base}/layers`
/// - `GET  {layer}/records`
/// - `POST {layer}/records/delete`
/// - `POST {layer}/records/insert`
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(base_url: String, api_key: Option<String>) -> Result<Self, SyncError> {
        // Reject malformed service URLs up front rather than on first request
        url::Url::parse(&base_url)
            .map_err(|e| SyncError::ConnectionFailure(format!("invalid service URL: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SyncError::ConnectionFailure(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    async fn post_mutation<T: Serialize>(
        &self,
        url: &str,
        operation: &str,
        body: &T,
    ) -> Result<(), SyncError> {
        let request = self.with_auth(self.client.post(url).json(body));
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::apply(operation, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::apply(
                operation,
                format!("service returned {status}: {body}"),
            ));
        }

        let outcome: MutationResponse = response
            .json()
            .await
            .map_err(|e| SyncError::apply(operation, format!("unparseable response: {e}")))?;
        if !outcome.success {
            return Err(SyncError::apply(
                operation,
                outcome.error.unwrap_or_else(|| "unspecified error".to_string()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_layers(&self) -> Result<Vec<Layer>, SyncError> {
        let url = format!("{}/layers", self.base_url);
        let request = self.with_auth(self.client.get(&url));
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::ConnectionFailure(e.to_string()))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SyncError::ConnectionFailure(
                "authentication failed; check the API key".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(SyncError::ConnectionFailure(format!(
                "listing layers returned {}",
                response.status()
            )));
        }

        let parsed: LayersResponse = response
            .json()
            .await
            .map_err(|e| SyncError::ConnectionFailure(format!("unparseable layer list: {e}")))?;
        Ok(parsed.layers)
    }

    async fn fetch_records(&self, layer: &Layer) -> Result<RecordCollection, SyncError> {
        let url = format!("{}/records", layer.url.trim_end_matches('/'));
        let request = self.with_auth(self.client.get(&url));
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::ConnectionFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SyncError::ConnectionFailure(format!(
                "fetching '{}' returned {}",
                layer.name,
                response.status()
            )));
        }

        let parsed: RecordsResponse = response.json().await.map_err(|e| {
            SyncError::ConnectionFailure(format!("unparseable records for '{}': {e}", layer.name))
        })?;

        Ok(RecordCollection::new(
            layer.name.clone(),
            parsed.fields,
            parsed.records,
        ))
    }

    async fn delete_records(
        &self,
        layer_url: &str,
        predicate: &FieldPredicate,
    ) -> Result<(), SyncError> {
        let url = format!("{}/records/delete", layer_url.trim_end_matches('/'));
        let body = DeleteRequest {
            field: &predicate.field,
            values: &predicate.values,
        };
        tracing::debug!(
            "Deleting {} record(s) where {} matches",
            predicate.values.len(),
            predicate.field
        );
        self.post_mutation(&url, "delete", &body).await
    }

    async fn insert_records(&self, layer_url: &str, records: &[Record]) -> Result<(), SyncError> {
        if records.is_empty() {
            return Ok(());
        }
        let url = format!("{}/records/insert", layer_url.trim_end_matches('/'));
        let body = InsertRequest { records };
        tracing::debug!("Inserting {} record(s)", records.len());
        self.post_mutation(&url, "insert", &body).await
    }
}
