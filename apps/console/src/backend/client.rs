use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::backend::{BackendError, RecordStore};
use crate::models::{Record, RecordKind};
use crate::remarks::log::NewRemark;

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(alias = "error")]
    message: String,
}

/// HTTP client for the CRM backend REST API.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, kind: RecordKind, rest: &str) -> String {
        if rest.is_empty() {
            format!("{}/{}", self.base_url, kind.collection())
        } else {
            format!("{}/{}/{}", self.base_url, kind.collection(), rest)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends once and decodes the JSON body. 404 maps to `NotFound`, any
    /// other non-2xx to `Api` with the backend's message when it sent one.
    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Value, BackendError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.as_u16() == 404 {
            return Err(BackendError::NotFound(what.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            warn!("Backend returned {} for {}: {}", status, what, message);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| BackendError::MalformedResponse(format!("{what}: {e}")))
    }
}

#[async_trait]
impl RecordStore for BackendClient {
    async fn list_records(&self, kind: RecordKind) -> Result<Vec<Record>, BackendError> {
        let url = self.url(kind, "");
        let body = self.send(self.request(Method::GET, &url), kind.segment()).await?;
        let records = records_from_listing(body);
        debug!("Fetched {} {}", records.len(), kind.segment());
        Ok(records)
    }

    async fn append_remark(
        &self,
        kind: RecordKind,
        parent_id: &str,
        remark: &NewRemark,
    ) -> Result<Record, BackendError> {
        let url = self.url(kind, &format!("{parent_id}/remarks"));
        let what = format!("{} {parent_id}", kind.segment());
        let body = self
            .send(self.request(Method::POST, &url).json(remark), &what)
            .await?;
        let record = record_from_body(body)?;
        info!(
            "Appended {} remark to {what} ({} remarks now)",
            remark.status.as_str(),
            record.remarks.len()
        );
        Ok(record)
    }

    async fn deactivate_remark(
        &self,
        kind: RecordKind,
        parent_id: &str,
        sequence: u32,
    ) -> Result<Record, BackendError> {
        let url = self.url(kind, &format!("{parent_id}/remarks/{sequence}"));
        let what = format!("remark {sequence} on {} {parent_id}", kind.segment());
        let body = self
            .send(
                self.request(Method::PATCH, &url)
                    .json(&json!({ "isActive": false })),
                &what,
            )
            .await?;
        info!("Deactivated {what}");
        record_from_body(body)
    }

    async fn delete_record(&self, kind: RecordKind, id: &str) -> Result<(), BackendError> {
        let url = self.url(kind, id);
        let what = format!("{} {id}", kind.segment());
        self.send(self.request(Method::DELETE, &url), &what).await?;
        info!("Deleted {what}");
        Ok(())
    }
}

/// Accepts a bare array or a `{ "data": [...] }` envelope. Anything else
/// degrades to an empty listing; undecodable records are skipped.
pub fn records_from_listing(body: Value) -> Vec<Record> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                warn!("Backend listing has no data array; treating as empty");
                Vec::new()
            }
        },
        _ => {
            warn!("Backend listing is not a JSON array; treating as empty");
            Vec::new()
        }
    };
    items.into_iter().filter_map(Record::from_value).collect()
}

/// Accepts a bare record or a `{ "data": {...} }` envelope.
pub fn record_from_body(body: Value) -> Result<Record, BackendError> {
    let body = match body {
        Value::Object(mut envelope) if envelope.get("data").is_some_and(Value::is_object) => {
            envelope.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    Record::from_value(body)
        .ok_or_else(|| BackendError::MalformedResponse("expected a record with an id".to_string()))
}
