//! Typed client for the backend's production and QR endpoints.
//!
//! Status mapping: 400/422 are validation errors, 401/403 unauthorized,
//! 404 not found, any other non-2xx a service error. Bodies that do not
//! decode are [`ErpError::Malformed`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use super::credentials::CredentialProvider;
use super::error::ErpError;
use super::types::{Envelope, StageUpdate};
use crate::print::PrintArtifact;
use crate::production::{JobCard, NewJobCard, Stage};

/// Backend root used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// The production and QR operations the backend exposes.
///
/// Implemented by [`ErpClient`] for real calls and by in-memory fakes in tests.
#[allow(async_fn_in_trait)]
pub trait ProductionApi {
    /// `None` lists every job card; `Some(stage)` filters server-side.
    async fn list_job_cards(&self, stage: Option<Stage>) -> Result<Vec<JobCard>, ErpError>;

    async fn advance_job_card_stage(
        &self,
        job_card_id: i64,
        new_stage: Stage,
    ) -> Result<JobCard, ErpError>;

    async fn get_print_data(&self, job_card_number: &str) -> Result<PrintArtifact, ErpError>;

    async fn create_job_card(&self, spec: &NewJobCard) -> Result<JobCard, ErpError>;
}

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Time allowed to open the TCP/TLS connection.
    pub connect: Duration,
    /// Time allowed for the whole exchange, body included.
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            request: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the ERP backend's production and QR endpoints.
///
/// Every request carries a fresh `x-request-id` and, when the credential
/// provider has one, a bearer token. Responses are unwrapped from the
/// backend's envelope and mapped onto [`ErpError`].
pub struct ErpClient {
    client: Client,
    /// Root of the REST API, e.g. `http://localhost:5000/api`.
    base_url: Url,
    /// Asked for a token on every request, so rotated tokens are picked up.
    credentials: Arc<dyn CredentialProvider>,
}

impl ErpClient {
    /// Builds a client rooted at `base_url`.
    ///
    /// Fails with [`ErpError::InvalidBaseUrl`] for anything that is not an
    /// absolute hierarchical URL.
    pub fn new(
        base_url: &str,
        credentials: Arc<dyn CredentialProvider>,
        timeouts: Timeouts,
    ) -> Result<Self, ErpError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| ErpError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ErpError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not a hierarchical URL".into(),
            });
        }
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .build()?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Sends `request` and decodes the envelope's `data` as `T`.
    ///
    /// `context` names the operation in log lines and error messages.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, ErpError> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = request.header("x-request-id", &request_id);
        if let Some(token) = self.credentials.bearer_token()? {
            request = request.bearer_auth(token);
        }

        debug!(%request_id, context, "sending backend request");
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%request_id, status = status.as_u16(), "backend responded");

        if !status.is_success() {
            let err = error_for_status(status, &body, context);
            warn!(%request_id, error = %err, "backend request failed");
            return Err(err);
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| ErpError::Malformed(format!("{context}: {e}")))?;
        if !envelope.success {
            return Err(ErpError::Service {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("{context} was rejected")),
            });
        }
        envelope
            .data
            .ok_or_else(|| ErpError::Malformed(format!("{context}: response has no data")))
    }
}

impl ProductionApi for ErpClient {
    async fn list_job_cards(&self, stage: Option<Stage>) -> Result<Vec<JobCard>, ErpError> {
        let mut request = self
            .client
            .get(self.endpoint(&["production", "job-cards"]));
        if let Some(stage) = stage {
            request = request.query(&[("stage", stage.as_str())]);
        }
        self.send(request, "job card listing").await
    }

    async fn advance_job_card_stage(
        &self,
        job_card_id: i64,
        new_stage: Stage,
    ) -> Result<JobCard, ErpError> {
        let id = job_card_id.to_string();
        let request = self
            .client
            .put(self.endpoint(&["production", "job-cards", &id, "stage"]))
            .json(&StageUpdate { stage: new_stage });
        self.send(request, &format!("job card {job_card_id}")).await
    }

    async fn get_print_data(&self, job_card_number: &str) -> Result<PrintArtifact, ErpError> {
        let request = self.client.get(self.endpoint(&[
            "qr",
            "job-card",
            job_card_number,
            "print-data",
        ]));
        self.send(request, &format!("job card {job_card_number}"))
            .await
    }

    async fn create_job_card(&self, spec: &NewJobCard) -> Result<JobCard, ErpError> {
        let request = self
            .client
            .post(self.endpoint(&["production", "job-cards"]))
            .json(spec);
        self.send(request, "job card creation").await
    }
}

/// Maps a non-success HTTP status to an [`ErpError`], preferring the
/// backend's own `message`/`error` text when the body carries one.
fn error_for_status(status: StatusCode, body: &str, context: &str) -> ErpError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .or_else(|| {
            let text = body.trim();
            (!text.is_empty() && text.len() <= 200).then(|| text.to_string())
        })
        .unwrap_or_else(|| {
            format!(
                "{context}: {}",
                status.canonical_reason().unwrap_or("request failed")
            )
        });

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErpError::Validation(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErpError::Unauthorized(message),
        StatusCode::NOT_FOUND => ErpError::NotFound(message),
        _ => ErpError::Service {
            status: status.as_u16(),
            message,
        },
    }
}
