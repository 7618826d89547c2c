use consultoria_contact::ContactSubmission;
use serde::{Deserialize, Serialize};

/// Where the contact form posts when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://handlecontactform-oud5hzev5q-uc.a.run.app";

/// Body returned by the intake endpoint on success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

/// What the user is told when a submission does not go through. Status codes
/// and transport details are logged, never returned.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("El servidor no pudo procesar la solicitud.")]
    Rejected,

    #[error("No se pudo conectar con el servidor.")]
    Connection,
}

/// Posts submissions to a single intake endpoint. One request per call, no
/// retry, no timeout beyond the transport's own.
#[derive(Debug, Clone)]
pub struct SubmissionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl Default for SubmissionClient {
    fn default() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }
}

impl SubmissionClient {
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[tracing::instrument(skip_all, fields(endpoint = %self.endpoint))]
    pub async fn submit(&self, submission: &ContactSubmission) -> Result<Ack, SubmissionError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "could not reach contact endpoint");
                SubmissionError::Connection
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "contact endpoint rejected submission");
            return Err(SubmissionError::Rejected);
        }

        response.json::<Ack>().await.map_err(|err| {
            tracing::error!(error = %err, "unreadable response from contact endpoint");
            SubmissionError::Connection
        })
    }
}
