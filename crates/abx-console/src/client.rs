//! HTTP client for the experiment endpoints of the backend.
//!
//! Requests are sent once. A failed request is logged and surfaced as a
//! [`ClientError`]; nothing is retried.

use std::str::FromStr;
use std::time::Duration;

use abx_protocol::{
    experiment_path, experiment_results_path, ndjson, Experiment, ExperimentResults, Page,
    PageRequest, ProtocolError, CLIENT_ID_HEADER, CLIENT_SECRET_HEADER,
    EVENT_EXPERIMENT_CREATED, EVENT_EXPERIMENT_DELETED, EVENT_EXPERIMENT_UPDATED,
    EXPERIMENTS_NDJSON_PATH, EXPERIMENTS_PATH, EXPERIMENT_EVENTS_NDJSON_PATH,
};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Bulk export/import resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NdjsonKind {
    Experiments,
    Events,
}

impl NdjsonKind {
    pub fn path(self) -> &'static str {
        match self {
            NdjsonKind::Experiments => EXPERIMENTS_NDJSON_PATH,
            NdjsonKind::Events => EXPERIMENT_EVENTS_NDJSON_PATH,
        }
    }
}

impl std::fmt::Display for NdjsonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NdjsonKind::Experiments => "experiments",
            NdjsonKind::Events => "events",
        };
        write!(f, "{s}")
    }
}

impl FromStr for NdjsonKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "experiments" => Ok(NdjsonKind::Experiments),
            "events" => Ok(NdjsonKind::Events),
            other => Err(format!("unknown export kind '{other}', expected experiments or events")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl ExperimentClient {
    pub fn new(config: &ServerConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let credentials = match (&config.client_id, &config.client_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        };
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some((id, secret)) = &self.credentials {
            builder = builder
                .header(CLIENT_ID_HEADER, id)
                .header(CLIENT_SECRET_HEADER, secret);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), url = %url, "experiment backend request failed");
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let builder = builder.header(reqwest::header::ACCEPT, "application/json");
        Ok(self.send(builder).await?.json::<T>().await?)
    }

    /// One page of experiments whose key matches the request's search terms.
    pub async fn list(&self, request: &PageRequest) -> Result<Page<Experiment>, ClientError> {
        let builder = self.request(Method::GET, EXPERIMENTS_PATH).query(&[
            ("pattern", request.pattern()),
            ("page", request.page.to_string()),
            ("pageSize", request.page_size.to_string()),
        ]);
        self.send_json(builder).await
    }

    pub async fn fetch(&self, id: &str) -> Result<Experiment, ClientError> {
        self.send_json(self.request(Method::GET, &experiment_path(id))).await
    }

    pub async fn create(&self, experiment: &Experiment) -> Result<Experiment, ClientError> {
        let builder = self.request(Method::POST, EXPERIMENTS_PATH).json(experiment);
        let created = self.send_json(builder).await?;
        tracing::info!(event = EVENT_EXPERIMENT_CREATED, experiment = %experiment.id, "experiment created");
        Ok(created)
    }

    /// Replace the experiment stored under `id`.
    pub async fn update(&self, id: &str, experiment: &Experiment) -> Result<Experiment, ClientError> {
        let builder = self.request(Method::PUT, &experiment_path(id)).json(experiment);
        let updated = self.send_json(builder).await?;
        tracing::info!(
            event = EVENT_EXPERIMENT_UPDATED,
            experiment = %id,
            variants = experiment.variants.len(),
            "experiment updated"
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.send(self.request(Method::DELETE, &experiment_path(id))).await?;
        tracing::info!(event = EVENT_EXPERIMENT_DELETED, experiment = %id, "experiment deleted");
        Ok(())
    }

    /// Toggle an experiment on or off, keeping the rest of it as stored.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<Experiment, ClientError> {
        let mut experiment = self.fetch(id).await?;
        experiment.enabled = enabled;
        self.update(id, &experiment).await
    }

    pub async fn results(&self, id: &str) -> Result<ExperimentResults, ClientError> {
        self.send_json(self.request(Method::GET, &experiment_results_path(id))).await
    }

    /// Download an ndjson export.
    pub async fn export(&self, kind: NdjsonKind) -> Result<String, ClientError> {
        let builder = self
            .request(Method::GET, kind.path())
            .header(reqwest::header::ACCEPT, "application/nd-json");
        Ok(self.send(builder).await?.text().await?)
    }

    /// Upload an ndjson body. Returns the backend's import report.
    ///
    /// Experiment exports are decoded locally first so a malformed line is
    /// reported before anything reaches the backend.
    pub async fn import(&self, kind: NdjsonKind, body: String) -> Result<serde_json::Value, ClientError> {
        let records = match kind {
            NdjsonKind::Experiments => ndjson::decode::<Experiment>(&body)?.len(),
            NdjsonKind::Events => ndjson::count_records(&body),
        };
        let builder = self
            .request(Method::POST, kind.path())
            .header(reqwest::header::CONTENT_TYPE, "application/nd-json")
            .body(body);
        let report = self.send_json(builder).await?;
        tracing::info!(kind = %kind, records, "ndjson import uploaded");
        Ok(report)
    }
}
