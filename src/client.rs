//! Backend HTTP client
//!
//! One POST per question, JSON in and out, no retries. A non-2xx status is a
//! failure whatever the body says; a 2xx body carrying `error` is one too.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::dispatch::Endpoint;
use crate::error::ClientError;
use crate::models::Mode;

/// Timeout for the doctor connectivity probe
const PROBE_TIMEOUT_SECS: u64 = 5;

/// Seam between the session controller and the network
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(
        &self,
        endpoint: Endpoint,
        request: &RequestEnvelope,
    ) -> Result<ResponseEnvelope, ClientError>;

    /// Run the canned agent demo for `topic` with the selected model
    async fn agent_demo(&self, topic: &str, model_id: &str) -> Result<DemoResponse, ClientError>;
}

/// reqwest-backed implementation
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let response = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout_secs))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// GET /api/models/status, body returned raw. Used by `doctor`.
    pub async fn check_status(&self) -> Result<serde_json::Value, ClientError> {
        let response = self
            .client
            .get(self.url("/api/models/status"))
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, PROBE_TIMEOUT_SECS))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn send(
        &self,
        endpoint: Endpoint,
        request: &RequestEnvelope,
    ) -> Result<ResponseEnvelope, ClientError> {
        tracing::debug!(path = endpoint.path(), mode = request.mode.wire_name(), "POST");
        let envelope: ResponseEnvelope = self.post_json(endpoint.path(), request).await?;
        envelope.into_result()
    }

    async fn agent_demo(&self, topic: &str, model_id: &str) -> Result<DemoResponse, ClientError> {
        let body = DemoRequest {
            topic: topic.to_string(),
            model_id: model_id.to_string(),
        };
        tracing::debug!(path = Endpoint::AgentDemo.path(), topic, "POST");
        let demo: DemoResponse = self.post_json(Endpoint::AgentDemo.path(), &body).await?;
        Ok(DemoResponse {
            answer: demo.answer.into_result()?,
            ..demo
        })
    }
}

// ═══════════════════════════════════════════════════════════════
// API Types
// ═══════════════════════════════════════════════════════════════

/// Body of every question POST
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope {
    #[serde(rename = "pregunta")]
    pub question: String,
    #[serde(rename = "modo")]
    pub mode: Mode,
    #[serde(rename = "modelo")]
    pub model_id: String,
    #[serde(rename = "permitir_red")]
    pub network_allowed: bool,
}

/// Parsed backend reply
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "respuesta", alias = "answer", default)]
    pub answer_text: Option<String>,
    /// Raw mode string; unknown values are kept and rendered as simple
    #[serde(rename = "modo", alias = "mode", default)]
    pub mode_used: Option<String>,
    #[serde(rename = "modelo_usado", alias = "model_used", default)]
    pub model_used: Option<String>,
    #[serde(rename = "pasos_intermedios", alias = "intermediate_steps", default)]
    pub intermediate_steps: Option<Vec<AgentStep>>,
    #[serde(rename = "pensamientos", alias = "thoughts", default)]
    pub thoughts: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<ResponseMetadata>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Turn an application-level `error` field, or a reply without an
    /// answer, into a failure
    pub fn into_result(self) -> Result<Self, ClientError> {
        match (self.error.as_deref(), &self.answer_text) {
            (Some(e), _) if !e.is_empty() => Err(ClientError::Application(e.to_string())),
            (_, None) => Err(ClientError::Decode(
                "reply carries neither an answer nor an error".into(),
            )),
            _ => Ok(self),
        }
    }

    pub fn answer(&self) -> &str {
        self.answer_text.as_deref().unwrap_or_default()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode_used.as_deref().and_then(Mode::from_wire)
    }

    /// Authentic reasoning trace: thoughts first, intermediate steps otherwise
    pub fn reasoning(&self) -> Option<Vec<String>> {
        match (&self.thoughts, &self.intermediate_steps) {
            (Some(t), _) if !t.is_empty() => Some(t.clone()),
            (_, Some(s)) => Some(s.iter().map(AgentStep::describe).collect()),
            (Some(t), None) => Some(t.clone()),
            (None, None) => None,
        }
    }
}

/// One entry of `pasos_intermedios`: a tool call, its observation, or
/// plain text from backends that pre-format their steps
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AgentStep {
    Text(String),
    Action {
        action: String,
        action_input: serde_json::Value,
    },
    Observation {
        observation: serde_json::Value,
    },
    Other(serde_json::Value),
}

impl AgentStep {
    /// One-line summary shown in the reasoning list
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Text(text) => text.clone(),
            AgentStep::Action {
                action,
                action_input,
            } => format!("Acción: {} → \"{}\"", action, value_text(action_input)),
            AgentStep::Observation { observation } => {
                format!("Resultado: {}...", truncate(&value_text(observation), 100))
            }
            AgentStep::Other(value) => format!("{}...", truncate(&value.to_string(), 80)),
        }
    }
}

/// Strings without their JSON quotes, anything else as compact JSON
fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Timing block the backend attaches to an answer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseMetadata {
    #[serde(rename = "inicio", alias = "started_at", default)]
    pub started_at: Option<String>,
    #[serde(rename = "fin", alias = "finished_at", default)]
    pub finished_at: Option<String>,
    #[serde(rename = "duracion_segundos", alias = "duration_seconds", default)]
    pub duration_seconds: Option<f64>,
    #[serde(rename = "iteraciones", alias = "iteration_count", default)]
    pub iteration_count: Option<u32>,
    #[serde(rename = "busquedas", alias = "search_count", default)]
    pub search_count: Option<u32>,
    #[serde(rename = "red_permitida", alias = "network_allowed", default)]
    pub network_allowed: Option<bool>,
}

#[derive(Debug, Serialize)]
struct DemoRequest {
    #[serde(rename = "tipo")]
    topic: String,
    #[serde(rename = "modelo")]
    model_id: String,
}

/// Demo reply: the canned question plus a normal answer envelope
#[derive(Debug, Clone, Deserialize)]
pub struct DemoResponse {
    #[serde(rename = "pregunta", alias = "question", default)]
    pub question: String,
    /// Human-readable topic echoed back by the backend
    #[serde(rename = "tipo_demo", alias = "demo_kind", default)]
    pub demo_kind: Option<String>,
    #[serde(flatten)]
    pub answer: ResponseEnvelope,
}
