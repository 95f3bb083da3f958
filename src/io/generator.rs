//! Client for the remote route generator.
//!
//! The generator turns a metal and ore description into a candidate
//! processing route. Its output is loosely typed, so every response is run
//! through the validator before it reaches a caller. Requests are never
//! retried; a failed call surfaces as a [`GenerationError`].

use crate::pipeline::{ValidatedRoute, ValidationError, validate};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generator ran but reported a failure.
    #[error("route generator failed: {0}")]
    Upstream(String),

    #[error("route generator returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not reach route generator: {0}")]
    Transport(String),

    #[error("route generator did not answer within {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("route generator returned an unreadable response: {0}")]
    Decode(String),

    #[error("route generator returned an invalid route: {0}")]
    InvalidRoute(#[from] ValidationError),
}

/// Body of a generation request. The generator expects all three keys, so an
/// unknown grade is sent as an empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub metal: String,
    pub ore_name: String,
    pub ore_grade: String,
}

impl GenerationRequest {
    pub fn new(metal: impl Into<String>, ore_name: impl Into<String>) -> Self {
        Self {
            metal: metal.into(),
            ore_name: ore_name.into(),
            ore_grade: String::new(),
        }
    }

    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.ore_grade = grade.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl GeneratorClient {
    /// Creates a client posting to `endpoint`, giving up after `timeout`.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Requests a route and validates the response.
    ///
    /// Dropping the returned future cancels the request.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ValidatedRoute, GenerationError> {
        let started = Instant::now();
        debug!(endpoint = %self.endpoint, metal = %request.metal, ore = %request.ore_name, "requesting route");

        let resp = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        let result = interpret_response(status, &body);
        info!(
            endpoint = %self.endpoint,
            metal = %request.metal,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "route generator round-trip"
        );
        result
    }

    fn transport_error(&self, e: reqwest::Error) -> GenerationError {
        if e.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Transport(e.to_string())
        }
    }
}

/// Turns a raw generator response into a validated route.
///
/// A body of the form `{"status": "failure", "log": ...}` is an upstream
/// failure whatever the HTTP status. Otherwise a non-2xx status is an error,
/// and a 2xx body must hold a route, either bare or wrapped as
/// `{"status": "success", "route": {...}}`.
pub fn interpret_response(status: u16, body: &str) -> Result<ValidatedRoute, GenerationError> {
    let parsed = serde_json::from_str::<Value>(body);

    if let Ok(Value::Object(obj)) = &parsed {
        if obj.get("status").and_then(Value::as_str) == Some("failure") {
            let log = match obj.get("log") {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => "no log provided".to_string(),
                Some(other) => other.to_string(),
            };
            return Err(GenerationError::Upstream(log));
        }
    }

    if !(200..300).contains(&status) {
        return Err(GenerationError::Status {
            status,
            body: excerpt(body),
        });
    }

    let payload = parsed.map_err(|e| GenerationError::Decode(e.to_string()))?;
    let route = match &payload {
        Value::Object(obj) if !obj.contains_key("stages") => match obj.get("route") {
            Some(inner) => inner,
            None => &payload,
        },
        _ => &payload,
    };

    Ok(validate(route)?)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE: &str = r#"{
        "id": "gen-1",
        "stages": [
            { "id": "m", "type": "extraction", "metrics": { "carbonEmissions": 12 } },
            { "id": "s", "type": "smelting", "metrics": { "carbonEmissions": "30.5" } }
        ]
    }"#;

    #[test]
    fn failure_body_is_upstream_error() {
        let err = interpret_response(200, r#"{"status": "failure", "log": "no data"}"#).unwrap_err();
        assert!(matches!(err, GenerationError::Upstream(ref log) if log == "no data"));
    }

    #[test]
    fn failure_body_wins_over_http_status() {
        let err = interpret_response(500, r#"{"status": "failure", "log": "model crashed"}"#)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Upstream(ref log) if log == "model crashed"));
    }

    #[test]
    fn failure_without_log_still_reports() {
        let err = interpret_response(200, r#"{"status": "failure"}"#).unwrap_err();
        assert!(matches!(err, GenerationError::Upstream(ref log) if log == "no log provided"));
    }

    #[test]
    fn bare_route_is_validated() {
        let validated = interpret_response(200, ROUTE).unwrap();
        assert_eq!(validated.route.id, "gen-1");
        assert_eq!(validated.route.stages[1].metrics.carbon_emissions, 30.5);
    }

    #[test]
    fn wrapped_route_is_unwrapped() {
        let body = format!(r#"{{"status": "success", "route": {}}}"#, ROUTE);
        let validated = interpret_response(200, &body).unwrap();
        assert_eq!(validated.route.stage_count(), 2);
    }

    #[test]
    fn non_success_status_is_reported() {
        let err = interpret_response(502, "Bad Gateway").unwrap_err();
        match err {
            GenerationError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreadable_body_is_decode_error() {
        let err = interpret_response(200, "<html>").unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
    }

    #[test]
    fn route_without_stages_is_invalid() {
        let err = interpret_response(200, r#"{"status": "success", "route": {"stages": []}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            GenerationError::InvalidRoute(ValidationError::NoStages)
        ));
    }

    #[test]
    fn long_error_bodies_are_truncated() {
        let body = "x".repeat(1000);
        match interpret_response(500, &body).unwrap_err() {
            GenerationError::Status { body, .. } => {
                assert_eq!(body.len(), BODY_EXCERPT_LEN + 3);
                assert!(body.ends_with("..."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn request_uses_snake_case_keys() {
        let req = GenerationRequest::new("copper", "chalcopyrite").with_grade("1.2% Cu");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["metal"], "copper");
        assert_eq!(json["ore_name"], "chalcopyrite");
        assert_eq!(json["ore_grade"], "1.2% Cu");

    }

    #[test]
    fn request_without_grade_sends_empty_string() {
        let bare = serde_json::to_value(GenerationRequest::new("zinc", "sphalerite")).unwrap();
        assert_eq!(bare["ore_grade"], "");
        assert_eq!(bare.as_object().unwrap().len(), 3);
    }

    #[test]
    fn client_normalizes_endpoint() {
        let client = GeneratorClient::new("http://localhost:8000/generate/", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8000/generate");
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
    }
}
