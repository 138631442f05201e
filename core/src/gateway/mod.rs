//! Normalizes an inquiry round trip into a single success/error result.
//!
//! Only the first element of the response envelope is read; the console sends
//! one inquiry per envelope.

pub mod envelope;
pub mod http;

pub use envelope::{InquiryEnvelope, ResponseEnvelope, PROTOCOL_VERSION};
pub use http::HttpGateway;

use crate::protocol::InquiryResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Description used when the call itself fails.
pub const GENERIC_FAILURE: &str = "encountered an error when running request";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Non-200 status or network fault.
    Transport,
    /// Envelope received with a nonzero response code.
    Domain,
    /// Body could not be decoded.
    Parse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResError {
    pub kind: ErrorKind,
    pub description: String,
    pub code: Option<i64>,
    pub body: Option<Value>,
}

impl ResError {
    pub fn new(kind: ErrorKind, description: impl Into<String>, code: Option<i64>) -> Self {
        Self {
            kind,
            description: description.into(),
            code,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// `response.supplementalInfo` of a domain error body, when present.
    pub fn supplemental_info(&self) -> Option<&Value> {
        self.body
            .as_ref()?
            .get("response")?
            .get("supplementalInfo")
            .filter(|info| !info.is_null())
    }
}

impl std::fmt::Display for ResError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "Error: {code}: {}", self.description),
            None => write!(f, "Error: {}", self.description),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResult {
    Success(InquiryResponse),
    Error(ResError),
}

impl GatewayResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GatewayResult::Success(_))
    }

    /// Folds a call-level fault into the generic error shape.
    pub fn fault(fault: impl std::fmt::Display) -> Self {
        GatewayResult::Error(
            ResError::new(ErrorKind::Transport, GENERIC_FAILURE, None)
                .with_body(Value::String(fault.to_string())),
        )
    }
}

/// Interprets a completed HTTP exchange.
pub fn interpret_response(status: u16, reason: &str, body: &[u8]) -> GatewayResult {
    if status != 200 {
        let raw = serde_json::from_slice::<Value>(body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()));
        return GatewayResult::Error(
            ResError::new(ErrorKind::Transport, reason, Some(i64::from(status))).with_body(raw),
        );
    }

    let envelope: ResponseEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(err) => return parse_failure(err),
    };
    let Some(response) = envelope.available_spectrum_inquiry_responses.into_iter().next()
    else {
        return parse_failure("response envelope carries no inquiry responses");
    };

    if response.is_success() {
        return GatewayResult::Success(response);
    }
    let description = response
        .response
        .short_description
        .clone()
        .unwrap_or_default();
    let code = response.response.response_code;
    let body = serde_json::to_value(&response).unwrap_or(Value::Null);
    GatewayResult::Error(ResError::new(ErrorKind::Domain, description, Some(code)).with_body(body))
}

fn parse_failure(fault: impl std::fmt::Display) -> GatewayResult {
    GatewayResult::Error(
        ResError::new(ErrorKind::Parse, GENERIC_FAILURE, None)
            .with_body(Value::String(fault.to_string())),
    )
}
