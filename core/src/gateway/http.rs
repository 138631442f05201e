use super::envelope::InquiryEnvelope;
use super::{interpret_response, GatewayResult};
use crate::protocol::InquiryRequest;
use log::{debug, warn};
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;

/// Seconds to wait for the AFC engine before giving up on a submission.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Submits inquiries to an AFC endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("HTTP client without {timeout:?} timeout: {err}");
                reqwest::Client::new()
            });
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one inquiry. Never retries; every failure comes back as
    /// [`GatewayResult::Error`].
    pub async fn submit(&self, request: &InquiryRequest) -> GatewayResult {
        if let Err(err) = request.location.validate() {
            warn!("refusing to submit request {}: {}", request.request_id, err);
            return GatewayResult::fault(err);
        }
        let envelope = InquiryEnvelope::single(request.clone());
        debug!(
            "POST {} request {}",
            self.endpoint, request.request_id
        );

        let response = match self.client.post(&self.endpoint).json(&envelope).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!("inquiry to {} failed: {}", self.endpoint, err);
                return GatewayResult::fault(err);
            }
        };
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        match response.bytes().await {
            Ok(body) => interpret_response(status.as_u16(), &reason, &body),
            Err(err) => {
                warn!("reading inquiry response from {} failed: {}", self.endpoint, err);
                GatewayResult::fault(err)
            }
        }
    }

    /// Blocking variant for command-line drivers without a runtime.
    pub fn submit_blocking(&self, request: &InquiryRequest) -> GatewayResult {
        match TokioBuilder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(self.submit(request)),
            Err(err) => GatewayResult::fault(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ErrorKind, GENERIC_FAILURE};
    use crate::protocol::{LinearPolygon, Point};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use warp::http::StatusCode;
    use warp::Filter;

    async fn serve_fixed(status: StatusCode, body: Value) -> SocketAddr {
        let route = warp::path("availableSpectrumInquiry")
            .and(warp::post())
            .and(warp::body::json())
            .map(move |envelope: Value| {
                assert_eq!(envelope["version"], "1.1");
                assert_eq!(
                    envelope["availableSpectrumInquiryRequests"]
                        .as_array()
                        .map(Vec::len),
                    Some(1)
                );
                warp::reply::with_status(warp::reply::json(&body), status)
            });
        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    fn endpoint(addr: SocketAddr) -> String {
        format!("http://{addr}/availableSpectrumInquiry")
    }

    #[tokio::test]
    async fn success_envelope_yields_first_response() {
        let addr = serve_fixed(
            StatusCode::OK,
            json!({"version": "1.1", "availableSpectrumInquiryResponses": [
                {"requestId": "0", "response": {"responseCode": 0}}
            ]}),
        )
        .await;
        let result = HttpGateway::new(endpoint(addr))
            .submit(&InquiryRequest::sample())
            .await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn server_error_reports_status() {
        let addr = serve_fixed(StatusCode::INTERNAL_SERVER_ERROR, json!({"message": "boom"})).await;
        let result = HttpGateway::new(endpoint(addr))
            .submit(&InquiryRequest::sample())
            .await;
        let GatewayResult::Error(err) = result else {
            panic!("expected error");
        };
        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.code, Some(500));
        assert_eq!(err.description, "Internal Server Error");
        assert_eq!(err.body, Some(json!({"message": "boom"})));
    }

    #[tokio::test]
    async fn unreachable_engine_is_generic_fault() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = HttpGateway::new(endpoint(addr))
            .submit(&InquiryRequest::sample())
            .await;
        let GatewayResult::Error(err) = result else {
            panic!("expected error");
        };
        assert_eq!(err.description, GENERIC_FAILURE);
        assert_eq!(err.code, None);
        assert!(matches!(err.body, Some(Value::String(_))));
    }

    #[tokio::test]
    async fn two_shapes_are_rejected_before_sending() {
        let mut request = InquiryRequest::sample();
        request.location.linear_polygon = Some(LinearPolygon {
            outer_boundary: vec![Point::new(1.0, 1.0)],
        });
        let result = HttpGateway::new("http://127.0.0.1:9/unused")
            .submit(&request)
            .await;
        assert!(!result.is_success());
    }
}
