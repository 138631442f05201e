use crate::protocol::{InquiryRequest, InquiryResponse};
use serde::{Deserialize, Serialize};

/// Protocol version sent with every inquiry.
pub const PROTOCOL_VERSION: &str = "1.1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryEnvelope {
    pub version: String,
    pub available_spectrum_inquiry_requests: Vec<InquiryRequest>,
}

impl InquiryEnvelope {
    /// Envelope carrying exactly one inquiry. The console never batches.
    pub fn single(request: InquiryRequest) -> Self {
        Self {
            version: PROTOCOL_VERSION.into(),
            available_spectrum_inquiry_requests: vec![request],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub version: String,
    #[serde(default)]
    pub available_spectrum_inquiry_responses: Vec<InquiryResponse>,
}
