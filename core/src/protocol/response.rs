use super::extension::{VendorExtension, VendorExtensions};
use super::request::FrequencyRange;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response codes defined for the available spectrum inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    Success,
    GeneralFailure,
    VersionNotSupported,
    DeviceUnallowed,
    MissingParam,
    InvalidValue,
    UnexpectedParam,
    UnsupportedSpectrum,
}

impl ResponseCode {
    pub fn code(self) -> i64 {
        match self {
            ResponseCode::Success => 0,
            ResponseCode::GeneralFailure => -1,
            ResponseCode::VersionNotSupported => 100,
            ResponseCode::DeviceUnallowed => 101,
            ResponseCode::MissingParam => 102,
            ResponseCode::InvalidValue => 103,
            ResponseCode::UnexpectedParam => 106,
            ResponseCode::UnsupportedSpectrum => 300,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Some(match code {
            0 => ResponseCode::Success,
            -1 => ResponseCode::GeneralFailure,
            100 => ResponseCode::VersionNotSupported,
            101 => ResponseCode::DeviceUnallowed,
            102 => ResponseCode::MissingParam,
            103 => ResponseCode::InvalidValue,
            106 => ResponseCode::UnexpectedParam,
            300 => ResponseCode::UnsupportedSpectrum,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            ResponseCode::Success => "SUCCESS",
            ResponseCode::GeneralFailure => "GENERAL_FAILURE",
            ResponseCode::VersionNotSupported => "VERSION_NOT_SUPPORTED",
            ResponseCode::DeviceUnallowed => "DEVICE_UNALLOWED",
            ResponseCode::MissingParam => "MISSING_PARAM",
            ResponseCode::InvalidValue => "INVALID_VALUE",
            ResponseCode::UnexpectedParam => "UNEXPECTED_PARAM",
            ResponseCode::UnsupportedSpectrum => "UNSUPPORTED_SPECTRUM",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ResponseCode::Success => "Success",
            ResponseCode::GeneralFailure => "General failure",
            ResponseCode::VersionNotSupported => "The requested version number is invalid",
            ResponseCode::DeviceUnallowed => {
                "This specific device is not allowed to operate under AFC control."
            }
            ResponseCode::MissingParam => {
                "One or more fields required to be included in the request are missing."
            }
            ResponseCode::InvalidValue => "One or more fields have an invalid value.",
            ResponseCode::UnexpectedParam => {
                "Unknown parameter found, or conditional parameter found, but condition is not met."
            }
            ResponseCode::UnsupportedSpectrum => {
                "The frequency range indicated in the Available Spectrum Inquiry Request is at least partially outside of the frequency band under the management of the AFC."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseStatus {
    pub response_code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplemental_info: Option<Value>,
}

impl ResponseStatus {
    pub fn success() -> Self {
        Self {
            response_code: 0,
            short_description: Some(ResponseCode::Success.description().into()),
            supplemental_info: None,
        }
    }

    pub fn failure(code: ResponseCode, supplemental_info: Option<Value>) -> Self {
        Self {
            response_code: code.code(),
            short_description: Some(code.description().into()),
            supplemental_info,
        }
    }
}

/// EIRP limits for the channels of one operating class. `max_eirp` is
/// parallel to `channel_cfi`; `None` marks an excluded channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableChannelInfo {
    pub global_operating_class: u32,
    #[serde(default)]
    pub channel_cfi: Vec<u32>,
    #[serde(default)]
    pub max_eirp: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableFrequencyInfo {
    pub frequency_range: FrequencyRange,
    pub max_psd: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryResponse {
    pub request_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset_id: Option<String>,
    pub response: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_frequency_info: Option<Vec<AvailableFrequencyInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_channel_info: Option<Vec<AvailableChannelInfo>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_expire_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_extensions: Option<Vec<VendorExtension>>,
}

impl InquiryResponse {
    pub fn is_success(&self) -> bool {
        self.response.response_code == 0
    }

    pub fn extensions(&self) -> VendorExtensions {
        VendorExtensions::index(self.vendor_extensions.as_deref().unwrap_or_default())
    }

    pub fn channel_info(&self) -> &[AvailableChannelInfo] {
        self.available_channel_info.as_deref().unwrap_or_default()
    }
}
