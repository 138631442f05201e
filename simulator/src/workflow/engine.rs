use crate::generator::map::map_info_extension;
use crate::generator::profile::EirpGenerator;
use crate::workflow::config::EngineScenario;
use afccore::gateway::{ResponseEnvelope, PROTOCOL_VERSION};
use afccore::protocol::{InquiryRequest, InquiryResponse, ResponseCode, ResponseStatus};
use log::{info, warn};
use serde_json::{json, Value};

/// Protocol versions the mock engine answers.
pub const ALLOWED_VERSIONS: [&str; 2] = ["1.1", "1.3"];

/// Rejection carried back to the device inside a 200 envelope.
#[derive(Debug)]
struct Rejection {
    code: ResponseCode,
    supplemental_info: Option<Value>,
}

impl Rejection {
    fn new(code: ResponseCode, supplemental_info: Option<Value>) -> Self {
        Self {
            code,
            supplemental_info,
        }
    }

    /// The engine ships `supplementalInfo` as JSON text.
    fn into_response(self, request_id: &str) -> InquiryResponse {
        let info = self
            .supplemental_info
            .map(|info| Value::String(info.to_string()));
        InquiryResponse {
            request_id: request_id.to_string(),
            ruleset_id: None,
            response: ResponseStatus::failure(self.code, info),
            available_frequency_info: None,
            available_channel_info: None,
            availability_expire_time: None,
            vendor_extensions: None,
        }
    }
}

#[derive(Clone)]
pub struct Engine {
    scenario: EngineScenario,
}

impl Engine {
    pub fn new(scenario: EngineScenario) -> Self {
        Self { scenario }
    }

    pub fn scenario(&self) -> &EngineScenario {
        &self.scenario
    }

    /// Answers every inquiry of an envelope. A bad envelope version yields a
    /// single rejection for the first request.
    pub fn answer(&self, version: &str, requests: &[InquiryRequest]) -> ResponseEnvelope {
        let mut envelope = ResponseEnvelope {
            version: PROTOCOL_VERSION.into(),
            available_spectrum_inquiry_responses: Vec::with_capacity(requests.len()),
        };
        if !ALLOWED_VERSIONS.contains(&version) {
            warn!("rejecting envelope version {}", version);
            let request_id = requests
                .first()
                .map(|r| r.request_id.as_str())
                .unwrap_or_default();
            envelope.available_spectrum_inquiry_responses.push(
                Rejection::new(
                    ResponseCode::VersionNotSupported,
                    Some(json!({ "invalidVersion": [version] })),
                )
                .into_response(request_id),
            );
            return envelope;
        }

        for request in requests {
            let response = match self.evaluate(request) {
                Ok(response) => response,
                Err(rejection) => {
                    warn!(
                        "request {} rejected with {}",
                        request.request_id,
                        rejection.code.name()
                    );
                    rejection.into_response(&request.request_id)
                }
            };
            envelope.available_spectrum_inquiry_responses.push(response);
        }
        envelope
    }

    fn validate(&self, request: &InquiryRequest) -> Result<(), Rejection> {
        let device = &request.device_descriptor;
        if device.serial_number.trim().is_empty() {
            return Err(Rejection::new(
                ResponseCode::MissingParam,
                Some(json!({ "missingParams": ["serialNumber"] })),
            ));
        }
        if self.scenario.denied_serials.contains(&device.serial_number) {
            return Err(Rejection::new(ResponseCode::DeviceUnallowed, None));
        }
        if device.ruleset_ids.len() != 1 || !self.scenario.rulesets.contains(&device.ruleset_ids[0])
        {
            return Err(Rejection::new(
                ResponseCode::InvalidValue,
                Some(json!({ "invalidParams": ["rulesets"] })),
            ));
        }

        let shapes = request.location.shapes();
        if shapes.is_empty() {
            return Err(Rejection::new(
                ResponseCode::MissingParam,
                Some(json!({ "missingParams": ["ellipse", "linearPolygon", "radialPolygon"] })),
            ));
        }
        if shapes.len() > 1 {
            let names: Vec<&str> = shapes.iter().skip(1).map(|s| s.name()).collect();
            return Err(Rejection::new(
                ResponseCode::UnexpectedParam,
                Some(json!({ "unexpectedParams": names })),
            ));
        }

        let outside = request.inquired_frequency_range.iter().any(|range| {
            !self
                .scenario
                .allowed_ranges
                .iter()
                .any(|allowed| allowed.contains(range.low_frequency, range.high_frequency))
        });
        if outside {
            return Err(Rejection::new(ResponseCode::UnsupportedSpectrum, None));
        }
        Ok(())
    }

    fn evaluate(&self, request: &InquiryRequest) -> Result<InquiryResponse, Rejection> {
        self.validate(request)?;

        let mut generator = EirpGenerator::new(&self.scenario);
        let channel_info = generator.channel_info(&request.inquired_channels);
        let frequency_info = generator.frequency_info(&request.inquired_frequency_range);

        let vendor_extensions = match request.location.representative_point() {
            Some(center) if self.scenario.include_map => {
                match map_info_extension(&request.request_id, center) {
                    Ok(extension) => Some(vec![extension]),
                    Err(err) => {
                        warn!("skipping map info for {}: {:#}", request.request_id, err);
                        None
                    }
                }
            }
            _ => None,
        };

        info!(
            "request {} answered with {} channel classes",
            request.request_id,
            channel_info.len()
        );
        Ok(InquiryResponse {
            request_id: request.request_id.clone(),
            ruleset_id: request.device_descriptor.ruleset_ids.first().cloned(),
            response: ResponseStatus::success(),
            available_frequency_info: Some(frequency_info),
            available_channel_info: Some(channel_info),
            availability_expire_time: None,
            vendor_extensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use afccore::protocol::{FrequencyRange, LinearPolygon, Point};

    fn engine() -> Engine {
        Engine::new(EngineScenario {
            denied_serials: vec!["rogue-ap".into()],
            ..Default::default()
        })
    }

    fn code_of(request: InquiryRequest) -> i64 {
        engine().answer("1.1", &[request]).available_spectrum_inquiry_responses[0]
            .response
            .response_code
    }

    #[test]
    fn sample_request_succeeds_with_map_info() {
        let envelope = engine().answer("1.1", &[InquiryRequest::sample()]);
        let response = &envelope.available_spectrum_inquiry_responses[0];
        assert!(response.is_success());
        assert_eq!(response.channel_info().len(), 2);
        assert!(response.extensions().map_info().unwrap().is_some());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let envelope = engine().answer("0.9", &[InquiryRequest::sample()]);
        let response = &envelope.available_spectrum_inquiry_responses[0];
        assert_eq!(response.response.response_code, 100);
        assert_eq!(
            response.response.supplemental_info,
            Some(Value::String(r#"{"invalidVersion":["0.9"]}"#.into()))
        );
    }

    #[test]
    fn device_checks_map_to_response_codes() {
        let mut missing = InquiryRequest::sample();
        missing.device_descriptor.serial_number.clear();
        assert_eq!(code_of(missing), 102);

        let mut denied = InquiryRequest::sample();
        denied.device_descriptor.serial_number = "rogue-ap".into();
        assert_eq!(code_of(denied), 101);

        let mut ruleset = InquiryRequest::sample();
        ruleset.device_descriptor.ruleset_ids = vec!["ISED_DBS-06".into()];
        assert_eq!(code_of(ruleset), 103);
    }

    #[test]
    fn location_checks_map_to_response_codes() {
        let mut none = InquiryRequest::sample();
        none.location.ellipse = None;
        assert_eq!(code_of(none), 102);

        let mut two = InquiryRequest::sample();
        two.location.linear_polygon = Some(LinearPolygon {
            outer_boundary: vec![Point::new(41.0, -74.0)],
        });
        assert_eq!(code_of(two), 106);
    }

    #[test]
    fn spectrum_outside_allowed_ranges_is_rejected() {
        let mut request = InquiryRequest::sample();
        request.inquired_frequency_range = vec![FrequencyRange {
            low_frequency: 6_425_000_000,
            high_frequency: 6_525_000_000,
        }];
        assert_eq!(code_of(request), 300);
    }

    #[test]
    fn every_request_of_a_batch_is_answered() {
        let mut second = InquiryRequest::sample();
        second.request_id = "1".into();
        let envelope = engine().answer("1.3", &[InquiryRequest::sample(), second]);
        let ids: Vec<_> = envelope
            .available_spectrum_inquiry_responses
            .iter()
            .map(|r| r.request_id.as_str())
            .collect();
        assert_eq!(ids, vec!["0", "1"]);
    }
}
