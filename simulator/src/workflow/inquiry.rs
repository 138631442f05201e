use afccore::channels::{ChannelColor, ChannelGroup};
use afccore::controller::{Completion, Controller, RequestStatus};
use afccore::protocol::InquiryRequest;
use afccore::{AfcConfig, HttpGateway};
use anyhow::Context;
use std::fs;
use std::path::Path;

pub struct InquiryReport {
    pub status: RequestStatus,
    pub description: Option<String>,
    pub classification: Vec<ChannelGroup>,
    pub overlay_features: usize,
}

impl InquiryReport {
    /// Channel counts per colour: green, yellow, red, black.
    pub fn color_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for channel in self.classification.iter().flat_map(|g| g.channels.iter()) {
            match channel.color {
                ChannelColor::Green => counts[0] += 1,
                ChannelColor::Yellow => counts[1] += 1,
                ChannelColor::Red => counts[2] += 1,
                ChannelColor::Black => counts[3] += 1,
                ChannelColor::NoData => {}
            }
        }
        counts
    }

    pub fn summary(&self) -> String {
        let [green, yellow, red, black] = self.color_counts();
        format!(
            "status={:?} green={} yellow={} red={} black={} overlay_features={} description={:?}\n",
            self.status, green, yellow, red, black, self.overlay_features, self.description
        )
    }
}

pub fn load_request<P: AsRef<Path>>(path: P) -> anyhow::Result<InquiryRequest> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading inquiry request {}", path_ref.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing inquiry request {}", path_ref.display()))
}

/// Drives one request through the console controller against a live endpoint.
pub fn run_inquiry(
    gateway: &HttpGateway,
    config: &AfcConfig,
    request: InquiryRequest,
) -> InquiryReport {
    let mut controller = Controller::new(Some(config));
    let submission = controller.submit(request);
    let result = gateway.submit_blocking(&submission.request);
    let status = match controller.complete(&submission, result) {
        Completion::Applied(status) => status,
        Completion::Stale => controller.state().status,
    };
    let state = controller.state();

    InquiryReport {
        status,
        description: state.error.as_ref().map(|err| err.to_string()),
        classification: controller.classification(),
        overlay_features: state.map.val.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_request_reads_wire_json() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            serde_json::to_string(&InquiryRequest::sample())
                .unwrap()
                .as_bytes(),
        )
        .unwrap();
        let path = temp.into_temp_path();
        let request = load_request(&path).unwrap();
        assert_eq!(request.device_descriptor.serial_number, "sample-ap");
    }

    #[test]
    fn unreachable_endpoint_reports_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = HttpGateway::new(format!("http://{addr}/availableSpectrumInquiry"));
        let report = run_inquiry(&gateway, &AfcConfig::default(), InquiryRequest::sample());
        assert_eq!(report.status, RequestStatus::Error);
        assert_eq!(report.color_counts(), [0, 0, 0, 0]);
        assert!(report.summary().starts_with("status=Error"));
    }
}
