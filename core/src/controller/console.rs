use super::session::{SessionStorage, CACHE_KEY};
use super::state::{RequestStatus, ViewState, Warning};
use crate::channels::{classify_channels, empty_channels, ChannelGroup};
use crate::config::AfcConfig;
use crate::gateway::{ErrorKind, GatewayResult, ResError};
use crate::geometry::{rasterize_ellipse, ELLIPSE_RASTER_SAMPLES};
use crate::prelude::{AfcError, AfcResult, LatLng};
use crate::protocol::{Feature, FeatureCollection, Geometry, InquiryRequest, InquiryResponse};
use crate::telemetry::{LogManager, Metrics, MetricsRecorder};
use serde_json::{json, Map, Value};

/// Largest cached overlay the map widget can redraw.
pub const OVERLAY_FEATURE_CEILING: usize = 646;

/// Feature `kind` of the synthesized device ellipse.
pub const RLAN_KIND: &str = "RLAN";

/// An issued request, stamped with the generation it belongs to.
#[derive(Debug, Clone)]
pub struct Submission {
    pub generation: u64,
    pub request: InquiryRequest,
    pub location: Option<LatLng>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied(RequestStatus),
    /// A newer submission was issued; the result was dropped.
    Stale,
}

/// Owns the console view state and drives it through submissions.
pub struct Controller {
    state: ViewState,
    generation: u64,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl Controller {
    /// Fresh controller; `config` is `None` when the AFC config failed to load.
    pub fn new(config: Option<&AfcConfig>) -> Self {
        Self {
            state: ViewState::from_config(config),
            generation: 0,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    /// Rehydrates from the cache slot, degrading to a fresh state when the
    /// snapshot is missing or unreadable.
    pub fn restore(config: Option<&AfcConfig>, storage: &dyn SessionStorage) -> Self {
        let mut controller = Self::new(config);
        let cached = match storage.get(CACHE_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return controller,
            Err(err) => {
                controller
                    .logger
                    .warn(&format!("session cache unavailable: {err}"));
                return controller;
            }
        };
        let mut state: ViewState = match serde_json::from_str(&cached) {
            Ok(state) => state,
            Err(err) => {
                controller
                    .logger
                    .warn(&format!("discarding unreadable session cache: {err}"));
                return controller;
            }
        };

        state.include_map = config.map(AfcConfig::include_map).unwrap_or(false);
        if state.status == RequestStatus::Pending {
            controller
                .logger
                .warn("request in flight at teardown was dropped");
            state.status = RequestStatus::Idle;
        }
        if state.map.val.len() > OVERLAY_FEATURE_CEILING {
            controller.logger.warn(&format!(
                "cached overlay has {} features, dropping it",
                state.map.val.len()
            ));
            state.map = Default::default();
            state.warning = Some(Warning::new(
                "Map data not restored",
                "The map can only redraw a limited number of cached features, so map data could not be saved. Run again to see map data.",
            ));
        }
        controller.state = state;
        controller
    }

    /// Persists the view state into the cache slot.
    pub fn teardown(&self, storage: &dyn SessionStorage) -> AfcResult<()> {
        let snapshot = serde_json::to_string(&self.state).map_err(|source| AfcError::Json {
            what: "session snapshot".into(),
            source,
        })?;
        storage.set(CACHE_KEY, snapshot)
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Marker position, `None` when the last request carried no shape.
    pub fn marker(&self) -> Option<LatLng> {
        self.state.clicked_point
    }

    pub fn map_artifact(&self) -> Option<&[u8]> {
        self.state.map_artifact.as_deref()
    }

    /// Starts a submission: recentres the map and enters `pending`.
    pub fn submit(&mut self, request: InquiryRequest) -> Submission {
        let location = request.location.representative_point();
        self.generation += 1;
        self.state.status = RequestStatus::Pending;
        self.state.map_center = location;
        self.state.clicked_point = location;
        self.metrics.record_submitted();
        self.logger.record(&format!(
            "submitting request {} (generation {})",
            request.request_id, self.generation
        ));

        Submission {
            generation: self.generation,
            request,
            location,
        }
    }

    /// Applies a gateway result unless a newer submission superseded it.
    pub fn complete(&mut self, submission: &Submission, result: GatewayResult) -> Completion {
        if submission.generation != self.generation {
            self.metrics.record_stale();
            self.logger.record(&format!(
                "dropping stale result for generation {} (latest {})",
                submission.generation, self.generation
            ));
            return Completion::Stale;
        }

        match result {
            GatewayResult::Success(response) if response.is_success() => {
                self.apply_success(submission, response)
            }
            GatewayResult::Success(response) => {
                let code = response.response.response_code;
                let description = response
                    .response
                    .short_description
                    .clone()
                    .unwrap_or_default();
                let body = serde_json::to_value(&response).unwrap_or(Value::Null);
                self.apply_error(
                    ResError::new(ErrorKind::Domain, description, Some(code)).with_body(body),
                )
            }
            GatewayResult::Error(err) => self.apply_error(err),
        }
        Completion::Applied(self.state.status)
    }

    fn apply_success(&mut self, submission: &Submission, response: InquiryResponse) {
        self.metrics.record_success();
        self.state.min_eirp = submission
            .request
            .min_desired_power
            .unwrap_or(self.state.min_eirp);
        self.state.status = RequestStatus::Success;
        self.state.error = None;
        self.state.warning = None;
        self.state.map_center = submission.location;
        self.state.clicked_point = submission.location;
        self.state.full_json_response = serde_json::to_string_pretty(&response).ok();
        self.state.map_artifact = None;

        if self.state.include_map {
            self.ingest_map_info(submission, &response);
        }
        self.logger.record(&format!(
            "request {} succeeded with {} channel classes",
            response.request_id,
            response.channel_info().len()
        ));
        self.state.response = Some(response);
    }

    fn ingest_map_info(&mut self, submission: &Submission, response: &InquiryResponse) {
        let info = match response.extensions().map_info() {
            Ok(Some(info)) => info,
            Ok(None) => return,
            Err(err) => return self.map_warning(err),
        };

        match info.decode_artifact() {
            Ok(artifact) => self.state.map_artifact = artifact,
            Err(err) => self.map_warning(err),
        }
        let mut overlay = match info.decode_overlay() {
            Ok(Some(overlay)) => overlay,
            Ok(None) => return,
            Err(err) => return self.map_warning(err),
        };
        if let Some(ellipse) = &submission.request.location.ellipse {
            let ring = rasterize_ellipse(ellipse, ELLIPSE_RASTER_SAMPLES);
            overlay.features.push(rlan_feature(ring, submission.location));
        }
        self.state.map.replace(overlay);
    }

    fn map_warning(&mut self, err: AfcError) {
        self.logger.warn(&format!("map info ignored: {err}"));
        self.state.warning = Some(Warning::new("Map data unavailable", err.to_string()));
    }

    fn apply_error(&mut self, err: ResError) {
        self.metrics.record_error();
        self.logger.warn(&err.to_string());
        self.state.status = RequestStatus::Error;
        self.state.response = err
            .body
            .clone()
            .and_then(|body| serde_json::from_value(body).ok());
        self.state.full_json_response = None;
        self.state.error = Some(err);
    }

    /// Moves the marker to a clicked map point and forces a redraw.
    pub fn move_marker(&mut self, point: LatLng) {
        self.state.clicked_point = Some(point);
        self.state.map.touch();
    }

    /// Replaces the overlay with externally loaded boundaries.
    pub fn load_overlay(&mut self, collection: FeatureCollection) {
        self.state.map.set_features(collection);
    }

    pub fn dismiss_warning(&mut self) {
        self.state.warning = None;
    }

    /// Channel table for the last response, or the empty taxonomy.
    pub fn classification(&self) -> Vec<ChannelGroup> {
        match self.state.response.as_ref() {
            Some(response) if response.available_channel_info.is_some() => classify_channels(
                response.channel_info(),
                self.state.min_eirp,
                self.state.max_eirp,
            ),
            _ => empty_channels(),
        }
    }
}

fn rlan_feature(ring: Vec<[f64; 2]>, marker: Option<LatLng>) -> Feature {
    let mut properties = Map::new();
    properties.insert("kind".into(), Value::String(RLAN_KIND.into()));
    if let Some(marker) = marker {
        properties.insert("FSLonLat".into(), json!([marker.lng, marker.lat]));
    }
    Feature::new(
        Geometry::Polygon {
            coordinates: vec![ring],
        },
        properties,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::ChannelColor;
    use crate::controller::session::MemoryStorage;
    use crate::protocol::{
        AvailableChannelInfo, LinearPolygon, Location, Point, RadialPolygon, ResponseStatus,
        Vector, VendorExtension, MAP_INFO_EXTENSION_ID,
    };

    fn config(include_map: bool) -> AfcConfig {
        AfcConfig {
            min_eirp: 15.0,
            max_eirp: 30.0,
            enable_map_in_virtual_ap: Some(include_map),
        }
    }

    fn response(with_map: bool) -> InquiryResponse {
        let geo = json!({"geoJson": {"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"kind": "BLDB"},
             "geometry": {"type": "Point", "coordinates": [-74.0, 41.0]}}
        ]}});
        InquiryResponse {
            request_id: "0".into(),
            ruleset_id: None,
            response: ResponseStatus::success(),
            available_frequency_info: None,
            available_channel_info: Some(vec![AvailableChannelInfo {
                global_operating_class: 133,
                channel_cfi: vec![7],
                max_eirp: vec![Some(32.0)],
            }]),
            availability_expire_time: None,
            vendor_extensions: with_map.then(|| {
                vec![VendorExtension::new(
                    MAP_INFO_EXTENSION_ID,
                    json!({"kmzFile": "UEsDBA==", "geoJsonFile": geo.to_string()}),
                )]
            }),
        }
    }

    fn overlay_of(count: usize) -> FeatureCollection {
        FeatureCollection {
            features: (0..count)
                .map(|i| {
                    Feature::new(
                        Geometry::Point {
                            coordinates: [i as f64, 0.0],
                        },
                        Map::new(),
                    )
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn ellipse_submission_centres_marker() {
        let mut controller = Controller::new(Some(&config(false)));
        let submission = controller.submit(InquiryRequest::sample());
        assert_eq!(controller.state().status, RequestStatus::Pending);
        assert_eq!(submission.location, Some(LatLng::new(41.0, -74.0)));
        assert_eq!(controller.marker(), Some(LatLng::new(41.0, -74.0)));
    }

    #[test]
    fn polygon_submission_uses_vertex_mean() {
        let mut controller = Controller::new(Some(&config(false)));
        let mut request = InquiryRequest::sample();
        request.location = Location::from_linear_polygon(LinearPolygon {
            outer_boundary: vec![
                Point::new(10.0, 20.0),
                Point::new(12.0, 20.0),
                Point::new(12.0, 24.0),
            ],
        });
        controller.submit(request);
        let marker = controller.marker().unwrap();
        assert!((marker.lat - 34.0 / 3.0).abs() < 1e-12);
        assert!((marker.lng - 64.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn radial_polygon_submission_uses_centre() {
        let mut controller = Controller::new(Some(&config(false)));
        let mut request = InquiryRequest::sample();
        request.location = Location::from_radial_polygon(RadialPolygon {
            center: Point::new(37.5, -122.25),
            outer_boundary: vec![
                Vector {
                    length: 30.0,
                    angle: 0.0,
                },
                Vector {
                    length: 45.0,
                    angle: 120.0,
                },
                Vector {
                    length: 30.0,
                    angle: 240.0,
                },
            ],
        });
        let submission = controller.submit(request);
        assert_eq!(submission.location, Some(LatLng::new(37.5, -122.25)));
        assert_eq!(controller.marker(), Some(LatLng::new(37.5, -122.25)));
    }

    #[test]
    fn shapeless_submission_clears_marker() {
        let mut controller = Controller::new(Some(&config(false)));
        let mut request = InquiryRequest::sample();
        request.location = Location::default();
        controller.submit(request);
        assert_eq!(controller.marker(), None);
    }

    #[test]
    fn success_updates_thresholds_and_classification() {
        let mut controller = Controller::new(Some(&config(false)));
        let mut request = InquiryRequest::sample();
        request.min_desired_power = Some(20.0);
        let submission = controller.submit(request);
        let outcome = controller.complete(&submission, GatewayResult::Success(response(true)));

        assert_eq!(outcome, Completion::Applied(RequestStatus::Success));
        assert_eq!(controller.state().min_eirp, 20.0);
        assert!(controller.state().full_json_response.is_some());
        // map disabled: extension ignored
        assert_eq!(controller.state().map.version, 0);
        let groups = controller.classification();
        let seven = groups
            .iter()
            .flat_map(|g| g.channels.iter())
            .find(|c| c.name == "7")
            .unwrap();
        assert_eq!(seven.color, ChannelColor::Green);
    }

    #[test]
    fn missing_min_power_keeps_prior_threshold() {
        let mut controller = Controller::new(Some(&config(false)));
        let mut request = InquiryRequest::sample();
        request.min_desired_power = None;
        let submission = controller.submit(request);
        controller.complete(&submission, GatewayResult::Success(response(false)));
        assert_eq!(controller.state().min_eirp, 15.0);
    }

    #[test]
    fn map_info_builds_overlay_with_rlan_polygon() {
        let mut controller = Controller::new(Some(&config(true)));
        let submission = controller.submit(InquiryRequest::sample());
        controller.complete(&submission, GatewayResult::Success(response(true)));

        let map = &controller.state().map;
        assert!(map.valid);
        assert_eq!(map.version, 1);
        assert_eq!(map.val.len(), 2);
        let rlan = &map.val.features[1];
        assert_eq!(rlan.kind(), Some(RLAN_KIND));
        assert_eq!(rlan.properties["FSLonLat"], json!([-74.0, 41.0]));
        match &rlan.geometry {
            Geometry::Polygon { coordinates } => {
                assert_eq!(coordinates[0].len(), ELLIPSE_RASTER_SAMPLES + 1)
            }
            other => panic!("unexpected geometry {other:?}"),
        }
        assert_eq!(controller.map_artifact(), Some(&b"PK\x03\x04"[..]));
    }

    #[test]
    fn polygon_request_gets_no_rlan_feature() {
        let mut controller = Controller::new(Some(&config(true)));
        let mut request = InquiryRequest::sample();
        request.location = Location::from_linear_polygon(LinearPolygon {
            outer_boundary: vec![Point::new(41.0, -74.0)],
        });
        let submission = controller.submit(request);
        controller.complete(&submission, GatewayResult::Success(response(true)));
        assert_eq!(controller.state().map.val.len(), 1);
    }

    #[test]
    fn error_result_records_error() {
        let mut controller = Controller::new(Some(&config(false)));
        let submission = controller.submit(InquiryRequest::sample());
        let err = ResError::new(ErrorKind::Transport, "Not Found", Some(404));
        let outcome = controller.complete(&submission, GatewayResult::Error(err.clone()));
        assert_eq!(outcome, Completion::Applied(RequestStatus::Error));
        assert_eq!(controller.state().error, Some(err));
        assert_eq!(controller.metrics().failed, 1);
    }

    #[test]
    fn nonzero_success_is_treated_as_error() {
        let mut controller = Controller::new(Some(&config(false)));
        let submission = controller.submit(InquiryRequest::sample());
        let mut denied = response(false);
        denied.response = ResponseStatus {
            response_code: 101,
            short_description: Some("denied".into()),
            supplemental_info: None,
        };
        controller.complete(&submission, GatewayResult::Success(denied));
        let state = controller.state();
        assert_eq!(state.status, RequestStatus::Error);
        assert_eq!(state.error.as_ref().unwrap().code, Some(101));
        assert_eq!(state.response.as_ref().unwrap().response.response_code, 101);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut controller = Controller::new(Some(&config(false)));
        let first = controller.submit(InquiryRequest::sample());
        let second = controller.submit(InquiryRequest::sample());

        let err = ResError::new(ErrorKind::Transport, "late", Some(500));
        assert_eq!(
            controller.complete(&first, GatewayResult::Error(err)),
            Completion::Stale
        );
        assert_eq!(controller.state().status, RequestStatus::Pending);

        controller.complete(&second, GatewayResult::Success(response(false)));
        assert_eq!(controller.state().status, RequestStatus::Success);
        assert_eq!(controller.metrics().stale, 1);
    }

    #[test]
    fn resubmission_reenters_pending() {
        let mut controller = Controller::new(Some(&config(false)));
        let submission = controller.submit(InquiryRequest::sample());
        controller.complete(&submission, GatewayResult::Success(response(false)));
        controller.submit(InquiryRequest::sample());
        assert_eq!(controller.state().status, RequestStatus::Pending);
    }

    #[test]
    fn marker_moves_and_overlay_loads_bump_version() {
        let mut controller = Controller::new(Some(&config(true)));
        controller.move_marker(LatLng::new(1.0, 2.0));
        controller.load_overlay(overlay_of(3));
        assert_eq!(controller.marker(), Some(LatLng::new(1.0, 2.0)));
        assert_eq!(controller.state().map.version, 2);
        assert_eq!(controller.state().map.val.len(), 3);
    }

    #[test]
    fn teardown_then_restore_round_trips_state() {
        let storage = MemoryStorage::new();
        let mut controller = Controller::new(Some(&config(true)));
        let submission = controller.submit(InquiryRequest::sample());
        controller.complete(&submission, GatewayResult::Success(response(true)));
        controller.teardown(&storage).unwrap();

        let restored = Controller::restore(Some(&config(true)), &storage);
        let (before, after) = (controller.state(), restored.state());
        assert_eq!(after.status, RequestStatus::Success);
        assert_eq!(after.map.version, before.map.version);
        assert_eq!(after.map.val.len(), before.map.val.len());
        assert_eq!(after.clicked_point, before.clicked_point);
        assert_eq!(after.full_json_response, before.full_json_response);
        assert_eq!(after.response, before.response);
        assert!(after.map_artifact.is_none());
        assert!(after.warning.is_none());
    }

    #[test]
    fn teardown_while_pending_restores_idle() {
        let storage = MemoryStorage::new();
        let mut controller = Controller::new(Some(&config(false)));
        controller.submit(InquiryRequest::sample());
        assert_eq!(controller.state().status, RequestStatus::Pending);
        controller.teardown(&storage).unwrap();

        let mut restored = Controller::restore(Some(&config(false)), &storage);
        assert_eq!(restored.state().status, RequestStatus::Idle);
        assert_eq!(restored.marker(), Some(LatLng::new(41.0, -74.0)));

        let submission = restored.submit(InquiryRequest::sample());
        let outcome = restored.complete(&submission, GatewayResult::Success(response(false)));
        assert_eq!(outcome, Completion::Applied(RequestStatus::Success));
    }

    #[test]
    fn restore_at_ceiling_keeps_overlay() {
        let storage = MemoryStorage::new();
        let mut controller = Controller::new(Some(&config(true)));
        controller.load_overlay(overlay_of(OVERLAY_FEATURE_CEILING));
        controller.teardown(&storage).unwrap();

        let restored = Controller::restore(Some(&config(true)), &storage);
        assert_eq!(restored.state().map.val.len(), OVERLAY_FEATURE_CEILING);
        assert!(restored.state().warning.is_none());
    }

    #[test]
    fn restore_above_ceiling_drops_overlay_with_warning() {
        let storage = MemoryStorage::new();
        let mut controller = Controller::new(Some(&config(true)));
        controller.load_overlay(overlay_of(OVERLAY_FEATURE_CEILING + 1));
        controller.teardown(&storage).unwrap();

        let restored = Controller::restore(Some(&config(true)), &storage);
        assert!(restored.state().map.val.is_empty());
        assert_eq!(restored.state().map.version, 0);
        assert!(restored.state().warning.is_some());
    }

    #[test]
    fn restore_rederives_map_flag_from_config() {
        let storage = MemoryStorage::new();
        Controller::new(Some(&config(true)))
            .teardown(&storage)
            .unwrap();
        let restored = Controller::restore(Some(&config(false)), &storage);
        assert!(!restored.state().include_map);
    }

    #[test]
    fn unreadable_cache_degrades_to_fresh_state() {
        let storage = MemoryStorage::new();
        storage.set(CACHE_KEY, "{broken".into()).unwrap();
        let restored = Controller::restore(Some(&config(false)), &storage);
        assert_eq!(restored.state().status, RequestStatus::Idle);
    }

    #[test]
    fn clean_success_clears_earlier_map_warning() {
        let mut controller = Controller::new(Some(&config(true)));
        let submission = controller.submit(InquiryRequest::sample());
        let mut broken = response(false);
        broken.vendor_extensions = Some(vec![VendorExtension::new(
            MAP_INFO_EXTENSION_ID,
            json!({"geoJsonFile": "{not json"}),
        )]);
        controller.complete(&submission, GatewayResult::Success(broken));
        assert!(controller.state().warning.is_some());

        let submission = controller.submit(InquiryRequest::sample());
        controller.complete(&submission, GatewayResult::Success(response(true)));
        assert!(controller.state().warning.is_none());
        assert_eq!(controller.state().map.val.len(), 2);
    }

    #[test]
    fn dismissing_warning_clears_it() {
        let storage = MemoryStorage::new();
        let mut controller = Controller::new(None);
        controller.load_overlay(overlay_of(OVERLAY_FEATURE_CEILING + 5));
        controller.teardown(&storage).unwrap();
        let mut restored = Controller::restore(None, &storage);
        assert!(restored.state().warning.is_some());
        restored.dismiss_warning();
        assert!(restored.state().warning.is_none());
    }
}
