use afccore::channels::{ChannelColor, ChannelGroup};
use afccore::controller::state::DEFAULT_MAP_CENTER;
use afccore::controller::{FileStorage, RequestStatus, RLAN_KIND};
use afccore::protocol::{
    Ellipse, FeatureCollection, Geometry, InquiryRequest, Point as WirePoint, Position,
};
use afccore::{AfcConfig, Completion, Controller, GatewayResult, HttpGateway, LatLng, Submission};
use clap::Parser;
use directories::ProjectDirs;
use iced::{
    mouse,
    widget::{
        button,
        canvas::{self, Canvas, Event, Frame, Geometry as CanvasGeometry, Path, Stroke},
        column, row, scrollable, text, text_input, Column, Container, Row,
    },
    window, Alignment, Color, Element, Length, Point, Rectangle, Renderer, Subscription, Task,
    Theme,
};
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Operator console for AFC spectrum inquiries")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:9000/availableSpectrumInquiry")]
    endpoint: String,
    /// AFC config JSON with EIRP thresholds
    #[arg(long)]
    afc_config: Option<PathBuf>,
    /// Directory holding the remembered console state
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Console::boot, Console::update, Console::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .window(window::Settings {
            exit_on_close_request: false,
            ..window::Settings::default()
        })
        .run()
}

fn application_title(_: &Console) -> String {
    "AFC Console".into()
}

fn application_subscription(_: &Console) -> Subscription<Message> {
    window::close_requests().map(Message::CloseRequested)
}

fn application_theme(_: &Console) -> Theme {
    Theme::Dark
}

fn cache_dir(args: &Args) -> PathBuf {
    if let Some(dir) = &args.cache_dir {
        return dir.clone();
    }
    ProjectDirs::from("org", "afc", "afcconsole")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".afcconsole"))
}

struct Console {
    controller: Controller,
    gateway: HttpGateway,
    storage: FileStorage,
    form: InquiryForm,
    note: String,
}

#[derive(Debug, Clone)]
enum Message {
    FieldChanged(FormField, String),
    Submit,
    Completed(Submission, GatewayResult),
    MapClicked(LatLng),
    DismissWarning,
    SaveArtifact,
    CloseRequested(window::Id),
}

#[derive(Debug, Clone, Copy)]
enum FormField {
    Serial,
    Latitude,
    Longitude,
    MajorAxis,
    MinorAxis,
    Orientation,
    MinPower,
}

impl Console {
    fn boot() -> (Self, Task<Message>) {
        let args = Args::parse();
        let config = match &args.afc_config {
            Some(path) => match AfcConfig::load(path) {
                Ok(config) => Some(config),
                Err(err) => {
                    warn!("AFC config unavailable: {err}");
                    None
                }
            },
            None => Some(AfcConfig::default()),
        };
        let storage = FileStorage::new(cache_dir(&args));
        let controller = Controller::restore(config.as_ref(), &storage);
        let mut form = InquiryForm::default();
        if let Some(point) = controller.marker() {
            form.latitude = point.lat.to_string();
            form.longitude = point.lng.to_string();
        }
        info!("console talking to {}", args.endpoint);

        (
            Console {
                controller,
                gateway: HttpGateway::new(&args.endpoint),
                storage,
                form,
                note: String::new(),
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::FieldChanged(field, value) => {
                state.form.update_field(field, value);
                Task::none()
            }
            Message::Submit => {
                let request = match state.form.to_request() {
                    Ok(request) => request,
                    Err(err) => {
                        state.note = err;
                        return Task::none();
                    }
                };
                state.note.clear();
                let submission = state.controller.submit(request);
                let gateway = state.gateway.clone();
                Task::perform(
                    async move {
                        let result = gateway.submit(&submission.request).await;
                        (submission, result)
                    },
                    |(submission, result)| Message::Completed(submission, result),
                )
            }
            Message::Completed(submission, result) => {
                if state.controller.complete(&submission, result) == Completion::Stale {
                    info!(
                        "dropped result of generation {} (current {})",
                        submission.generation,
                        state.controller.generation()
                    );
                }
                Task::none()
            }
            Message::MapClicked(point) => {
                state.controller.move_marker(point);
                state.form.latitude = format!("{:.6}", point.lat);
                state.form.longitude = format!("{:.6}", point.lng);
                Task::none()
            }
            Message::DismissWarning => {
                state.controller.dismiss_warning();
                Task::none()
            }
            Message::SaveArtifact => {
                state.note = match state.controller.map_artifact() {
                    Some(bytes) => match std::fs::write("results.kmz", bytes) {
                        Ok(()) => "Saved results.kmz".into(),
                        Err(err) => format!("Could not save results.kmz: {err}"),
                    },
                    None => "No map artifact to save".into(),
                };
                Task::none()
            }
            Message::CloseRequested(id) => {
                if let Err(err) = state.controller.teardown(&state.storage) {
                    warn!("could not persist console state: {err}");
                }
                window::close(id)
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let view_state = state.controller.state();
        let pending = view_state.status == RequestStatus::Pending;

        let submit = button(if pending { "Sending..." } else { "Send Request" }).padding(10);
        let submit = if pending {
            submit
        } else {
            submit.on_press(Message::Submit)
        };

        let form_column = column![
            text("Inquiry").size(26),
            text_input("Serial number", &state.form.serial)
                .on_input(|value| Message::FieldChanged(FormField::Serial, value))
                .padding(6),
            text_input("Latitude", &state.form.latitude)
                .on_input(|value| Message::FieldChanged(FormField::Latitude, value))
                .padding(6),
            text_input("Longitude", &state.form.longitude)
                .on_input(|value| Message::FieldChanged(FormField::Longitude, value))
                .padding(6),
            text_input("Semi-major axis (m)", &state.form.major_axis)
                .on_input(|value| Message::FieldChanged(FormField::MajorAxis, value))
                .padding(6),
            text_input("Semi-minor axis (m)", &state.form.minor_axis)
                .on_input(|value| Message::FieldChanged(FormField::MinorAxis, value))
                .padding(6),
            text_input("Orientation (deg)", &state.form.orientation)
                .on_input(|value| Message::FieldChanged(FormField::Orientation, value))
                .padding(6),
            text_input("Min desired power (dBm, optional)", &state.form.min_power)
                .on_input(|value| Message::FieldChanged(FormField::MinPower, value))
                .padding(6),
            submit,
            text(&state.note).size(14),
            status_panel(state),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let metrics = state.controller.metrics();
        let mut map_header = Row::new()
            .spacing(12)
            .align_y(Alignment::Center)
            .push(text(format!("Map ({} features)", view_state.map.val.len())).size(18));
        if state.controller.map_artifact().is_some() {
            map_header = map_header.push(button("Save KMZ").on_press(Message::SaveArtifact));
        }

        let overlay = Canvas::new(OverlayMap::new(
            &view_state.map.val,
            state.controller.marker(),
        ))
        .width(Length::Fill)
        .height(Length::Fixed(320.0));

        let results_column = column![
            text("Results").size(26),
            text(format!(
                "Submitted {} | succeeded {} | failed {} | stale {}",
                metrics.submitted, metrics.succeeded, metrics.failed, metrics.stale
            ))
            .size(12),
            map_header,
            overlay,
            text(format!(
                "Channels (green >= {} dBm, yellow >= {} dBm)",
                view_state.max_eirp, view_state.min_eirp
            ))
            .size(16),
            Container::new(
                scrollable(channel_table(&state.controller.classification()))
                    .height(Length::Fixed(220.0))
            )
            .padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let layout = row![form_column, results_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn status_panel(state: &Console) -> Column<'_, Message> {
    let view_state = state.controller.state();
    let mut panel = Column::new().spacing(6).push(
        text(format!("Status: {:?}", view_state.status)).size(16),
    );

    if let Some(warning) = &view_state.warning {
        panel = panel
            .push(
                text(format!("{}: {}", warning.title, warning.message))
                    .size(13)
                    .color(Color::from_rgb(0.95, 0.75, 0.2)),
            )
            .push(button("Dismiss").on_press(Message::DismissWarning));
    }

    if let Some(err) = &view_state.error {
        panel = panel.push(
            text(err.to_string())
                .size(13)
                .color(Color::from_rgb(0.95, 0.35, 0.3)),
        );
        if let Some(info) = err.supplemental_info() {
            panel = panel.push(text(format!("Supplemental info: {info}")).size(12));
        }
    } else if let Some(response) = &view_state.response {
        panel = panel.push(
            text(format!(
                "Request {}: {} ({})",
                response.request_id,
                response.response.short_description.as_deref().unwrap_or("Success"),
                response.response.response_code
            ))
            .size(13),
        );
    }
    panel
}

fn color_of(color: ChannelColor) -> Color {
    match color {
        ChannelColor::Green => Color::from_rgb(0.3, 0.8, 0.35),
        ChannelColor::Yellow => Color::from_rgb(0.95, 0.85, 0.25),
        ChannelColor::Red => Color::from_rgb(0.9, 0.3, 0.3),
        ChannelColor::Black => Color::from_rgb(0.45, 0.45, 0.45),
        ChannelColor::NoData => Color::from_rgb(0.7, 0.7, 0.75),
    }
}

fn channel_table(groups: &[ChannelGroup]) -> Column<'static, Message> {
    groups.iter().fold(Column::new().spacing(8), |col, group| {
        let cells = group.channels.iter().fold(Row::new().spacing(6), |cells, channel| {
            let label = match channel.max_eirp {
                Some(eirp) => format!("{} {:.1}", channel.name, eirp),
                None => channel.name.clone(),
            };
            cells.push(text(label).size(12).color(color_of(channel.color)))
        });
        col.push(
            text(format!(
                "Class {} ({} MHz)",
                group.operating_class, group.channel_width_mhz
            ))
            .size(14),
        )
        .push(scrollable(cells).direction(scrollable::Direction::Horizontal(
            scrollable::Scrollbar::default(),
        )))
    })
}

#[derive(Debug, Clone)]
struct InquiryForm {
    serial: String,
    latitude: String,
    longitude: String,
    major_axis: String,
    minor_axis: String,
    orientation: String,
    min_power: String,
}

impl Default for InquiryForm {
    fn default() -> Self {
        let sample = InquiryRequest::sample();
        let ellipse = sample.location.ellipse.clone().unwrap_or(Ellipse {
            center: WirePoint::new(41.0, -74.0),
            major_axis: 200.0,
            minor_axis: 100.0,
            orientation: 90.0,
        });
        Self {
            serial: sample.device_descriptor.serial_number,
            latitude: ellipse.center.latitude.to_string(),
            longitude: ellipse.center.longitude.to_string(),
            major_axis: ellipse.major_axis.to_string(),
            minor_axis: ellipse.minor_axis.to_string(),
            orientation: ellipse.orientation.to_string(),
            min_power: sample
                .min_desired_power
                .map(|p| p.to_string())
                .unwrap_or_default(),
        }
    }
}

impl InquiryForm {
    fn update_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::Serial => self.serial = value,
            FormField::Latitude => self.latitude = value,
            FormField::Longitude => self.longitude = value,
            FormField::MajorAxis => self.major_axis = value,
            FormField::MinorAxis => self.minor_axis = value,
            FormField::Orientation => self.orientation = value,
            FormField::MinPower => self.min_power = value,
        }
    }

    fn to_request(&self) -> Result<InquiryRequest, String> {
        fn number(label: &str, value: &str) -> Result<f64, String> {
            value
                .trim()
                .parse()
                .map_err(|_| format!("{label} must be a number"))
        }

        let mut request = InquiryRequest::sample();
        request.request_id = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis().to_string())
            .unwrap_or_else(|_| "0".into());
        request.device_descriptor.serial_number = self.serial.trim().to_string();
        request.location.ellipse = Some(Ellipse {
            center: WirePoint::new(
                number("Latitude", &self.latitude)?,
                number("Longitude", &self.longitude)?,
            ),
            major_axis: number("Semi-major axis", &self.major_axis)?,
            minor_axis: number("Semi-minor axis", &self.minor_axis)?,
            orientation: number("Orientation", &self.orientation)?,
        });
        request.min_desired_power = if self.min_power.trim().is_empty() {
            None
        } else {
            Some(number("Min desired power", &self.min_power)?)
        };
        Ok(request)
    }
}

/// Equirectangular view fitted around the overlay and marker.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    min_lng: f64,
    min_lat: f64,
    span: f64,
}

impl Viewport {
    fn fit(positions: &[Position]) -> Self {
        let (mut min_lng, mut min_lat) = (f64::INFINITY, f64::INFINITY);
        let (mut max_lng, mut max_lat) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for [lng, lat] in positions {
            min_lng = min_lng.min(*lng);
            max_lng = max_lng.max(*lng);
            min_lat = min_lat.min(*lat);
            max_lat = max_lat.max(*lat);
        }
        if positions.is_empty() {
            let center = DEFAULT_MAP_CENTER;
            return Self {
                min_lng: center.lng - 30.0,
                min_lat: center.lat - 30.0,
                span: 60.0,
            };
        }
        let span = (max_lng - min_lng).max(max_lat - min_lat).max(1e-4) * 1.2;
        Self {
            min_lng: (min_lng + max_lng - span) / 2.0,
            min_lat: (min_lat + max_lat - span) / 2.0,
            span,
        }
    }

    fn project(&self, [lng, lat]: Position, bounds: Rectangle) -> Point {
        let side = bounds.width.min(bounds.height) as f64;
        Point::new(
            ((lng - self.min_lng) / self.span * side) as f32,
            (side - (lat - self.min_lat) / self.span * side) as f32,
        )
    }

    fn unproject(&self, point: Point, bounds: Rectangle) -> LatLng {
        let side = bounds.width.min(bounds.height) as f64;
        LatLng::new(
            self.min_lat + (side - point.y as f64) / side * self.span,
            self.min_lng + point.x as f64 / side * self.span,
        )
    }
}

struct OverlayMap {
    rings: Vec<(bool, Vec<Position>)>,
    points: Vec<Position>,
    marker: Option<LatLng>,
    viewport: Viewport,
}

impl OverlayMap {
    fn new(collection: &FeatureCollection, marker: Option<LatLng>) -> Self {
        let mut rings = Vec::new();
        let mut points = Vec::new();
        for feature in &collection.features {
            let rlan = feature.kind() == Some(RLAN_KIND);
            match &feature.geometry {
                Geometry::Point { coordinates } => points.push(*coordinates),
                Geometry::MultiPoint { coordinates } => points.extend(coordinates),
                Geometry::LineString { coordinates } => rings.push((rlan, coordinates.clone())),
                Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                    rings.extend(coordinates.iter().map(|ring| (rlan, ring.clone())))
                }
                Geometry::MultiPolygon { coordinates } => rings.extend(
                    coordinates
                        .iter()
                        .flatten()
                        .map(|ring| (rlan, ring.clone())),
                ),
            }
        }

        let mut extent: Vec<Position> = rings
            .iter()
            .flat_map(|(_, ring)| ring.iter().copied())
            .chain(points.iter().copied())
            .collect();
        if let Some(marker) = marker {
            extent.push([marker.lng, marker.lat]);
        }
        Self {
            viewport: Viewport::fit(&extent),
            rings,
            points,
            marker,
        }
    }
}

impl canvas::Program<Message> for OverlayMap {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_in(bounds)?;
                Some(canvas::Action::publish(Message::MapClicked(
                    self.viewport.unproject(position, bounds),
                )))
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<CanvasGeometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.03, 0.04, 0.06),
        );

        for (rlan, ring) in &self.rings {
            if ring.len() < 2 {
                continue;
            }
            let path = Path::new(|builder| {
                for (i, position) in ring.iter().enumerate() {
                    let point = self.viewport.project(*position, bounds);
                    if i == 0 {
                        builder.move_to(point);
                    } else {
                        builder.line_to(point);
                    }
                }
            });
            let color = if *rlan {
                Color::from_rgb(0.18, 0.72, 0.89)
            } else {
                Color::from_rgb(0.85, 0.45, 0.2)
            };
            frame.stroke(&path, Stroke::default().with_width(2.0).with_color(color));
        }

        for position in &self.points {
            let dot = Path::new(|builder| {
                builder.circle(self.viewport.project(*position, bounds), 2.5)
            });
            frame.fill(&dot, Color::from_rgb(0.85, 0.45, 0.2));
        }

        if let Some(marker) = self.marker {
            let center = self.viewport.project([marker.lng, marker.lat], bounds);
            let pin = Path::new(|builder| builder.circle(center, 5.0));
            frame.fill(&pin, Color::from_rgb(0.95, 0.25, 0.25));
        }

        vec![frame.into_geometry()]
    }
}
