use crate::server::model::EngineStatus;
use crate::workflow::engine::Engine;
use afccore::gateway::InquiryEnvelope;
use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::{json, Value};
use std::{
    future::Future,
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use warp::{http::StatusCode, Filter};

/// Route the console posts inquiries to.
pub const INQUIRY_PATH: &str = "availableSpectrumInquiry";

fn record(state: &RwLock<EngineStatus>, update: impl FnOnce(&mut EngineStatus)) {
    if let Ok(mut guard) = state.write() {
        update(&mut guard);
    }
}

fn handle_inquiry(
    body: Value,
    engine: &Engine,
    state: &RwLock<EngineStatus>,
) -> warp::reply::WithStatus<warp::reply::Json> {
    record(state, |status| status.envelopes += 1);

    if let Some(code) = engine.scenario().force_status {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        warn!("forcing HTTP {} for inquiry", status);
        return warp::reply::with_status(
            warp::reply::json(&json!({"message": "forced failure"})),
            status,
        );
    }

    let envelope: InquiryEnvelope = match serde_json::from_value(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("malformed inquiry envelope: {}", err);
            return warp::reply::with_status(
                warp::reply::json(&json!({"message": err.to_string()})),
                StatusCode::BAD_REQUEST,
            );
        }
    };

    let requests = &envelope.available_spectrum_inquiry_requests;
    let answer = engine.answer(&envelope.version, requests);
    let rejected = answer
        .available_spectrum_inquiry_responses
        .iter()
        .filter(|r| !r.is_success())
        .count();
    record(state, |status| {
        status.answered += answer.available_spectrum_inquiry_responses.len() - rejected;
        status.rejected += rejected;
        status.last_request_id = requests.last().map(|r| r.request_id.clone());
    });
    warp::reply::with_status(warp::reply::json(&answer), StatusCode::OK)
}

/// Binds the engine routes on `addr`; port 0 picks a free port.
pub fn bind(
    engine: Engine,
    state: Arc<RwLock<EngineStatus>>,
    addr: SocketAddr,
) -> Result<(SocketAddr, impl Future<Output = ()> + Send + 'static)> {
    let engine = Arc::new(engine);
    let state_for_filter = state.clone();
    let state_filter = warp::any().map(move || state_for_filter.clone());
    let engine_filter = warp::any().map(move || engine.clone());

    let status_route = warp::path("status")
        .and(warp::get())
        .and(state_filter.clone())
        .map(|state: Arc<RwLock<EngineStatus>>| {
            let snapshot = state.read().map(|s| s.clone()).unwrap_or_default();
            warp::reply::json(&snapshot)
        });

    let inquiry_route = warp::path(INQUIRY_PATH)
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(engine_filter)
        .and(state_filter)
        .map(
            |body: Value, engine: Arc<Engine>, state: Arc<RwLock<EngineStatus>>| {
                handle_inquiry(body, &engine, &state)
            },
        );

    let routes = status_route.or(inquiry_route);
    warp::serve(routes)
        .try_bind_ephemeral(addr)
        .with_context(|| format!("binding mock AFC engine on {addr}"))
}

/// Mock AFC engine served from a background thread.
pub struct EngineServer {
    addr: SocketAddr,
    state: Arc<RwLock<EngineStatus>>,
}

impl EngineServer {
    pub fn spawn(engine: Engine, addr: SocketAddr) -> Result<Self> {
        let description = engine.scenario().description.clone();
        let state = Arc::new(RwLock::new(EngineStatus {
            description,
            ..Default::default()
        }));
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("building mock engine runtime")?;
        let (addr, server) = {
            let _guard = runtime.enter();
            bind(engine, state.clone(), addr)?
        };
        thread::spawn(move || runtime.block_on(server));
        info!("mock AFC engine listening on http://{}/{}", addr, INQUIRY_PATH);
        Ok(Self { addr, state })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/{}", self.addr, INQUIRY_PATH)
    }

    pub fn snapshot(&self) -> EngineStatus {
        self.state.read().map(|s| s.clone()).unwrap_or_default()
    }
}
