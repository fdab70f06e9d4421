//! Server router definition.
//!
//! The following routes are supported:
//!
//! - GET: `/version`
//! - POST: `/channel/:channel/topic/:topic/announcement`

use crate::{
    announcement::router::announcement_router,
    config::Mode,
    discord::api::DiscordClient,
    error::{panic_response, ErrorEnvelope},
    server::REQUEST_TIMEOUT,
};
use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::any::Any;
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{self, TraceLayer},
};
use tracing::Level;

/// Dependencies shared by routes across requests. Nothing in here is
/// mutable, so concurrent requests never contend.
#[derive(Clone)]
pub struct Deps {
    pub discord_client: DiscordClient,
    pub mode: Mode,
}

#[derive(Serialize)]
struct Version {
    version: &'static str,
    status: &'static str,
}

/// Instantiate a new router. Requests are traced outside of production.
pub fn new(deps: Deps) -> Router {
    let mode = deps.mode;

    let api = Router::new()
        .merge(announcement_router())
        .fallback(|| async { ErrorEnvelope::bare(StatusCode::NOT_FOUND) })
        .with_state(deps);

    let api = if mode.is_production() {
        api
    } else {
        api.layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
    };

    api
        // Exclude the version route from tracing.
        .route("/version", get(version))
        .layer(CatchPanicLayer::custom(
            move |err: Box<dyn Any + Send + 'static>| panic_response(err, mode),
        ))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
}

async fn version() -> Json<Version> {
    Json(Version {
        version: env!("CARGO_PKG_VERSION"),
        status: "Running",
    })
}
