//! Announcement subrouter definition.
//!
//! The following subroute is supported:
//!
//! - POST: `/channel/:channel/topic/:topic/announcement`

use super::{
    pipeline::announce,
    request::{AnnouncementBody, AnnouncementRequest},
};
use crate::{error::Failure, router::Deps};
use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::{BytesRejection, JsonRejection},
        FromRequest, Path, Request, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::warn;

/// Instantiate a new announcement subrouter.
pub fn announcement_router() -> Router<Deps> {
    Router::new().route(
        "/channel/:channel/topic/:topic/announcement",
        post(announcement_handler),
    )
}

/// Handler for the POST subroute.
///
/// Accepts an [AnnouncementBody] in `application/json` format. An empty body
/// is read as `{}`, so that callers are told which field is missing first.
/// Responds
/// `204` once the announcement has been posted, or with an
/// [crate::error::ErrorEnvelope] otherwise.
async fn announcement_handler(
    State(deps): State<Deps>,
    Path((channel, topic)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let res = match read_body(headers, body).await {
        Ok(body) => {
            let req = AnnouncementRequest::new(channel, topic, body);
            announce(&deps.discord_client, req).await
        }
        Err(e) => {
            let e = Failure::from(e);
            warn!("{}", e);
            Err(e)
        }
    };

    match res {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.respond(deps.mode),
    }
}

/// Decode a JSON body, applying the usual `Content-Type` checks to anything
/// non-empty.
async fn read_body(
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<AnnouncementBody, JsonRejection> {
    let bytes = body?;
    if bytes.is_empty() {
        return Ok(AnnouncementBody::default());
    }

    let mut req = Request::new(Body::from(bytes));
    *req.headers_mut() = headers;

    let Json(body) = Json::<AnnouncementBody>::from_request(req, &()).await?;
    Ok(body)
}
