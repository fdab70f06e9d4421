//! Every way an announcement can fail, and how each is reported to callers.

use crate::{
    announcement::request::Field,
    config::Mode,
    discord::{channel::ChannelId, DiscordError},
};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::{any::Any, error::Error as _, fmt};
use thiserror::Error;

/// What an announcement was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Channel(ChannelId),
    Topic(ChannelId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Channel(id) => write!(f, "channel {}", id),
            Target::Topic(id) => write!(f, "topic {}", id),
        }
    }
}

/// Sum type representing every possible unexceptional fail state.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("Missing required field: {0}")]
    MissingField(Field),
    #[error("Invalid field {0}: {1}")]
    InvalidField(Field, #[source] url::ParseError),
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("Failed to authenticate with Discord: {0}")]
    Authentication(#[source] DiscordError),
    #[error("Unknown {0}")]
    NotFound(Target),
    #[error("Failed to look up {0}: {1}")]
    Lookup(Target, #[source] DiscordError),
    #[error("Failed to deliver announcement: {0}")]
    Delivery(#[source] DiscordError),
}

impl Failure {
    /// Classify a failed lookup of `target`.
    pub fn lookup(target: Target, e: DiscordError) -> Self {
        if e.is_not_found() {
            Failure::NotFound(target)
        } else {
            Failure::Lookup(target, e)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Failure::MissingField(_) | Failure::InvalidField(..) => StatusCode::BAD_REQUEST,
            Failure::InvalidBody(e) => e.status(),
            Failure::Authentication(e) if e.is_unauthenticated() => StatusCode::UNAUTHORIZED,
            Failure::Authentication(_) => StatusCode::BAD_GATEWAY,
            Failure::NotFound(_) => StatusCode::NOT_FOUND,
            Failure::Lookup(..) | Failure::Delivery(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Failure::MissingField(_) => "MissingField",
            Failure::InvalidField(..) => "InvalidField",
            Failure::InvalidBody(_) => "InvalidBody",
            Failure::Authentication(_) => "AuthenticationError",
            Failure::NotFound(_) => "NotFound",
            Failure::Lookup(..) => "LookupError",
            Failure::Delivery(_) => "DeliveryError",
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Failure::MissingField(_) | Failure::InvalidField(..) | Failure::InvalidBody(_) => {
                "validation"
            }
            Failure::Authentication(_) => "authentication",
            Failure::NotFound(_) => "not_found",
            Failure::Lookup(..) => "upstream",
            Failure::Delivery(_) => "delivery",
        }
    }

    fn discord_code(&self) -> Option<u32> {
        match self {
            Failure::Authentication(e) | Failure::Lookup(_, e) | Failure::Delivery(e) => e.code(),
            _ => None,
        }
    }

    /// Render the failure as an [ErrorEnvelope]. Diagnostic detail is only
    /// attached outside of production.
    pub fn envelope(&self, mode: Mode) -> ErrorEnvelope {
        ErrorEnvelope {
            status: self.status().as_u16(),
            message: self.to_string(),
            code: self.discord_code(),
            name: Some(self.name()),
            typ: Some(self.category()),
            stack: (!mode.is_production()).then(|| cause_chain(self)),
        }
    }

    pub fn respond(self, mode: Mode) -> Response {
        let status = self.status();
        (status, Json(self.envelope(mode))).into_response()
    }
}

/// The JSON body of every error response.
///
/// ```json
/// {
///     "status": 404,
///     "message": "Unknown channel 1234",
///     "name": "NotFound",
///     "type": "not_found"
/// }
/// ```
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub message: String,
    pub code: Option<u32>,
    pub name: Option<&'static str>,
    #[serde(rename = "type")]
    pub typ: Option<&'static str>,
    pub stack: Option<String>,
}

impl ErrorEnvelope {
    /// An envelope with nothing beyond a status and its canonical reason.
    pub fn bare(status: StatusCode) -> Self {
        ErrorEnvelope {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_owned(),
            code: None,
            name: None,
            typ: None,
            stack: None,
        }
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Convert a panic caught in a handler into a generic 500, so that internals
/// only leak outside of production.
pub fn panic_response(err: Box<dyn Any + Send + 'static>, mode: Mode) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_owned()
    };

    tracing::error!(panic = %detail, "Handler panicked");

    let mut envelope = ErrorEnvelope::bare(StatusCode::INTERNAL_SERVER_ERROR);
    envelope.name = Some("InternalError");
    envelope.typ = Some("internal");
    if !mode.is_production() {
        envelope.stack = Some(detail);
    }

    envelope.into_response()
}

/// Flatten an error and all of its sources into one line per cause.
fn cause_chain(e: &Failure) -> String {
    let mut out = format!("{}: {}", e.name(), e);
    let mut source = e.source();

    while let Some(s) = source {
        out.push_str("\n    caused by: ");
        out.push_str(&s.to_string());
        source = s.source();
    }

    out
}
