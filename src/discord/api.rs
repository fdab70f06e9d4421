//! Type definitions and helpers for the Discord API.

use super::{auth::*, error::DiscordError};
use serde::{de::DeserializeOwned, Deserialize};

/// The base URL of the Discord API.
pub const API_BASE: &str = "https://discord.com/api/v10";

/// Discord asks bots to identify themselves in this format.
///
/// <https://discord.com/developers/docs/reference#user-agent>
const USER_AGENT: &str = concat!(
    "DiscordBot (https://github.com/crier-rs/crier, ",
    env!("CARGO_PKG_VERSION"),
    ")"
);

/// A client that holds a connection pool internally, as per
/// [reqwest::Client]. Cloning it is cheap and shares the pool.
#[derive(Clone)]
pub struct DiscordClient {
    base: String,
    http: reqwest::Client,
}

impl DiscordClient {
    pub fn new(base: String) -> Self {
        Self {
            base: base.trim_end_matches('/').to_owned(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a GET request to any Discord API endpoint, handling
    /// authentication.
    pub(super) fn get<T: ToString>(&self, path: T, token: &BotToken) -> reqwest::RequestBuilder {
        self.http
            .get(self.base.to_owned() + &path.to_string())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(token))
    }

    /// Create a POST request to any Discord API endpoint, handling
    /// authentication.
    pub(super) fn post<T: ToString>(&self, path: T, token: &BotToken) -> reqwest::RequestBuilder {
        self.http
            .post(self.base.to_owned() + &path.to_string())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::AUTHORIZATION, to_auth_header_val(token))
    }

    /// Create an unauthenticated GET request to an arbitrary URL. The bot
    /// token must never leak to third-party hosts, so this doesn't share
    /// anything with [Self::get] beyond the pool.
    pub(super) fn fetch(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.get(url)
    }
}

/// The body Discord sends alongside a non-2xx status.
///
/// ```json
/// {
///     "message": "Unknown Channel",
///     "code": 10003
/// }
/// ```
///
/// <https://discord.com/developers/docs/topics/opcodes-and-status-codes#json>
#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: u32,
    message: String,
}

/// Decode a successful response, or surface Discord's error for anything
/// else.
pub(super) async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, DiscordError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json().await?);
    }

    // Not every failure comes with a JSON body, for example those from a
    // proxy in front of Discord.
    let body = res.text().await?;
    let err = serde_json::from_str::<ErrorResponse>(&body).unwrap_or(ErrorResponse {
        code: 0,
        message: body,
    });

    Err(DiscordError::Api {
        status: status.as_u16(),
        code: err.code,
        message: err.message,
    })
}
