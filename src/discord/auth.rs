//! Helpers around Discord's bot token authentication, and the session a
//! token logs in to.
//!
//! Logging in is asynchronous: [DiscordClient::login] kicks it off in the
//! background and hands back a [Login], which resolves once the session is
//! ready (or has failed to become so).

use super::{api::*, error::DiscordError};
use serde::Deserialize;
use std::fmt;
use tokio::sync::oneshot;
use tracing::debug;

/// A newtype wrapper around Discord bot tokens.
#[derive(PartialEq, Eq, Clone)]
pub struct BotToken(pub String);

/// Never print the secret itself.
impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(..)")
    }
}

/// Convert a bot token to a `Bot` `Authorization` header value.
///
/// ```
/// let token = BotToken("abc.def".into());
/// assert_eq!(to_auth_header_val(&token), "Bot abc.def");
/// ```
pub fn to_auth_header_val(t: &BotToken) -> String {
    format!("Bot {}", t.0)
}

/// The bot user a token belongs to.
///
/// <https://discord.com/developers/docs/resources/user#user-object>
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUser {
    #[allow(dead_code)]
    pub id: String,
    pub username: String,
}

/// An authenticated session, good for the lifetime of one announcement.
pub struct Session {
    pub(super) client: DiscordClient,
    pub(super) token: BotToken,
    pub user: CurrentUser,
}

/// A login in flight. Await [Login::ready] for the session.
pub struct Login {
    rx: oneshot::Receiver<Result<Session, DiscordError>>,
}

impl Login {
    /// Wait for the session to become ready.
    pub async fn ready(self) -> Result<Session, DiscordError> {
        self.rx.await.unwrap_or(Err(DiscordError::SessionClosed))
    }
}

impl DiscordClient {
    /// Begin logging in with `token`. The login proceeds in the background
    /// whether or not the returned [Login] is awaited.
    pub fn login(&self, token: BotToken) -> Login {
        let (tx, rx) = oneshot::channel();
        let client = self.clone();

        tokio::spawn(async move {
            let res = client.identify(&token).await.map(|user| {
                debug!(bot = %user.username, "Discord session ready");
                Session {
                    client,
                    token,
                    user,
                }
            });

            // The receiver may have been dropped if the request was
            // abandoned, in which case there's nobody left to tell.
            let _ = tx.send(res);
        });

        Login { rx }
    }

    /// <https://discord.com/developers/docs/resources/user#get-current-user>
    async fn identify(&self, token: &BotToken) -> Result<CurrentUser, DiscordError> {
        let res = self.get("/users/@me", token).send().await?;

        decode(res).await
    }
}
