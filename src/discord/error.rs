use super::channel::ChannelId;
use thiserror::Error;

/// Sum type representing every possible unexceptional fail state when
/// talking to Discord.
#[derive(Debug, Error)]
pub enum DiscordError {
    #[error("Discord API request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Discord API returned {status}: {message}")]
    Api {
        status: u16,
        /// Discord's JSON error code, or zero if none was supplied.
        code: u32,
        message: String,
    },
    #[error("Failed to download attachment: {0}")]
    Download(#[source] reqwest::Error),
    #[error("Failed to encode Discord payload: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Not a thread of the requested channel: {0}")]
    UnknownThread(ChannelId),
    #[error("Discord session closed before becoming ready")]
    SessionClosed,
}

impl DiscordError {
    /// Whether the error means the requested resource doesn't exist (or
    /// doesn't exist where we looked for it).
    pub fn is_not_found(&self) -> bool {
        match self {
            DiscordError::Api { status, .. } => *status == 404,
            DiscordError::UnknownThread(_) => true,
            _ => false,
        }
    }

    /// Whether Discord rejected the bot token itself.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, DiscordError::Api { status: 401, .. })
    }

    /// Discord's JSON error code, if it supplied a meaningful one.
    pub fn code(&self) -> Option<u32> {
        match self {
            DiscordError::Api { code, .. } if *code != 0 => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: u32) -> DiscordError {
        DiscordError::Api {
            status,
            code,
            message: "any".to_owned(),
        }
    }

    #[test]
    fn test_is_not_found() {
        assert!(api(404, 10003).is_not_found());
        assert!(DiscordError::UnknownThread(ChannelId("1".into())).is_not_found());
        assert!(!api(403, 50001).is_not_found());
        assert!(!DiscordError::SessionClosed.is_not_found());
        assert!(!api(401, 0).is_not_found());
    }

    #[test]
    fn test_is_unauthenticated() {
        assert!(api(401, 0).is_unauthenticated());
        assert!(!api(403, 50001).is_unauthenticated());
    }

    #[test]
    fn test_code() {
        assert_eq!(api(404, 10003).code(), Some(10003));
        assert_eq!(api(502, 0).code(), None);
        assert_eq!(DiscordError::SessionClosed.code(), None);
    }
}
