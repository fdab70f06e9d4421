//! Look up Discord channels and the threads within them.

use super::{api::*, auth::Session, error::DiscordError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discord snowflake identifying a channel. Threads are channels too, so
/// topics are addressed the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelId(pub String);

/// Format without the surrounding newtype wrapper.
impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The metadata we care about per-channel.
///
/// <https://discord.com/developers/docs/resources/channel#channel-object>
#[derive(Debug, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: Option<String>,
    pub parent_id: Option<ChannelId>,
}

/// <https://discord.com/developers/docs/resources/channel#channel-object-channel-types>
const THREAD_KINDS: [u8; 3] = [
    10, // ANNOUNCEMENT_THREAD
    11, // PUBLIC_THREAD
    12, // PRIVATE_THREAD
];

impl Channel {
    pub fn is_thread(&self) -> bool {
        THREAD_KINDS.contains(&self.kind)
    }
}

impl Session {
    /// Fetch a channel by its ID.
    pub async fn get_channel(&self, id: &ChannelId) -> Result<Channel, DiscordError> {
        let res = self
            .client
            .get(format!("/channels/{}", id), &self.token)
            .send()
            .await?;

        decode(res).await
    }

    /// Fetch a thread by its ID, ensuring that it belongs to `channel`.
    pub async fn get_thread(
        &self,
        channel: &Channel,
        id: &ChannelId,
    ) -> Result<Channel, DiscordError> {
        let thread = self.get_channel(id).await?;

        if thread.is_thread() && thread.parent_id.as_ref() == Some(&channel.id) {
            Ok(thread)
        } else {
            Err(DiscordError::UnknownThread(id.clone()))
        }
    }
}
