//! Carry an announcement from request to Discord.
//!
//! Each announcement passes through the following stages in order, stopping
//! at the first failure:
//!
//! 1. [Stage::Validating]
//! 2. [Stage::Authenticating], with a fresh session per announcement
//! 3. [Stage::ResolvingChannel]
//! 4. [Stage::ResolvingTopic]
//! 5. [Stage::Composing]
//! 6. [Stage::Sending]
//!
//! An announcement ends in [Stage::Done], or in [Stage::Failed] from
//! whichever stage went wrong. Nothing is retried.

use super::{compose::compose, request::AnnouncementRequest};
use crate::{
    discord::api::DiscordClient,
    error::{Failure, Target},
};
use chrono::Utc;
use std::fmt;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Authenticating,
    ResolvingChannel,
    ResolvingTopic,
    Composing,
    Sending,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            Stage::Validating => "validating",
            Stage::Authenticating => "authenticating",
            Stage::ResolvingChannel => "resolving channel",
            Stage::ResolvingTopic => "resolving topic",
            Stage::Composing => "composing",
            Stage::Sending => "sending",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };

        write!(f, "{}", x)
    }
}

/// Validate and post an announcement, logging any failure along with the
/// stage it occurred in.
pub async fn announce(client: &DiscordClient, req: AnnouncementRequest) -> Result<(), Failure> {
    let mut stage = Stage::Validating;

    let res = run(client, req, &mut stage).await;

    if let Err(e) = &res {
        error!(%stage, "Announcement failed: {}", e);
        advance(&mut stage, Stage::Failed);
    }

    debug_assert!(matches!(stage, Stage::Done | Stage::Failed));

    res
}

async fn run(
    client: &DiscordClient,
    req: AnnouncementRequest,
    stage: &mut Stage,
) -> Result<(), Failure> {
    let ann = req.validate()?;

    advance(stage, Stage::Authenticating);
    let session = client
        .login(ann.token.clone())
        .ready()
        .await
        .map_err(Failure::Authentication)?;

    advance(stage, Stage::ResolvingChannel);
    let channel = session
        .get_channel(&ann.channel)
        .await
        .map_err(|e| Failure::lookup(Target::Channel(ann.channel.clone()), e))?;

    advance(stage, Stage::ResolvingTopic);
    let thread = session
        .get_thread(&channel, &ann.topic)
        .await
        .map_err(|e| Failure::lookup(Target::Topic(ann.topic.clone()), e))?;

    advance(stage, Stage::Composing);
    let msg = compose(ann, Utc::now());

    advance(stage, Stage::Sending);
    session
        .send_message(&thread.id, &msg)
        .await
        .map_err(Failure::Delivery)?;

    advance(stage, Stage::Done);
    info!(
        bot = %session.user.username,
        channel = %channel.id,
        topic = %thread.id,
        thread = thread.name.as_deref().unwrap_or_default(),
        images = msg.attachments.len(),
        "Posted announcement: {}",
        msg.title
    );

    Ok(())
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "Announcement stage");
    *stage = next;
}
