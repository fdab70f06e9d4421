//! Send rich messages, with image attachments, to a Discord thread.

use super::{api::*, auth::Session, channel::ChannelId, error::DiscordError};
use crate::announcement::description::Image;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use url::Url;

/// A structured message, rendered on Discord's end as a single embed with
/// any images uploaded alongside it.
pub struct Message {
    pub title: String,
    pub url: Url,
    pub color: u32,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    pub body: String,
    pub attachments: Vec<Image>,
}

/// Who the message is displayed as coming from.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub name: String,
    pub icon_url: Option<Url>,
}

/// <https://discord.com/developers/docs/resources/message#embed-object>
#[skip_serializing_none]
#[derive(Serialize)]
struct Embed<'a> {
    title: &'a str,
    url: &'a Url,
    color: u32,
    author: &'a Author,
    timestamp: String,
    description: Option<&'a str>,
}

/// <https://discord.com/developers/docs/resources/message#attachment-object>
#[derive(Serialize)]
struct AttachmentMeta<'a> {
    id: usize,
    filename: String,
    description: &'a str,
}

/// <https://discord.com/developers/docs/resources/message#create-message-jsonform-params>
#[derive(Serialize)]
struct MessageRequest<'a> {
    embeds: [Embed<'a>; 1],
    attachments: Vec<AttachmentMeta<'a>>,
}

/// <https://discord.com/developers/docs/resources/message#message-object>
#[derive(Deserialize)]
struct MessageResponse {
    #[allow(dead_code)]
    id: String,
}

impl Session {
    /// Post a message in a thread (or any other channel), uploading its
    /// attachments.
    pub async fn send_message(&self, to: &ChannelId, msg: &Message) -> Result<(), DiscordError> {
        let attachments: Vec<AttachmentMeta> = msg
            .attachments
            .iter()
            .enumerate()
            .map(|(i, img)| AttachmentMeta {
                id: i,
                filename: attachment_filename(i + 1, &img.url),
                description: &img.alt,
            })
            .collect();

        let payload = MessageRequest {
            embeds: [build_embed(msg)],
            attachments,
        };

        let req = self
            .client
            .post(format!("/channels/{}/messages", to), &self.token);

        let req = if payload.attachments.is_empty() {
            req.json(&payload)
        } else {
            req.multipart(self.build_form(&payload, &msg.attachments).await?)
        };

        let _: MessageResponse = decode(req.send().await?).await?;

        Ok(())
    }

    /// Download every image and pack it, along with the JSON payload, into
    /// the multipart shape Discord expects for uploads.
    async fn build_form(
        &self,
        payload: &MessageRequest<'_>,
        images: &[Image],
    ) -> Result<Form, DiscordError> {
        let json = serde_json::to_string(payload)?;
        let mut form =
            Form::new().part("payload_json", Part::text(json).mime_str("application/json")?);

        for (meta, img) in payload.attachments.iter().zip(images) {
            let bytes = self
                .client
                .fetch(&img.url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(DiscordError::Download)?
                .bytes()
                .await
                .map_err(DiscordError::Download)?;

            form = form.part(
                format!("files[{}]", meta.id),
                Part::bytes(bytes.to_vec()).file_name(meta.filename.clone()),
            );
        }

        Ok(form)
    }
}

/// Map [Message] to its embed format on Discord's end.
fn build_embed(msg: &Message) -> Embed<'_> {
    Embed {
        title: &msg.title,
        url: &msg.url,
        color: msg.color,
        author: &msg.author,
        timestamp: msg.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        description: Some(msg.body.as_str()).filter(|x| !x.is_empty()),
    }
}

/// Name the `n`th upload after its position, keeping the source's extension
/// so that Discord renders it inline.
///
/// ```
/// assert_eq!(attachment_filename(2, "https://x/a/shot.PNG?v=1"), "image2.png");
/// ```
fn attachment_filename(n: usize, url: &str) -> String {
    let ext = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut xs| xs.next_back().map(str::to_owned))
        })
        .and_then(|file| {
            file.rsplit_once('.')
                .map(|(_, ext)| ext.to_ascii_lowercase())
        })
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("image{}.{}", n, ext),
        None => format!("image{}.png", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn message(body: &str) -> Message {
        Message {
            title: "v1.0.0".into(),
            url: Url::parse("https://example.com/releases/v1.0.0").unwrap(),
            color: 0x2ECC71,
            author: Author {
                name: "someone".into(),
                icon_url: None,
            },
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            body: body.into(),
            attachments: vec![],
        }
    }

    #[test]
    fn test_build_embed() {
        let msg = message("Changelog [image1:shot]");
        let json = serde_json::to_value(build_embed(&msg)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "title": "v1.0.0",
                "url": "https://example.com/releases/v1.0.0",
                "color": 0x2ECC71,
                "author": { "name": "someone" },
                "timestamp": "2024-03-01T12:30:00.000Z",
                "description": "Changelog [image1:shot]",
            })
        );
    }

    #[test]
    fn test_build_embed_omits_empty_body() {
        let msg = message("");
        let json = serde_json::to_value(build_embed(&msg)).unwrap();

        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_attachment_filename() {
        assert_eq!(
            attachment_filename(1, "https://cdn.example/img.png"),
            "image1.png"
        );
        assert_eq!(
            attachment_filename(2, "https://x/a/shot.JPEG?size=large#top"),
            "image2.jpeg"
        );
        assert_eq!(attachment_filename(3, "https://x/a/shot"), "image3.png");
        assert_eq!(attachment_filename(4, "https://x/"), "image4.png");
        assert_eq!(attachment_filename(5, "relative/shot.gif"), "image5.png");
    }
}
