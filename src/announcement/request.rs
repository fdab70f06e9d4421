//! The shape of an announcement request, and its validation.

use crate::{
    discord::{auth::BotToken, channel::ChannelId},
    error::Failure,
};
use serde::Deserialize;
use std::fmt;
use url::Url;

/// The fields a caller may be told are missing or invalid, named as the
/// caller supplies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Token,
    Channel,
    Topic,
    Title,
    Link,
    BaseUrl,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = match self {
            Field::Token => "token",
            Field::Channel => "channel",
            Field::Topic => "topic",
            Field::Title => "title",
            Field::Link => "link",
            Field::BaseUrl => "baseUrl",
        };

        write!(f, "{}", x)
    }
}

/// The JSON body of an announcement request. Nothing is enforced at this
/// stage, so that callers get a [Failure::MissingField] naming what's
/// missing rather than a generic deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementBody {
    #[serde(default, deserialize_with = "crate::de::truthy_string")]
    pub base_url: Option<String>,
    #[serde(default, deserialize_with = "crate::de::truthy_string")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "crate::de::truthy_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::de::truthy_string")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "crate::de::truthy_string")]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "crate::de::truthy_string")]
    pub description: Option<String>,
}

/// An announcement as received, from both the path and the body.
#[derive(Debug, Default)]
pub struct AnnouncementRequest {
    pub channel: Option<String>,
    pub topic: Option<String>,
    pub body: AnnouncementBody,
}

/// An announcement which has passed validation.
#[derive(Debug)]
pub struct ValidAnnouncement {
    pub token: BotToken,
    pub channel: ChannelId,
    pub topic: ChannelId,
    pub title: String,
    pub link: Url,
    pub author: Option<String>,
    pub description: String,
    pub base_url: Option<Url>,
}

impl AnnouncementRequest {
    pub fn new(channel: String, topic: String, body: AnnouncementBody) -> Self {
        // Path segments can't be absent, but they can be blank.
        let present = |x: String| Some(x).filter(|x| !x.trim().is_empty());

        AnnouncementRequest {
            channel: present(channel),
            topic: present(topic),
            body,
        }
    }

    /// Check that every required field is present, in a fixed order so that
    /// the first missing field reported is deterministic, before checking
    /// that the URLs parse.
    pub fn validate(self) -> Result<ValidAnnouncement, Failure> {
        let AnnouncementRequest {
            channel,
            topic,
            body,
        } = self;

        let token = require(body.token, Field::Token)?;
        let channel = require(channel, Field::Channel)?;
        let topic = require(topic, Field::Topic)?;
        let title = require(body.title, Field::Title)?;
        let link = require(body.link, Field::Link)?;

        let link = parse_url(&link, Field::Link)?;
        let base_url = body
            .base_url
            .map(|x| parse_url(&x, Field::BaseUrl))
            .transpose()?;

        Ok(ValidAnnouncement {
            token: BotToken(token),
            channel: ChannelId(channel),
            topic: ChannelId(topic),
            title,
            link,
            author: body.author,
            description: body.description.unwrap_or_default(),
            base_url,
        })
    }
}

fn require(x: Option<String>, field: Field) -> Result<String, Failure> {
    x.ok_or(Failure::MissingField(field))
}

fn parse_url(x: &str, field: Field) -> Result<Url, Failure> {
    Url::parse(x).map_err(|e| Failure::InvalidField(field, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> AnnouncementRequest {
        AnnouncementRequest::new(
            "123".into(),
            "456".into(),
            AnnouncementBody {
                base_url: Some("https://cdn.example/".into()),
                token: Some("t".into()),
                title: Some("v1.0.0".into()),
                link: Some("https://x/y".into()),
                author: None,
                description: Some("See ![shot](img.png)".into()),
            },
        )
    }

    fn missing(req: AnnouncementRequest) -> Option<Field> {
        match req.validate() {
            Err(Failure::MissingField(f)) => Some(f),
            _ => None,
        }
    }

    #[test]
    fn test_valid() {
        let ann = full().validate().unwrap();

        assert_eq!(ann.token, BotToken("t".into()));
        assert_eq!(ann.channel, ChannelId("123".into()));
        assert_eq!(ann.topic, ChannelId("456".into()));
        assert_eq!(ann.link.as_str(), "https://x/y");
        assert_eq!(ann.base_url.unwrap().as_str(), "https://cdn.example/");
    }

    #[test]
    fn test_each_missing_field() {
        let mut req = full();
        req.body.token = None;
        assert_eq!(missing(req), Some(Field::Token));

        let mut req = full();
        req.channel = None;
        assert_eq!(missing(req), Some(Field::Channel));

        let mut req = full();
        req.topic = None;
        assert_eq!(missing(req), Some(Field::Topic));

        let mut req = full();
        req.body.title = None;
        assert_eq!(missing(req), Some(Field::Title));

        let mut req = full();
        req.body.link = None;
        assert_eq!(missing(req), Some(Field::Link));
    }

    #[test]
    fn test_missing_order() {
        assert_eq!(
            missing(AnnouncementRequest::default()),
            Some(Field::Token)
        );

        let mut req = full();
        req.topic = None;
        req.body.title = None;
        req.body.link = None;
        assert_eq!(missing(req), Some(Field::Topic));
    }

    #[test]
    fn test_blank_path_segment_is_missing() {
        let req = AnnouncementRequest::new(" ".into(), "456".into(), full().body);
        assert_eq!(missing(req), Some(Field::Channel));
    }

    #[test]
    fn test_optional_fields() {
        let mut req = full();
        req.body.base_url = None;
        req.body.description = None;

        let ann = req.validate().unwrap();
        assert!(ann.base_url.is_none());
        assert_eq!(ann.description, "");
    }

    #[test]
    fn test_invalid_urls() {
        let mut req = full();
        req.body.link = Some("not a link".into());
        assert!(matches!(
            req.validate(),
            Err(Failure::InvalidField(Field::Link, _))
        ));

        let mut req = full();
        req.body.base_url = Some("/relative/".into());
        assert!(matches!(
            req.validate(),
            Err(Failure::InvalidField(Field::BaseUrl, _))
        ));
    }

    #[test]
    fn test_falsy_body_fields() {
        let body: AnnouncementBody = serde_json::from_str(
            r#"{"token": "", "title": false, "link": null, "description": 0}"#,
        )
        .unwrap();

        assert!(body.token.is_none());
        assert!(body.title.is_none());
        assert!(body.link.is_none());
        assert!(body.description.is_none());
    }
}
