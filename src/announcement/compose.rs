//! Turn a validated announcement into a message ready to send.

use super::{description::extract_images, request::ValidAnnouncement};
use crate::discord::message::{Author, Message};
use chrono::{DateTime, Utc};

/// Embed color for prereleases: amber.
pub const PRERELEASE_COLOR: u32 = 0xF1C40F;
/// Embed color for everything else: green.
pub const RELEASE_COLOR: u32 = 0x2ECC71;

/// Who announcements are attributed to when the caller doesn't say.
const FALLBACK_AUTHOR: &str = "Release Announcer";

/// Prerelease versions are recognised by a marker anywhere in the title, for
/// example `v2.0.0-rc.1` or `v2.0.0-pre`.
const PRERELEASE_MARKERS: [&str; 2] = ["-pre", "-rc"];

pub fn color_for(title: &str) -> u32 {
    if PRERELEASE_MARKERS.iter().any(|m| title.contains(m)) {
        PRERELEASE_COLOR
    } else {
        RELEASE_COLOR
    }
}

fn author(name: Option<String>) -> Author {
    Author {
        name: name.unwrap_or_else(|| FALLBACK_AUTHOR.to_owned()),
        icon_url: None,
    }
}

/// Build the outbound message, extracting images from the description as
/// attachments.
pub fn compose(ann: ValidAnnouncement, now: DateTime<Utc>) -> Message {
    let extracted = extract_images(&ann.description, ann.base_url.as_ref());

    Message {
        color: color_for(&ann.title),
        title: ann.title,
        url: ann.link,
        author: author(ann.author),
        timestamp: now,
        body: extracted.text,
        attachments: extracted.images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        announcement::description::Image,
        discord::{auth::BotToken, channel::ChannelId},
    };
    use chrono::TimeZone;
    use quickcheck::quickcheck;
    use url::Url;

    fn announcement(title: &str, author: Option<&str>) -> ValidAnnouncement {
        ValidAnnouncement {
            token: BotToken("t".into()),
            channel: ChannelId("1".into()),
            topic: ChannelId("2".into()),
            title: title.into(),
            link: Url::parse("https://x/y").unwrap(),
            author: author.map(str::to_owned),
            description: "See ![shot](img.png)".into(),
            base_url: Some(Url::parse("https://cdn.example/").unwrap()),
        }
    }

    #[test]
    fn test_color_for() {
        assert_eq!(color_for("v1.0.0"), RELEASE_COLOR);
        assert_eq!(color_for("v1.0.0-pre"), PRERELEASE_COLOR);
        assert_eq!(color_for("v1.0.0-rc.2"), PRERELEASE_COLOR);
        assert_eq!(color_for("Release -rc of the week"), PRERELEASE_COLOR);
        assert_eq!(color_for("v1.0.0-beta"), RELEASE_COLOR);
        assert_eq!(color_for("v1.0.0 rc"), RELEASE_COLOR);
        assert_eq!(color_for(""), RELEASE_COLOR);
    }

    #[test]
    fn test_compose() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let msg = compose(announcement("v1.0.0", Some("octocat")), now);

        assert_eq!(msg.title, "v1.0.0");
        assert_eq!(msg.url.as_str(), "https://x/y");
        assert_eq!(msg.color, RELEASE_COLOR);
        assert_eq!(msg.author.name, "octocat");
        assert_eq!(msg.timestamp, now);
        assert_eq!(msg.body, "See [image1:shot]");
        assert_eq!(
            msg.attachments,
            vec![Image {
                url: "https://cdn.example/img.png".into(),
                alt: "shot".into(),
            }]
        );
    }

    #[test]
    fn test_compose_fallback_author() {
        let msg = compose(announcement("v2.0.0-rc.1", None), Utc::now());

        assert_eq!(msg.author.name, FALLBACK_AUTHOR);
        assert_eq!(msg.color, PRERELEASE_COLOR);
    }

    quickcheck! {
        fn test_color_for_any_title(title: String) -> bool {
            let prerelease = title.contains("-pre") || title.contains("-rc");
            (color_for(&title) == PRERELEASE_COLOR) == prerelease
        }

        fn test_color_for_marked_titles(prefix: String, suffix: String, rc: bool) -> bool {
            let marker = if rc { "-rc" } else { "-pre" };
            color_for(&format!("{}{}{}", prefix, marker, suffix)) == PRERELEASE_COLOR
        }
    }
}
