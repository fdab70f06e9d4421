//! Pull image markup out of a description so that the images can travel as
//! attachments, leaving positional placeholders behind in the text.
//!
//! ```text
//! See ![shot](img.png) and ![diff](https://x/diff.png)
//! ```
//!
//! becomes
//!
//! ```text
//! See [image1:shot] and [image2:diff]
//! ```
//!
//! with the two images, in that order, alongside.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use url::Url;

/// `![alt](url)`, where neither part may span lines, the alt text may not
/// contain `]`, and the URL may not contain `)`.
// This unwrap is exercised by every test below.
static IMAGE_MARKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[(?P<alt>[^\]\r\n]*)\]\((?P<url>[^)\r\n]*)\)").unwrap());

/// An image referenced from a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

/// A description with its images extracted. The `n`th placeholder in `text`
/// refers to `images[n - 1]`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Extracted {
    pub text: String,
    pub images: Vec<Image>,
}

/// Replace every image in `desc` with a placeholder, collecting the images
/// in order of appearance. Relative image URLs are resolved against `base`
/// where one is given.
pub fn extract_images(desc: &str, base: Option<&Url>) -> Extracted {
    let mut images = Vec::new();

    let text = IMAGE_MARKUP
        .replace_all(desc, |cs: &Captures| {
            let alt = &cs["alt"];
            images.push(Image {
                url: resolve(&cs["url"], base),
                alt: alt.to_owned(),
            });

            format!("[image{}:{}]", images.len(), alt)
        })
        .into_owned();

    Extracted { text, images }
}

/// Absolute URLs pass through untouched. Relative ones are joined onto
/// `base`, or left as they are without one.
fn resolve(raw: &str, base: Option<&Url>) -> String {
    match (Url::parse(raw), base) {
        (Ok(_), _) => raw.to_owned(),
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base
            .join(raw)
            .map(String::from)
            .unwrap_or_else(|_| raw.to_owned()),
        _ => raw.to_owned(),
    }
}
