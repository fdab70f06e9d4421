//! Relay release announcements into a Discord thread.
//!
//! A request names a channel and a thread ("topic") within it, and supplies
//! the bot token to post with. See [pipeline::announce] for the steps taken.

pub mod compose;
pub mod description;
pub mod pipeline;
pub mod request;
pub mod router;
