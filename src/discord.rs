//! A thin client for the subset of Discord's REST API needed to post an
//! announcement into a thread.
//!
//! Every announcement logs in afresh with the credential it was given; see
//! [auth::Login]. Lookups and sends hang off the resulting [auth::Session].

pub mod api;
pub mod auth;
pub mod channel;
pub mod error;
pub mod message;

pub use error::DiscordError;
