//! Chat-facing output: platform-neutral [`messages::ChatMessage`] builders and
//! their Discord embed rendering.

pub mod embeds;
pub mod messages;
