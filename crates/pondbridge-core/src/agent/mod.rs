//! Reply composition and agent lifecycle.

pub mod composer;
pub mod engine;

pub use composer::{ComposerSettings, ReplyComposer};
pub use engine::SentimentAgent;
