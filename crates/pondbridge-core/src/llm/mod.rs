//! Completion provider port and outbound rate limiting.

pub mod provider;
pub mod rate_limit;

pub use provider::CompletionProvider;
pub use rate_limit::TokenBucket;
