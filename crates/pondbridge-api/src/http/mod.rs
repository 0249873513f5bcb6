//! HTTP layer for Pondbridge.
//!
//! Axum-based operator API: agent initialization/stop, the Twilio
//! WhatsApp webhook, and a health check, with envelope responses and
//! CORS support.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
