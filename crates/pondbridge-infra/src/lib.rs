//! Infrastructure layer for Pondbridge.
//!
//! Contains implementations of the ports defined in `pondbridge-core`:
//! the OpenAI-compatible completion provider, the HTTP gateway transport
//! for the P2P network, the Twilio WhatsApp sender, and the configuration
//! loader.

pub mod config;
pub mod llm;
pub mod transport;
pub mod twilio;
