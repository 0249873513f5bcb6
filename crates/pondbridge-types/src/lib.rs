//! Shared domain types for Pondbridge.
//!
//! This crate contains the core domain types used across the Pondbridge
//! service: conversation turns, completion requests, inbound/outbound
//! message shapes, agent lifecycle states, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, secrecy, thiserror.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod message;
