//! Business logic and transport/provider trait definitions for Pondbridge.
//!
//! This crate defines the "ports" (completion provider and peer transport
//! traits) that the infrastructure layer implements, plus the two pieces
//! of behavior the service actually owns: the bounded per-counterparty
//! conversation store and the reply composer. It depends only on
//! `pondbridge-types` -- never on `pondbridge-infra` or any HTTP crate.

pub mod agent;
pub mod conversation;
pub mod llm;
pub mod transport;
