//! Peer transport implementations.

pub mod gateway;

pub use gateway::HttpGatewayTransport;
