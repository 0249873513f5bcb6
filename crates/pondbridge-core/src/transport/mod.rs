//! Peer transport port.
//!
//! The P2P network itself is an external collaborator; the core only
//! needs a way to receive inbound messages and push reply text back out.

use tokio::sync::mpsc;

use pondbridge_types::error::TransportError;
use pondbridge_types::message::{DeliveryContext, InboundMessage};

/// Trait for the P2P message transport.
///
/// `connect` establishes the link and returns the inbound mailbox; the
/// implementation owns whatever polling or socket machinery feeds it.
/// The infra implementation is an HTTP gateway client; tests substitute
/// channel-backed stubs.
pub trait PeerTransport: Send + Sync {
    /// Connect to the network and return the inbound message mailbox.
    ///
    /// Fails when the gateway cannot be reached; this failure is fatal
    /// to agent initialization and is surfaced to the caller of
    /// `SentimentAgent::start`.
    fn connect(
        &self,
    ) -> impl std::future::Future<Output = Result<mpsc::Receiver<InboundMessage>, TransportError>> + Send;

    /// Deliver reply text to a counterparty.
    fn send(
        &self,
        to: &str,
        text: &str,
        context: &DeliveryContext,
    ) -> impl std::future::Future<Output = Result<(), TransportError>> + Send;

    /// Release the connection. Idempotent, best-effort.
    fn disconnect(&self) -> impl std::future::Future<Output = ()> + Send;
}
