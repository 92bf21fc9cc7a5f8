//! Interfaces to the reliable-handshake and record layers.
//!
//! Both layers live outside this crate: the reliable layer handles
//! fragmentation, retransmission and handshake sequence numbers; the
//! record layer handles encryption, epochs and datagram I/O. The driver
//! only needs the narrow surface below.

use crate::alert::{AlertDescription, AlertLevel};
use crate::message::{HandshakeType, ProtocolVersion};
use crate::Error;

/// A fully reassembled handshake message as delivered by the reliable
/// layer.
#[derive(Debug)]
pub struct HandshakeMessage {
    /// The handshake message type tag.
    pub msg_type: HandshakeType,
    /// The message body, defragmented.
    pub body: Vec<u8>,
}

/// The record layer beneath the handshake.
///
/// Constructed by the caller over a datagram transport; the driver only
/// consumes it through this interface and hands ownership to the returned
/// transport on success.
pub trait RecordLayer {
    /// The pending cipher state type this record layer installs. Matches
    /// [`crate::TlsClient::Cipher`] for the client in use.
    type Cipher;

    /// The protocol version observed on the first inbound record, if any
    /// record has arrived yet.
    fn discovered_peer_version(&self) -> Option<ProtocolVersion>;

    /// Stage the negotiated cipher for the next epoch. Committed when the
    /// Finished exchange completes.
    fn init_pending_epoch(&mut self, cipher: Self::Cipher);

    /// The handshake completed; retire the cleartext epoch.
    fn handshake_successful(&mut self);

    /// Emit an alert record. The driver sends a fatal alert with the
    /// failing error's description before surfacing any handshake error.
    fn send_alert(&mut self, level: AlertLevel, description: AlertDescription);
}

/// The reliable-handshake layer: ordered, reassembled handshake messages
/// plus the running transcript hash over everything sent and received.
pub trait ReliableHandshake {
    /// The record layer this handshake runs over.
    type Record: RecordLayer;

    /// Frame and send one handshake message. The body becomes part of the
    /// transcript.
    fn send_message(&mut self, msg_type: HandshakeType, body: &[u8]) -> Result<(), Error>;

    /// Block until the next fully reassembled handshake message arrives.
    /// The body becomes part of the transcript.
    fn receive_message(&mut self) -> Result<HandshakeMessage, Error>;

    /// The transcript hash over all messages so far: MD5 ‖ SHA-1
    /// (36 bytes) for pre-1.2 versions.
    fn current_hash(&self) -> Vec<u8>;

    /// Restart the transcript from empty. Used exactly once per cookie
    /// retry so only the post-cookie ClientHello contributes.
    fn reset_transcript(&mut self);

    /// Access the record layer mid-handshake (pending epoch, alerts).
    fn record_layer_mut(&mut self) -> &mut Self::Record;

    /// Drain outstanding retransmits and release the record layer.
    fn finish(self) -> Self::Record
    where
        Self: Sized;
}
