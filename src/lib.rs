//! dshake — DTLS 1.0 client handshake driver
//!
//! dshake drives a single client-side DTLS handshake to completion over an
//! unreliable datagram transport: it sequences the ordered message
//! exchange (including the DTLS cookie round-trip), negotiates
//! cryptographic parameters, derives the master secret and verify data,
//! and installs the traffic keys on a record layer so application data can
//! flow over the secured transport.
//!
//! The crate deliberately implements only the hard middle of the problem.
//! Everything around it is a pluggable seam:
//!
//! - **Cryptography** (cipher suites, key exchange, signing, certificate
//!   validation) comes from a [`TlsClient`] capability the caller
//!   supplies, together with its [`TlsKeyExchange`], [`TlsAuthentication`]
//!   and [`TlsCredentials`] companions.
//! - **Reliability** (fragmentation, retransmission, handshake sequence
//!   numbers, the running transcript hash) is consumed through the
//!   [`ReliableHandshake`] trait.
//! - **Records** (encryption, epochs, datagram I/O, alerts) are consumed
//!   through the [`RecordLayer`] trait, which the returned
//!   [`DtlsTransport`] takes ownership of on success.
//!
//! # Goals
//! - **DTLS 1.0 semantics**: the cookie exchange, pre-1.2 PRF (MD5 ‖ SHA-1)
//!   and Finished calculation, SCSV/renegotiation_info signaling.
//! - **Safety**: `forbid(unsafe_code)`; premaster secrets are zeroized on
//!   every exit path, Finished and renegotiation payloads compare in
//!   constant time.
//! - **No hidden state**: the RNG is injected, nothing is shared between
//!   handshakes.
//!
//! ## Non-goals
//! - **Session resumption** and **renegotiation** (a handshake is always
//!   full, and always the first)
//! - **Compression** beyond the null method
//! - **DTLS 1.2 signature-algorithm negotiation** and **DTLS 1.3**
//! - A record layer or reliable-handshake implementation of its own
//!
//! # Driving a handshake
//!
//! Construct a [`DtlsClientProtocol`] with an injected [`SeededRng`], then
//! call [`DtlsClientProtocol::connect`] with your client capability and a
//! reliable-handshake stack built over your record layer and datagram
//! transport. The call blocks (the reliable layer's `receive_message` is
//! the only suspension point) and returns either a ready
//! [`DtlsTransport`] or an [`Error`] naming the failure; in the failure
//! case a fatal alert with the matching description has already been
//! emitted on the record layer.

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::len_without_is_empty)]

#[macro_use]
extern crate log;

mod alert;
pub use alert::{AlertDescription, AlertLevel};

mod error;
pub use error::Error;

pub mod codec;

pub mod message;

mod prf;
pub use prf::{calculate_verify_data, master_secret_from_premaster, prf, MASTER_SECRET_LEN};

mod rng;
pub use rng::SeededRng;

mod client;
pub use client::{
    SecurityParameters, TlsAuthentication, TlsClient, TlsContext, TlsCredentials, TlsKeyExchange,
    TlsSignerCredentials,
};

mod handshake;
pub use handshake::{HandshakeMessage, RecordLayer, ReliableHandshake};

mod protocol;
pub use protocol::{DtlsClientProtocol, DtlsTransport};
