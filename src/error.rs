use std::fmt;
use std::io;

use crate::alert::AlertDescription;

/// Fatal handshake failure.
///
/// Every variant maps to the TLS alert description the driver emits on the
/// record layer before the error reaches the caller.
#[derive(Debug)]
pub enum Error {
    /// A caller-supplied argument was unusable (e.g. an RC4 cipher suite
    /// was offered; RC4 MUST NOT be used with DTLS).
    InvalidArgument(String),
    /// The server negotiated something we never offered, or a version
    /// later than ours.
    IllegalParameter(String),
    /// A handshake message arrived out of order for the current state.
    UnexpectedMessage(String),
    /// A message body was malformed or had trailing bytes.
    DecodeError(String),
    /// The server returned an extension type the client did not offer.
    UnsupportedExtension(String),
    /// Negotiation failed a security check (renegotiation_info payload,
    /// Finished verify_data mismatch).
    HandshakeFailure(String),
    /// The client capability is misconfigured (non-DTLS client version).
    InternalError(String),
    /// The datagram transport or reliable layer failed underneath us.
    Transport(io::Error),
}

impl Error {
    /// The alert description to put on the wire for this failure.
    pub fn alert_description(&self) -> AlertDescription {
        match self {
            Error::InvalidArgument(_) => AlertDescription::InternalError,
            Error::IllegalParameter(_) => AlertDescription::IllegalParameter,
            Error::UnexpectedMessage(_) => AlertDescription::UnexpectedMessage,
            Error::DecodeError(_) => AlertDescription::DecodeError,
            Error::UnsupportedExtension(_) => AlertDescription::UnsupportedExtension,
            Error::HandshakeFailure(_) => AlertDescription::HandshakeFailure,
            Error::InternalError(_) => AlertDescription::InternalError,
            Error::Transport(_) => AlertDescription::InternalError,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(m) => write!(f, "invalid argument: {}", m),
            Error::IllegalParameter(m) => write!(f, "illegal parameter: {}", m),
            Error::UnexpectedMessage(m) => write!(f, "unexpected message: {}", m),
            Error::DecodeError(m) => write!(f, "decode error: {}", m),
            Error::UnsupportedExtension(m) => write!(f, "unsupported extension: {}", m),
            Error::HandshakeFailure(m) => write!(f, "handshake failure: {}", m),
            Error::InternalError(m) => write!(f, "internal error: {}", m),
            Error::Transport(e) => write!(f, "transport: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Transport(value)
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Error {
    fn from(value: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        match value {
            nom::Err::Incomplete(_) => Error::DecodeError("incomplete message".to_string()),
            nom::Err::Error(x) => Error::DecodeError(format!("parse error: {:?}", x.code)),
            nom::Err::Failure(x) => Error::DecodeError(format!("parse failure: {:?}", x.code)),
        }
    }
}
