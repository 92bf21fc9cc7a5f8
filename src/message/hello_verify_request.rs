use nom::error::{Error as NomError, ErrorKind};
use nom::Err;
use nom::IResult;

use super::{Cookie, ProtocolVersion};

/// HelloVerifyRequest body: server version plus the cookie the client must
/// echo in its retransmitted ClientHello.
#[derive(Debug, PartialEq, Eq)]
pub struct HelloVerifyRequest {
    pub server_version: ProtocolVersion,
    pub cookie: Cookie,
}

impl HelloVerifyRequest {
    pub fn new(server_version: ProtocolVersion, cookie: Cookie) -> Self {
        HelloVerifyRequest {
            server_version,
            cookie,
        }
    }

    /// Parse the body. The cookie must be 1..=32 bytes; a zero-length
    /// cookie would defeat the verification round-trip.
    pub fn parse(input: &[u8]) -> IResult<&[u8], HelloVerifyRequest> {
        let (input, server_version) = ProtocolVersion::parse(input)?;
        let (input, cookie_bytes) = crate::codec::opaque8(input)?;

        if cookie_bytes.is_empty() || cookie_bytes.len() > 32 {
            return Err(Err::Failure(NomError::new(input, ErrorKind::LengthValue)));
        }
        let cookie = Cookie::try_new(cookie_bytes).expect("length checked");

        Ok((
            input,
            HelloVerifyRequest {
                server_version,
                cookie,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        self.server_version.serialize(output);
        crate::codec::write_opaque8(&self.cookie, output);
    }
}
