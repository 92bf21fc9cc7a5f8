use nom::bytes::complete::take;
use nom::error::{Error as NomError, ErrorKind};
use nom::number::complete::be_u8;
use nom::Err;
use nom::IResult;
use smallvec::SmallVec;

use super::{CipherSuite, CompressionMethod, ProtocolVersion};
use super::{Cookie, ExtensionTable, Random, SessionId};
use crate::Error;

/// ClientHello body.
///
/// `cipher_suites` is the wire list, i.e. including the SCSV when the
/// driver appends one. The extension block is only emitted when the table
/// is non-empty.
#[derive(Debug, PartialEq, Eq)]
pub struct ClientHello {
    pub client_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionId,
    pub cookie: Cookie,
    pub cipher_suites: SmallVec<[CipherSuite; 32]>,
    pub compression_methods: SmallVec<[CompressionMethod; 4]>,
    pub extensions: ExtensionTable,
}

impl ClientHello {
    pub fn new(
        client_version: ProtocolVersion,
        random: Random,
        session_id: SessionId,
        cookie: Cookie,
        cipher_suites: SmallVec<[CipherSuite; 32]>,
        compression_methods: SmallVec<[CompressionMethod; 4]>,
        extensions: ExtensionTable,
    ) -> Self {
        ClientHello {
            client_version,
            random,
            session_id,
            cookie,
            cipher_suites,
            compression_methods,
            extensions,
        }
    }

    /// Serialize the message body.
    ///
    /// Refuses RC4-based suites before emitting any bytes: RC4 MUST NOT be
    /// used with DTLS (RFC 4347 section 4.1.2.4).
    pub fn serialize(&self, output: &mut Vec<u8>) -> Result<(), Error> {
        for suite in &self.cipher_suites {
            if suite.is_rc4() {
                return Err(Error::InvalidArgument(format!(
                    "RC4 cipher suite {:04x} offered: RC4 MUST NOT be used with DTLS",
                    suite.as_u16()
                )));
            }
        }

        self.client_version.serialize(output);
        output.extend_from_slice(&self.random);
        crate::codec::write_opaque8(&self.session_id, output);
        crate::codec::write_opaque8(&self.cookie, output);

        output.extend_from_slice(&(self.cipher_suites.len() as u16 * 2).to_be_bytes());
        for suite in &self.cipher_suites {
            output.extend_from_slice(&suite.as_u16().to_be_bytes());
        }

        output.push(self.compression_methods.len() as u8);
        for method in &self.compression_methods {
            output.push(method.as_u8());
        }

        if !self.extensions.is_empty() {
            self.extensions.serialize(output);
        }

        Ok(())
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], ClientHello> {
        let (input, client_version) = ProtocolVersion::parse(input)?;

        let (input, random_bytes) = take(32usize)(input)?;
        let random = Random::new(random_bytes).expect("32 bytes taken");

        let (input, session_id_bytes) = crate::codec::opaque8(input)?;
        let session_id = SessionId::try_new(session_id_bytes)
            .map_err(|_| Err::Failure(NomError::new(input, ErrorKind::LengthValue)))?;

        let (input, cookie_bytes) = crate::codec::opaque8(input)?;
        let cookie = Cookie::try_new(cookie_bytes)
            .map_err(|_| Err::Failure(NomError::new(input, ErrorKind::LengthValue)))?;

        let (input, suite_ids) = crate::codec::vector16(input)?;
        let cipher_suites = suite_ids.iter().map(|&id| CipherSuite::from_u16(id)).collect();

        let (input, compression_len) = be_u8(input)?;
        let (input, compression_bytes) = take(compression_len)(input)?;
        if compression_bytes.is_empty() {
            return Err(Err::Failure(NomError::new(input, ErrorKind::LengthValue)));
        }
        let compression_methods = compression_bytes
            .iter()
            .map(|&b| CompressionMethod::from_u8(b))
            .collect();

        let (input, extensions) = if input.is_empty() {
            (input, ExtensionTable::new())
        } else {
            ExtensionTable::parse(input)?
        };

        Ok((
            input,
            ClientHello {
                client_version,
                random,
                session_id,
                cookie,
                cipher_suites,
                compression_methods,
                extensions,
            },
        ))
    }
}

/// Splice a server-issued cookie into an already-serialized ClientHello.
///
/// The body layout fixes the session_id length byte at offset 34 (2 version
/// bytes + 32 random bytes); the cookie length byte follows the session_id
/// bytes. Everything outside the cookie region is copied byte-for-byte so
/// the retransmitted hello stays identical to the first except for the
/// cookie, keeping the handshake transcript deterministic.
pub fn patch_client_hello_with_cookie(body: &[u8], cookie: &[u8]) -> Result<Vec<u8>, Error> {
    const SESSION_ID_POS: usize = 34;

    let session_id_len = *body.get(SESSION_ID_POS).ok_or_else(|| {
        Error::DecodeError("ClientHello body too short for session_id length".to_string())
    })? as usize;

    let cookie_length_pos = SESSION_ID_POS + 1 + session_id_len;
    let cookie_pos = cookie_length_pos + 1;

    if body.len() < cookie_pos {
        return Err(Error::DecodeError(
            "ClientHello body too short for cookie length".to_string(),
        ));
    }

    let mut patched = Vec::with_capacity(body.len() + cookie.len());
    patched.extend_from_slice(&body[..cookie_length_pos]);
    patched.push(cookie.len() as u8);
    patched.extend_from_slice(cookie);
    patched.extend_from_slice(&body[cookie_pos..]);

    Ok(patched)
}
