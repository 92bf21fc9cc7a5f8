use nom::bytes::complete::take;
use nom::error::{Error as NomError, ErrorKind};
use nom::Err;
use nom::IResult;

use super::{CipherSuite, CompressionMethod, ProtocolVersion};
use super::{ExtensionTable, Random, SessionId};

/// ServerHello body.
///
/// Negotiation policy (suite must have been offered, SCSV never selected,
/// extension solicitation rules) is the driver's job; this type is just
/// the wire shape.
#[derive(Debug, PartialEq, Eq)]
pub struct ServerHello {
    pub server_version: ProtocolVersion,
    pub random: Random,
    pub session_id: SessionId,
    pub cipher_suite: CipherSuite,
    pub compression_method: CompressionMethod,
    pub extensions: Option<ExtensionTable>,
}

impl ServerHello {
    pub fn new(
        server_version: ProtocolVersion,
        random: Random,
        session_id: SessionId,
        cipher_suite: CipherSuite,
        compression_method: CompressionMethod,
        extensions: Option<ExtensionTable>,
    ) -> Self {
        ServerHello {
            server_version,
            random,
            session_id,
            cipher_suite,
            compression_method,
            extensions,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], ServerHello> {
        let (input, server_version) = ProtocolVersion::parse(input)?;

        let (input, random_bytes) = take(32usize)(input)?;
        let random = Random::new(random_bytes).expect("32 bytes taken");

        let (input, session_id_bytes) = crate::codec::opaque8(input)?;
        let session_id = SessionId::try_new(session_id_bytes)
            .map_err(|_| Err::Failure(NomError::new(input, ErrorKind::LengthValue)))?;

        let (input, cipher_suite) = CipherSuite::parse(input)?;
        let (input, compression_method) = CompressionMethod::parse(input)?;

        let (input, extensions) = if input.is_empty() {
            (input, None)
        } else {
            let (input, table) = ExtensionTable::parse(input)?;
            (input, Some(table))
        };

        Ok((
            input,
            ServerHello {
                server_version,
                random,
                session_id,
                cipher_suite,
                compression_method,
                extensions,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        self.server_version.serialize(output);
        output.extend_from_slice(&self.random);
        crate::codec::write_opaque8(&self.session_id, output);
        output.extend_from_slice(&self.cipher_suite.as_u16().to_be_bytes());
        output.push(self.compression_method.as_u8());
        if let Some(extensions) = &self.extensions {
            extensions.serialize(output);
        }
    }
}
