use nom::bytes::complete::take;
use nom::error::{Error, ErrorKind};
use nom::number::complete::be_u16;
use nom::Err;
use nom::IResult;

/// Extension type registry values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionType {
    ServerName,
    MaxFragmentLength,
    ClientCertificateUrl,
    TrustedCaKeys,
    TruncatedHmac,
    StatusRequest,
    SupportedGroups,
    EcPointFormats,
    Srp,
    SignatureAlgorithms,
    UseSrtp,
    Heartbeat,
    ApplicationLayerProtocolNegotiation,
    SessionTicket,
    RenegotiationInfo,
    Unknown(u16),
}

impl ExtensionType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0000 => ExtensionType::ServerName,
            0x0001 => ExtensionType::MaxFragmentLength,
            0x0002 => ExtensionType::ClientCertificateUrl,
            0x0003 => ExtensionType::TrustedCaKeys,
            0x0004 => ExtensionType::TruncatedHmac,
            0x0005 => ExtensionType::StatusRequest,
            0x000A => ExtensionType::SupportedGroups,
            0x000B => ExtensionType::EcPointFormats,
            0x000C => ExtensionType::Srp,
            0x000D => ExtensionType::SignatureAlgorithms,
            0x000E => ExtensionType::UseSrtp,
            0x000F => ExtensionType::Heartbeat,
            0x0010 => ExtensionType::ApplicationLayerProtocolNegotiation,
            0x0023 => ExtensionType::SessionTicket,
            0xFF01 => ExtensionType::RenegotiationInfo,
            _ => ExtensionType::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            ExtensionType::ServerName => 0x0000,
            ExtensionType::MaxFragmentLength => 0x0001,
            ExtensionType::ClientCertificateUrl => 0x0002,
            ExtensionType::TrustedCaKeys => 0x0003,
            ExtensionType::TruncatedHmac => 0x0004,
            ExtensionType::StatusRequest => 0x0005,
            ExtensionType::SupportedGroups => 0x000A,
            ExtensionType::EcPointFormats => 0x000B,
            ExtensionType::Srp => 0x000C,
            ExtensionType::SignatureAlgorithms => 0x000D,
            ExtensionType::UseSrtp => 0x000E,
            ExtensionType::Heartbeat => 0x000F,
            ExtensionType::ApplicationLayerProtocolNegotiation => 0x0010,
            ExtensionType::SessionTicket => 0x0023,
            ExtensionType::RenegotiationInfo => 0xFF01,
            ExtensionType::Unknown(value) => *value,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], ExtensionType> {
        let (input, value) = be_u16(input)?;
        Ok((input, ExtensionType::from_u16(value)))
    }
}

/// An ordered extension table.
///
/// Iteration preserves insertion order, which is also the wire order.
/// The client builds its table once before the first ClientHello and the
/// driver treats it as read-only from then on.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: Vec<(ExtensionType, Vec<u8>)>,
}

impl ExtensionTable {
    pub fn new() -> Self {
        ExtensionTable {
            entries: Vec::new(),
        }
    }

    /// Add or replace an extension, keeping first-insertion order for
    /// replacements.
    pub fn insert(&mut self, extension_type: ExtensionType, data: Vec<u8>) {
        for entry in &mut self.entries {
            if entry.0 == extension_type {
                entry.1 = data;
                return;
            }
        }
        self.entries.push((extension_type, data));
    }

    pub fn get(&self, extension_type: ExtensionType) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(t, _)| *t == extension_type)
            .map(|(_, d)| d.as_slice())
    }

    pub fn contains(&self, extension_type: ExtensionType) -> bool {
        self.get(extension_type).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExtensionType, &[u8])> {
        self.entries.iter().map(|(t, d)| (*t, d.as_slice()))
    }

    /// Serialize as a u16 total length followed by (type, length, data)
    /// triples in insertion order.
    pub fn serialize(&self, output: &mut Vec<u8>) {
        let total: usize = self.entries.iter().map(|(_, d)| 4 + d.len()).sum();
        output.extend_from_slice(&(total as u16).to_be_bytes());

        for (extension_type, data) in &self.entries {
            output.extend_from_slice(&extension_type.as_u16().to_be_bytes());
            output.extend_from_slice(&(data.len() as u16).to_be_bytes());
            output.extend_from_slice(data);
        }
    }

    /// Parse an extension block. Duplicate types are rejected.
    pub fn parse(input: &[u8]) -> IResult<&[u8], ExtensionTable> {
        let (input, total_len) = be_u16(input)?;
        let (input, mut block) = take(total_len)(input)?;

        let mut table = ExtensionTable::new();
        while !block.is_empty() {
            let (rest, extension_type) = ExtensionType::parse(block)?;
            let (rest, data_len) = be_u16(rest)?;
            let (rest, data) = take(data_len)(rest)?;

            if table.contains(extension_type) {
                return Err(Err::Failure(Error::new(block, ErrorKind::Verify)));
            }

            table.insert(extension_type, data.to_vec());
            block = rest;
        }

        Ok((input, table))
    }
}

/// The renegotiation_info extension payload: a u8-length-prefixed
/// `renegotiated_connection` value (RFC 5746).
pub fn create_renegotiation_info(renegotiated_connection: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(1 + renegotiated_connection.len());
    crate::codec::write_opaque8(renegotiated_connection, &mut payload);
    payload
}
