//! Handshake message types and their wire codecs.

mod certificate;
mod certificate_request;
mod certificate_verify;
mod client_hello;
mod extension;
mod finished;
mod hello_verify_request;
mod id;
mod server_hello;
mod supplemental_data;

pub use certificate::{Asn1Cert, Certificate};
pub use certificate_request::{CertificateRequest, ClientCertificateType, DistinguishedName};
pub use certificate_verify::CertificateVerify;
pub use client_hello::{patch_client_hello_with_cookie, ClientHello};
pub use extension::{create_renegotiation_info, ExtensionTable, ExtensionType};
pub use finished::{Finished, VERIFY_DATA_LEN};
pub use hello_verify_request::HelloVerifyRequest;
pub use id::{Cookie, InvalidLength, Random, SessionId};
pub use server_hello::ServerHello;
pub use supplemental_data::SupplementalDataEntry;

use nom::number::complete::{be_u16, be_u8};
use nom::IResult;

/// Handshake message type tag (RFC 2246 section 7.4 plus the DTLS
/// hello_verify_request).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeType {
    HelloRequest,
    ClientHello,
    ServerHello,
    HelloVerifyRequest,
    Certificate,
    ServerKeyExchange,
    CertificateRequest,
    ServerHelloDone,
    CertificateVerify,
    ClientKeyExchange,
    Finished,
    SupplementalData,
    Unknown(u8),
}

impl HandshakeType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => HandshakeType::HelloRequest,
            1 => HandshakeType::ClientHello,
            2 => HandshakeType::ServerHello,
            3 => HandshakeType::HelloVerifyRequest,
            11 => HandshakeType::Certificate,
            12 => HandshakeType::ServerKeyExchange,
            13 => HandshakeType::CertificateRequest,
            14 => HandshakeType::ServerHelloDone,
            15 => HandshakeType::CertificateVerify,
            16 => HandshakeType::ClientKeyExchange,
            20 => HandshakeType::Finished,
            23 => HandshakeType::SupplementalData,
            _ => HandshakeType::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            HandshakeType::HelloRequest => 0,
            HandshakeType::ClientHello => 1,
            HandshakeType::ServerHello => 2,
            HandshakeType::HelloVerifyRequest => 3,
            HandshakeType::Certificate => 11,
            HandshakeType::ServerKeyExchange => 12,
            HandshakeType::CertificateRequest => 13,
            HandshakeType::ServerHelloDone => 14,
            HandshakeType::CertificateVerify => 15,
            HandshakeType::ClientKeyExchange => 16,
            HandshakeType::Finished => 20,
            HandshakeType::SupplementalData => 23,
            HandshakeType::Unknown(value) => *value,
        }
    }
}

/// Cipher suite identifier.
///
/// Suites the driver must recognize by exact id are named: the RC4 family
/// (forbidden for DTLS), the renegotiation SCSV, and a handful of common
/// CBC suites. Everything else passes through as `Unknown`; the driver
/// never interprets suite semantics beyond these checks.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherSuite {
    RSA_EXPORT_RC4_40_MD5,
    RSA_RC4_128_MD5,
    RSA_RC4_128_SHA,
    RSA_3DES_EDE_CBC_SHA,
    DH_ANON_EXPORT_RC4_40_MD5,
    DH_ANON_RC4_128_MD5,
    RSA_AES128_CBC_SHA,
    DHE_RSA_AES128_CBC_SHA,
    RSA_AES256_CBC_SHA,
    DHE_RSA_AES256_CBC_SHA,
    PSK_RC4_128_SHA,
    DHE_PSK_RC4_128_SHA,
    RSA_PSK_RC4_128_SHA,
    EMPTY_RENEGOTIATION_INFO_SCSV,
    ECDH_ECDSA_RC4_128_SHA,
    ECDHE_ECDSA_RC4_128_SHA,
    ECDH_RSA_RC4_128_SHA,
    ECDHE_RSA_RC4_128_SHA,
    ECDH_ANON_RC4_128_SHA,
    ECDHE_RSA_AES128_CBC_SHA,
    ECDHE_RSA_AES256_CBC_SHA,
    Unknown(u16),
}

impl CipherSuite {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0003 => CipherSuite::RSA_EXPORT_RC4_40_MD5,
            0x0004 => CipherSuite::RSA_RC4_128_MD5,
            0x0005 => CipherSuite::RSA_RC4_128_SHA,
            0x000A => CipherSuite::RSA_3DES_EDE_CBC_SHA,
            0x0017 => CipherSuite::DH_ANON_EXPORT_RC4_40_MD5,
            0x0018 => CipherSuite::DH_ANON_RC4_128_MD5,
            0x002F => CipherSuite::RSA_AES128_CBC_SHA,
            0x0033 => CipherSuite::DHE_RSA_AES128_CBC_SHA,
            0x0035 => CipherSuite::RSA_AES256_CBC_SHA,
            0x0039 => CipherSuite::DHE_RSA_AES256_CBC_SHA,
            0x008A => CipherSuite::PSK_RC4_128_SHA,
            0x008E => CipherSuite::DHE_PSK_RC4_128_SHA,
            0x0092 => CipherSuite::RSA_PSK_RC4_128_SHA,
            0x00FF => CipherSuite::EMPTY_RENEGOTIATION_INFO_SCSV,
            0xC002 => CipherSuite::ECDH_ECDSA_RC4_128_SHA,
            0xC007 => CipherSuite::ECDHE_ECDSA_RC4_128_SHA,
            0xC00C => CipherSuite::ECDH_RSA_RC4_128_SHA,
            0xC011 => CipherSuite::ECDHE_RSA_RC4_128_SHA,
            0xC016 => CipherSuite::ECDH_ANON_RC4_128_SHA,
            0xC013 => CipherSuite::ECDHE_RSA_AES128_CBC_SHA,
            0xC014 => CipherSuite::ECDHE_RSA_AES256_CBC_SHA,
            _ => CipherSuite::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CipherSuite::RSA_EXPORT_RC4_40_MD5 => 0x0003,
            CipherSuite::RSA_RC4_128_MD5 => 0x0004,
            CipherSuite::RSA_RC4_128_SHA => 0x0005,
            CipherSuite::RSA_3DES_EDE_CBC_SHA => 0x000A,
            CipherSuite::DH_ANON_EXPORT_RC4_40_MD5 => 0x0017,
            CipherSuite::DH_ANON_RC4_128_MD5 => 0x0018,
            CipherSuite::RSA_AES128_CBC_SHA => 0x002F,
            CipherSuite::DHE_RSA_AES128_CBC_SHA => 0x0033,
            CipherSuite::RSA_AES256_CBC_SHA => 0x0035,
            CipherSuite::DHE_RSA_AES256_CBC_SHA => 0x0039,
            CipherSuite::PSK_RC4_128_SHA => 0x008A,
            CipherSuite::DHE_PSK_RC4_128_SHA => 0x008E,
            CipherSuite::RSA_PSK_RC4_128_SHA => 0x0092,
            CipherSuite::EMPTY_RENEGOTIATION_INFO_SCSV => 0x00FF,
            CipherSuite::ECDH_ECDSA_RC4_128_SHA => 0xC002,
            CipherSuite::ECDHE_ECDSA_RC4_128_SHA => 0xC007,
            CipherSuite::ECDH_RSA_RC4_128_SHA => 0xC00C,
            CipherSuite::ECDHE_RSA_RC4_128_SHA => 0xC011,
            CipherSuite::ECDH_ANON_RC4_128_SHA => 0xC016,
            CipherSuite::ECDHE_RSA_AES128_CBC_SHA => 0xC013,
            CipherSuite::ECDHE_RSA_AES256_CBC_SHA => 0xC014,
            CipherSuite::Unknown(value) => *value,
        }
    }

    /// RC4 MUST NOT be used with DTLS; detection is by exact suite id.
    pub fn is_rc4(&self) -> bool {
        matches!(
            self,
            CipherSuite::RSA_EXPORT_RC4_40_MD5
                | CipherSuite::RSA_RC4_128_MD5
                | CipherSuite::RSA_RC4_128_SHA
                | CipherSuite::DH_ANON_EXPORT_RC4_40_MD5
                | CipherSuite::DH_ANON_RC4_128_MD5
                | CipherSuite::PSK_RC4_128_SHA
                | CipherSuite::DHE_PSK_RC4_128_SHA
                | CipherSuite::RSA_PSK_RC4_128_SHA
                | CipherSuite::ECDH_ECDSA_RC4_128_SHA
                | CipherSuite::ECDHE_ECDSA_RC4_128_SHA
                | CipherSuite::ECDH_RSA_RC4_128_SHA
                | CipherSuite::ECDHE_RSA_RC4_128_SHA
                | CipherSuite::ECDH_ANON_RC4_128_SHA
        )
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], CipherSuite> {
        let (input, value) = be_u16(input)?;
        Ok((input, CipherSuite::from_u16(value)))
    }
}

/// Compression method. Only `Null` is ever offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Null,
    Deflate,
    Unknown(u8),
}

impl CompressionMethod {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => CompressionMethod::Null,
            0x01 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            CompressionMethod::Null => 0x00,
            CompressionMethod::Deflate => 0x01,
            CompressionMethod::Unknown(value) => *value,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], CompressionMethod> {
        let (input, value) = be_u8(input)?;
        Ok((input, CompressionMethod::from_u8(value)))
    }
}

/// Protocol version pair.
///
/// DTLS versions use the inverted encoding: the minor byte counts
/// backwards, so DTLS 1.0 is {254, 255} and DTLS 1.2 is {254, 253}.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolVersion {
    DTLS1_0,
    DTLS1_2,
    Unknown(u16),
}

impl ProtocolVersion {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0xFEFF => ProtocolVersion::DTLS1_0,
            0xFEFD => ProtocolVersion::DTLS1_2,
            _ => ProtocolVersion::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            ProtocolVersion::DTLS1_0 => 0xFEFF,
            ProtocolVersion::DTLS1_2 => 0xFEFD,
            ProtocolVersion::Unknown(value) => *value,
        }
    }

    pub fn major(&self) -> u8 {
        (self.as_u16() >> 8) as u8
    }

    pub fn minor(&self) -> u8 {
        self.as_u16() as u8
    }

    /// Whether this is any DTLS version.
    pub fn is_dtls(&self) -> bool {
        self.major() == 0xFE
    }

    /// Version ordering within one major family. DTLS minors run
    /// backwards, so "earlier" means a numerically larger minor.
    pub fn is_equal_or_earlier_version_of(&self, other: ProtocolVersion) -> bool {
        self.major() == other.major() && self.minor() >= other.minor()
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], ProtocolVersion> {
        let (input, value) = be_u16(input)?;
        Ok((input, ProtocolVersion::from_u16(value)))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.as_u16().to_be_bytes());
    }
}
