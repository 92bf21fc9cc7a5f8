use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u8};
use nom::IResult;
use smallvec::SmallVec;

/// Certificate type requested by the server.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCertificateType {
    RSA_SIGN,
    DSS_SIGN,
    RSA_FIXED_DH,
    DSS_FIXED_DH,
    ECDSA_SIGN,
    RSA_FIXED_ECDH,
    ECDSA_FIXED_ECDH,
    Unknown(u8),
}

impl ClientCertificateType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => ClientCertificateType::RSA_SIGN,
            2 => ClientCertificateType::DSS_SIGN,
            3 => ClientCertificateType::RSA_FIXED_DH,
            4 => ClientCertificateType::DSS_FIXED_DH,
            64 => ClientCertificateType::ECDSA_SIGN,
            65 => ClientCertificateType::RSA_FIXED_ECDH,
            66 => ClientCertificateType::ECDSA_FIXED_ECDH,
            _ => ClientCertificateType::Unknown(value),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            ClientCertificateType::RSA_SIGN => 1,
            ClientCertificateType::DSS_SIGN => 2,
            ClientCertificateType::RSA_FIXED_DH => 3,
            ClientCertificateType::DSS_FIXED_DH => 4,
            ClientCertificateType::ECDSA_SIGN => 64,
            ClientCertificateType::RSA_FIXED_ECDH => 65,
            ClientCertificateType::ECDSA_FIXED_ECDH => 66,
            ClientCertificateType::Unknown(value) => *value,
        }
    }
}

/// A DER-encoded X.501 distinguished name, opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName(pub Vec<u8>);

/// CertificateRequest body, TLS 1.0 layout: certificate types followed by
/// acceptable certificate authorities. (The signature_algorithms field is
/// a TLS 1.2 addition and does not appear pre-1.2.)
#[derive(Debug, PartialEq, Eq)]
pub struct CertificateRequest {
    pub certificate_types: SmallVec<[ClientCertificateType; 8]>,
    pub certificate_authorities: SmallVec<[DistinguishedName; 8]>,
}

impl CertificateRequest {
    pub fn new(
        certificate_types: SmallVec<[ClientCertificateType; 8]>,
        certificate_authorities: SmallVec<[DistinguishedName; 8]>,
    ) -> Self {
        CertificateRequest {
            certificate_types,
            certificate_authorities,
        }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], CertificateRequest> {
        let (input, types_len) = be_u8(input)?;
        let (input, types_data) = take(types_len)(input)?;
        let certificate_types = types_data
            .iter()
            .map(|&b| ClientCertificateType::from_u8(b))
            .collect();

        let (input, authorities_len) = be_u16(input)?;
        let (input, mut authorities_data) = take(authorities_len)(input)?;

        let mut certificate_authorities = SmallVec::new();
        while !authorities_data.is_empty() {
            let (rest, name) = crate::codec::opaque16(authorities_data)?;
            certificate_authorities.push(DistinguishedName(name.to_vec()));
            authorities_data = rest;
        }

        Ok((
            input,
            CertificateRequest {
                certificate_types,
                certificate_authorities,
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        output.push(self.certificate_types.len() as u8);
        for cert_type in &self.certificate_types {
            output.push(cert_type.as_u8());
        }

        let authorities_len: usize = self
            .certificate_authorities
            .iter()
            .map(|name| 2 + name.0.len())
            .sum();
        output.extend_from_slice(&(authorities_len as u16).to_be_bytes());
        for name in &self.certificate_authorities {
            crate::codec::write_opaque16(&name.0, output);
        }
    }
}
