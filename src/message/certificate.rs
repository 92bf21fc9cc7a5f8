use nom::bytes::complete::take;
use nom::number::complete::be_u24;
use nom::IResult;
use smallvec::SmallVec;

/// One DER-encoded certificate, opaque to this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asn1Cert(pub Vec<u8>);

/// A certificate chain in TLS wire order, leaf first.
///
/// An empty chain is a legal message: it is the client's answer to a
/// CertificateRequest when no credentials are available, and some key
/// exchanges accept it from a server too.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Certificate {
    pub certificate_list: SmallVec<[Asn1Cert; 4]>,
}

impl Certificate {
    /// The empty chain.
    pub fn empty() -> Self {
        Certificate::default()
    }

    pub fn is_empty(&self) -> bool {
        self.certificate_list.is_empty()
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], Certificate> {
        let (input, total_len) = be_u24(input)?;
        let (input, mut list_data) = take(total_len)(input)?;

        let mut certificate_list = SmallVec::new();
        while !list_data.is_empty() {
            let (rest, cert_len) = be_u24(list_data)?;
            let (rest, cert) = take(cert_len)(rest)?;
            certificate_list.push(Asn1Cert(cert.to_vec()));
            list_data = rest;
        }

        Ok((input, Certificate { certificate_list }))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        let total_len: usize = self
            .certificate_list
            .iter()
            .map(|cert| 3 + cert.0.len())
            .sum();
        crate::codec::write_u24(total_len as u32, output);

        for cert in &self.certificate_list {
            crate::codec::write_opaque24(&cert.0, output);
        }
    }
}
