use nom::IResult;

/// CertificateVerify body: a u16-length-prefixed signature over the
/// handshake transcript hash.
#[derive(Debug, PartialEq, Eq)]
pub struct CertificateVerify {
    pub signature: Vec<u8>,
}

impl CertificateVerify {
    pub fn new(signature: Vec<u8>) -> Self {
        CertificateVerify { signature }
    }

    pub fn parse(input: &[u8]) -> IResult<&[u8], CertificateVerify> {
        let (input, signature) = crate::codec::opaque16(input)?;
        Ok((
            input,
            CertificateVerify {
                signature: signature.to_vec(),
            },
        ))
    }

    pub fn serialize(&self, output: &mut Vec<u8>) {
        crate::codec::write_opaque16(&self.signature, output);
    }
}
