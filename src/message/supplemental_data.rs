use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u24};
use nom::IResult;

/// One supplemental data entry (RFC 4680): a type code plus an opaque
/// payload neither side interprets at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplementalDataEntry {
    pub data_type: u16,
    pub data: Vec<u8>,
}

impl SupplementalDataEntry {
    pub fn new(data_type: u16, data: Vec<u8>) -> Self {
        SupplementalDataEntry { data_type, data }
    }

    /// Parse a full supplemental_data message body: a u24 outer length
    /// wrapping (u16 type, opaque16 data) entries.
    pub fn parse_message(input: &[u8]) -> IResult<&[u8], Vec<SupplementalDataEntry>> {
        let (input, total_len) = be_u24(input)?;
        let (input, mut entries_data) = take(total_len)(input)?;

        let mut entries = Vec::new();
        while !entries_data.is_empty() {
            let (rest, data_type) = be_u16(entries_data)?;
            let (rest, data) = crate::codec::opaque16(rest)?;
            entries.push(SupplementalDataEntry {
                data_type,
                data: data.to_vec(),
            });
            entries_data = rest;
        }

        Ok((input, entries))
    }

    /// Serialize a list of entries as a supplemental_data message body.
    pub fn serialize_message(entries: &[SupplementalDataEntry], output: &mut Vec<u8>) {
        let mut inner = Vec::new();
        for entry in entries {
            inner.extend_from_slice(&entry.data_type.to_be_bytes());
            crate::codec::write_opaque16(&entry.data, &mut inner);
        }
        crate::codec::write_opaque24(&inner, output);
    }
}
