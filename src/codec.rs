//! Shared wire primitives for handshake message bodies.
//!
//! Readers are nom parsers over `&[u8]`; writers append to a `Vec<u8>`.
//! TLS length prefixes are big-endian throughout.

use nom::bytes::complete::take;
use nom::number::complete::{be_u16, be_u8};
use nom::IResult;
use smallvec::SmallVec;

use crate::Error;

/// Read a byte string with a u8 length prefix.
pub fn opaque8(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, len) = be_u8(input)?;
    take(len)(input)
}

/// Read a byte string with a u16 length prefix.
pub fn opaque16(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, len) = be_u16(input)?;
    take(len)(input)
}

/// Read a u16-length-prefixed list of u16 values.
///
/// The prefix counts bytes, not elements; an odd byte count fails.
pub fn vector16(input: &[u8]) -> IResult<&[u8], SmallVec<[u16; 32]>> {
    use nom::error::{Error, ErrorKind};
    use nom::Err;

    let (input, byte_len) = be_u16(input)?;
    if byte_len % 2 != 0 {
        return Err(Err::Failure(Error::new(input, ErrorKind::LengthValue)));
    }
    let (input, data) = take(byte_len)(input)?;

    let values = data
        .chunks_exact(2)
        .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
        .collect();

    Ok((input, values))
}

/// Append a byte string with a u8 length prefix.
///
/// Panics if `data` exceeds 255 bytes; callers size-check at construction.
pub fn write_opaque8(data: &[u8], output: &mut Vec<u8>) {
    debug_assert!(data.len() <= u8::MAX as usize);
    output.push(data.len() as u8);
    output.extend_from_slice(data);
}

/// Append a byte string with a u16 length prefix.
pub fn write_opaque16(data: &[u8], output: &mut Vec<u8>) {
    debug_assert!(data.len() <= u16::MAX as usize);
    output.extend_from_slice(&(data.len() as u16).to_be_bytes());
    output.extend_from_slice(data);
}

/// Append a byte string with a u24 length prefix.
pub fn write_opaque24(data: &[u8], output: &mut Vec<u8>) {
    write_u24(data.len() as u32, output);
    output.extend_from_slice(data);
}

/// Append a u24 big-endian integer.
pub fn write_u24(value: u32, output: &mut Vec<u8>) {
    debug_assert!(value < 1 << 24);
    output.extend_from_slice(&value.to_be_bytes()[1..]);
}

/// Append a list of u16 values with a u16 byte-length prefix.
pub fn write_vector16(values: &[u16], output: &mut Vec<u8>) {
    output.extend_from_slice(&(values.len() as u16 * 2).to_be_bytes());
    for value in values {
        output.extend_from_slice(&value.to_be_bytes());
    }
}

/// Fail with `decode_error` if a parsed message body has trailing bytes.
pub fn assert_empty(rest: &[u8]) -> Result<(), Error> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(Error::DecodeError(format!(
            "{} trailing bytes after message body",
            rest.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque8_roundtrip() {
        let mut out = Vec::new();
        write_opaque8(&[0xAA, 0xBB], &mut out);
        assert_eq!(out, &[0x02, 0xAA, 0xBB]);

        let (rest, data) = opaque8(&out).unwrap();
        assert!(rest.is_empty());
        assert_eq!(data, &[0xAA, 0xBB]);
    }

    #[test]
    fn opaque16_roundtrip() {
        let mut out = Vec::new();
        write_opaque16(&[0x01, 0x02, 0x03], &mut out);
        assert_eq!(out, &[0x00, 0x03, 0x01, 0x02, 0x03]);

        let (rest, data) = opaque16(&out).unwrap();
        assert!(rest.is_empty());
        assert_eq!(data, &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn vector16_roundtrip() {
        let mut out = Vec::new();
        write_vector16(&[0x002F, 0xC014], &mut out);
        assert_eq!(out, &[0x00, 0x04, 0x00, 0x2F, 0xC0, 0x14]);

        let (rest, values) = vector16(&out).unwrap();
        assert!(rest.is_empty());
        assert_eq!(&values[..], &[0x002F, 0xC014]);
    }

    #[test]
    fn vector16_odd_byte_count() {
        let result = vector16(&[0x00, 0x03, 0x00, 0x2F, 0xC0]);
        assert!(result.is_err());
    }

    #[test]
    fn write_u24_truncates_to_three_bytes() {
        let mut out = Vec::new();
        write_u24(0x010203, &mut out);
        assert_eq!(out, &[0x01, 0x02, 0x03]);
    }

    #[test]
    fn assert_empty_rejects_trailing() {
        assert!(assert_empty(&[]).is_ok());
        assert!(assert_empty(&[0x00]).is_err());
    }
}
