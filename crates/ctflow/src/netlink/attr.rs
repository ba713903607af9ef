//! Netlink attribute (nlattr) headers and value access.

use super::cursor::Cursor;
use super::error::{Error, Result};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Size of the attribute header (length field + type field).
pub const NLA_HDRLEN: usize = 4;

/// Flag bit marking an attribute whose payload is further attributes.
pub const NLA_F_NESTED: u16 = 1 << 15;

/// Align a length to the next NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// One decoded attribute header.
///
/// `len` is the value payload size: the stored length field minus
/// [`NLA_HDRLEN`]. `kind` is the type field with the nested flag masked
/// off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrHeader {
    /// Payload is a further attribute sequence.
    pub nested: bool,
    /// Attribute type without the nested flag.
    pub kind: u16,
    /// Payload length, header size already subtracted.
    pub len: u16,
}

impl<'a> Cursor<'a> {
    /// Read one attribute header: length then type, both in the cursor's
    /// configured header byte order.
    ///
    /// A stored length below [`NLA_HDRLEN`] is rejected rather than
    /// wrapped; the length field is unsigned and a wrap would turn a bad
    /// header into a near-64k skip.
    pub fn read_attr_header(&mut self) -> Result<AttrHeader> {
        let stored = self.read_u16_header()?;
        let raw_type = self.read_u16_header()?;
        let len = stored
            .checked_sub(NLA_HDRLEN as u16)
            .ok_or(Error::Truncated {
                expected: NLA_HDRLEN,
                actual: stored as usize,
            })?;
        Ok(AttrHeader {
            nested: raw_type & NLA_F_NESTED != 0,
            kind: raw_type & (NLA_F_NESTED - 1),
            len,
        })
    }

    /// Read an attribute value of the given payload length.
    pub fn read_attr_value(&mut self, len: u16) -> Result<&'a [u8]> {
        self.read_fixed(len as usize)
    }

    /// Read one attribute header and its value.
    pub fn read_attr(&mut self) -> Result<(AttrHeader, &'a [u8])> {
        let header = self.read_attr_header()?;
        let value = self.read_attr_value(header.len)?;
        Ok((header, value))
    }

    /// Skip an attribute value, including its alignment padding.
    ///
    /// Returns the number of bytes actually advanced: `len` rounded up
    /// to the next [`NLA_ALIGNTO`] boundary.
    pub fn skip_attr_value(&mut self, len: u16) -> Result<usize> {
        let aligned = nla_align(len as usize);
        self.skip(aligned)?;
        Ok(aligned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::cursor::HeaderOrder;

    fn header_bytes(stored_len: u16, raw_type: u16) -> Vec<u8> {
        let mut out = Vec::with_capacity(4);
        out.extend_from_slice(&stored_len.to_ne_bytes());
        out.extend_from_slice(&raw_type.to_ne_bytes());
        out
    }

    #[test]
    fn parses_nested_flag_and_masked_kind() {
        let data = header_bytes(20, NLA_F_NESTED | 1);
        let mut cur = Cursor::new(&data);
        let header = cur.read_attr_header().unwrap();
        assert!(header.nested);
        assert_eq!(header.kind, 1);
        assert_eq!(header.len, 16);
    }

    #[test]
    fn plain_attribute_keeps_kind() {
        let data = header_bytes(8, 3);
        let mut cur = Cursor::new(&data);
        let header = cur.read_attr_header().unwrap();
        assert!(!header.nested);
        assert_eq!(header.kind, 3);
        assert_eq!(header.len, 4);
    }

    #[test]
    fn rejects_stored_length_below_header_size() {
        let data = header_bytes(2, 1);
        let mut cur = Cursor::new(&data);
        assert!(matches!(
            cur.read_attr_header().unwrap_err(),
            Error::Truncated {
                expected: NLA_HDRLEN,
                actual: 2
            }
        ));
    }

    #[test]
    fn reads_header_and_value() {
        let mut data = header_bytes(8, 2);
        data.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        let mut cur = Cursor::new(&data);
        let (header, value) = cur.read_attr().unwrap();
        assert_eq!(header.kind, 2);
        assert_eq!(value, &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn skip_rounds_up_to_alignment() {
        let mut cur = Cursor::new(&[0; 16]);
        assert_eq!(cur.skip_attr_value(5).unwrap(), 8);
        assert_eq!(cur.remaining(), 8);
        assert_eq!(cur.skip_attr_value(1).unwrap(), 4);
        assert_eq!(cur.remaining(), 4);
    }

    #[test]
    fn skip_of_aligned_length_is_exact() {
        let mut cur = Cursor::new(&[0; 8]);
        assert_eq!(cur.skip_attr_value(8).unwrap(), 8);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn skip_past_end_fails_closed() {
        let mut cur = Cursor::new(&[0; 6]);
        // 5 rounds to 8, only 6 remain
        assert!(cur.skip_attr_value(5).is_err());
        assert_eq!(cur.remaining(), 6);
    }

    #[test]
    fn big_endian_headers_decode_with_big_order() {
        let mut data = Vec::new();
        data.extend_from_slice(&8u16.to_be_bytes());
        data.extend_from_slice(&(NLA_F_NESTED | 2).to_be_bytes());
        let mut cur = Cursor::with_order(&data, HeaderOrder::Big);
        let header = cur.read_attr_header().unwrap();
        assert!(header.nested);
        assert_eq!(header.kind, 2);
        assert_eq!(header.len, 4);
    }
}
