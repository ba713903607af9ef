//! Decoding raw conntrack dump entries into [`Flow`] records.
//!
//! Each dump entry is a netfilter generic header followed by an LTV
//! attribute stream: native-order header fields, big-endian payload
//! scalars, 4-byte alignment padding between attributes. The decoder
//! recognizes the original and reply tuple containers and steps over
//! everything else by declared length, so unknown attributes never
//! desynchronize the read position.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tracing::trace;

use crate::netlink::cursor::{Cursor, HeaderOrder};
use crate::netlink::{Error, Result};

use super::types::{CtAttr, Flow, IpAttr, IpProtocol, IpTuple, NfGenMsg, ProtoAttr, TupleAttr};

/// Decoder for per-entry conntrack dump buffers.
///
/// Stateless apart from the configured header byte order; one instance
/// may decode any number of buffers, from any number of threads, and
/// decoding the same buffer twice yields the same [`Flow`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowDecoder {
    order: HeaderOrder,
}

impl FlowDecoder {
    /// Decoder expecting native-order attribute headers, which is what
    /// the local kernel produces.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder for dumps whose attribute headers use a specific byte
    /// order (a capture taken on a foreign-endian host).
    pub fn with_header_order(order: HeaderOrder) -> Self {
        Self { order }
    }

    /// Decode one raw dump entry.
    ///
    /// A truncated or malformed buffer fails this entry only; callers
    /// decoding a batch carry on with the remaining entries.
    pub fn decode_entry(&self, data: &[u8]) -> Result<Flow> {
        let mut input = data;
        let genmsg = NfGenMsg::parse(&mut input).map_err(|_| Error::Truncated {
            expected: 4,
            actual: data.len(),
        })?;
        trace!(
            family = genmsg.family,
            version = genmsg.version,
            res_id = genmsg.res_id,
            "decoding entry"
        );

        let mut flow = Flow {
            family: genmsg.family,
            ..Flow::default()
        };

        let mut cur = Cursor::with_order(input, self.order);
        while cur.remaining() > 0 {
            let header = cur.read_attr_header()?;

            if !header.nested {
                // Top-level scalars (status, timeout, mark, ...) are not
                // of interest here.
                cur.skip_attr_value(header.len)?;
                continue;
            }

            match CtAttr::from_kind(header.kind) {
                CtAttr::TupleOrig => {
                    let inner = cur.read_attr_header()?;
                    if inner.nested && TupleAttr::from_kind(inner.kind) == TupleAttr::Ip {
                        flow.forward = decode_ip_tuple(&mut cur, inner.len)?;
                    }
                    // On a mismatch nothing further is consumed; the
                    // loop picks up at the next unread byte. Asymmetric
                    // with the reply branch below, kept that way on
                    // purpose; see DESIGN.md.
                }
                CtAttr::TupleReply => {
                    let inner = cur.read_attr_header()?;
                    if inner.nested && TupleAttr::from_kind(inner.kind) == TupleAttr::Ip {
                        flow.reverse = decode_ip_tuple(&mut cur, inner.len)?;
                    } else {
                        // Header not recognized: skip by the *type*
                        // value, not the length. Kept as-is; see
                        // DESIGN.md.
                        cur.skip_attr_value(inner.kind)?;
                    }
                }
                CtAttr::Other(kind) => {
                    trace!(kind, len = header.len, "skipping attribute");
                    cur.skip_attr_value(header.len)?;
                }
            }
        }

        Ok(flow)
    }

    /// Decode a batch of dump entries: one result per buffer, input
    /// order preserved. A failing entry never affects its siblings.
    pub fn decode_batch<'a, I>(&self, entries: I) -> Vec<Result<Flow>>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        entries.into_iter().map(|e| self.decode_entry(e)).collect()
    }
}

/// Decode one tuple: two address attributes, then the protocol-info
/// block.
///
/// The cursor sits on the first attribute inside the tuple-IP block;
/// `declared_len` is that block's payload length from the enclosing
/// header. The addresses are accounted field by field, the protocol-info
/// block through a bounded sub-reader over its own declared length, so
/// sub-structures the decoder does not understand (vendor extensions,
/// ICMP ids, future fields) are stepped over exactly.
fn decode_ip_tuple(cur: &mut Cursor<'_>, declared_len: u16) -> Result<IpTuple> {
    trace!(declared_len, "decoding tuple");
    let mut tuple = IpTuple::default();

    // Source and destination address, two reads regardless of whether
    // the kinds match.
    for _ in 0..2 {
        let (header, value) = cur.read_attr()?;
        match IpAttr::from_kind(header.kind) {
            IpAttr::V4Src | IpAttr::V6Src => {
                tuple.src_ip = Some(ip_from_bytes(header.kind, value)?);
            }
            IpAttr::V4Dst | IpAttr::V6Dst => {
                tuple.dst_ip = Some(ip_from_bytes(header.kind, value)?);
            }
            IpAttr::Other(_) => {}
        }
    }

    let proto_info = cur.read_attr_header()?;
    let mut info = cur.bounded(proto_info.len as usize)?;

    let (header, value) = info.read_attr()?;
    if ProtoAttr::from_kind(header.kind) == ProtoAttr::Num {
        let first = value.first().ok_or(Error::UnsupportedEncoding {
            kind: header.kind,
            len: value.len(),
        })?;
        tuple.protocol = IpProtocol::from_u8(*first);
    }

    if !tuple.protocol.has_ports() {
        // Ports stay zero by policy. The unread tail of the block is
        // already behind the parent cursor, so nothing else to do.
        return Ok(tuple);
    }

    // Padding after the one-byte protocol number.
    info.skip(3)?;

    for _ in 0..2 {
        let header = info.read_attr_header()?;
        match ProtoAttr::from_kind(header.kind) {
            ProtoAttr::SrcPort => tuple.src_port = info.read_u16_be()?,
            ProtoAttr::DstPort => tuple.dst_port = info.read_u16_be()?,
            ProtoAttr::Num | ProtoAttr::Other(_) => {}
        }
        // Trailing pad after each port attribute, matched or not.
        info.skip(2)?;
    }

    Ok(tuple)
}

/// Build an address from raw attribute bytes: 4 for v4, 16 for v6.
fn ip_from_bytes(kind: u16, value: &[u8]) -> Result<IpAddr> {
    match value.len() {
        4 => Ok(IpAddr::V4(Ipv4Addr::new(
            value[0], value[1], value[2], value[3],
        ))),
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(value);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        len => Err(Error::UnsupportedEncoding { kind, len }),
    }
}

/// Decode one raw dump entry with native-order headers.
pub fn decode_entry(data: &[u8]) -> Result<Flow> {
    FlowDecoder::new().decode_entry(data)
}

/// Decode a batch of raw dump entries with native-order headers.
pub fn decode_batch<'a, I>(entries: I) -> Vec<Result<Flow>>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    FlowDecoder::new().decode_batch(entries)
}
