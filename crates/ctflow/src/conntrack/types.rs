//! Flow data model and conntrack attribute tables.

use std::net::IpAddr;

use winnow::binary::be_u16;
use winnow::prelude::*;

use crate::netlink::parse::PResult;

#[cfg(feature = "output")]
use serde::Serialize;

/// IP protocol numbers as conntrack reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "output", derive(Serialize))]
pub enum IpProtocol {
    /// TCP (6)
    Tcp,
    /// UDP (17)
    Udp,
    /// ICMP (1)
    Icmp,
    /// ICMPv6 (58)
    Icmpv6,
    /// Other protocol
    Other(u8),
}

impl IpProtocol {
    /// Map an IANA protocol number.
    pub fn from_u8(val: u8) -> Self {
        match val {
            1 => Self::Icmp,
            6 => Self::Tcp,
            17 => Self::Udp,
            58 => Self::Icmpv6,
            other => Self::Other(other),
        }
    }

    /// Get the protocol number.
    pub fn number(&self) -> u8 {
        match self {
            Self::Icmp => 1,
            Self::Tcp => 6,
            Self::Udp => 17,
            Self::Icmpv6 => 58,
            Self::Other(n) => *n,
        }
    }

    /// True for the two protocols whose tuples carry ports.
    pub fn has_ports(&self) -> bool {
        matches!(self, Self::Tcp | Self::Udp)
    }
}

impl Default for IpProtocol {
    fn default() -> Self {
        Self::Other(0)
    }
}

/// One directional 5-tuple of a tracked connection.
///
/// Addresses are carried as the raw 4- or 16-byte wire payload and are
/// not cross-checked against the entry's address family. Ports stay at
/// their zero default unless the protocol is TCP or UDP; for every
/// other protocol a zero port is policy, not a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "output", derive(Serialize))]
pub struct IpTuple {
    /// Source address.
    pub src_ip: Option<IpAddr>,
    /// Destination address.
    pub dst_ip: Option<IpAddr>,
    /// Transport protocol number.
    pub protocol: IpProtocol,
    /// Source port (TCP/UDP only).
    pub src_port: u16,
    /// Destination port (TCP/UDP only).
    pub dst_port: u16,
}

/// One decoded conntrack entry.
///
/// Built fresh per raw dump buffer and fully populated by a single
/// decode pass; it owns its two tuples outright.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "output", derive(Serialize))]
pub struct Flow {
    /// Address family byte from the netfilter generic header
    /// (`libc::AF_INET`, `libc::AF_INET6`).
    pub family: u8,
    /// Original direction.
    pub forward: IpTuple,
    /// Reply direction.
    pub reverse: IpTuple,
}

/// Top-level conntrack attributes (CTA_*) the decoder acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CtAttr {
    /// Original-direction tuple container.
    TupleOrig,
    /// Reply-direction tuple container.
    TupleReply,
    /// Anything else (status, timeout, counters, ...); skipped.
    Other(u16),
}

impl CtAttr {
    pub(crate) fn from_kind(kind: u16) -> Self {
        match kind {
            1 => Self::TupleOrig,
            2 => Self::TupleReply,
            other => Self::Other(other),
        }
    }
}

/// Attributes nested directly inside a tuple container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TupleAttr {
    Ip,
    Proto,
    Other(u16),
}

impl TupleAttr {
    pub(crate) fn from_kind(kind: u16) -> Self {
        match kind {
            1 => Self::Ip,
            2 => Self::Proto,
            other => Self::Other(other),
        }
    }
}

/// Address attributes inside a tuple-IP block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IpAttr {
    V4Src,
    V4Dst,
    V6Src,
    V6Dst,
    Other(u16),
}

impl IpAttr {
    pub(crate) fn from_kind(kind: u16) -> Self {
        match kind {
            1 => Self::V4Src,
            2 => Self::V4Dst,
            3 => Self::V6Src,
            4 => Self::V6Dst,
            other => Self::Other(other),
        }
    }
}

/// Attributes inside the protocol-info block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProtoAttr {
    Num,
    SrcPort,
    DstPort,
    Other(u16),
}

impl ProtoAttr {
    pub(crate) fn from_kind(kind: u16) -> Self {
        match kind {
            1 => Self::Num,
            2 => Self::SrcPort,
            3 => Self::DstPort,
            other => Self::Other(other),
        }
    }
}

/// Netfilter generic message header (4 bytes).
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NfGenMsg {
    pub(crate) family: u8,
    pub(crate) version: u8,
    pub(crate) res_id: u16,
}

impl NfGenMsg {
    pub(crate) fn parse(input: &mut &[u8]) -> PResult<Self> {
        let family = winnow::binary::u8.parse_next(input)?;
        let version = winnow::binary::u8.parse_next(input)?;
        let res_id = be_u16.parse_next(input)?;
        Ok(Self {
            family,
            version,
            res_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ip_protocol_roundtrip() {
        assert_eq!(IpProtocol::Tcp.number(), 6);
        assert_eq!(IpProtocol::from_u8(6), IpProtocol::Tcp);

        assert_eq!(IpProtocol::Udp.number(), 17);
        assert_eq!(IpProtocol::from_u8(17), IpProtocol::Udp);

        assert_eq!(IpProtocol::from_u8(47), IpProtocol::Other(47));
        assert_eq!(IpProtocol::Other(47).number(), 47);
    }

    #[test]
    fn only_tcp_udp_carry_ports() {
        assert!(IpProtocol::Tcp.has_ports());
        assert!(IpProtocol::Udp.has_ports());
        assert!(!IpProtocol::Icmp.has_ports());
        assert!(!IpProtocol::Other(0).has_ports());
    }

    #[test]
    fn attribute_kind_tables() {
        assert_eq!(CtAttr::from_kind(1), CtAttr::TupleOrig);
        assert_eq!(CtAttr::from_kind(2), CtAttr::TupleReply);
        assert_eq!(CtAttr::from_kind(3), CtAttr::Other(3));
        assert_eq!(TupleAttr::from_kind(1), TupleAttr::Ip);
        assert_eq!(IpAttr::from_kind(4), IpAttr::V6Dst);
        assert_eq!(ProtoAttr::from_kind(3), ProtoAttr::DstPort);
    }

    #[test]
    fn nfgenmsg_parse() {
        let data = [2u8, 0, 0x12, 0x34, 0xff];
        let mut input = &data[..];
        let msg = NfGenMsg::parse(&mut input).unwrap();
        assert_eq!(msg.family, 2);
        assert_eq!(msg.version, 0);
        assert_eq!(msg.res_id, 0x1234);
        assert_eq!(input, &[0xff]);
    }

    #[test]
    fn nfgenmsg_parse_short_input() {
        let data = [2u8, 0];
        let mut input = &data[..];
        assert!(NfGenMsg::parse(&mut input).is_err());
    }
}
