//! Dumping the kernel conntrack table.

use tracing::debug;

use crate::netlink::Result;
use crate::netlink::connection::Connection;
use crate::netlink::message::{NLM_F_DUMP, NLM_F_REQUEST, NLMSG_HDRLEN};
use crate::netlink::protocol::Netfilter;

use super::decode::FlowDecoder;
use super::types::Flow;

// Netfilter subsystem IDs
const NFNL_SUBSYS_CTNETLINK: u8 = 1;

// Conntrack message types
const IPCTNL_MSG_CT_GET: u8 = 1;

// Netfilter generic message version
const NFNETLINK_V0: u8 = 0;

/// Build a complete conntrack dump request: netlink header plus the
/// netfilter generic header (family, version, zero resource id) used as
/// the dump filter.
pub fn dump_request(family: u8, seq: u32, pid: u32) -> Vec<u8> {
    // Message type: (NFNL_SUBSYS_CTNETLINK << 8) | IPCTNL_MSG_CT_GET
    let msg_type = ((NFNL_SUBSYS_CTNETLINK as u16) << 8) | (IPCTNL_MSG_CT_GET as u16);

    let mut buf = Vec::with_capacity(NLMSG_HDRLEN + 4);
    buf.extend_from_slice(&0u32.to_ne_bytes()); // nlmsg_len (fill later)
    buf.extend_from_slice(&msg_type.to_ne_bytes()); // nlmsg_type
    buf.extend_from_slice(&(NLM_F_REQUEST | NLM_F_DUMP).to_ne_bytes()); // nlmsg_flags
    buf.extend_from_slice(&seq.to_ne_bytes()); // nlmsg_seq
    buf.extend_from_slice(&pid.to_ne_bytes()); // nlmsg_pid

    // nfgenmsg (4 bytes)
    buf.push(family); // nfgen_family
    buf.push(NFNETLINK_V0); // version
    buf.extend_from_slice(&0u16.to_be_bytes()); // res_id

    // Update length
    let len = buf.len() as u32;
    buf[0..4].copy_from_slice(&len.to_ne_bytes());

    buf
}

impl Connection<Netfilter> {
    /// Dump the conntrack table for one address family, returning one
    /// raw buffer per entry: the netfilter generic header followed by
    /// the attribute stream, in kernel order.
    pub async fn dump_entries(&self, family: u8) -> Result<Vec<Vec<u8>>> {
        let seq = self.socket().next_seq();
        let request = dump_request(family, seq, self.socket().pid());
        let entries = self.collect_dump(&request, seq).await?;
        debug!(family, entries = entries.len(), "conntrack dump");
        Ok(entries)
    }

    /// Dump and decode the conntrack table for one address family.
    ///
    /// Decode failures are per-entry: the returned vector holds one
    /// result per table entry and a bad entry never aborts the rest.
    pub async fn dump_flows(&self, family: u8) -> Result<Vec<Result<Flow>>> {
        let entries = self.dump_entries(family).await?;
        let decoder = FlowDecoder::new();
        Ok(decoder.decode_batch(entries.iter().map(Vec::as_slice)))
    }

    /// Dump and decode IPv4 conntrack flows.
    pub async fn dump_flows_v4(&self) -> Result<Vec<Result<Flow>>> {
        self.dump_flows(libc::AF_INET as u8).await
    }

    /// Dump and decode IPv6 conntrack flows.
    pub async fn dump_flows_v6(&self) -> Result<Vec<Result<Flow>>> {
        self.dump_flows(libc::AF_INET6 as u8).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::NlMsgHdr;

    #[test]
    fn request_layout() {
        let buf = dump_request(libc::AF_INET as u8, 42, 1234);
        assert_eq!(buf.len(), NLMSG_HDRLEN + 4);

        let header = NlMsgHdr::from_bytes(&buf).unwrap();
        assert_eq!(header.nlmsg_len as usize, buf.len());
        assert_eq!(header.nlmsg_type, (1 << 8) | 1);
        assert_eq!(header.nlmsg_flags, NLM_F_REQUEST | NLM_F_DUMP);
        assert_eq!(header.nlmsg_seq, 42);
        assert_eq!(header.nlmsg_pid, 1234);

        // nfgenmsg tail: family, version 0, zero resource id
        assert_eq!(
            &buf[NLMSG_HDRLEN..],
            &[libc::AF_INET as u8, NFNETLINK_V0, 0, 0]
        );
    }
}
