//! Typed netlink connection with dump collection.

use std::marker::PhantomData;

use tracing::trace;

use super::error::{Error, Result};
use super::message::{MessageIter, NlMsgError};
use super::protocol::ProtocolState;
use super::socket::NetlinkSocket;

/// Typed netlink connection.
///
/// The protocol marker fixes at compile time which operations are
/// available; conntrack dumps live on `Connection<Netfilter>`.
pub struct Connection<P: ProtocolState> {
    socket: NetlinkSocket,
    _protocol: PhantomData<P>,
}

impl<P: ProtocolState> Connection<P> {
    /// Create a new connection for this protocol.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new(P::PROTOCOL)?,
            _protocol: PhantomData,
        })
    }

    /// Get the underlying socket.
    pub fn socket(&self) -> &NetlinkSocket {
        &self.socket
    }

    /// Send a dump request and collect one payload buffer per entry.
    ///
    /// `request` must be a complete netlink message carrying `seq`.
    /// Responses with other sequence numbers are ignored; multipart
    /// messages are drained until NLMSG_DONE. Each returned buffer is
    /// the message payload with the netlink header stripped.
    pub(crate) async fn collect_dump(&self, request: &[u8], seq: u32) -> Result<Vec<Vec<u8>>> {
        self.socket.send(request).await?;

        let mut entries = Vec::new();
        loop {
            let data = self.socket.recv_msg().await?;

            for result in MessageIter::new(&data) {
                let (header, payload) = result?;

                if header.nlmsg_seq != seq {
                    continue;
                }

                if header.is_error() {
                    let err = NlMsgError::from_bytes(payload)?;
                    if !err.is_ack() {
                        return Err(Error::from_errno(err.error));
                    }
                    continue;
                }

                if header.is_done() {
                    trace!(entries = entries.len(), "dump complete");
                    return Ok(entries);
                }

                entries.push(payload.to_vec());
            }
        }
    }
}

#[cfg(test)]
mod send_sync_tests {
    use super::*;
    use crate::netlink::protocol::Netfilter;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn connection_is_send_sync() {
        assert_send::<Connection<Netfilter>>();
        assert_sync::<Connection<Netfilter>>();
    }
}
