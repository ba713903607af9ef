//! Netlink plumbing under the conntrack decoder.
//!
//! The pieces layer bottom-up: [`Cursor`] is a bounds-checked positional
//! reader over one raw buffer, [`attr`] adds attribute header/value
//! reading with alignment-aware skips on top of it, [`message`] frames
//! whole netlink responses, and [`Connection`] drives the async
//! netfilter socket that produces dump responses in the first place.

pub mod attr;
pub mod connection;
pub mod cursor;
mod error;
pub mod message;
pub mod parse;
pub mod protocol;
mod socket;

pub use attr::{AttrHeader, NLA_ALIGNTO, NLA_F_NESTED, NLA_HDRLEN, nla_align};
pub use connection::Connection;
pub use cursor::{Cursor, HeaderOrder};
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr};
pub use protocol::{Netfilter, ProtocolState};
pub use socket::{NetlinkSocket, Protocol};
