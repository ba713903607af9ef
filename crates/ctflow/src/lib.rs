//! Conntrack dump decoding for Linux.
//!
//! This crate decodes netfilter connection-tracking dump responses into
//! structured flow records, and ships the async netlink transport that
//! produces those dumps. The wire format is length-type-value with
//! nested attributes, native-order header fields, big-endian payload
//! scalars, and 4-byte alignment padding; the decoder steps over
//! anything it does not recognize by declared length, so one unknown
//! attribute never corrupts the rest of an entry.
//!
//! # Features
//!
//! - `output` - serde derives on [`Flow`]/[`IpTuple`] for JSON output
//!
//! # Example
//!
//! ```ignore
//! use ctflow::{Connection, Netfilter};
//!
//! #[tokio::main]
//! async fn main() -> ctflow::Result<()> {
//!     let conn = Connection::<Netfilter>::new()?;
//!
//!     for result in conn.dump_flows_v4().await? {
//!         let flow = result?;
//!         println!("{:?} -> {:?}", flow.forward.src_ip, flow.forward.dst_ip);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Decoding alone needs no socket and no privileges:
//!
//! ```ignore
//! let flow = ctflow::decode_entry(&raw_entry)?;
//! ```

pub mod conntrack;
pub mod netlink;

// Re-export common types at crate root for convenience
pub use conntrack::{Flow, FlowDecoder, IpProtocol, IpTuple, decode_batch, decode_entry};
pub use netlink::{Connection, Error, HeaderOrder, Netfilter, Result};
