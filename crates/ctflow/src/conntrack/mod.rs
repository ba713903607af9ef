//! Connection tracking: data model, dump decoding, and table dumps.
//!
//! The decoder is the core: [`decode_entry`] turns one raw dump buffer
//! into a [`Flow`] (address family plus original and reply tuples), and
//! [`decode_batch`] maps it over a whole dump, one result per entry.
//! Both are pure functions; the async side that produces the buffers
//! lives on `Connection<Netfilter>`.
//!
//! # Example
//!
//! ```ignore
//! use ctflow::{Connection, Netfilter};
//!
//! let conn = Connection::<Netfilter>::new()?;
//! for result in conn.dump_flows_v4().await? {
//!     match result {
//!         Ok(flow) => println!(
//!             "{:?} {:?}:{} -> {:?}:{}",
//!             flow.forward.protocol,
//!             flow.forward.src_ip,
//!             flow.forward.src_port,
//!             flow.forward.dst_ip,
//!             flow.forward.dst_port,
//!         ),
//!         Err(e) => eprintln!("bad entry: {e}"),
//!     }
//! }
//! ```

pub mod decode;
mod dump;
pub mod types;

pub use decode::{FlowDecoder, decode_batch, decode_entry};
pub use dump::dump_request;
pub use types::{Flow, IpProtocol, IpTuple};
