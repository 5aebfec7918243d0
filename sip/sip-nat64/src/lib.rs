#![warn(unreachable_pub)]
//! NAT64 rewriting of SDP bodies inside SIP messages
//!
//! Lets SIP calls negotiate media when one side sits in an IPv6-only network
//! behind NAT64 and the other side only offers IPv4.
//!
//! The [`Nat64Layer`] is handed every message by the SIP stack:
//!
//! - incoming INVITE requests and responses received over IPv6 get their IPv4
//!   connection addresses replaced by synthesized IPv6 addresses, and an IPv6
//!   twin is appended for every IPv4 ICE candidate
//! - outgoing INVITE requests get a least preferred IPv4 candidate appended to
//!   every media section with candidates
//!
//! ```
//! use sip_nat64::{Layer, Nat64Config, Nat64Layer, Nat64Options};
//!
//! let mut config = Nat64Config::new();
//! config.options(Nat64Options::REWRITE_INCOMING_SDP | Nat64Options::REWRITE_OUTGOING_SDP);
//!
//! let layer = Nat64Layer::with_config(config);
//! assert_eq!(layer.name(), "nat64");
//! ```

mod connection;
mod error;
mod ice;
mod layer;
pub mod message;
mod options;
pub mod resolver;
mod splice;

pub use connection::rewrite_connections;
pub use error::{Error, Result, SpliceError};
pub use ice::{append_placeholder_candidates, synthesize_ipv6_candidates};
pub use layer::{Layer, Nat64Layer, Status};
pub use message::{Body, Header, IncomingMessage, MessageLine, Method, OutgoingMessage, TransportInfo};
pub use options::{
    DEFAULT_MAX_ATTRIBUTES, DEFAULT_MAX_PACKET_LEN, DEFAULT_PLACEHOLDER, Nat64Config,
    Nat64Options,
};
pub use resolver::{AddressFamily, Nat64Prefix, Resolve, StaticResolver, Synthesizer, SystemResolver};
pub use splice::{body_offset, splice_body};
