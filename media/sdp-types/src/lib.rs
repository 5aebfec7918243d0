#![warn(unreachable_pub)]
//! Lossless SDP tree
//!
//! Only connection lines, attributes and ICE candidates are interpreted, every other
//! line is carried through untouched.

mod attribute;
mod candidate;
mod connection;
mod line;
mod media_description;
mod parser;
mod session_description;

pub use attribute::Attribute;
pub use candidate::{IceCandidate, InvalidCandidate};
pub use connection::{AddressType, Connection};
pub use line::{AttributeLimitReached, Field, Line};
pub use media_description::MediaDescription;
pub use parser::ParseSessionDescriptionError;
pub use session_description::SessionDescription;
