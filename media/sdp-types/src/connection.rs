use bytes::Bytes;
use bytesstr::BytesStr;
use internal::{IResult, field};
use nom::combinator::map;
use nom::error::context;
use nom::sequence::tuple;
use std::fmt;
use std::net::IpAddr;

/// Address type tag of a connection line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressType {
    IP4,
    IP6,
    Other(BytesStr),
}

impl AddressType {
    fn from_parse(src: &Bytes, tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("IP4") {
            Self::IP4
        } else if tag.eq_ignore_ascii_case("IP6") {
            Self::IP6
        } else {
            Self::Other(BytesStr::from_parse(src, tag))
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressType::IP4 => f.write_str("IP4"),
            AddressType::IP6 => f.write_str("IP6"),
            AddressType::Other(other) => f.write_str(other),
        }
    }
}

/// Connection field (c=) of a session or media description
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.7)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Network type, practically always `IN`
    pub net_type: BytesStr,

    /// Address type tag, must always describe the family of `address`
    pub address_type: AddressType,

    /// Address literal or host name, including an optional `/ttl` or `/count` suffix
    pub address: BytesStr,
}

impl Connection {
    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            context(
                "parsing connection",
                map(
                    tuple((field, field, field)),
                    |(net_type, address_type, address)| Connection {
                        net_type: BytesStr::from_parse(src, net_type),
                        address_type: AddressType::from_parse(src, address_type),
                        address: BytesStr::from_parse(src, address),
                    },
                ),
            )(i)
        }
    }

    pub fn is_ip4(&self) -> bool {
        self.address_type == AddressType::IP4
    }

    /// The `/ttl` and `/count` suffix of a multicast address, including the leading slash
    pub fn multicast_suffix(&self) -> Option<&str> {
        self.address.find('/').map(|pos| &self.address[pos..])
    }

    /// Replace both the address type tag and the address.
    ///
    /// The whole address is replaced, a multicast suffix is dropped.
    pub fn set_address(&mut self, address: IpAddr) {
        self.address_type = match address {
            IpAddr::V4(_) => AddressType::IP4,
            IpAddr::V6(_) => AddressType::IP6,
        };
        self.address = address.to_string().into();
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.net_type, self.address_type, self.address)
    }
}
