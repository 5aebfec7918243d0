use std::net::Ipv4Addr;

bitflags::bitflags! {
    /// Enabled rewriting behaviors, all of them are usually wanted
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Nat64Options: u32 {
        /// Add a placeholder IPv4 candidate to outgoing INVITE requests
        const REWRITE_OUTGOING_SDP = 0x01;
        /// Replace IPv4 media addresses in incoming messages with IPv6 ones
        const REWRITE_INCOMING_SDP = 0x02;
        /// Replace the IPv4 address in Route/Contact of INVITE responses.
        /// Accepted for compatibility, no rewriting is attached to it.
        const REWRITE_ROUTE_AND_CONTACT = 0x04;
    }
}

/// Default ceiling of a single SIP message
pub const DEFAULT_MAX_PACKET_LEN: usize = 4000;

/// Default number of attributes a single media section may hold
pub const DEFAULT_MAX_ATTRIBUTES: usize = 68;

/// Link-local and never routed, see [`Nat64Config::placeholder`]
pub const DEFAULT_PLACEHOLDER: Ipv4Addr = Ipv4Addr::new(169, 254, 169, 254);

/// Configuration of the [`Nat64Layer`](crate::Nat64Layer)
#[derive(Debug, Clone)]
pub struct Nat64Config {
    pub(crate) options: Nat64Options,
    pub(crate) max_packet_len: usize,
    pub(crate) max_attributes: usize,
    pub(crate) placeholder: Ipv4Addr,
}

impl Default for Nat64Config {
    fn default() -> Self {
        Self {
            options: Nat64Options::empty(),
            max_packet_len: DEFAULT_MAX_PACKET_LEN,
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
            placeholder: DEFAULT_PLACEHOLDER,
        }
    }
}

impl Nat64Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behaviors enabled when the layer is created
    pub fn options(&mut self, options: Nat64Options) -> &mut Self {
        self.options = options;
        self
    }

    /// Maximum length of a rewritten message in bytes
    pub fn max_packet_len(&mut self, max_packet_len: usize) -> &mut Self {
        self.max_packet_len = max_packet_len;
        self
    }

    /// Maximum number of attributes per media section, no candidates are appended beyond it
    pub fn max_attributes(&mut self, max_attributes: usize) -> &mut Self {
        self.max_attributes = max_attributes;
        self
    }

    /// Address carried by the candidate appended to outgoing INVITEs
    pub fn placeholder(&mut self, placeholder: Ipv4Addr) -> &mut Self {
        self.placeholder = placeholder;
        self
    }
}
