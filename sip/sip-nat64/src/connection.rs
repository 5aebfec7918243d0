use crate::resolver::{AddressFamily, Resolve};
use sdp_types::{Connection, SessionDescription};

/// Replace the IPv4 address of a connection line with a resolved IPv6 address.
///
/// Returns if the connection was changed, on failure the line is left as is.
fn replace_ipv4_with_ipv6(resolver: &dyn Resolve, conn: &mut Connection) -> bool {
    if !conn.is_ip4() {
        return false;
    }

    // IPv4 multicast has no NAT64 equivalent and its ttl no IPv6 counterpart
    if let Some(suffix) = conn.multicast_suffix() {
        log::debug!(
            "Leaving multicast connection address {:?} with suffix {suffix:?} intact",
            conn.address
        );
        return false;
    }

    match resolver.resolve(&conn.address, AddressFamily::V6) {
        Some(resolved) => {
            log::debug!(
                "Replacing IPv4 address {:?} with synthesized IPv6 address {resolved} in connection line",
                conn.address
            );

            conn.set_address(resolved);
            true
        }
        None => {
            log::warn!(
                "Failed to synthesize IPv6 address for IPv4 literal {:?}, leaving intact",
                conn.address
            );
            false
        }
    }
}

/// Rewrite the session level and every media level IPv4 connection line to IPv6.
///
/// Every line is attempted regardless of earlier failures.
/// Returns the number of rewritten lines.
pub fn rewrite_connections(resolver: &dyn Resolve, sdp: &mut SessionDescription) -> usize {
    let mut rewritten = 0;

    if let Some(conn) = sdp.connection_mut() {
        rewritten += usize::from(replace_ipv4_with_ipv6(resolver, conn));
    }

    for media in &mut sdp.media_descriptions {
        if let Some(conn) = media.connection_mut() {
            rewritten += usize::from(replace_ipv4_with_ipv6(resolver, conn));
        }
    }

    rewritten
}
