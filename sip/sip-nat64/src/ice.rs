//! Synthesis of additional ICE candidates
//!
//! Incoming descriptions get an IPv6 twin for each IPv4 candidate, outgoing ones a
//! single placeholder IPv4 candidate which is less preferred than any other candidate.

use crate::resolver::{AddressFamily, Resolve};
use sdp_types::{Attribute, IceCandidate, MediaDescription, SessionDescription};
use std::net::Ipv4Addr;

/// Collect the IPv4 candidates of a media section up to the first IPv6 candidate.
///
/// An IPv6 candidate means the section was already rewritten or offers IPv6 by
/// itself, nothing after it is considered.
fn ipv4_candidates(media: &MediaDescription) -> Vec<IceCandidate> {
    let mut candidates = Vec::new();

    for attr in media.candidates() {
        let candidate = match IceCandidate::from_attribute(attr) {
            Ok(candidate) => candidate,
            Err(e) => {
                log::debug!("Skipping candidate {:?}, {e}", attr.value);
                continue;
            }
        };

        if candidate.is_ipv6() {
            break;
        }

        candidates.push(candidate);
    }

    candidates
}

/// Append a synthesized IPv6 candidate for every IPv4 candidate of every media section.
///
/// The twin has the priority of its original plus one and is not appended again if
/// the section already contains it. Appending silently stops once a section holds
/// `max_attributes` attributes.
/// Returns the number of appended candidates.
pub fn synthesize_ipv6_candidates(
    resolver: &dyn Resolve,
    sdp: &mut SessionDescription,
    max_attributes: usize,
) -> usize {
    let mut appended = 0;

    for media in &mut sdp.media_descriptions {
        for candidate in ipv4_candidates(media) {
            let Some(resolved) = resolver.resolve(&candidate.address, AddressFamily::V6) else {
                log::debug!(
                    "No IPv6 address for candidate address {:?}",
                    candidate.address
                );
                continue;
            };

            let Some(priority) = candidate.priority.checked_add(1) else {
                log::debug!("Candidate {candidate} already has the highest priority");
                continue;
            };

            let twin = candidate.with_address(resolved.to_string(), priority);
            let attribute = Attribute::from(&twin);

            if media.candidates().any(|existing| existing.value == attribute.value) {
                log::trace!("Synthesized IPv6 candidate {twin} is already present");
                continue;
            }

            if let Err(e) = media.try_push_attribute(attribute, max_attributes) {
                log::debug!("Not appending synthesized IPv6 candidate to {} media, {e}", media.media_type());
                break;
            }

            log::debug!("Appended SDP attribute for synthesized IPv6 ICE candidate: {twin}");
            appended += 1;
        }
    }

    appended
}

/// Append a candidate with the `placeholder` address to every media section with candidates.
///
/// It copies the candidate with the lowest priority (the first one on ties) and
/// lowers the priority by one. Sections at `max_attributes` are skipped.
/// Returns the number of appended candidates.
pub fn append_placeholder_candidates(
    sdp: &mut SessionDescription,
    placeholder: Ipv4Addr,
    max_attributes: usize,
) -> usize {
    let mut appended = 0;

    for media in &mut sdp.media_descriptions {
        let lowest = media
            .candidates()
            .filter_map(|attr| IceCandidate::from_attribute(attr).ok())
            .min_by_key(|candidate| candidate.priority);

        let Some(lowest) = lowest else {
            continue;
        };

        let Some(priority) = lowest.priority.checked_sub(1) else {
            log::debug!("Candidate {lowest} has priority 0, no placeholder can rank below it");
            continue;
        };

        let placeholder = lowest.with_address(placeholder.to_string(), priority);

        if let Err(e) = media.try_push_attribute(Attribute::from(&placeholder), max_attributes) {
            log::debug!("Not appending placeholder candidate to {} media, {e}", media.media_type());
            continue;
        }

        log::debug!("Appended SDP attribute for placeholder IPv4 candidate: {placeholder}");
        appended += 1;
    }

    appended
}
