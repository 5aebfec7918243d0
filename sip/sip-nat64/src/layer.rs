use crate::connection::rewrite_connections;
use crate::ice::{append_placeholder_candidates, synthesize_ipv6_candidates};
use crate::message::{Body, IncomingMessage, OutgoingMessage};
use crate::options::{Nat64Config, Nat64Options};
use crate::resolver::{Resolve, Synthesizer};
use crate::splice::body_offset;
use crate::Result;
use bytes::Bytes;
use parking_lot::RwLock;
use sdp_types::SessionDescription;

/// Outcome of a layer hook reported back to the SIP stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Continue processing the message
    Continue,
    /// Stop processing the message
    Failed,
}

/// Layers are extensions to the SIP stack's message processing.
///
/// Every received message is passed to [`Layer::on_receive`] before it is parsed
/// into transactions, and every message is passed to [`Layer::on_send`] right before
/// it is handed to its transport.
pub trait Layer: Send + Sync + 'static {
    /// Return a descriptive and unique name of the layer
    fn name(&self) -> &'static str;

    fn on_receive(&self, _message: &mut IncomingMessage) -> Status {
        Status::Continue
    }

    fn on_send(&self, _message: &mut OutgoingMessage) -> Status {
        Status::Continue
    }
}

/// Rewrites SDP bodies so media negotiation works across NAT64.
///
/// - INVITE related messages received over IPv6 have their IPv4 connection
///   addresses replaced and get IPv6 twins of their IPv4 ICE candidates.
/// - Outgoing INVITE requests get an additional, least preferred IPv4 candidate.
///
/// Rewriting never blocks a message, every failure leaves the message as it was.
pub struct Nat64Layer<R = Synthesizer> {
    options: RwLock<Nat64Options>,
    config: Nat64Config,
    resolver: R,
}

impl Nat64Layer {
    /// Layer synthesizing with the well-known prefix and the system resolver
    pub fn with_config(config: Nat64Config) -> Self {
        Self::new(config, Synthesizer::default())
    }
}

impl<R: Resolve> Nat64Layer<R> {
    pub fn new(config: Nat64Config, resolver: R) -> Self {
        Self {
            options: RwLock::new(config.options),
            config,
            resolver,
        }
    }

    /// Currently enabled behaviors
    pub fn options(&self) -> Nat64Options {
        *self.options.read()
    }

    /// Replace the enabled behaviors, applies to all messages processed afterwards
    pub fn set_options(&self, options: Nat64Options) {
        *self.options.write() = options;
    }

    /// Returns if the message was rewritten
    fn rewrite_incoming(&self, message: &mut IncomingMessage) -> Result<bool> {
        let Some(body_start) = body_offset(&message.buffer) else {
            log::debug!("Message has no body delimiter, nothing to rewrite");
            return Ok(false);
        };

        let body = Bytes::copy_from_slice(&message.buffer[body_start..]);
        let mut sdp = SessionDescription::parse_bytes(&body)?;

        let connections = rewrite_connections(&self.resolver, &mut sdp);
        let candidates =
            synthesize_ipv6_candidates(&self.resolver, &mut sdp, self.config.max_attributes);

        if connections == 0 && candidates == 0 {
            return Ok(false);
        }

        message.replace_body(sdp.to_string().as_bytes(), self.config.max_packet_len)?;

        Ok(true)
    }

    /// Returns if the message was rewritten
    fn rewrite_outgoing(&self, message: &mut OutgoingMessage) -> Result<bool> {
        let Some(Body::Sdp(sdp)) = &message.body else {
            return Ok(false);
        };

        let mut cloned = sdp.clone();

        if append_placeholder_candidates(
            &mut cloned,
            self.config.placeholder,
            self.config.max_attributes,
        ) == 0
        {
            return Ok(false);
        }

        let previous_body = message.body.replace(Body::Sdp(cloned));
        let previous_buffer = message.buffer.clone();

        message.invalidate();

        if let Err(e) = message.encode(self.config.max_packet_len).map(|_| ()) {
            message.body = previous_body;
            message.buffer = previous_buffer;
            return Err(e);
        }

        Ok(true)
    }
}

impl<R: Resolve> Layer for Nat64Layer<R> {
    fn name(&self) -> &'static str {
        "nat64"
    }

    #[tracing::instrument(level = "debug", name = "nat64_receive", skip_all)]
    fn on_receive(&self, message: &mut IncomingMessage) -> Status {
        let options = self.options();

        if !options.contains(Nat64Options::REWRITE_INCOMING_SDP)
            || !message.is_invite_related()
            || !message.tp_info.is_ipv6()
            || !message.has_sdp_body()
        {
            return Status::Continue;
        }

        log::debug!(
            "Received INVITE related message via IPv6, synthesizing IPv6 addresses from IPv4 ones in SDP"
        );
        log::trace!(
            "Message before rewriting SDP: {}",
            String::from_utf8_lossy(&message.buffer)
        );

        match self.rewrite_incoming(message) {
            Ok(true) => log::trace!(
                "Reconstructed message with new SDP: {}",
                String::from_utf8_lossy(&message.buffer)
            ),
            Ok(false) => log::debug!("SDP contains nothing to rewrite"),
            Err(e) => log::warn!("Failed to rewrite incoming SDP, leaving message intact, {e}"),
        }

        Status::Continue
    }

    #[tracing::instrument(level = "debug", name = "nat64_send", skip_all)]
    fn on_send(&self, message: &mut OutgoingMessage) -> Status {
        let options = self.options();

        if !options.contains(Nat64Options::REWRITE_OUTGOING_SDP) || !message.is_invite_request() {
            return Status::Continue;
        }

        log::debug!("Detected outgoing INVITE with SDP, adding placeholder IPv4 candidate");

        match self.rewrite_outgoing(message) {
            Ok(true) => {}
            Ok(false) => log::debug!("No media section with candidates in outgoing SDP"),
            Err(e) => log::warn!("Failed to add placeholder candidate, leaving message intact, {e}"),
        }

        Status::Continue
    }
}
