//! The parts of a SIP message the rewriting layer needs to see
//!
//! Messages are owned by the surrounding SIP stack, which hands them to a
//! [`Layer`](crate::Layer) right after receiving or right before sending.

use crate::splice::{body_offset, splice_body, with_content_length};
use crate::{Error, Result, SpliceError};
use bytes::{Bytes, BytesMut};
use bytesstr::BytesStr;
use internal::IResult;
use nom::bytes::complete::take_while1;
use nom::character::complete::{digit1, space1};
use nom::combinator::{map, map_res};
use nom::sequence::separated_pair;
use sdp_types::SessionDescription;
use std::fmt::{self, Write};
use std::io;
use std::net::SocketAddr;
use std::str::{FromStr, from_utf8};

/// SIP request method
///
/// ```
/// use sip_nat64::Method;
///
/// assert_eq!(Method::from("INVITE"), Method::INVITE);
/// assert_eq!(Method::from("HELLO").to_string(), "HELLO");
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Method(Repr);

macro_rules! methods {
    ($($print:literal, $ident:ident;)+) => {

        #[derive(Debug, Clone, Eq, PartialEq, Hash)]
        #[allow(clippy::upper_case_acronyms)]
        enum Repr {
            $($ident,)+
            Other(BytesStr),
        }

        impl Method {
            $(pub const $ident : Self = Self(Repr :: $ident );)+
        }

        impl From<&str> for Method {
            fn from(s: &str) -> Self {
                match s {
                    $($print => Self(Repr::$ident),)+
                    other => Self(Repr::Other(other.into())),
                }
            }
        }

        impl fmt::Display for Method {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match &self.0 {
                   $(Repr:: $ident => f.write_str($print),)+
                    Repr::Other(other) => f.write_str(other),
                }
            }
        }
    };
}

methods! {
    "INVITE",      INVITE;
    "ACK",         ACK;
    "CANCEL",      CANCEL;
    "BYE",         BYE;
    "REGISTER",    REGISTER;
    "MESSAGE",     MESSAGE;
    "UPDATE",      UPDATE;
    "PRACK",       PRACK;
    "OPTIONS",     OPTIONS;
    "SUBSCRIBE",   SUBSCRIBE;
    "NOTIFY",      NOTIFY;
    "PUBLISH",     PUBLISH;
    "INFO",        INFO;
    "REFER",       REFER;
}

#[rustfmt::skip]
fn token(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '.' | '!' | '%' | '*' | '_' | '`' | '\'' | '~' | '+')
}

/// `CSeq` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CSeq {
    pub cseq: u32,
    pub method: Method,
}

impl CSeq {
    fn parse(i: &str) -> IResult<&str, Self> {
        map(
            separated_pair(map_res(digit1, u32::from_str), space1, take_while1(token)),
            |(cseq, method)| CSeq {
                cseq,
                method: Method::from(method),
            },
        )(i)
    }
}

/// Media type of a Content-Type header, parameters are dropped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub kind: BytesStr,
    pub subtype: BytesStr,
}

impl MediaType {
    pub const SDP: MediaType = MediaType {
        kind: BytesStr::from_static("application"),
        subtype: BytesStr::from_static("sdp"),
    };

    fn parse(value: &str) -> Option<Self> {
        let essence = value.split(';').next()?;
        let (kind, subtype) = essence.split_once('/')?;

        Some(Self {
            kind: kind.trim().into(),
            subtype: subtype.trim().into(),
        })
    }

    /// `application/sdp`, compared case-insensitively
    pub fn is_sdp(&self) -> bool {
        self.kind.eq_ignore_ascii_case("application") && self.subtype.eq_ignore_ascii_case("sdp")
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

/// Transport a message was received on or is about to be sent over
#[derive(Debug, Clone)]
pub struct TransportInfo {
    /// Name of the transport (e.g. UDP, TCP, TLS ...)
    pub name: &'static str,

    /// Local address of the transport
    pub bound: SocketAddr,

    /// Length of the last message the transport received
    pub last_recv_len: usize,
}

impl TransportInfo {
    pub fn new(name: &'static str, bound: SocketAddr) -> Self {
        Self {
            name,
            bound,
            last_recv_len: 0,
        }
    }

    pub fn is_ipv6(&self) -> bool {
        self.bound.is_ipv6()
    }
}

/// First line of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLine {
    Request { method: Method, uri: BytesStr },
    Response { code: u16, reason: BytesStr },
}

impl MessageLine {
    fn parse(line: &str) -> Result<Self> {
        let mut parts = line.splitn(3, ' ');

        match (parts.next(), parts.next(), parts.next()) {
            (Some("SIP/2.0"), Some(code), reason) => Ok(Self::Response {
                code: code
                    .parse()
                    .map_err(|_| Error::MalformedMessage("invalid status code"))?,
                reason: reason.unwrap_or_default().into(),
            }),
            (Some(method), Some(uri), Some("SIP/2.0")) => Ok(Self::Request {
                method: Method::from(method),
                uri: uri.into(),
            }),
            _ => Err(Error::MalformedMessage("invalid start line")),
        }
    }

    pub fn method(&self) -> Option<&Method> {
        match self {
            MessageLine::Request { method, .. } => Some(method),
            MessageLine::Response { .. } => None,
        }
    }
}

impl fmt::Display for MessageLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageLine::Request { method, uri } => write!(f, "{method} {uri} SIP/2.0"),
            MessageLine::Response { code, reason } => write!(f, "SIP/2.0 {code} {reason}"),
        }
    }
}

/// Message received by the SIP stack, passed to every layer before it is processed
#[derive(Debug)]
pub struct IncomingMessage {
    pub tp_info: TransportInfo,
    pub line: MessageLine,
    pub cseq: Option<CSeq>,
    pub content_type: Option<MediaType>,
    pub content_length: Option<usize>,

    /// The complete message as received
    pub buffer: BytesMut,
}

impl IncomingMessage {
    /// Extract the start line and the headers relevant to rewriting from a raw message
    pub fn decode(buffer: BytesMut, mut tp_info: TransportInfo) -> Result<Self> {
        let head_end = body_offset(&buffer).unwrap_or(buffer.len());
        let head = from_utf8(&buffer[..head_end])
            .map_err(|_| Error::MalformedMessage("message head is not valid UTF-8"))?;

        let mut lines = head.split("\r\n").filter(|line| !line.is_empty());

        let line = MessageLine::parse(
            lines
                .next()
                .ok_or(Error::MalformedMessage("missing start line"))?,
        )?;

        let mut cseq = None;
        let mut content_type = None;
        let mut content_length = None;

        for header in lines {
            let Some((name, value)) = header.split_once(':') else {
                log::warn!("Incoming SIP message has malformed header line {header:?}");
                continue;
            };

            let name = name.trim();
            let value = value.trim();

            if name.eq_ignore_ascii_case("CSeq") {
                let (_, parsed) = CSeq::parse(value)
                    .map_err(|_| Error::MalformedMessage("invalid CSeq header"))?;
                cseq = Some(parsed);
            } else if name.eq_ignore_ascii_case("Content-Type") || name.eq_ignore_ascii_case("c") {
                content_type = MediaType::parse(value);
            } else if name.eq_ignore_ascii_case("Content-Length") || name.eq_ignore_ascii_case("l")
            {
                content_length = Some(
                    value
                        .parse()
                        .map_err(|_| Error::MalformedMessage("invalid Content-Length header"))?,
                );
            }
        }

        tp_info.last_recv_len = buffer.len();

        Ok(Self {
            tp_info,
            line,
            cseq,
            content_type,
            content_length,
            buffer,
        })
    }

    /// Total length of the message
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Everything after the header block
    pub fn body(&self) -> &[u8] {
        match body_offset(&self.buffer) {
            Some(start) => &self.buffer[start..],
            None => &[],
        }
    }

    /// Replace the body, keeping the Content-Length header and the recorded lengths in sync.
    ///
    /// Fails without touching the message if it has no header delimiter or the rewritten
    /// message would exceed `max_len` bytes.
    pub fn replace_body(&mut self, body: &[u8], max_len: usize) -> Result<(), SpliceError> {
        let body_start = body_offset(&self.buffer).ok_or(SpliceError::MissingBodyDelimiter)?;

        let mut rewritten = with_content_length(&self.buffer[..body_start], body.len());
        splice_body(&mut rewritten, body, max_len)?;

        self.buffer = rewritten;
        self.content_length = Some(body.len());
        self.tp_info.last_recv_len = self.buffer.len();

        Ok(())
    }

    /// Request or response belonging to an INVITE transaction
    pub fn is_invite_related(&self) -> bool {
        self.cseq
            .as_ref()
            .is_some_and(|cseq| cseq.method == Method::INVITE)
    }

    /// Has a non-empty body of type `application/sdp`
    pub fn has_sdp_body(&self) -> bool {
        self.content_type.as_ref().is_some_and(MediaType::is_sdp) && !self.body().is_empty()
    }
}

/// A single header of an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: BytesStr,
    pub value: BytesStr,
}

impl Header {
    pub fn new(name: impl Into<BytesStr>, value: impl Into<BytesStr>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

static SDP: MediaType = MediaType::SDP;

/// Body of an outgoing message
#[derive(Debug, Clone)]
pub enum Body {
    /// Parsed session description, printed when the message is encoded
    Sdp(SessionDescription),
    Other { content_type: MediaType, data: Bytes },
}

impl Body {
    pub fn content_type(&self) -> &MediaType {
        match self {
            Body::Sdp(_) => &SDP,
            Body::Other { content_type, .. } => content_type,
        }
    }

    fn to_bytes(&self) -> Bytes {
        match self {
            Body::Sdp(sdp) => Bytes::from(sdp.to_string()),
            Body::Other { data, .. } => data.clone(),
        }
    }
}

/// Message about to be sent by the SIP stack
#[derive(Debug)]
pub struct OutgoingMessage {
    pub tp_info: TransportInfo,
    pub line: MessageLine,

    /// Headers except Content-Type and Content-Length, which are derived from the body
    pub headers: Vec<Header>,
    pub body: Option<Body>,

    /// Cached wire encoding, empty if not yet encoded
    pub buffer: Bytes,
}

impl OutgoingMessage {
    pub fn new(tp_info: TransportInfo, line: MessageLine) -> Self {
        Self {
            tp_info,
            line,
            headers: vec![],
            body: None,
            buffer: Bytes::new(),
        }
    }

    pub fn is_invite_request(&self) -> bool {
        self.line.method() == Some(&Method::INVITE)
    }

    /// Drop the cached wire encoding, it must be encoded again before sending
    pub fn invalidate(&mut self) {
        self.buffer = Bytes::new();
    }

    /// Encode the message if it isn't already, and return the wire encoding
    pub fn encode(&mut self, max_len: usize) -> Result<&Bytes> {
        if self.buffer.is_empty() {
            self.buffer = self.encode_with_body(self.body.as_ref(), max_len)?;
        }

        Ok(&self.buffer)
    }

    fn encode_with_body(&self, body: Option<&Body>, max_len: usize) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        let body_bytes = body.map(Body::to_bytes).unwrap_or_default();

        let map_err = |e: fmt::Error| io::Error::other(e);

        write!(buffer, "{}\r\n", self.line).map_err(map_err)?;

        for header in &self.headers {
            if header.name.eq_ignore_ascii_case("Content-Type")
                || header.name.eq_ignore_ascii_case("Content-Length")
            {
                continue;
            }

            write!(buffer, "{}: {}\r\n", header.name, header.value).map_err(map_err)?;
        }

        if let Some(body) = body {
            write!(buffer, "Content-Type: {}\r\n", body.content_type()).map_err(map_err)?;
        }

        write!(buffer, "Content-Length: {}\r\n\r\n", body_bytes.len()).map_err(map_err)?;
        buffer.extend_from_slice(&body_bytes);

        if buffer.len() > max_len {
            return Err(Error::MessageTooLarge {
                len: buffer.len(),
                max: max_len,
            });
        }

        Ok(buffer.freeze())
    }
}
