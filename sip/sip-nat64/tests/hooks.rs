use bytes::BytesMut;
use bytesstr::BytesStr;
use sdp_types::SessionDescription;
use sip_nat64::{
    Body, Header, IncomingMessage, Layer, MessageLine, Method, Nat64Config, Nat64Layer,
    Nat64Options, Nat64Prefix, OutgoingMessage, StaticResolver, Status, Synthesizer, TransportInfo,
};
use std::net::Ipv4Addr;

const ANSWER_SDP: &str = "v=0\r\n\
    o=bob 2808844564 2808844564 IN IP4 192.0.2.201\r\n\
    s=-\r\n\
    c=IN IP4 192.0.2.201\r\n\
    t=0 0\r\n\
    m=audio 49172 RTP/AVP 0\r\n\
    c=IN IP4 192.0.2.202\r\n\
    a=rtpmap:0 PCMU/8000\r\n\
    a=candidate:1 1 UDP 2130706431 192.0.2.202 49172 typ host\r\n\
    a=candidate:2 1 UDP 1694498815 198.51.100.9 49172 typ srflx raddr 192.0.2.202 rport 49172\r\n";

const REWRITTEN_SDP: &str = "v=0\r\n\
    o=bob 2808844564 2808844564 IN IP4 192.0.2.201\r\n\
    s=-\r\n\
    c=IN IP6 64:ff9b::c000:2c9\r\n\
    t=0 0\r\n\
    m=audio 49172 RTP/AVP 0\r\n\
    c=IN IP6 64:ff9b::c000:2ca\r\n\
    a=rtpmap:0 PCMU/8000\r\n\
    a=candidate:1 1 UDP 2130706431 192.0.2.202 49172 typ host\r\n\
    a=candidate:2 1 UDP 1694498815 198.51.100.9 49172 typ srflx raddr 192.0.2.202 rport 49172\r\n\
    a=candidate:1 1 UDP 2130706432 64:ff9b::c000:2ca 49172 typ host\r\n\
    a=candidate:2 1 UDP 1694498816 64:ff9b::c633:6409 49172 typ srflx raddr 192.0.2.202 rport 49172\r\n";

const RESPONSE_HEAD: &str = "SIP/2.0 200 OK\r\n\
    Via: SIP/2.0/UDP [2001:db8::10]:5060;branch=z9hG4bKnashds8\r\n\
    To: Bob <sip:bob@example.com>;tag=a6c85cf\r\n\
    From: Alice <sip:alice@example.com>;tag=1928301774\r\n\
    Call-ID: a84b4c76e66710\r\n\
    CSeq: 314159 INVITE\r\n\
    Content-Type: application/sdp\r\n";

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn layer(options: Nat64Options) -> Nat64Layer<Synthesizer<StaticResolver>> {
    let mut config = Nat64Config::new();
    config.options(options);

    Nat64Layer::new(
        config,
        Synthesizer::new(Nat64Prefix::WELL_KNOWN, StaticResolver::new()),
    )
}

fn transport(bound: &str) -> TransportInfo {
    TransportInfo::new("UDP", bound.parse().unwrap())
}

fn incoming(head: &str, body: &str, bound: &str) -> IncomingMessage {
    let raw = format!("{head}Content-Length: {}\r\n\r\n{body}", body.len());

    IncomingMessage::decode(BytesMut::from(raw.as_str()), transport(bound)).unwrap()
}

fn outgoing_invite(sdp: &'static str) -> OutgoingMessage {
    let mut msg = OutgoingMessage::new(
        transport("[2001:db8::10]:5060"),
        MessageLine::Request {
            method: Method::INVITE,
            uri: "sip:bob@example.com".into(),
        },
    );

    msg.headers.push(Header::new("CSeq", "1 INVITE"));
    msg.body = Some(Body::Sdp(
        SessionDescription::parse(&BytesStr::from_static(sdp)).unwrap(),
    ));
    msg
}

#[test]
fn incoming_response_rewritten() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = incoming(RESPONSE_HEAD, ANSWER_SDP, "[2001:db8::10]:5060");

    assert_eq!(layer.on_receive(&mut msg), Status::Continue);

    assert_eq!(msg.body(), REWRITTEN_SDP.as_bytes());
    assert_eq!(msg.content_length, Some(REWRITTEN_SDP.len()));
    assert_eq!(msg.tp_info.last_recv_len, msg.len());
    assert!(msg.buffer.starts_with(RESPONSE_HEAD.as_bytes()));
}

#[test]
fn incoming_rewrite_keeps_content_length_header() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = incoming(RESPONSE_HEAD, ANSWER_SDP, "[2001:db8::10]:5060");

    layer.on_receive(&mut msg);

    let redecoded =
        IncomingMessage::decode(msg.buffer.clone(), transport("[2001:db8::10]:5060")).unwrap();

    assert_eq!(redecoded.content_length, Some(msg.body().len()));
    assert_eq!(redecoded.content_length, msg.content_length);
    assert_eq!(redecoded.body(), REWRITTEN_SDP.as_bytes());
}

#[test]
fn incoming_rewrite_is_idempotent() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = incoming(RESPONSE_HEAD, REWRITTEN_SDP, "[2001:db8::10]:5060");
    let before = msg.buffer.clone();

    layer.on_receive(&mut msg);

    assert_eq!(msg.buffer, before);
}

#[test]
fn incoming_over_ipv4_untouched() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = incoming(RESPONSE_HEAD, ANSWER_SDP, "192.0.2.10:5060");
    let before = msg.buffer.clone();

    assert_eq!(layer.on_receive(&mut msg), Status::Continue);
    assert_eq!(msg.buffer, before);
}

#[test]
fn incoming_non_invite_untouched() {
    init();

    let layer = layer(Nat64Options::all());
    let head = RESPONSE_HEAD.replace("314159 INVITE", "314160 UPDATE");
    let mut msg = incoming(&head, ANSWER_SDP, "[2001:db8::10]:5060");
    let before = msg.buffer.clone();

    layer.on_receive(&mut msg);

    assert_eq!(msg.buffer, before);
}

#[test]
fn incoming_non_sdp_untouched() {
    init();

    let layer = layer(Nat64Options::all());
    let head = RESPONSE_HEAD.replace("application/sdp", "text/plain");
    let mut msg = incoming(&head, ANSWER_SDP, "[2001:db8::10]:5060");
    let before = msg.buffer.clone();

    layer.on_receive(&mut msg);

    assert_eq!(msg.buffer, before);
}

#[test]
fn incoming_disabled_option_untouched() {
    init();

    let layer = layer(Nat64Options::REWRITE_OUTGOING_SDP);
    let mut msg = incoming(RESPONSE_HEAD, ANSWER_SDP, "[2001:db8::10]:5060");
    let before = msg.buffer.clone();

    layer.on_receive(&mut msg);
    assert_eq!(msg.buffer, before);

    layer.set_options(Nat64Options::REWRITE_INCOMING_SDP);
    layer.on_receive(&mut msg);
    assert_eq!(msg.body(), REWRITTEN_SDP.as_bytes());
}

#[test]
fn incoming_malformed_sdp_untouched() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = incoming(
        RESPONSE_HEAD,
        "this is not sdp\r\nc=IN IP4 192.0.2.1\r\n",
        "[2001:db8::10]:5060",
    );
    let before = msg.buffer.clone();

    assert_eq!(layer.on_receive(&mut msg), Status::Continue);
    assert_eq!(msg.buffer, before);
}

#[test]
fn incoming_too_large_untouched() {
    init();

    let mut config = Nat64Config::new();
    config
        .options(Nat64Options::all())
        .max_packet_len(RESPONSE_HEAD.len() + ANSWER_SDP.len() + 40);

    let layer = Nat64Layer::new(
        config,
        Synthesizer::new(Nat64Prefix::WELL_KNOWN, StaticResolver::new()),
    );

    let mut msg = incoming(RESPONSE_HEAD, ANSWER_SDP, "[2001:db8::10]:5060");
    let before = msg.buffer.clone();
    let content_length = msg.content_length;

    assert_eq!(layer.on_receive(&mut msg), Status::Continue);
    assert_eq!(msg.buffer, before);
    assert_eq!(msg.content_length, content_length);
}

#[test]
fn incoming_ipv6_only_untouched() {
    init();

    let sdp = "v=0\r\n\
        o=bob 1 1 IN IP6 2001:db8::201\r\n\
        s=-\r\n\
        c=IN IP6 2001:db8::201\r\n\
        t=0 0\r\n\
        m=audio 49172 RTP/AVP 0\r\n\
        a=candidate:1 1 UDP 100 2001:db8::201 49172 typ host\r\n";

    let layer = layer(Nat64Options::all());
    let mut msg = incoming(RESPONSE_HEAD, sdp, "[2001:db8::10]:5060");
    let before = msg.buffer.clone();

    layer.on_receive(&mut msg);

    assert_eq!(msg.buffer, before);
}

#[test]
fn outgoing_invite_gets_placeholder() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = outgoing_invite(
        "v=0\r\n\
        m=audio 4000 RTP/AVP 0\r\n\
        a=candidate:1 1 UDP 10 2001:db8::1 4000 typ host\r\n\
        a=candidate:2 1 UDP 5 2001:db8::2 4002 typ srflx\r\n\
        a=candidate:3 1 UDP 20 2001:db8::3 4004 typ host\r\n",
    );

    assert_eq!(layer.on_send(&mut msg), Status::Continue);

    let Some(Body::Sdp(sdp)) = &msg.body else {
        panic!("body must still be sdp");
    };

    let last = sdp.media_descriptions[0].candidates().last().unwrap();
    assert_eq!(
        last.value.as_deref(),
        Some("2 1 UDP 4 169.254.169.254 4002 typ srflx")
    );

    let wire = String::from_utf8(msg.buffer.to_vec()).unwrap();
    assert!(wire.starts_with("INVITE sip:bob@example.com SIP/2.0\r\n"));
    assert!(wire.ends_with("a=candidate:2 1 UDP 4 169.254.169.254 4002 typ srflx\r\n"));
    assert!(wire.contains(&format!("Content-Length: {}\r\n", sdp.to_string().len())));
}

#[test]
fn outgoing_replaces_cached_encoding() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = outgoing_invite(
        "v=0\r\n\
        m=audio 4000 RTP/AVP 0\r\n\
        a=candidate:1 1 UDP 10 2001:db8::1 4000 typ host\r\n",
    );
    let stale = msg.encode(4000).unwrap().clone();

    layer.on_send(&mut msg);

    assert_ne!(msg.buffer, stale);

    let wire = String::from_utf8(msg.buffer.to_vec()).unwrap();
    assert!(wire.ends_with("a=candidate:1 1 UDP 9 169.254.169.254 4000 typ host\r\n"));
}

#[test]
fn outgoing_custom_placeholder() {
    init();

    let mut config = Nat64Config::new();
    config
        .options(Nat64Options::REWRITE_OUTGOING_SDP)
        .placeholder(Ipv4Addr::new(192, 0, 0, 8));

    let layer = Nat64Layer::new(config, StaticResolver::new());
    let mut msg = outgoing_invite(
        "v=0\r\n\
        m=audio 4000 RTP/AVP 0\r\n\
        a=candidate:1 1 UDP 10 2001:db8::1 4000 typ host\r\n",
    );

    layer.on_send(&mut msg);

    let wire = String::from_utf8(msg.buffer.to_vec()).unwrap();
    assert!(wire.contains("a=candidate:1 1 UDP 9 192.0.0.8 4000 typ host\r\n"));
}

#[test]
fn outgoing_response_untouched() {
    init();

    let layer = layer(Nat64Options::all());
    let mut msg = outgoing_invite(
        "v=0\r\n\
        m=audio 4000 RTP/AVP 0\r\n\
        a=candidate:1 1 UDP 10 2001:db8::1 4000 typ host\r\n",
    );
    msg.line = MessageLine::Response {
        code: 200,
        reason: "OK".into(),
    };

    layer.on_send(&mut msg);

    assert!(msg.buffer.is_empty());
    let Some(Body::Sdp(sdp)) = &msg.body else {
        panic!("body must still be sdp");
    };
    assert_eq!(sdp.media_descriptions[0].candidates().count(), 1);
}

#[test]
fn outgoing_too_large_untouched() {
    init();

    let mut config = Nat64Config::new();
    config.options(Nat64Options::all()).max_packet_len(200);

    let layer = Nat64Layer::new(config, StaticResolver::new());
    let mut msg = outgoing_invite(
        "v=0\r\n\
        m=audio 4000 RTP/AVP 0\r\n\
        a=candidate:1 1 UDP 10 2001:db8::1 4000 typ host\r\n\
        a=candidate:2 1 UDP 11 2001:db8::2 4000 typ host\r\n",
    );
    let cached = msg.encode(4000).unwrap().clone();

    assert_eq!(layer.on_send(&mut msg), Status::Continue);

    assert_eq!(msg.buffer, cached);
    let Some(Body::Sdp(sdp)) = &msg.body else {
        panic!("body must still be sdp");
    };
    assert_eq!(sdp.media_descriptions[0].candidates().count(), 2);
}

#[test]
fn outgoing_disabled_untouched() {
    init();

    let layer = layer(Nat64Options::REWRITE_INCOMING_SDP);
    let mut msg = outgoing_invite(
        "v=0\r\n\
        m=audio 4000 RTP/AVP 0\r\n\
        a=candidate:1 1 UDP 10 2001:db8::1 4000 typ host\r\n",
    );

    layer.on_send(&mut msg);

    assert!(msg.buffer.is_empty());
}
