use crate::error::SpliceError;
use bytes::BytesMut;
use memchr::memmem;

const BODY_DELIMITER: &[u8] = b"\r\n\r\n";

/// Offset of the first byte after the header block, if there is one
pub fn body_offset(message: &[u8]) -> Option<usize> {
    memmem::find(message, BODY_DELIMITER).map(|pos| pos + BODY_DELIMITER.len())
}

/// Replace everything after the header block of `message` with `body`.
///
/// Fails without touching `message` if it has no header delimiter or the result
/// would exceed `max_len` bytes. Returns the new total length.
///
/// Any Content-Length header is not touched, keeping it consistent is up to the caller.
pub fn splice_body(message: &mut BytesMut, body: &[u8], max_len: usize) -> Result<usize, SpliceError> {
    let body_start = body_offset(&message[..]).ok_or(SpliceError::MissingBodyDelimiter)?;

    let required = body_start + body.len();
    if required > max_len {
        log::warn!("New body pushes message length to {required}, but maximum is {max_len}");
        return Err(SpliceError::Capacity {
            required,
            max: max_len,
        });
    }

    message.truncate(body_start);
    message.extend_from_slice(body);

    Ok(required)
}

/// Copy of the header block `head` with the value of every `Content-Length` (or compact `l`)
/// header replaced by `content_length`.
pub(crate) fn with_content_length(head: &[u8], content_length: usize) -> BytesMut {
    let mut rewritten = BytesMut::with_capacity(head.len() + 8);

    for line in head.split_inclusive(|&b| b == b'\n') {
        match content_length_value(line) {
            Some(value_start) => {
                rewritten.extend_from_slice(&line[..value_start]);
                rewritten.extend_from_slice(content_length.to_string().as_bytes());
                rewritten.extend_from_slice(b"\r\n");
            }
            None => rewritten.extend_from_slice(line),
        }
    }

    rewritten
}

/// Offset of the value inside a Content-Length header line
fn content_length_value(line: &[u8]) -> Option<usize> {
    let colon = memchr::memchr(b':', line)?;
    let name = line[..colon].trim_ascii();

    if !(name.eq_ignore_ascii_case(b"Content-Length") || name.eq_ignore_ascii_case(b"l")) {
        return None;
    }

    let spaces = line[colon + 1..]
        .iter()
        .take_while(|b| matches!(b, b' ' | b'\t'))
        .count();

    Some(colon + 1 + spaces)
}
