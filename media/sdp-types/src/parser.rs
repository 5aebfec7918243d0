use internal::verbose_error_to_owned;
use nom::error::VerboseError;
use std::str::Utf8Error;

#[derive(Debug, thiserror::Error)]
pub enum ParseSessionDescriptionError {
    #[error("session description is not valid UTF-8, {0}")]
    Utf8(#[from] Utf8Error),
    #[error("session description must begin with a version line")]
    MissingVersion,
    #[error("malformed line {0:?}")]
    MalformedLine(String),
    #[error("failed to parse connection line, {0}")]
    Connection(VerboseError<String>),
}

impl From<VerboseError<&str>> for ParseSessionDescriptionError {
    fn from(e: VerboseError<&str>) -> Self {
        Self::Connection(verbose_error_to_owned(e))
    }
}

/// Split a line into its type character and value
pub(crate) fn split_line(line: &str) -> Option<(char, &str)> {
    let mut chars = line.chars();
    let kind = chars.next().filter(char::is_ascii_alphabetic)?;

    chars.as_str().strip_prefix('=').map(|value| (kind, value))
}
