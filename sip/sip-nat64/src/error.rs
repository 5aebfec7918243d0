use sdp_types::{InvalidCandidate, ParseSessionDescriptionError};
use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sdp(#[from] ParseSessionDescriptionError),
    #[error(transparent)]
    Candidate(#[from] InvalidCandidate),
    #[error(transparent)]
    Splice(#[from] SpliceError),
    #[error("failed to encode message, {0}")]
    Encode(#[from] io::Error),
    #[error("message is malformed, {0}")]
    MalformedMessage(&'static str),
    #[error("encoded message is {len} bytes, exceeding the maximum of {max}")]
    MessageTooLarge { len: usize, max: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SpliceError {
    #[error("message has no body delimiter")]
    MissingBodyDelimiter,
    #[error("spliced message would be {required} bytes, exceeding the maximum of {max}")]
    Capacity { required: usize, max: usize },
}
