use crate::IceCandidate;
use bytes::Bytes;
use bytesstr::BytesStr;
use std::fmt;

/// `name:[value]` pair of an attribute line (a=)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name, the part before the optional `:`
    pub name: BytesStr,

    /// if the optional `:` is present the part parsed after is stored inside `value`
    pub value: Option<BytesStr>,
}

impl Attribute {
    pub fn parse(src: &Bytes, line: &str) -> Self {
        match line.split_once(':') {
            None => Self {
                name: BytesStr::from_parse(src, line),
                value: None,
            },
            Some((name, value)) => Self {
                name: BytesStr::from_parse(src, name),
                value: Some(BytesStr::from_parse(src, value)),
            },
        }
    }

    pub fn new(name: impl Into<BytesStr>, value: Option<BytesStr>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Is this an ICE `candidate` attribute
    pub fn is_candidate(&self) -> bool {
        self.name.eq_ignore_ascii_case("candidate")
    }
}

impl From<&IceCandidate> for Attribute {
    fn from(candidate: &IceCandidate) -> Self {
        Self::new("candidate", Some(candidate.to_string().into()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a={}", self.name)?;

        if let Some(value) = &self.value {
            write!(f, ":{value}")?;
        }

        Ok(())
    }
}
