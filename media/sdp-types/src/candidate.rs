use crate::Attribute;
use bytes::Bytes;
use bytesstr::BytesStr;
use internal::{Finish, IResult, field, verbose_error_to_owned};
use nom::character::complete::space0;
use nom::combinator::{map, map_res, rest};
use nom::error::{VerboseError, context};
use nom::sequence::{preceded, tuple};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum InvalidCandidate {
    #[error("candidate attribute has no value")]
    MissingValue,
    #[error("malformed candidate, {0}")]
    Malformed(VerboseError<String>),
}

/// ICE candidate carried in the value of an `a=candidate` attribute
///
/// Only the seven leading fields are interpreted, the remainder is kept verbatim.
///
/// [RFC8839](https://www.rfc-editor.org/rfc/rfc8839.html#section-5.1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidate {
    pub foundation: BytesStr,
    pub component: BytesStr,
    pub transport: BytesStr,
    /// Higher is more preferred
    pub priority: u32,
    pub address: BytesStr,
    pub port: BytesStr,
    /// The field following the port, `typ` in RFC conforming candidates
    pub kind: BytesStr,
    /// Everything after `kind`, never reparsed
    pub extensions: Option<BytesStr>,
}

impl IceCandidate {
    pub fn parse(src: &Bytes) -> impl Fn(&str) -> IResult<&str, Self> + '_ {
        move |i| {
            context(
                "parsing ice candidate",
                map(
                    tuple((
                        field,
                        field,
                        field,
                        map_res(field, u32::from_str),
                        field,
                        field,
                        field,
                        map(preceded(space0, rest), str::trim_end),
                    )),
                    |(foundation, component, transport, priority, address, port, kind, ext)| {
                        IceCandidate {
                            foundation: BytesStr::from_parse(src, foundation),
                            component: BytesStr::from_parse(src, component),
                            transport: BytesStr::from_parse(src, transport),
                            priority,
                            address: BytesStr::from_parse(src, address),
                            port: BytesStr::from_parse(src, port),
                            kind: BytesStr::from_parse(src, kind),
                            extensions: (!ext.is_empty())
                                .then(|| BytesStr::from_parse(src, ext)),
                        }
                    },
                ),
            )(i)
        }
    }

    /// Parse the candidate from the value of a `candidate` attribute
    pub fn from_attribute(attribute: &Attribute) -> Result<Self, InvalidCandidate> {
        let value = attribute
            .value
            .as_ref()
            .ok_or(InvalidCandidate::MissingValue)?;

        let (_, candidate) = Self::parse(value.as_ref())(value.trim_start())
            .finish()
            .map_err(|e| InvalidCandidate::Malformed(verbose_error_to_owned(e)))?;

        Ok(candidate)
    }

    /// IPv6 literals always contain a colon
    pub fn is_ipv6(&self) -> bool {
        self.address.contains(':')
    }

    /// Copy of this candidate with a different address and priority
    pub fn with_address(&self, address: impl Into<BytesStr>, priority: u32) -> Self {
        Self {
            address: address.into(),
            priority,
            ..self.clone()
        }
    }
}

impl fmt::Display for IceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {}",
            self.foundation,
            self.component,
            self.transport,
            self.priority,
            self.address,
            self.port,
            self.kind
        )?;

        if let Some(extensions) = &self.extensions {
            write!(f, " {extensions}")?;
        }

        Ok(())
    }
}
