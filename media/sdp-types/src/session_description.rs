use crate::line::{Field, Line, Lines};
use crate::parser::{ParseSessionDescriptionError, split_line};
use crate::{Attribute, Connection, MediaDescription};
use bytes::Bytes;
use bytesstr::BytesStr;
use internal::Finish;
use nom::character::complete::space0;
use nom::combinator::all_consuming;
use nom::sequence::terminated;
use std::fmt;

/// Parsed session description
///
/// Keeps every line in order, an unmodified description prints back exactly as
/// it was received, given CRLF line endings.
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    /// Session level lines, starting with the version (v=)
    pub lines: Vec<Line>,

    /// Media descriptions in order
    pub media_descriptions: Vec<MediaDescription>,
}

impl SessionDescription {
    pub fn parse(src: &BytesStr) -> Result<Self, ParseSessionDescriptionError> {
        let bytes: &Bytes = src.as_ref();

        let mut lines = src
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.is_empty());

        match lines.next().and_then(split_line) {
            Some(('v', version)) => {
                let mut session = SessionDescription {
                    lines: vec![Line::Field(Field {
                        kind: 'v',
                        value: BytesStr::from_parse(bytes, version),
                    })],
                    media_descriptions: vec![],
                };

                for line in lines {
                    session.parse_line(bytes, line)?;
                }

                Ok(session)
            }
            _ => Err(ParseSessionDescriptionError::MissingVersion),
        }
    }

    /// Parse a session description from a message body
    pub fn parse_bytes(body: &Bytes) -> Result<Self, ParseSessionDescriptionError> {
        let text = std::str::from_utf8(body)?;

        Self::parse(&BytesStr::from_parse(body, text))
    }

    fn parse_line(&mut self, src: &Bytes, line: &str) -> Result<(), ParseSessionDescriptionError> {
        let Some((kind, value)) = split_line(line) else {
            return Err(ParseSessionDescriptionError::MalformedLine(line.into()));
        };

        let line = match kind {
            'm' => {
                self.media_descriptions
                    .push(MediaDescription::new(BytesStr::from_parse(src, value)));
                return Ok(());
            }
            'c' => {
                let (_, conn) =
                    all_consuming(terminated(Connection::parse(src), space0))(value).finish()?;
                Line::Connection(conn)
            }
            'a' => Line::Attribute(Attribute::parse(src, value)),
            kind => Line::Field(Field {
                kind,
                value: BytesStr::from_parse(src, value),
            }),
        };

        match self.media_descriptions.last_mut() {
            Some(media) => media.lines.push(line),
            None => self.lines.push(line),
        }

        Ok(())
    }

    /// Session level connection
    pub fn connection(&self) -> Option<&Connection> {
        Lines::connection(&self.lines)
    }

    pub fn connection_mut(&mut self) -> Option<&mut Connection> {
        Lines::connection_mut(&mut self.lines)
    }

    pub fn set_connection(&mut self, connection: Connection) {
        Lines::set_connection(&mut self.lines, connection)
    }

    /// Session level attributes
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        Lines::attributes(&self.lines)
    }
}

impl fmt::Display for SessionDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            write!(f, "{line}\r\n")?;
        }

        for media in &self.media_descriptions {
            write!(f, "{media}")?;
        }

        Ok(())
    }
}
