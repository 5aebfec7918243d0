use crate::line::{AttributeLimitReached, Line, Lines};
use crate::{Attribute, Connection};
use bytesstr::BytesStr;
use std::fmt;

/// Part of the [`SessionDescription`](crate::SessionDescription) describes a single media session
///
/// Starts with the media field (m=) and owns every line up to the next media field.
///
/// [RFC8866](https://www.rfc-editor.org/rfc/rfc8866.html#section-5.14)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescription {
    /// Value of the media field (m=)
    pub media: BytesStr,

    /// All following lines in order
    pub lines: Vec<Line>,
}

impl MediaDescription {
    pub fn new(media: impl Into<BytesStr>) -> Self {
        Self {
            media: media.into(),
            lines: vec![],
        }
    }

    /// Media type, the first token of the media field (e.g. `audio`)
    pub fn media_type(&self) -> &str {
        self.media.split(' ').next().unwrap_or_default()
    }

    pub fn connection(&self) -> Option<&Connection> {
        Lines::connection(&self.lines)
    }

    pub fn connection_mut(&mut self) -> Option<&mut Connection> {
        Lines::connection_mut(&mut self.lines)
    }

    pub fn set_connection(&mut self, connection: Connection) {
        Lines::set_connection(&mut self.lines, connection)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        Lines::attributes(&self.lines)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes().count()
    }

    /// All `candidate` attributes in order
    pub fn candidates(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes().filter(|attr| attr.is_candidate())
    }

    /// Append an attribute to the end of the section
    pub fn push_attribute(&mut self, attribute: Attribute) {
        self.lines.push(Line::Attribute(attribute));
    }

    /// Append an attribute unless the section already holds `limit` attributes
    pub fn try_push_attribute(
        &mut self,
        attribute: Attribute,
        limit: usize,
    ) -> Result<(), AttributeLimitReached> {
        if self.attribute_count() >= limit {
            return Err(AttributeLimitReached { limit });
        }

        self.push_attribute(attribute);

        Ok(())
    }
}

impl fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "m={}\r\n", self.media)?;

        for line in &self.lines {
            write!(f, "{line}\r\n")?;
        }

        Ok(())
    }
}
