use crate::{Attribute, Connection};
use bytesstr::BytesStr;
use std::fmt;

/// Any `<type>=<value>` line which is neither a connection nor an attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: char,
    pub value: BytesStr,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.value)
    }
}

/// Single line of a session or media section, kept in order of appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Connection(Connection),
    Attribute(Attribute),
    Field(Field),
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Connection(conn) => write!(f, "c={conn}"),
            Line::Attribute(attr) => fmt::Display::fmt(attr, f),
            Line::Field(field) => fmt::Display::fmt(field, f),
        }
    }
}

/// Returned when a media section already holds the maximum number of attributes
#[derive(Debug, thiserror::Error)]
#[error("attribute limit of {limit} reached")]
pub struct AttributeLimitReached {
    pub limit: usize,
}

/// Connection and attribute access shared by session and media sections
pub(crate) struct Lines;

impl Lines {
    pub(crate) fn connection(lines: &[Line]) -> Option<&Connection> {
        lines.iter().find_map(|line| match line {
            Line::Connection(conn) => Some(conn),
            _ => None,
        })
    }

    pub(crate) fn connection_mut(lines: &mut [Line]) -> Option<&mut Connection> {
        lines.iter_mut().find_map(|line| match line {
            Line::Connection(conn) => Some(conn),
            _ => None,
        })
    }

    /// Replace the existing connection line or insert one in front of the
    /// first bandwidth, key or attribute line
    pub(crate) fn set_connection(lines: &mut Vec<Line>, connection: Connection) {
        if let Some(conn) = Self::connection_mut(lines) {
            *conn = connection;
            return;
        }

        let position = lines
            .iter()
            .position(|line| match line {
                Line::Attribute(_) => true,
                Line::Field(field) => matches!(field.kind, 'b' | 'k' | 't'),
                Line::Connection(_) => false,
            })
            .unwrap_or(lines.len());

        lines.insert(position, Line::Connection(connection));
    }

    pub(crate) fn attributes(lines: &[Line]) -> impl Iterator<Item = &Attribute> {
        lines.iter().filter_map(|line| match line {
            Line::Attribute(attr) => Some(attr),
            _ => None,
        })
    }
}
