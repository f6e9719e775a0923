//! Property path parsing.
//!
//! A binding path names a chain of lookups starting at a source object:
//! property segments separated by `.` and list indexers in `[n]` form,
//! e.g. `orders[0].customer.name`. Parsing happens once, up front; the
//! resulting [`BindingPath`] is the immutable plan the walker resolves
//! against live objects.
//!
//! Two parse modes exist. [`BindingPath::parse`] is strict and returns a
//! [`PathError`]. [`BindingPath::parse_lenient`] never fails: a malformed
//! path becomes an *unusable* path, and a walker built over one is
//! permanently broken with a `None` value.

use std::fmt;

use crate::error::PathError;

/// One step of a binding path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A named property lookup.
    Property(String),
    /// A positional list lookup.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Property(name) => f.write_str(name),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// A parsed binding path.
///
/// An empty path (and a `(`-prefixed one, see below) has zero segments
/// and binds straight through to the source itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPath {
    raw: String,
    segments: Vec<PathSegment>,
    usable: bool,
}

impl BindingPath {
    /// Parse a path string, rejecting malformed input.
    ///
    /// Grammar notes:
    /// - Segments split on `.` and `[`.
    /// - An indexer token must be decimal digits followed by `]`.
    /// - A property token must be an identifier
    ///   (`[A-Za-z_][A-Za-z0-9_]*`).
    /// - A leading `.` is an error; a leading `[` binds the index against
    ///   the source directly.
    /// - A path starting with `(` uses a parenthesized syntax this engine
    ///   does not model; it parses to zero segments and resolves as a
    ///   pass-through rather than failing.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() || path.starts_with('(') {
            return Ok(Self {
                raw: path.to_string(),
                segments: Vec::new(),
                usable: true,
            });
        }
        if path.starts_with('.') {
            return Err(PathError::LeadingDot);
        }

        let mut segments = Vec::new();
        let mut start = 0usize;
        let mut in_index = false;
        let mut first = true;
        for (i, ch) in path.char_indices() {
            if ch == '.' || ch == '[' {
                let token = &path[start..i];
                // A path may begin with an indexer; the empty token in
                // front of the first '[' is not a segment.
                if !(first && ch == '[' && token.is_empty()) {
                    push_segment(&mut segments, token, in_index, start)?;
                }
                first = false;
                in_index = ch == '[';
                start = i + 1;
            }
        }
        push_segment(&mut segments, &path[start..], in_index, start)?;

        Ok(Self {
            raw: path.to_string(),
            segments,
            usable: true,
        })
    }

    /// Parse a path string, converting failures into an unusable path.
    ///
    /// An unusable path carries zero segments and
    /// [`is_usable`](Self::is_usable) returns `false`; a walker over it
    /// is permanently broken.
    pub fn parse_lenient(path: &str) -> Self {
        match Self::parse(path) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(
                    target: "trellis::binding",
                    path,
                    error = %err,
                    "malformed binding path, binding will stay broken"
                );
                Self {
                    raw: path.to_string(),
                    segments: Vec::new(),
                    usable: false,
                }
            }
        }
    }

    /// The parsed segments, in resolution order.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether the path parsed cleanly.
    ///
    /// Only lenient parsing can produce an unusable path.
    pub fn is_usable(&self) -> bool {
        self.usable
    }

    /// Whether the path has no segments (pass-through binding).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The original path text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for BindingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn push_segment(
    segments: &mut Vec<PathSegment>,
    token: &str,
    in_index: bool,
    offset: usize,
) -> Result<(), PathError> {
    if token.is_empty() {
        return Err(PathError::EmptySegment { offset });
    }
    if in_index {
        let index = token
            .strip_suffix(']')
            .filter(|inner| !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|inner| inner.parse::<usize>().ok())
            .ok_or_else(|| PathError::InvalidIndexSegment {
                segment: token.to_string(),
            })?;
        segments.push(PathSegment::Index(index));
    } else {
        if !is_identifier(token) {
            return Err(PathError::InvalidIdentifier {
                segment: token.to_string(),
            });
        }
        segments.push(PathSegment::Property(token.to_string()));
    }
    Ok(())
}

fn is_identifier(token: &str) -> bool {
    let mut bytes = token.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
