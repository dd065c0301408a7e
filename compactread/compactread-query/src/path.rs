//! Parsed field-access expressions.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use crate::error::PathSyntaxError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Field name, matched exactly against the schema.
    Field(String),
    /// Array element, written `name[3]` or `name.3`.
    Index(usize),
    /// Every array element, written `name[any]`.
    Any,
}

/// A non-empty sequence of path segments starting with a field name.
///
/// Grammar: segments separated by `.`, where a segment is a field name with
/// an optional `[n]` / `[any]` suffix, or a bare index following an array
/// field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(expression: &str) -> Result<Self, PathSyntaxError> {
        if expression.is_empty() {
            return Err(PathSyntaxError::Empty);
        }

        let mut segments = Vec::new();
        for (position, raw) in expression.split('.').enumerate() {
            if raw.is_empty() {
                return Err(PathSyntaxError::EmptySegment { position });
            }

            if raw.bytes().all(|b| b.is_ascii_digit()) {
                if !matches!(segments.last(), Some(PathSegment::Field(_))) {
                    return Err(PathSyntaxError::IndexWithoutField { position });
                }
                segments.push(PathSegment::Index(parse_index(position, raw)?));
                continue;
            }

            let (name, selector) = match raw.find('[') {
                Some(open) => (&raw[..open], Some(&raw[open..])),
                None => (raw, None),
            };
            if name.contains(']') {
                return Err(PathSyntaxError::UnbalancedBrackets { position });
            }
            if name.is_empty() {
                return Err(PathSyntaxError::IndexWithoutField { position });
            }
            segments.push(PathSegment::Field(name.to_string()));

            if let Some(selector) = selector {
                let inner = selector
                    .strip_prefix('[')
                    .and_then(|s| s.strip_suffix(']'))
                    .filter(|s| !s.contains(['[', ']']))
                    .ok_or(PathSyntaxError::UnbalancedBrackets { position })?;
                segments.push(match inner {
                    "any" => PathSegment::Any,
                    index => PathSegment::Index(parse_index(position, index)?),
                });
            }
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn parse_index(position: usize, raw: &str) -> Result<usize, PathSyntaxError> {
    let invalid = || PathSyntaxError::InvalidIndex {
        position,
        index: raw.to_string(),
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    raw.parse().map_err(|_| invalid())
}

impl FromStr for FieldPath {
    type Err = PathSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical form: indices are always rendered in brackets.
impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
                PathSegment::Any => f.write_str("[any]")?,
            }
        }
        Ok(())
    }
}
