//! Path grammar shared by instance pointer resolution and override targets.
//!
//! ```text
//! path    := segment ('/' segment)*
//! segment := '.' | '..' | name | name ':' index
//! ```

use crate::error::PathError;

/// One segment of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// `.`
    Current,
    /// `..`
    Parent,
    /// `name` or `name:index`
    Child {
        name: String,
        index: Option<usize>,
    },
}

/// A parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// Parse path text
    ///
    /// # Errors
    ///
    /// Returns [`PathError::InvalidSyntax`] for empty paths, empty segments,
    /// empty names, non-numeric indices or more than one index per segment.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Err(PathError::InvalidSyntax("empty path".to_string()));
        }

        let segments = text.split('/')
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The bare name of a single-segment path (`"Motor"`), which resolves by
    /// searching every instance of that resource
    pub fn shortcut(&self) -> Option<&str> {
        match self.segments.as_slice() {
            [PathSegment::Child { name, index: None }] => Some(name),
            _ => None,
        }
    }
}

fn parse_segment(segment: &str) -> Result<PathSegment, PathError> {
    match segment {
        "" => Err(PathError::InvalidSyntax("empty path segment".to_string())),
        "." => Ok(PathSegment::Current),
        ".." => Ok(PathSegment::Parent),
        _ => {
            let parts: Vec<&str> = segment.split(':').collect();
            let (name, index) = match parts.as_slice() {
                [name] => (*name, None),
                [name, index] => {
                    let index = index.parse::<usize>().map_err(|_| {
                        PathError::InvalidSyntax(format!("'{}' is not a valid child index", index))
                    })?;
                    (*name, Some(index))
                }
                _ => return Err(PathError::InvalidSyntax(format!(
                    "segment '{}' must be 'child_id' or 'child_id:child_index'", segment
                ))),
            };

            if name.is_empty() {
                return Err(PathError::InvalidSyntax(format!("segment '{}' has no name", segment)));
            }

            Ok(PathSegment::Child { name: name.to_string(), index })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(name: &str, index: Option<usize>) -> PathSegment {
        PathSegment::Child { name: name.to_string(), index }
    }

    #[test]
    fn test_parse_relative_path() {
        let path = InstancePath::parse("../Engine/Wheel:1/WheelComp").unwrap();
        assert_eq!(path.segments(), &[
            PathSegment::Parent,
            child("Engine", None),
            child("Wheel", Some(1)),
            child("WheelComp", None),
        ]);
        assert_eq!(path.shortcut(), None);
    }

    #[test]
    fn test_single_segment_is_shortcut() {
        assert_eq!(InstancePath::parse("Motor").unwrap().shortcut(), Some("Motor"));
        assert_eq!(InstancePath::parse(".").unwrap().shortcut(), None);
        assert_eq!(InstancePath::parse("Wheel:0").unwrap().shortcut(), None);
    }

    #[test]
    fn test_invalid_syntax() {
        for text in ["", "a//b", "Wheel:x", ":1", "./Wheel:-1"] {
            assert!(
                matches!(InstancePath::parse(text), Err(PathError::InvalidSyntax(_))),
                "'{}' should be rejected", text
            );
        }
    }

    #[test]
    fn test_segment_with_two_indices_is_rejected() {
        let error = InstancePath::parse("./Wheel:1:2/WheelComp").unwrap_err();
        assert_eq!(
            error,
            PathError::InvalidSyntax("segment 'Wheel:1:2' must be 'child_id' or 'child_id:child_index'".to_string())
        );
        assert!(InstancePath::parse("Wheel::1").is_err());
    }
}
