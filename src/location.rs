//! Dotted location expressions addressing a field or component of a segment.
//!
//! A location is written `<segment>.<field>` or `<segment>.<field>.<component>`
//! with 1-based indices, e.g. `PID.3` or `DG1.3.1`.

use std::fmt;
use std::str::FromStr;

use crate::error::TidyError;

/// Name of the header segment whose field numbering is shifted by one.
///
/// The header declares the field separator itself as field 1, so splitting
/// an `MSH` line on that separator puts field N at position N - 1.
pub const HEADER_SEGMENT: &str = "MSH";

const LOCATION_SYNTAX: &str =
    "Syntax of location must be either '<segment>.<field>' or '<segment>.<field>.<component>'";

/// A parsed location with zero-based positions ready for splitting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Segment name, e.g. "PID"
    pub segment: String,
    /// Position of the field after splitting the segment line on the field separator
    pub field: usize,
    /// Zero-based component index, present for 3-part locations
    pub component: Option<usize>,
}

impl Location {
    /// Parse a location from its dotted text form
    ///
    /// # Example
    ///
    /// ```
    /// use tidyhl7::Location;
    ///
    /// let loc = Location::parse("DG1.3.1").unwrap();
    /// assert_eq!(loc.segment, "DG1");
    /// assert_eq!(loc.field, 3);
    /// assert_eq!(loc.component, Some(0));
    /// assert_eq!(loc.depth(), 3);
    /// ```
    pub fn parse(text: &str) -> Result<Self, TidyError> {
        let parts: Vec<&str> = text.split('.').collect();

        if parts.len() != 2 && parts.len() != 3 {
            return Err(malformed(text, LOCATION_SYNTAX));
        }

        let segment = parts[0];
        if segment.is_empty() {
            return Err(malformed(text, "segment name is empty"));
        }

        let mut field = parse_index(text, parts[1], "field")?;
        if segment == HEADER_SEGMENT {
            field -= 1;
        }
        if field < 0 {
            return Err(malformed(text, "field index is out of range"));
        }

        let component = match parts.get(2) {
            Some(token) => {
                let component = parse_index(text, token, "component")? - 1;
                if component < 0 {
                    return Err(malformed(text, "component index must be at least 1"));
                }
                Some(component as usize)
            }
            None => None,
        };

        Ok(Self {
            segment: segment.to_string(),
            field: field as usize,
            component,
        })
    }

    /// 2 for field-only addressing, 3 when a component is addressed
    pub fn depth(&self) -> usize {
        if self.component.is_some() {
            3
        } else {
            2
        }
    }

    pub fn is_header(&self) -> bool {
        self.segment == HEADER_SEGMENT
    }
}

fn parse_index(text: &str, token: &str, what: &str) -> Result<i64, TidyError> {
    token
        .parse::<i64>()
        .map_err(|_| malformed(text, &format!("{} '{}' is not an integer", what, token)))
}

fn malformed(text: &str, reason: &str) -> TidyError {
    TidyError::MalformedLocation {
        location: text.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for Location {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Writes the 1-based text form, so `parse(loc.to_string())` gives back `loc`
impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = if self.is_header() { self.field + 1 } else { self.field };
        write!(f, "{}.{}", self.segment, field)?;
        if let Some(component) = self.component {
            write!(f, ".{}", component + 1)?;
        }
        Ok(())
    }
}
