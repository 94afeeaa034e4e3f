//! Field extraction from raw delimited messages.
//!
//! A [`SegmentExtractor`] is built once per [`Location`] and applied to any
//! number of messages. Each message declares its own delimiters in the header,
//! so they are read per message rather than configured.

use crate::error::TidyError;
use crate::location::Location;

/// Character offset of the field separator within a message
pub const FIELD_SEPARATOR_OFFSET: usize = 3;

/// Character offset of the component separator within a message
pub const COMPONENT_SEPARATOR_OFFSET: usize = 4;

/// Values of one location within one message, one entry per segment occurrence.
///
/// `None` marks an occurrence whose field or component is absent.
pub type ExtractedValues = Vec<Option<String>>;

/// Delimiters declared by a message's header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
}

impl Delimiters {
    /// Read the delimiters from their fixed offsets, e.g. `MSH|^~\&|...`
    ///
    /// Returns `None` when the message is too short to declare them.
    pub fn from_message(message: &str) -> Option<Self> {
        let mut chars = message.chars().skip(FIELD_SEPARATOR_OFFSET);
        let field = chars.next()?;
        let component = chars.next()?;
        Some(Self { field, component })
    }
}

/// Extracts the value addressed by a [`Location`] from every occurrence of
/// its segment in a message
#[derive(Debug, Clone)]
pub struct SegmentExtractor {
    location: Location,
}

impl SegmentExtractor {
    pub fn new(location: Location) -> Self {
        Self { location }
    }

    /// Parse location text and build an extractor for it
    pub fn from_text(text: &str) -> Result<Self, TidyError> {
        Ok(Self::new(Location::parse(text)?))
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Extract the addressed value from each occurrence of the segment
    ///
    /// Missing fields or components degrade to `None` rather than failing,
    /// and a message without the segment yields an empty vector.
    ///
    /// # Example
    ///
    /// ```
    /// use tidyhl7::SegmentExtractor;
    ///
    /// let msg = "MSH|^~\\&|APP\nAL1|3|DA|1545^MORPHINE^99HIC|||20080828|||\n";
    /// let extractor = SegmentExtractor::from_text("AL1.3.2").unwrap();
    /// assert_eq!(extractor.extract(msg), vec![Some("MORPHINE".to_string())]);
    /// ```
    pub fn extract(&self, message: &str) -> ExtractedValues {
        let delimiters = match Delimiters::from_message(message) {
            Some(d) => d,
            None => {
                tracing::warn!(
                    "Message too short to declare delimiters, skipping {}",
                    self.location
                );
                return Vec::new();
            }
        };

        segment_lines(message, &self.location.segment, delimiters.field)
            .map(|line| self.extract_from_line(line, delimiters))
            .collect()
    }

    fn extract_from_line(&self, line: &str, delimiters: Delimiters) -> Option<String> {
        let field = line.split(delimiters.field).nth(self.location.field)?;

        match self.location.component {
            Some(component) => field
                .split(delimiters.component)
                .nth(component)
                .map(str::to_string),
            None => Some(field.to_string()),
        }
    }
}

/// Lines of `message` that start with `segment` followed by the field separator
fn segment_lines<'a>(
    message: &'a str,
    segment: &'a str,
    field_sep: char,
) -> impl Iterator<Item = &'a str> + 'a {
    message
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(move |line| {
            line.strip_prefix(segment)
                .map_or(false, |rest| rest.starts_with(field_sep))
        })
}

/// Extract one location from every message
///
/// # Example
///
/// ```
/// use tidyhl7::extract_all;
///
/// let msg1 = "MSH|^~\\&|\nAL1|3|DA|1545^MORPHINE^99HIC|||20080828|||\n";
/// let msg2 = "MSH|^~\\&|\nAL1|1|DRUG|00000741^OXYCODONE||HYPOTENSION\n";
/// let values = extract_all("AL1.3.1", &[msg1, msg2]).unwrap();
/// assert_eq!(values[0], vec![Some("1545".to_string())]);
/// assert_eq!(values[1], vec![Some("00000741".to_string())]);
/// ```
pub fn extract_all<S: AsRef<str>>(
    location_text: &str,
    messages: &[S],
) -> Result<Vec<ExtractedValues>, TidyError> {
    let extractor = SegmentExtractor::from_text(location_text)?;
    let values: Vec<ExtractedValues> = messages
        .iter()
        .map(|msg| extractor.extract(msg.as_ref()))
        .collect();

    tracing::debug!(
        "Extracted {} from {} messages ({} occurrences)",
        location_text,
        messages.len(),
        values.iter().map(Vec::len).sum::<usize>()
    );

    Ok(values)
}
