//! Message identifiers built from one or more identity locations.
//!
//! The identifier is the comma-joined value of each identity location. Every
//! identity location must address a segment found exactly once per message,
//! and the resulting identifiers must be unique because they are the join key
//! for every data location.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::error::TidyError;
use crate::extraction::{ExtractedValues, SegmentExtractor};

/// Separator between the values of the identity locations
pub const ID_SEPARATOR: &str = ",";

/// Resolve one identifier per message, in message order
///
/// # Errors
///
/// * `NoLocations` - `id_locations` is empty
/// * `MalformedLocation` - an identity location does not parse
/// * `AmbiguousIdentity` - a location yields zero or several values in some message
/// * `DuplicateIdentity` - two messages resolve to the same identifier
///
/// # Example
///
/// ```
/// use tidyhl7::resolve_message_ids;
///
/// let msgs = [
///     "MSH|^~\\&|\nPID|1||68188^^^FAC1\n",
///     "MSH|^~\\&|\nPID|1||588229^^^FAC2\n",
/// ];
/// let ids = resolve_message_ids(&["PID.3.4", "PID.3.1"], &msgs).unwrap();
/// assert_eq!(ids, vec!["FAC1,68188", "FAC2,588229"]);
/// ```
pub fn resolve_message_ids<L, M>(id_locations: &[L], messages: &[M]) -> Result<Vec<String>, TidyError>
where
    L: AsRef<str>,
    M: AsRef<str>,
{
    if id_locations.is_empty() {
        return Err(TidyError::NoLocations);
    }

    let mut values_per_location: Vec<Vec<ExtractedValues>> = Vec::with_capacity(id_locations.len());
    for text in id_locations {
        let extractor = SegmentExtractor::from_text(text.as_ref())?;
        values_per_location.push(
            messages
                .iter()
                .map(|msg| extractor.extract(msg.as_ref()))
                .collect(),
        );
    }

    let ambiguous: Vec<String> = id_locations
        .iter()
        .zip(&values_per_location)
        .filter(|(_, values)| values.iter().any(|v| v.len() != 1))
        .map(|(text, _)| text.as_ref().to_string())
        .collect();

    if !ambiguous.is_empty() {
        return Err(TidyError::AmbiguousIdentity { locations: ambiguous });
    }

    let ids: Vec<String> = (0..messages.len())
        .map(|i| {
            values_per_location
                .iter()
                .map(|values| values[i][0].as_deref().unwrap_or(""))
                .collect::<Vec<_>>()
                .join(ID_SEPARATOR)
        })
        .collect();

    check_unique(&ids)?;

    tracing::debug!("Resolved {} message IDs", ids.len());
    Ok(ids)
}

fn check_unique(ids: &[String]) -> Result<(), TidyError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut duplicates = IndexSet::new();

    for id in ids {
        if !seen.insert(id.as_str()) {
            duplicates.insert(id.clone());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(TidyError::DuplicateIdentity {
            duplicates: duplicates.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(facility: &str, mrn: &str, allergies: &[&str]) -> String {
        let mut msg = format!(
            "MSH|^~\\&|APP|{}|||20080828||ADT^A01\nPID|1||{}^^^{}||DOE^JANE\n",
            facility, mrn, facility
        );
        for (i, code) in allergies.iter().enumerate() {
            msg.push_str(&format!("AL1|{}|DA|{}^DRUG^99HIC\n", i + 1, code));
        }
        msg
    }

    #[test]
    fn test_resolve_concatenates_in_location_order() {
        let msgs = vec![msg("FAC1", "68188", &[]), msg("FAC2", "588229", &[])];

        let ids = resolve_message_ids(&["PID.3.4", "PID.3.1"], &msgs).unwrap();
        assert_eq!(ids, vec!["FAC1,68188", "FAC2,588229"]);

        let ids = resolve_message_ids(&["PID.3.1", "MSH.4"], &msgs).unwrap();
        assert_eq!(ids, vec!["68188,FAC1", "588229,FAC2"]);
    }

    #[test]
    fn test_resolve_multiple_occurrences_is_ambiguous() {
        let msgs = vec![msg("FAC1", "1", &["100", "200"]), msg("FAC1", "2", &["300"])];

        let err = resolve_message_ids(&["PID.3.1", "AL1.3.1"], &msgs).unwrap_err();
        assert_eq!(
            err,
            TidyError::AmbiguousIdentity {
                locations: vec!["AL1.3.1".to_string()]
            }
        );
    }

    #[test]
    fn test_resolve_reports_every_ambiguous_location() {
        let msgs = vec![msg("FAC1", "1", &[])];

        let err = resolve_message_ids(&["AL1.1", "PID.3.1", "DG1.3"], &msgs).unwrap_err();
        match err {
            TidyError::AmbiguousIdentity { ref locations } => {
                assert_eq!(locations, &vec!["AL1.1", "DG1.3"]);
                assert!(err.to_string().contains("do not yield exactly one value"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_duplicate_ids() {
        let msgs = vec![
            msg("FAC1", "1", &[]),
            msg("FAC1", "2", &[]),
            msg("FAC1", "1", &[]),
        ];

        let err = resolve_message_ids(&["PID.3.4", "PID.3.1"], &msgs).unwrap_err();
        assert_eq!(
            err,
            TidyError::DuplicateIdentity {
                duplicates: vec!["FAC1,1".to_string()]
            }
        );
    }

    #[test]
    fn test_resolve_missing_component_renders_empty() {
        let msgs = vec!["MSH|^~\\&|\nPID|1||42\n"];

        let ids = resolve_message_ids(&["PID.3.1", "PID.3.4"], &msgs).unwrap();
        assert_eq!(ids, vec!["42,"]);
    }

    #[test]
    fn test_resolve_requires_locations() {
        let empty: [&str; 0] = [];
        assert_eq!(
            resolve_message_ids(&empty, &["MSH|^~\\&|"]),
            Err(TidyError::NoLocations)
        );
    }

    #[test]
    fn test_resolve_no_messages() {
        let msgs: Vec<String> = Vec::new();
        assert_eq!(resolve_message_ids(&["PID.3.1"], &msgs), Ok(vec![]));
    }
}
