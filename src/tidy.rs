//! Wide-to-long reshaping of extracted values.
//!
//! Each message contributes one row per occurrence position of the location's
//! segment. Messages with fewer occurrences than the busiest message in the
//! batch are padded with missing values so every message has the same number
//! of rows for the location.

use std::collections::HashSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::TidyError;
use crate::extraction::ExtractedValues;

/// One value of one location, keyed by message and occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRow {
    pub message_id: String,
    /// Zero-based repetition of the segment within its message
    pub occurrence: usize,
    pub value: Option<String>,
}

impl LongRow {
    pub fn key(&self) -> (&str, usize) {
        (self.message_id.as_str(), self.occurrence)
    }
}

/// Long-format rows for a single location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongTable {
    /// Column name, the location text
    pub label: String,
    pub rows: Vec<LongRow>,
}

impl LongTable {
    pub fn new(label: impl Into<String>, rows: Vec<LongRow>) -> Self {
        Self {
            label: label.into(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest occurrence count of any message, i.e. rows per message
    pub fn occurrences(&self) -> usize {
        self.rows.iter().map(|r| r.occurrence + 1).max().unwrap_or(0)
    }
}

/// Reshape per-message value lists into long rows
///
/// Rows are emitted occurrence-major: every message's occurrence 0, then
/// every message's occurrence 1, and so on.
///
/// # Errors
///
/// Returns `LengthMismatch` when `message_ids` and `values_per_message`
/// differ in length, and `DuplicateIdentity` when a message id repeats
/// (ids are the join key of every row).
///
/// # Example
///
/// ```
/// use tidyhl7::reshape;
///
/// let ids = vec!["m1".to_string(), "m2".to_string()];
/// let values = vec![
///     vec![Some("a".to_string())],
///     vec![Some("b".to_string()), Some("c".to_string())],
/// ];
/// let table = reshape(&ids, &values, "DG1.3.1").unwrap();
/// assert_eq!(table.len(), 4);
/// assert_eq!(table.rows[2].value, None);
/// ```
pub fn reshape(
    message_ids: &[String],
    values_per_message: &[ExtractedValues],
    label: &str,
) -> Result<LongTable, TidyError> {
    if message_ids.len() != values_per_message.len() {
        return Err(TidyError::LengthMismatch {
            expected: message_ids.len(),
            actual: values_per_message.len(),
        });
    }

    let mut seen = HashSet::with_capacity(message_ids.len());
    let duplicates: IndexSet<String> = message_ids
        .iter()
        .filter(|&id| !seen.insert(id.as_str()))
        .cloned()
        .collect();
    if !duplicates.is_empty() {
        return Err(TidyError::DuplicateIdentity {
            duplicates: duplicates.into_iter().collect(),
        });
    }

    let width = values_per_message.iter().map(Vec::len).max().unwrap_or(0);
    let mut rows = Vec::with_capacity(width * message_ids.len());

    for occurrence in 0..width {
        for (message_id, values) in message_ids.iter().zip(values_per_message) {
            rows.push(LongRow {
                message_id: message_id.clone(),
                occurrence,
                value: values.get(occurrence).cloned().flatten(),
            });
        }
    }

    tracing::debug!(
        "Reshaped {} into {} rows ({} occurrences per message)",
        label,
        rows.len(),
        width
    );

    Ok(LongTable::new(label, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn vals(values: &[Option<&str>]) -> ExtractedValues {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_reshape_single_occurrence() {
        let table = reshape(
            &ids(&["m1", "m2"]),
            &[vals(&[Some("a")]), vals(&[Some("b")])],
            "PID.5.1",
        )
        .unwrap();

        assert_eq!(table.label, "PID.5.1");
        assert_eq!(table.occurrences(), 1);
        assert_eq!(
            table.rows,
            vec![
                LongRow { message_id: "m1".into(), occurrence: 0, value: Some("a".into()) },
                LongRow { message_id: "m2".into(), occurrence: 0, value: Some("b".into()) },
            ]
        );
    }

    #[test]
    fn test_reshape_pads_to_batch_maximum() {
        let table = reshape(
            &ids(&["m1", "m2", "m3"]),
            &[
                vals(&[Some("a")]),
                vals(&[Some("b"), Some("c"), Some("d")]),
                vals(&[]),
            ],
            "AL1.3.1",
        )
        .unwrap();

        assert_eq!(table.len(), 9);
        assert_eq!(table.occurrences(), 3);

        let m1: Vec<_> = table.rows.iter().filter(|r| r.message_id == "m1").collect();
        assert_eq!(m1.len(), 3);
        assert_eq!(m1[0].value.as_deref(), Some("a"));
        assert_eq!(m1[1].value, None);
        assert_eq!(m1[2].value, None);

        let m3: Vec<_> = table.rows.iter().filter(|r| r.message_id == "m3").collect();
        assert!(m3.iter().all(|r| r.value.is_none()));
    }

    #[test]
    fn test_reshape_is_occurrence_major() {
        let table = reshape(
            &ids(&["m1", "m2"]),
            &[vals(&[Some("a"), Some("b")]), vals(&[Some("c"), Some("d")])],
            "AL1.2",
        )
        .unwrap();

        let keys: Vec<_> = table.rows.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec![("m1", 0), ("m2", 0), ("m1", 1), ("m2", 1)]);
    }

    #[test]
    fn test_reshape_keeps_missing_values() {
        let table = reshape(&ids(&["m1"]), &[vals(&[None, Some("x")])], "AL1.5").unwrap();

        assert_eq!(table.rows[0].value, None);
        assert_eq!(table.rows[1].value.as_deref(), Some("x"));
    }

    #[test]
    fn test_reshape_no_occurrences_is_empty() {
        let table = reshape(&ids(&["m1", "m2"]), &[vals(&[]), vals(&[])], "DG1.3").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.occurrences(), 0);
    }

    #[test]
    fn test_reshape_rejects_repeated_message_ids() {
        let err = reshape(
            &ids(&["m", "m"]),
            &[vals(&[Some("L1")]), vals(&[Some("L2")])],
            "AL1.3",
        )
        .unwrap_err();

        assert_eq!(
            err,
            TidyError::DuplicateIdentity {
                duplicates: vec!["m".to_string()]
            }
        );
    }

    #[test]
    fn test_reshape_length_mismatch() {
        let err = reshape(&ids(&["m1", "m2"]), &[vals(&[Some("a")])], "PID.3").unwrap_err();
        assert_eq!(err, TidyError::LengthMismatch { expected: 2, actual: 1 });
    }
}
