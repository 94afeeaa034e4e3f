//! Inner joins of long tables on `(message_id, occurrence)`.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::TidyError;
use crate::tidy::LongTable;

/// One joined row: the key plus one value per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub message_id: String,
    pub occurrence: usize,
    pub values: Vec<Option<String>>,
}

/// Rows keyed by message and occurrence, one value column per location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinedTable {
    pub columns: Vec<String>,
    pub rows: Vec<JoinedRow>,
}

impl From<LongTable> for JoinedTable {
    fn from(table: LongTable) -> Self {
        Self {
            columns: vec![table.label],
            rows: table
                .rows
                .into_iter()
                .map(|row| JoinedRow {
                    message_id: row.message_id,
                    occurrence: row.occurrence,
                    values: vec![row.value],
                })
                .collect(),
        }
    }
}

impl JoinedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by its location label
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// All values of one column, in row order
    pub fn column(&self, label: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(label)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.values[idx].as_deref())
                .collect(),
        )
    }

    /// Inner join with another long table
    ///
    /// Row order follows `self`; keys absent from `other` are dropped.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateColumn` when `other.label` is already a column.
    pub fn inner_join(mut self, other: &LongTable) -> Result<Self, TidyError> {
        if self.column_index(&other.label).is_some() {
            return Err(TidyError::DuplicateColumn {
                label: other.label.clone(),
            });
        }

        let lookup: HashMap<(&str, usize), &Option<String>> = other
            .rows
            .iter()
            .map(|row| (row.key(), &row.value))
            .collect();

        self.rows.retain_mut(|row| {
            match lookup.get(&(row.message_id.as_str(), row.occurrence)) {
                Some(value) => {
                    row.values.push((*value).clone());
                    true
                }
                None => false,
            }
        });
        self.columns.push(other.label.clone());
        Ok(self)
    }

    /// Rows as ordered JSON objects: `message_id`, `occurrence`, then one key
    /// per location with `null` for missing values
    pub fn records(&self) -> Vec<IndexMap<String, JsonValue>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = IndexMap::with_capacity(self.columns.len() + 2);
                record.insert("message_id".to_string(), JsonValue::from(row.message_id.clone()));
                record.insert("occurrence".to_string(), JsonValue::from(row.occurrence));
                for (column, value) in self.columns.iter().zip(&row.values) {
                    let value = value.clone().map_or(JsonValue::Null, JsonValue::String);
                    record.insert(column.clone(), value);
                }
                record
            })
            .collect()
    }
}

/// Join long tables left to right on `(message_id, occurrence)`
///
/// A single table is returned as-is. Only keys present in every table survive.
///
/// # Errors
///
/// Returns `NoLocations` when `tables` is empty and `DuplicateColumn` when
/// two tables share a label.
pub fn join_tables(tables: Vec<LongTable>) -> Result<JoinedTable, TidyError> {
    let mut tables = tables.into_iter();
    let first = tables.next().ok_or(TidyError::NoLocations)?;

    let joined = tables.try_fold(JoinedTable::from(first), |acc, table| acc.inner_join(&table))?;

    tracing::debug!(
        "Joined {} columns into {} rows",
        joined.columns.len(),
        joined.rows.len()
    );
    Ok(joined)
}
