//! Writers for joined tables.
//!
//! Rows are written as ordered JSON objects (see [`JoinedTable::records`]),
//! either one per line (NDJSON) or as a single JSON array.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TidyError;
use crate::join::JoinedTable;

/// Output layout for joined rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Ndjson,
    JsonArray,
}

impl FromStr for OutputFormat {
    type Err = TidyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ndjson" | "jsonl" => Ok(OutputFormat::Ndjson),
            "json" => Ok(OutputFormat::JsonArray),
            other => Err(TidyError::Config(format!(
                "Unsupported output format: '{}'. Supported formats: ndjson, json",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Ndjson => write!(f, "ndjson"),
            OutputFormat::JsonArray => write!(f, "json"),
        }
    }
}

/// NDJSON (Newline Delimited JSON) writer
pub struct NdjsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> NdjsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), TidyError> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), TidyError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// JSON array writer; the closing bracket is written by [`JsonArrayWriter::finish`]
pub struct JsonArrayWriter<W: Write> {
    writer: W,
    first: bool,
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(mut writer: W) -> Result<Self, TidyError> {
        write!(writer, "[")?;
        Ok(Self {
            writer,
            first: true,
        })
    }

    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<(), TidyError> {
        if !self.first {
            write!(self.writer, ",")?;
        }
        self.first = false;

        let json = serde_json::to_string(record)?;
        write!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), TidyError> {
        writeln!(self.writer, "]")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Write every row of `table` to `writer` in the given format
pub fn write_table<W: Write>(
    table: &JoinedTable,
    format: OutputFormat,
    writer: W,
) -> Result<(), TidyError> {
    let records = table.records();

    match format {
        OutputFormat::Ndjson => {
            let mut out = NdjsonWriter::new(writer);
            for record in &records {
                out.write(record)?;
            }
            out.flush()
        }
        OutputFormat::JsonArray => {
            let mut out = JsonArrayWriter::new(writer)?;
            for record in &records {
                out.write(record)?;
            }
            out.finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::JoinedRow;

    fn table() -> JoinedTable {
        JoinedTable {
            columns: vec!["AL1.3.2".to_string(), "AL1.2".to_string()],
            rows: vec![
                JoinedRow {
                    message_id: "m1".to_string(),
                    occurrence: 0,
                    values: vec![Some("MORPHINE".to_string()), Some("DA".to_string())],
                },
                JoinedRow {
                    message_id: "m1".to_string(),
                    occurrence: 1,
                    values: vec![Some("CODEINE".to_string()), None],
                },
            ],
        }
    }

    #[test]
    fn test_write_ndjson() {
        let mut buf = Vec::new();
        write_table(&table(), OutputFormat::Ndjson, &mut buf).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"message_id":"m1","occurrence":0,"AL1.3.2":"MORPHINE","AL1.2":"DA"}"#
        );
        assert_eq!(
            lines[1],
            r#"{"message_id":"m1","occurrence":1,"AL1.3.2":"CODEINE","AL1.2":null}"#
        );
    }

    #[test]
    fn test_write_json_array() {
        let mut buf = Vec::new();
        write_table(&table(), OutputFormat::JsonArray, &mut buf).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["AL1.2"], serde_json::Value::Null);
    }

    #[test]
    fn test_write_empty_json_array() {
        let empty = JoinedTable {
            columns: vec!["PID.3".to_string()],
            rows: vec![],
        };
        let mut buf = Vec::new();
        write_table(&empty, OutputFormat::JsonArray, &mut buf).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "[]\n");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("ndjson".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::JsonArray);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
