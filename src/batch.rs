//! Splitting batch files into individual messages.
//!
//! A batch is any text holding one or more messages back to back; each
//! message starts at a line beginning with the header segment. Segment lines
//! may end in `\r`, `\r\n` or `\n` and are normalized to `\n`.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::TidyError;
use crate::location::HEADER_SEGMENT;

fn header_start() -> &'static Regex {
    static HEADER_START: OnceLock<Regex> = OnceLock::new();
    HEADER_START.get_or_init(|| {
        Regex::new(&format!(r"(?m)^{}[^A-Za-z0-9\s]", regex::escape(HEADER_SEGMENT)))
            .expect("header pattern is a valid regex")
    })
}

/// Split batch text into messages, one per header line
///
/// Text before the first header line is discarded. Each returned message
/// ends with a newline.
pub fn split_messages(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let starts: Vec<usize> = header_start()
        .find_iter(&normalized)
        .map(|m| m.start())
        .collect();

    let skipped = starts.first().copied().unwrap_or(normalized.len());
    if !normalized[..skipped].trim().is_empty() {
        tracing::warn!("Discarding {} bytes before the first header segment", skipped);
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(normalized.len());
            let body = normalized[start..end].trim_end_matches('\n');
            format!("{}\n", body)
        })
        .collect()
}

/// Read a batch file and split it into messages
pub fn read_messages<P: AsRef<Path>>(path: P) -> Result<Vec<String>, TidyError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| TidyError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

    let messages = split_messages(&text);
    tracing::info!("Read {} messages from {}", messages.len(), path.display());
    Ok(messages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_messages() {
        let text = "MSH|^~\\&|A\nPID|1||1\n\nMSH|^~\\&|B\nPID|1||2\n";
        let msgs = split_messages(text);

        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0], "MSH|^~\\&|A\nPID|1||1\n");
        assert_eq!(msgs[1], "MSH|^~\\&|B\nPID|1||2\n");
    }

    #[test]
    fn test_split_normalizes_carriage_returns() {
        let text = "MSH|^~\\&|A\rPID|1||1\r\nMSH|^~\\&|B\rPID|1||2";
        let msgs = split_messages(text);

        assert_eq!(msgs, vec!["MSH|^~\\&|A\nPID|1||1\n", "MSH|^~\\&|B\nPID|1||2\n"]);
    }

    #[test]
    fn test_split_ignores_leading_noise_and_inline_header_text() {
        let text = "garbage\nMSH|^~\\&|A\nNTE|1|copy of MSH|x\n";
        let msgs = split_messages(text);

        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].starts_with("MSH"));
        assert!(msgs[0].contains("NTE|1|copy of MSH|x"));
    }

    #[test]
    fn test_split_requires_separator_after_header_name() {
        let text = "MSH|^~\\&|A\nMSHX|1|not a header\nMSH2|x\nPID|1||1\n";
        let msgs = split_messages(text);

        assert_eq!(msgs.len(), 1);
        assert!(msgs[0].contains("MSHX|1|not a header"));
        assert!(msgs[0].contains("MSH2|x"));
    }

    #[test]
    fn test_split_empty() {
        assert!(split_messages("").is_empty());
        assert!(split_messages("\n\n").is_empty());
    }

    #[test]
    fn test_read_messages_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.hl7");
        fs::write(&path, "MSH|^~\\&|A\nPID|1||1\nMSH|^~\\&|B\nPID|1||2\n").unwrap();

        let msgs = read_messages(&path).unwrap();
        assert_eq!(msgs.len(), 2);
    }

    #[test]
    fn test_read_messages_missing_file() {
        let result = read_messages("/nonexistent/batch.hl7");
        assert!(matches!(result, Err(TidyError::Io(_))));
    }
}
