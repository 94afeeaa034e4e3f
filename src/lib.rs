//! # tidyhl7: Tidy Tables from HL7v2-style Messages
//!
//! tidyhl7 extracts location-addressed values from pipe/caret-delimited
//! clinical messages and reshapes them into long-format rows keyed by
//! message identity and segment occurrence.
//!
//! ## Features
//!
//! - **Location parsing**: `<segment>.<field>` or `<segment>.<field>.<component>`
//! - **Tolerant extraction**: missing fields and components become `None`, repeated
//!   segments yield one value per occurrence
//! - **Message identity**: unique per-message keys concatenated from identity locations
//! - **Tidy reshaping**: long rows padded to the batch's maximum occurrence count
//! - **Inner joins**: one column per data location, keyed by `(message_id, occurrence)`
//!
//! ## Example
//!
//! ```
//! use tidyhl7::tidy_messages;
//!
//! let msgs = [
//!     "MSH|^~\\&|\nPID|1||68188^^^FAC1\nAL1|1|DA|1545^MORPHINE^99HIC\nAL1|2|DA|1550^CODEINE^99HIC\n",
//!     "MSH|^~\\&|\nPID|1||588229^^^FAC2\nAL1|1|DRUG|00000741^OXYCODONE\n",
//! ];
//!
//! let table = tidy_messages(&["PID.3.4", "PID.3.1"], &["AL1.2", "AL1.3.2"], &msgs).unwrap();
//! assert_eq!(table.columns, vec!["AL1.2", "AL1.3.2"]);
//! assert_eq!(table.len(), 4);
//! ```
//!
//! ## Example: YAML configuration
//!
//! ```yaml
//! id_locations: [PID.3.4, PID.3.1, PID.18.1]
//! data_locations: [DG1.3.1, DG1.3.2, DG1.6, DG1.15]
//! single_segment: true
//! ```

pub mod error;
pub mod location;
pub mod extraction;
pub mod message_id;
pub mod tidy;
pub mod join;

// Orchestration and I/O around the core
pub mod config;
pub mod pipeline;
pub mod batch;
pub mod serialization;

// Re-export key types
pub use error::TidyError;
pub use location::{Location, HEADER_SEGMENT};
pub use extraction::{extract_all, Delimiters, ExtractedValues, SegmentExtractor};
pub use message_id::{resolve_message_ids, ID_SEPARATOR};
pub use tidy::{reshape, LongRow, LongTable};
pub use join::{join_tables, JoinedRow, JoinedTable};
pub use config::PipelineConfig;
pub use pipeline::{tidy_messages, Pipeline};
pub use batch::{read_messages, split_messages};
pub use serialization::{write_table, JsonArrayWriter, NdjsonWriter, OutputFormat};
