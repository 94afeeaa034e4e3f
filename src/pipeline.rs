//! End-to-end tidy run: identity resolution, extraction, reshaping and join.

use crate::config::PipelineConfig;
use crate::error::TidyError;
use crate::extraction::extract_all;
use crate::join::{join_tables, JoinedTable};
use crate::message_id::resolve_message_ids;
use crate::tidy::{reshape, LongTable};

/// Runs a validated [`PipelineConfig`] over batches of messages
///
/// # Example Flow
/// 1. Resolve one identifier per message from the identity locations
/// 2. Extract every data location and reshape it into long rows
/// 3. Inner-join the long tables on `(message_id, occurrence)`
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, validating the configuration up front
    pub fn new(config: PipelineConfig) -> Result<Self, TidyError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Produce the joined table for a batch of raw messages
    ///
    /// # Example
    /// ```
    /// use tidyhl7::{Pipeline, PipelineConfig};
    ///
    /// let msgs = [
    ///     "MSH|^~\\&|\nPID|1||1\nDG1|1||I10^HTN\nDG1|2||E11^DIABETES\n",
    ///     "MSH|^~\\&|\nPID|1||2\nDG1|1||J45^ASTHMA\n",
    /// ];
    /// let config = PipelineConfig::new(
    ///     vec!["PID.3".to_string()],
    ///     vec!["DG1.3.1".to_string(), "DG1.3.2".to_string()],
    /// );
    /// let table = Pipeline::new(config).unwrap().run(&msgs).unwrap();
    /// assert_eq!(table.columns, vec!["DG1.3.1", "DG1.3.2"]);
    /// assert_eq!(table.len(), 4);
    /// ```
    pub fn run<S: AsRef<str>>(&self, messages: &[S]) -> Result<JoinedTable, TidyError> {
        let message_ids = resolve_message_ids(&self.config.id_locations, messages)?;

        let tables = self
            .config
            .data_locations
            .iter()
            .map(|location| {
                let values = extract_all(location, messages)?;
                reshape(&message_ids, &values, location)
            })
            .collect::<Result<Vec<LongTable>, TidyError>>()?;

        let joined = join_tables(tables)?;

        tracing::info!(
            "Tidied {} messages into {} rows across {} locations",
            messages.len(),
            joined.len(),
            joined.columns.len()
        );

        Ok(joined)
    }
}

/// One-shot helper: build a pipeline from location lists and run it
pub fn tidy_messages<S: AsRef<str>>(
    id_locations: &[&str],
    data_locations: &[&str],
    messages: &[S],
) -> Result<JoinedTable, TidyError> {
    let config = PipelineConfig::new(
        id_locations.iter().map(|s| s.to_string()).collect(),
        data_locations.iter().map(|s| s.to_string()).collect(),
    );
    Pipeline::new(config)?.run(messages)
}
