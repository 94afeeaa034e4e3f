//! Pipeline configuration loader.
//!
//! Loads identity and data locations from YAML and validates them before any
//! message is touched.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::TidyError;
use crate::location::Location;

/// Locations to resolve message identity from and to extract as data columns.
///
/// ```yaml
/// id_locations: [MSH.7, PID.3.1]
/// data_locations: [DG1.3.1, DG1.3.2, DG1.6]
/// single_segment: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Locations concatenated into the message identifier
    pub id_locations: Vec<String>,

    /// Locations extracted into one output column each
    pub data_locations: Vec<String>,

    /// Require every data location to address the same segment
    #[serde(default)]
    pub single_segment: bool,
}

impl PipelineConfig {
    pub fn new(id_locations: Vec<String>, data_locations: Vec<String>) -> Self {
        Self {
            id_locations,
            data_locations,
            single_segment: false,
        }
    }

    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read or parsed, or any error
    /// raised by [`PipelineConfig::validate`].
    ///
    /// # Example
    /// ```ignore
    /// use tidyhl7::PipelineConfig;
    ///
    /// let config = PipelineConfig::load_from_file("pipeline.yaml")?;
    /// println!("Data locations: {:?}", config.data_locations);
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TidyError> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path).map_err(|e| {
            TidyError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        Self::from_yaml_str(&contents)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml_str(contents: &str) -> Result<Self, TidyError> {
        let config: Self = serde_yaml::from_str(contents)
            .map_err(|e| TidyError::Config(format!("Failed to parse YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can drive a pipeline run.
    ///
    /// Both location lists must be non-empty, every location must parse,
    /// data locations must be distinct (they name output columns) and, when
    /// `single_segment` is set, address the same segment.
    pub fn validate(&self) -> Result<(), TidyError> {
        if self.id_locations.is_empty() || self.data_locations.is_empty() {
            return Err(TidyError::NoLocations);
        }

        for text in self.id_locations.iter().chain(&self.data_locations) {
            Location::parse(text)?;
        }

        let mut seen = HashSet::new();
        for text in &self.data_locations {
            if !seen.insert(text.as_str()) {
                return Err(TidyError::Config(format!(
                    "Data location '{}' is listed more than once",
                    text
                )));
            }
        }

        if self.single_segment {
            let segments = self.data_segments()?;
            if segments.len() > 1 {
                return Err(TidyError::MixedSegments {
                    segments: segments.into_iter().collect(),
                });
            }
        }

        Ok(())
    }

    /// Distinct segments addressed by the data locations, in first-seen order
    pub fn data_segments(&self) -> Result<IndexSet<String>, TidyError> {
        self.data_locations
            .iter()
            .map(|text| Location::parse(text).map(|loc| loc.segment))
            .collect()
    }
}
