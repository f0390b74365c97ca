/// Batch request, outcome, and progress types
use crate::error::{LevelError, Result};
use crate::presets::LoudnessPreset;
use crate::types::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default premaster headroom cut in dB
pub const DEFAULT_PREMASTER_DB: f64 = 6.0;

/// One instrument category taking part in a category batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryJobSpec {
    /// Category name, also the output subfolder name
    pub category: String,
    /// Folder holding the category's samples (None excludes the category)
    pub source_dir: Option<PathBuf>,
    /// Loudness settings for every file in the category
    pub preset: LoudnessPreset,
}

impl CategoryJobSpec {
    pub fn new(
        category: impl Into<String>,
        source_dir: Option<PathBuf>,
        preset: LoudnessPreset,
    ) -> Self {
        Self {
            category: category.into(),
            source_dir,
            preset,
        }
    }

    /// Source folder if it is set and is an existing directory
    pub fn usable_source(&self) -> Option<&Path> {
        self.source_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty() && dir.is_dir())
    }
}

/// Work items of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchJobs {
    /// Category mode: one entry per enabled category
    Categories(Vec<CategoryJobSpec>),
    /// Track mode: every recognized file in one folder, one preset
    Tracks {
        source_dir: PathBuf,
        preset: LoudnessPreset,
    },
}

/// Everything a single batch run consumes
///
/// Built once per start action and not mutated during the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub jobs: BatchJobs,
    pub output_dir: PathBuf,
    pub output_format: OutputFormat,
    /// Extra attenuation applied after peak limiting (track mode only)
    pub premaster_attenuation: Option<f64>,
}

impl BatchRequest {
    /// Check that the run can start
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(LevelError::configuration("please choose an output folder"));
        }

        match &self.jobs {
            BatchJobs::Categories(jobs) if jobs.is_empty() => Err(LevelError::configuration(
                "select at least one category with a folder",
            )),
            BatchJobs::Tracks { source_dir, .. } if source_dir.as_os_str().is_empty() => Err(
                LevelError::configuration("please choose a source folder"),
            ),
            _ => Ok(()),
        }
    }
}

/// Result of processing one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingOutcome {
    Success {
        input_path: PathBuf,
        output_path: PathBuf,
    },
    Failure {
        input_path: PathBuf,
        reason: String,
    },
}

impl ProcessingOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn input_path(&self) -> &Path {
        match self {
            Self::Success { input_path, .. } | Self::Failure { input_path, .. } => input_path,
        }
    }
}

/// Progress of a running batch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressState {
    /// Files finished so far, successful or not
    pub completed_count: usize,
    /// Files in the run
    pub total_count: usize,
    /// File currently (or last) processed
    pub current_file_name: Option<String>,
}

impl ProgressState {
    pub fn new(total_count: usize) -> Self {
        Self {
            completed_count: 0,
            total_count,
            current_file_name: None,
        }
    }

    /// Mark the next file as finished, never passing the total
    pub fn advance(&mut self) {
        self.completed_count = (self.completed_count + 1).min(self.total_count);
    }
}

/// Structured updates emitted by a batch, in processing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    FileStarted(ProgressState),
    FileFinished {
        progress: ProgressState,
        outcome: ProcessingOutcome,
    },
    /// Track mode found nothing to process
    NoValidFiles {
        source_dir: PathBuf,
    },
    Finished {
        succeeded: usize,
        failed: usize,
    },
}

/// Summary of a finished batch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub outcomes: Vec<ProcessingOutcome>,
}

impl BatchSummary {
    pub fn new(outcomes: Vec<ProcessingOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn summary_text(&self) -> String {
        if self.outcomes.is_empty() {
            return "No audio files processed".to_string();
        }
        format!(
            "Processing complete: {} normalized, {} failed",
            self.succeeded(),
            self.failed()
        )
    }
}
