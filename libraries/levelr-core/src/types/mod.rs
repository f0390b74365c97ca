//! Domain types for Levelr

pub mod audio;
pub mod batch;

pub use audio::{db_to_linear, linear_to_db, AudioAsset, OutputFormat};
pub use batch::{
    BatchEvent, BatchJobs, BatchRequest, BatchSummary, CategoryJobSpec, ProcessingOutcome,
    ProgressState, DEFAULT_PREMASTER_DB,
};
