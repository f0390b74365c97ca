//! Levelr Core
//!
//! Platform-agnostic core types, traits, and error handling for Levelr,
//! a batch loudness normalizer.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `AudioAsset`, `BatchRequest`, `ProcessingOutcome`, `ProgressState`
//! - **Presets**: `LoudnessPreset`, `PresetTable`, `PresetResolver`
//! - **Core Traits**: `AudioDecoder`, `AudioEncoder`, `LoudnessMeasurer`, `ExternalNormalizer`
//! - **Error Handling**: Unified `LevelError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use levelr_core::{LoudnessPreset, PresetResolver};
//!
//! let resolver = PresetResolver::default();
//!
//! // A known platform wins over the custom slider values
//! let preset = resolver.resolve(Some("Spotify"), -20.0, -1.5);
//! assert_eq!(preset, LoudnessPreset::new(-14.0, -1.0));
//!
//! // No platform: the custom values are used as given
//! let preset = resolver.resolve(None, -20.0, -1.5);
//! assert_eq!(preset, LoudnessPreset::new(-20.0, -1.5));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod presets;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LevelError, Result};
pub use presets::{LoudnessPreset, PresetResolver, PresetTable};
pub use traits::{AudioDecoder, AudioEncoder, ExternalNormalizer, LoudnessMeasurer};
pub use types::{
    db_to_linear, linear_to_db, AudioAsset, BatchEvent, BatchJobs, BatchRequest, BatchSummary,
    CategoryJobSpec, OutputFormat, ProcessingOutcome, ProgressState, DEFAULT_PREMASTER_DB,
};
