/// Core traits for Levelr
///
/// Every collaborator that touches a file or an external program sits behind
/// one of these traits, so the batch pipeline can be driven by fakes in tests.
use crate::error::Result;
use crate::presets::LoudnessPreset;
use crate::types::{AudioAsset, OutputFormat};
use std::path::Path;

/// Audio decoder trait
///
/// Implementers decode a whole audio file into an `AudioAsset`.
pub trait AudioDecoder: Send + Sync {
    /// Decode an audio file from the given path
    ///
    /// # Errors
    /// Returns `LevelError::Decode` if the file cannot be read or decoded
    fn decode(&self, path: &Path) -> Result<AudioAsset>;
}

/// Audio encoder trait
pub trait AudioEncoder: Send + Sync {
    /// Write `asset` to `path` in the given format, replacing any existing file
    ///
    /// # Errors
    /// Returns `LevelError::Encode` if the output cannot be produced
    fn encode(&self, asset: &AudioAsset, path: &Path, format: OutputFormat) -> Result<()>;
}

/// Integrated-loudness measurement of a file on disk
pub trait LoudnessMeasurer: Send + Sync {
    /// Measure the integrated loudness of `path` (LUFS)
    ///
    /// # Errors
    /// Returns `LevelError::Measurement` when the service is unavailable,
    /// fails, or produces no usable value
    fn measure(&self, path: &Path) -> Result<f64>;
}

/// Stricter second-pass normalization performed in place on a working file
pub trait ExternalNormalizer: Send + Sync {
    /// Normalize `path` in place toward `preset`
    ///
    /// # Errors
    /// Returns `LevelError::ExternalNormalization` on any abnormal exit
    fn normalize(&self, path: &Path, preset: &LoudnessPreset) -> Result<()>;
}
