//! In-process EBU R128 measurement
//!
//! Alternative to the ffmpeg measurer for machines without ffmpeg. Uses the
//! ebur128 crate on the decoded buffer.

use ebur128::{EbuR128, Mode};
use levelr_core::{AudioAsset, AudioDecoder, LevelError, LoudnessMeasurer, Result};
use std::path::Path;
use std::sync::Arc;

/// Integrated loudness (LUFS) of a decoded buffer
///
/// # Errors
/// Returns `LevelError::Measurement` for unsupported layouts, empty buffers,
/// and silence.
pub fn integrated_loudness(asset: &AudioAsset) -> Result<f64> {
    if !(8000..=384_000).contains(&asset.sample_rate) {
        return Err(LevelError::measurement(format!(
            "invalid sample rate: {} Hz",
            asset.sample_rate
        )));
    }
    if !(1..=8).contains(&asset.channels) {
        return Err(LevelError::measurement(format!(
            "invalid channel count: {}",
            asset.channels
        )));
    }
    if asset.is_empty() {
        return Err(LevelError::measurement("no audio samples provided"));
    }

    let mut meter = EbuR128::new(u32::from(asset.channels), asset.sample_rate, Mode::I)
        .map_err(|e| LevelError::measurement(format!("{e:?}")))?;
    meter
        .add_frames_f32(&asset.samples)
        .map_err(|e| LevelError::measurement(format!("{e:?}")))?;
    let loudness = meter
        .loudness_global()
        .map_err(|e| LevelError::measurement(format!("{e:?}")))?;

    // ebur128 reports -inf for silence
    if !loudness.is_finite() {
        return Err(LevelError::measurement("audio is silent"));
    }
    Ok(loudness)
}

/// `LoudnessMeasurer` that decodes the file and runs EBU R128 in-process
pub struct EbuR128Measurer {
    decoder: Arc<dyn AudioDecoder>,
}

impl EbuR128Measurer {
    pub fn new(decoder: Arc<dyn AudioDecoder>) -> Self {
        Self { decoder }
    }
}

impl LoudnessMeasurer for EbuR128Measurer {
    fn measure(&self, path: &Path) -> Result<f64> {
        let asset = self
            .decoder
            .decode(path)
            .map_err(|e| LevelError::measurement(e.to_string()))?;
        let loudness = integrated_loudness(&asset)?;
        tracing::debug!("EBU R128: {:.2} LUFS for {}", loudness, path.display());
        Ok(loudness)
    }
}
