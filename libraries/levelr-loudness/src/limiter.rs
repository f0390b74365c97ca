//! Peak ceiling enforcement
//!
//! A post-hoc corrective pass, not a lookahead limiter: when the sample peak
//! sits above the ceiling the whole buffer is attenuated uniformly, so the
//! loudness ends up slightly below target for peaky material.

use levelr_core::AudioAsset;

/// Corrective gain that brings `sample_peak_db` down to `ceiling_db`
///
/// Returns `ceiling_db - sample_peak_db` when the peak exceeds the ceiling,
/// otherwise `0.0`.
pub fn clamp_gain(sample_peak_db: f64, ceiling_db: f64) -> f64 {
    if sample_peak_db > ceiling_db {
        ceiling_db - sample_peak_db
    } else {
        0.0
    }
}

/// Uniform peak limiter for decoded buffers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakLimiter {
    ceiling_db: f64,
}

impl PeakLimiter {
    /// Create a limiter with the given ceiling (dB relative to full scale)
    pub fn new(ceiling_db: f64) -> Self {
        Self { ceiling_db }
    }

    /// Gain the limiter would apply to `asset`
    pub fn corrective_gain(&self, asset: &AudioAsset) -> f64 {
        clamp_gain(asset.peak_dbfs(), self.ceiling_db)
    }

    /// Attenuate `asset` if its peak exceeds the ceiling
    ///
    /// Returns the gain applied in dB (`0.0` when nothing changed).
    pub fn limit(&self, asset: &mut AudioAsset) -> f64 {
        let gain_db = self.corrective_gain(asset);
        if gain_db != 0.0 {
            tracing::debug!(
                "Peak above {:.2} dB ceiling, applying {:.2} dB",
                self.ceiling_db,
                gain_db
            );
            asset.apply_gain(gain_db);
        }
        gain_db
    }
}
