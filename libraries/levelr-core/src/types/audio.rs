/// Audio-related types
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Convert a gain in dB to a linear factor
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude to dB (`-inf` for zero)
pub fn linear_to_db(linear: f64) -> f64 {
    if linear > 0.0 {
        20.0 * linear.log10()
    } else {
        f64::NEG_INFINITY
    }
}

/// Decoded audio held in memory while one file is processed
///
/// Samples are stored as f32 in the range [-1.0, 1.0] (full scale),
/// interleaved: [L, R, L, R, ...] for stereo. Values may exceed full scale
/// after gain is applied; encoders clamp on write.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    /// Audio samples (f32, interleaved)
    pub samples: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,

    /// Bit depth of the source, reused when writing WAV
    pub bits_per_sample: u16,
}

impl AudioAsset {
    /// Create a new audio asset
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16, bits_per_sample: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
            bits_per_sample,
        }
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Check if the asset holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// RMS level in dBFS across all channels
    ///
    /// This is the fast loudness proxy used in category mode.
    pub fn dbfs(&self) -> f64 {
        if self.samples.is_empty() {
            return f64::NEG_INFINITY;
        }
        let sum_squares: f64 = self
            .samples
            .iter()
            .map(|&s| f64::from(s) * f64::from(s))
            .sum();
        linear_to_db((sum_squares / self.samples.len() as f64).sqrt())
    }

    /// Maximum absolute sample value in dB relative to full scale
    pub fn peak_dbfs(&self) -> f64 {
        let peak = self
            .samples
            .iter()
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max);
        linear_to_db(f64::from(peak))
    }

    /// Scale every sample by `gain_db`
    pub fn apply_gain(&mut self, gain_db: f64) {
        if gain_db == 0.0 {
            return;
        }
        let factor = db_to_linear(gain_db);
        for sample in &mut self.samples {
            *sample = (f64::from(*sample) * factor) as f32;
        }
    }
}

/// Output container selected for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Wav,
    Flac,
    Mp3,
}

impl OutputFormat {
    /// File extension (without dot)
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wav" => Ok(Self::Wav),
            "flac" => Ok(Self::Flac),
            "mp3" => Ok(Self::Mp3),
            other => Err(format!("unsupported output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(samples: Vec<f32>) -> AudioAsset {
        AudioAsset::new(samples, 44_100, 2, 16)
    }

    #[test]
    fn frames_and_duration() {
        let buffer = asset(vec![0.0; 88_200]);
        assert_eq!(buffer.frames(), 44_100);
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn peak_of_half_scale_is_minus_six() {
        let buffer = asset(vec![0.1, -0.5, 0.25, 0.0]);
        assert!((buffer.peak_dbfs() - (-6.0206)).abs() < 0.001);
    }

    #[test]
    fn dbfs_of_constant_signal_equals_peak() {
        let buffer = asset(vec![0.5, -0.5, 0.5, -0.5]);
        assert!((buffer.dbfs() - buffer.peak_dbfs()).abs() < 1e-9);
    }

    #[test]
    fn silence_is_negative_infinity() {
        let buffer = asset(vec![0.0; 16]);
        assert_eq!(buffer.dbfs(), f64::NEG_INFINITY);
        assert_eq!(buffer.peak_dbfs(), f64::NEG_INFINITY);
        assert_eq!(asset(Vec::new()).dbfs(), f64::NEG_INFINITY);
    }

    #[test]
    fn apply_gain_shifts_levels() {
        let mut buffer = asset(vec![0.25, -0.25, 0.1, -0.1]);
        let before_peak = buffer.peak_dbfs();
        let before_rms = buffer.dbfs();
        buffer.apply_gain(6.0);
        assert!((buffer.peak_dbfs() - (before_peak + 6.0)).abs() < 1e-4);
        assert!((buffer.dbfs() - (before_rms + 6.0)).abs() < 1e-4);
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("WAV".parse::<OutputFormat>(), Ok(OutputFormat::Wav));
        assert_eq!("flac".parse::<OutputFormat>(), Ok(OutputFormat::Flac));
        assert_eq!("Mp3".parse::<OutputFormat>(), Ok(OutputFormat::Mp3));
        assert!("ogg".parse::<OutputFormat>().is_err());
    }
}
