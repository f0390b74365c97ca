//! Per-file normalization pipeline

use levelr_core::{
    AudioAsset, AudioDecoder, AudioEncoder, ExternalNormalizer, LevelError, LoudnessMeasurer,
    LoudnessPreset, OutputFormat, ProcessingOutcome, Result,
};
use levelr_loudness::{gain_to_target, PeakLimiter};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collaborators used by the pipeline
///
/// Production wiring uses Symphonia/hound/ffmpeg; tests substitute fakes.
#[derive(Clone)]
pub struct Services {
    pub decoder: Arc<dyn AudioDecoder>,
    pub encoder: Arc<dyn AudioEncoder>,
    pub measurer: Arc<dyn LoudnessMeasurer>,
    pub external: Arc<dyn ExternalNormalizer>,
}

/// How a file is brought to its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizeMode {
    /// Single pass on the RMS level, for short samples
    Category,
    /// External measurement plus a second EBU pass, for full tracks
    Track {
        /// Attenuation in dB applied after peak limiting
        premaster: Option<f64>,
    },
}

/// Working file removed when dropped
struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {}", self.path.display(), e),
        }
    }
}

/// `<output dir>/<input stem>_temp.wav`
pub fn temp_path_for(input: &Path, output: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "track".to_string());
    output
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{stem}_temp.wav"))
}

/// Decodes, corrects and re-encodes one file
///
/// The source file is only ever read.
#[derive(Clone)]
pub struct SampleNormalizer {
    services: Services,
}

impl SampleNormalizer {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Normalize `input` into `output`
    ///
    /// Never fails: any error is reported as `ProcessingOutcome::Failure`.
    pub fn normalize(
        &self,
        input: &Path,
        output: &Path,
        preset: &LoudnessPreset,
        format: OutputFormat,
        mode: NormalizeMode,
    ) -> ProcessingOutcome {
        match self.process(input, output, preset, format, mode) {
            Ok(()) => ProcessingOutcome::Success {
                input_path: input.to_path_buf(),
                output_path: output.to_path_buf(),
            },
            Err(e) => {
                tracing::warn!("Failed to normalize {}: {}", input.display(), e);
                ProcessingOutcome::Failure {
                    input_path: input.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn process(
        &self,
        input: &Path,
        output: &Path,
        preset: &LoudnessPreset,
        format: OutputFormat,
        mode: NormalizeMode,
    ) -> Result<()> {
        let mut asset = self.services.decoder.decode(input)?;
        tracing::debug!(
            "{}: {} Hz, {} ch, {:.2}s",
            input.display(),
            asset.sample_rate,
            asset.channels,
            asset.duration_secs()
        );

        let limiter = PeakLimiter::new(preset.peak_ceiling);

        match mode {
            NormalizeMode::Category => {
                let level = asset.dbfs();
                if !level.is_finite() {
                    return Err(LevelError::measurement(format!(
                        "{} is silent",
                        input.display()
                    )));
                }
                let gain = gain_to_target(level, preset.target_loudness);
                tracing::debug!("{:.2} dBFS -> gain {:+.2} dB", level, gain);
                asset.apply_gain(gain);
                limiter.limit(&mut asset);
            }
            NormalizeMode::Track { premaster } => {
                asset = self.two_pass(input, output, preset, asset)?;
                limiter.limit(&mut asset);
                if let Some(attenuation) = premaster {
                    tracing::debug!("Premaster: -{:.1} dB", attenuation);
                    asset.apply_gain(-attenuation);
                }
            }
        }

        self.services.encoder.encode(&asset, output, format)?;
        tracing::debug!(
            "Wrote {} (peak {:.2} dBFS)",
            output.display(),
            asset.peak_dbfs()
        );
        Ok(())
    }

    /// Measured gain, then the external EBU pass on a working WAV
    fn two_pass(
        &self,
        input: &Path,
        output: &Path,
        preset: &LoudnessPreset,
        mut asset: AudioAsset,
    ) -> Result<AudioAsset> {
        let measured = self.services.measurer.measure(input)?;
        let gain = gain_to_target(measured, preset.target_loudness);
        tracing::debug!("{:.2} LUFS -> gain {:+.2} dB", measured, gain);
        asset.apply_gain(gain);

        let temp = TempArtifact::new(temp_path_for(input, output));
        self.services
            .encoder
            .encode(&asset, temp.path(), OutputFormat::Wav)?;
        self.services.external.normalize(temp.path(), preset)?;
        self.services.decoder.decode(temp.path())
    }
}
