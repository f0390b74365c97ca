//! External loudness services built on ffmpeg and ffmpeg-normalize
//!
//! Both are invoked as blocking child processes; callers run them from a
//! worker thread.

use crate::report::integrated_loudness_from_output;
use levelr_core::{ExternalNormalizer, LevelError, LoudnessMeasurer, LoudnessPreset, Result};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Parameters passed to the `loudnorm` filter when only measuring
///
/// These steer the filter's analysis, they are not the normalization target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisProfile {
    pub target: f64,
    pub true_peak: f64,
    pub loudness_range: f64,
}

impl Default for AnalysisProfile {
    fn default() -> Self {
        Self {
            target: -14.0,
            true_peak: -1.5,
            loudness_range: 11.0,
        }
    }
}

impl AnalysisProfile {
    /// `loudnorm` filter expression in analysis mode
    pub fn filter(&self) -> String {
        format!(
            "loudnorm=I={}:TP={}:LRA={}:print_format=json",
            self.target, self.true_peak, self.loudness_range
        )
    }
}

fn run(program: &Path, args: &[OsString]) -> io::Result<Output> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
}

fn spawn_failure(program: &Path, err: &io::Error) -> String {
    if err.kind() == io::ErrorKind::NotFound {
        format!("{} not found", program.display())
    } else {
        format!("failed to run {}: {}", program.display(), err)
    }
}

fn last_line(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Integrated loudness measured by ffmpeg's `loudnorm` filter
#[derive(Debug, Clone)]
pub struct FfmpegMeasurer {
    ffmpeg_path: PathBuf,
    profile: AnalysisProfile,
}

impl FfmpegMeasurer {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            profile: AnalysisProfile::default(),
        }
    }

    fn args(&self, input: &Path) -> Vec<OsString> {
        vec![
            "-hide_banner".into(),
            "-i".into(),
            input.as_os_str().to_owned(),
            "-af".into(),
            self.profile.filter().into(),
            "-f".into(),
            "null".into(),
            "-".into(),
        ]
    }
}

impl LoudnessMeasurer for FfmpegMeasurer {
    fn measure(&self, path: &Path) -> Result<f64> {
        let output = run(&self.ffmpeg_path, &self.args(path))
            .map_err(|e| LevelError::measurement(spawn_failure(&self.ffmpeg_path, &e)))?;

        if !output.status.success() {
            return Err(LevelError::measurement(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                last_line(&output.stderr)
            )));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let loudness = integrated_loudness_from_output(&stderr)?;
        tracing::debug!("Measured {:.2} LUFS for {}", loudness, path.display());
        Ok(loudness)
    }
}

/// Second-pass EBU normalization through `ffmpeg-normalize`, in place
#[derive(Debug, Clone)]
pub struct FfmpegNormalizer {
    program: PathBuf,
    sample_rate: u32,
    audio_codec: String,
}

impl FfmpegNormalizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            sample_rate: 44_100,
            audio_codec: "pcm_s16le".to_string(),
        }
    }

    fn args(&self, path: &Path, preset: &LoudnessPreset) -> Vec<OsString> {
        vec![
            path.as_os_str().to_owned(),
            "-o".into(),
            path.as_os_str().to_owned(),
            "--force".into(),
            "--normalization-type".into(),
            "ebu".into(),
            "-t".into(),
            preset.target_loudness.to_string().into(),
            "-tp".into(),
            preset.peak_ceiling.to_string().into(),
            "--sample-rate".into(),
            self.sample_rate.to_string().into(),
            "--audio-codec".into(),
            self.audio_codec.clone().into(),
        ]
    }
}

impl ExternalNormalizer for FfmpegNormalizer {
    fn normalize(&self, path: &Path, preset: &LoudnessPreset) -> Result<()> {
        let output = run(&self.program, &self.args(path, preset)).map_err(|e| {
            LevelError::external_normalization(spawn_failure(&self.program, &e))
        })?;

        if !output.status.success() {
            return Err(LevelError::external_normalization(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                last_line(&output.stderr)
            )));
        }

        tracing::debug!("EBU pass done for {} ({})", path.display(), preset);
        Ok(())
    }
}
