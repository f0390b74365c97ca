//! Track mode: full tracks from one folder, one preset

use crate::normalizer::{temp_path_for, NormalizeMode, SampleNormalizer};
use crate::paths::OutputClaims;
use crate::scanner::FileScanner;
use levelr_core::{
    BatchEvent, LevelError, LoudnessPreset, OutputFormat, ProcessingOutcome, ProgressState,
    Result,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Parameters of a track batch
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRequest {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub preset: LoudnessPreset,
    /// Attenuation in dB applied after peak limiting
    pub premaster: Option<f64>,
}

/// `<output_dir>/<stem>_final.<ext>`
pub fn final_output_path(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.join(format!("{}_final.{}", stem, format.extension()))
}

/// Normalizes every recognized track of a folder
#[derive(Clone)]
pub struct TrackBatchProcessor {
    normalizer: SampleNormalizer,
    scanner: FileScanner,
}

impl TrackBatchProcessor {
    pub fn new(normalizer: SampleNormalizer) -> Self {
        Self {
            normalizer,
            scanner: FileScanner::for_tracks(),
        }
    }

    /// Run the batch, calling `on_event` for every progress update
    ///
    /// An empty folder emits `NoValidFiles` and leaves the output folder
    /// untouched.
    pub fn run<F>(&self, request: &TrackRequest, mut on_event: F) -> Result<Vec<ProcessingOutcome>>
    where
        F: FnMut(BatchEvent),
    {
        if request.source_dir.as_os_str().is_empty() {
            return Err(LevelError::configuration("please choose a source folder"));
        }

        let files = self.scanner.scan_directory(&request.source_dir)?;
        if files.is_empty() {
            tracing::info!("No valid audio files in {}", request.source_dir.display());
            on_event(BatchEvent::NoValidFiles {
                source_dir: request.source_dir.clone(),
            });
            return Ok(Vec::new());
        }

        fs::create_dir_all(&request.output_dir)?;

        let total = files.len();
        tracing::info!(
            "Track batch: {} files at {} -> {}",
            total,
            request.preset,
            request.output_dir.display()
        );

        let mode = NormalizeMode::Track {
            premaster: request.premaster,
        };
        let mut claims = OutputClaims::new(&files);
        let mut progress = ProgressState::new(total);
        let mut outcomes = Vec::with_capacity(total);
        on_event(BatchEvent::Started { total });

        for input in files {
            let output = final_output_path(&input, &request.output_dir, request.format);

            progress.current_file_name = input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
            on_event(BatchEvent::FileStarted(progress.clone()));

            let temp = temp_path_for(&input, &output);
            let outcome = match claims.claim(&input, &output, Some(temp.as_path())) {
                Ok(()) => {
                    self.normalizer
                        .normalize(&input, &output, &request.preset, request.format, mode)
                }
                Err(reason) => {
                    tracing::warn!("Skipping {}: {}", input.display(), reason);
                    ProcessingOutcome::Failure {
                        input_path: input.clone(),
                        reason,
                    }
                }
            };
            if outcome.is_success() {
                tracing::info!("Normalized {}", output.display());
            }

            progress.advance();
            on_event(BatchEvent::FileFinished {
                progress: progress.clone(),
                outcome: outcome.clone(),
            });
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!(
            "Track batch finished: {} normalized, {} failed",
            succeeded,
            outcomes.len() - succeeded
        );
        on_event(BatchEvent::Finished {
            succeeded,
            failed: outcomes.len() - succeeded,
        });
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_name_swaps_extension() {
        assert_eq!(
            final_output_path(Path::new("/music/Song.flac"), Path::new("/out"), OutputFormat::Mp3),
            Path::new("/out/Song_final.mp3")
        );
        assert_eq!(
            final_output_path(Path::new("/music/a.b.wav"), Path::new("/out"), OutputFormat::Wav),
            Path::new("/out/a.b_final.wav")
        );
    }
}
