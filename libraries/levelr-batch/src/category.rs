//! Category mode: short samples sorted into per-instrument folders

use crate::normalizer::{NormalizeMode, SampleNormalizer};
use crate::paths::OutputClaims;
use crate::scanner::FileScanner;
use levelr_core::{
    BatchEvent, CategoryJobSpec, LevelError, OutputFormat, ProcessingOutcome, ProgressState,
    Result,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Normalizes every enabled category folder into `output_dir/<category>/`
#[derive(Clone)]
pub struct CategoryBatchProcessor {
    normalizer: SampleNormalizer,
    scanner: FileScanner,
}

impl CategoryBatchProcessor {
    pub fn new(normalizer: SampleNormalizer) -> Self {
        Self {
            normalizer,
            scanner: FileScanner::for_categories(),
        }
    }

    /// Run the batch, calling `on_event` for every progress update
    ///
    /// Categories without a usable folder are skipped. A subfolder is only
    /// created for a category that has at least one file.
    pub fn run<F>(
        &self,
        jobs: &[CategoryJobSpec],
        output_dir: &Path,
        format: OutputFormat,
        mut on_event: F,
    ) -> Result<Vec<ProcessingOutcome>>
    where
        F: FnMut(BatchEvent),
    {
        if jobs.is_empty() {
            return Err(LevelError::configuration(
                "select at least one category with a folder",
            ));
        }

        fs::create_dir_all(output_dir)?;

        let planned = self.plan(jobs);
        let total = planned.iter().map(|(_, files)| files.len()).sum();
        tracing::info!(
            "Category batch: {} files in {} categories -> {}",
            total,
            planned.len(),
            output_dir.display()
        );

        let mut claims = OutputClaims::new(planned.iter().flat_map(|(_, files)| files));
        let mut progress = ProgressState::new(total);
        let mut outcomes = Vec::with_capacity(total);
        on_event(BatchEvent::Started { total });

        for (job, files) in planned {
            if files.is_empty() {
                tracing::debug!("No samples for category {}", job.category);
                continue;
            }

            let category_dir = output_dir.join(&job.category);
            fs::create_dir_all(&category_dir)?;

            for input in files {
                let file_name = input.file_name().unwrap_or_default();
                let output = category_dir
                    .join(file_name)
                    .with_extension(format.extension());

                progress.current_file_name = Some(file_name.to_string_lossy().into_owned());
                on_event(BatchEvent::FileStarted(progress.clone()));

                let outcome = match claims.claim(&input, &output, None) {
                    Ok(()) => self.normalizer.normalize(
                        &input,
                        &output,
                        &job.preset,
                        format,
                        NormalizeMode::Category,
                    ),
                    Err(reason) => {
                        tracing::warn!(
                            "[{}] Skipping {}: {}",
                            job.category,
                            input.display(),
                            reason
                        );
                        ProcessingOutcome::Failure {
                            input_path: input.clone(),
                            reason,
                        }
                    }
                };
                if outcome.is_success() {
                    tracing::info!("[{}] {}", job.category, input.display());
                }

                progress.advance();
                on_event(BatchEvent::FileFinished {
                    progress: progress.clone(),
                    outcome: outcome.clone(),
                });
                outcomes.push(outcome);
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        on_event(BatchEvent::Finished {
            succeeded,
            failed: outcomes.len() - succeeded,
        });
        Ok(outcomes)
    }

    /// Files of every usable category, in caller order
    fn plan<'a>(&self, jobs: &'a [CategoryJobSpec]) -> Vec<(&'a CategoryJobSpec, Vec<PathBuf>)> {
        jobs.iter()
            .filter_map(|job| {
                let Some(source) = job.usable_source() else {
                    tracing::debug!("Skipping category {}: no folder selected", job.category);
                    return None;
                };
                match self.scanner.scan_directory(source) {
                    Ok(files) => Some((job, files)),
                    Err(e) => {
                        tracing::warn!("Skipping category {}: {}", job.category, e);
                        None
                    }
                }
            })
            .collect()
    }
}
