/// Terminal rendering of batch progress
use indicatif::{ProgressBar, ProgressStyle};
use levelr_core::{BatchEvent, ProcessingOutcome};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Drives a progress bar from `BatchEvent`s
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter {
    pub fn new() -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let bar = ProgressBar::new(0);
        bar.set_style(style);
        Self { bar }
    }

    /// Reporter that draws nothing
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn handle(&self, event: &BatchEvent) {
        match event {
            BatchEvent::Started { total } => {
                self.bar.set_length(*total as u64);
                self.bar.set_position(0);
            }
            BatchEvent::FileStarted(progress) => {
                if let Some(name) = &progress.current_file_name {
                    self.bar.set_message(format!("Processing {name}"));
                }
            }
            BatchEvent::FileFinished { progress, outcome } => {
                self.bar.set_position(progress.completed_count as u64);
                if let ProcessingOutcome::Failure { input_path, reason } = outcome {
                    self.bar
                        .println(format!("warning: {}: {}", input_path.display(), reason));
                }
            }
            BatchEvent::NoValidFiles { source_dir } => {
                self.bar.println(format!(
                    "warning: no valid audio files found in {}",
                    source_dir.display()
                ));
            }
            BatchEvent::Finished { .. } => self.bar.finish_and_clear(),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelr_core::ProgressState;
    use std::path::PathBuf;

    #[test]
    fn bar_follows_completed_count() {
        let reporter = ProgressReporter::hidden();
        reporter.handle(&BatchEvent::Started { total: 3 });

        let mut progress = ProgressState::new(3);
        progress.current_file_name = Some("a.wav".to_string());
        reporter.handle(&BatchEvent::FileStarted(progress.clone()));
        progress.advance();
        reporter.handle(&BatchEvent::FileFinished {
            progress,
            outcome: ProcessingOutcome::Failure {
                input_path: PathBuf::from("a.wav"),
                reason: "Decode error: bad header".to_string(),
            },
        });

        assert_eq!(reporter.position(), 1);
    }
}
