//! Running a batch off the caller's thread

use crate::category::CategoryBatchProcessor;
use crate::normalizer::{SampleNormalizer, Services};
use crate::track::{TrackBatchProcessor, TrackRequest};
use levelr_core::{BatchEvent, BatchJobs, BatchRequest, BatchSummary, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the progress channel
const EVENT_BUFFER: usize = 100;

/// Dispatches a `BatchRequest` to the matching processor
#[derive(Clone)]
pub struct BatchRunner {
    categories: CategoryBatchProcessor,
    tracks: TrackBatchProcessor,
}

impl BatchRunner {
    pub fn new(services: Services) -> Self {
        let normalizer = SampleNormalizer::new(services);
        Self {
            categories: CategoryBatchProcessor::new(normalizer.clone()),
            tracks: TrackBatchProcessor::new(normalizer),
        }
    }

    /// Validate and run `request` on the current thread
    pub fn run<F>(&self, request: &BatchRequest, on_event: F) -> Result<BatchSummary>
    where
        F: FnMut(BatchEvent),
    {
        request.validate()?;

        let outcomes = match &request.jobs {
            BatchJobs::Categories(jobs) => self.categories.run(
                jobs,
                &request.output_dir,
                request.output_format,
                on_event,
            )?,
            BatchJobs::Tracks { source_dir, preset } => {
                let track_request = TrackRequest {
                    source_dir: source_dir.clone(),
                    output_dir: request.output_dir.clone(),
                    format: request.output_format,
                    preset: *preset,
                    premaster: request.premaster_attenuation,
                };
                self.tracks.run(&track_request, on_event)?
            }
        };

        Ok(BatchSummary::new(outcomes))
    }
}

/// Run `request` on a blocking worker
///
/// Returns a channel for receiving progress updates and a handle to the
/// batch task. Dropping the receiver does not stop the batch. Must be called
/// from within a Tokio runtime.
pub fn spawn_batch(
    runner: Arc<BatchRunner>,
    request: BatchRequest,
) -> (mpsc::Receiver<BatchEvent>, JoinHandle<Result<BatchSummary>>) {
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);

    let handle = tokio::task::spawn_blocking(move || {
        runner.run(&request, |event| {
            // Receiver gone: keep processing, nobody is listening
            let _ = tx.blocking_send(event);
        })
    });

    (rx, handle)
}
