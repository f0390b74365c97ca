//! Batch processing for Levelr
//!
//! This crate provides:
//! - Flat scanning of source folders for audio files
//! - The per-file `SampleNormalizer` pipeline
//! - Category mode (`CategoryBatchProcessor`) and track mode (`TrackBatchProcessor`)
//! - A background runner reporting `BatchEvent`s over a channel
//! - Archiving of a finished output folder
//!
//! Files are processed one at a time; a failing file is recorded as a
//! `ProcessingOutcome::Failure` and the batch moves on.

#![forbid(unsafe_code)]

mod archive;
mod category;
mod normalizer;
mod paths;
mod scanner;
mod track;
mod worker;

pub use archive::{archive_output_tree, archive_path_for};
pub use category::CategoryBatchProcessor;
pub use normalizer::{temp_path_for, NormalizeMode, SampleNormalizer, Services};
pub use scanner::{FileScanner, CATEGORY_EXTENSIONS, TRACK_EXTENSIONS};
pub use track::{final_output_path, TrackBatchProcessor, TrackRequest};
pub use worker::{spawn_batch, BatchRunner};
