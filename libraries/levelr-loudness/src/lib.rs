//! Loudness measurement, gain computation, and peak limiting for Levelr
//!
//! This crate provides:
//! - Gain computation toward a loudness target
//! - A uniform peak limiter enforcing a sample-peak ceiling
//! - External measurement via ffmpeg's `loudnorm` analysis report
//! - External second-pass normalization via `ffmpeg-normalize`
//! - In-process EBU R128 measurement as an ffmpeg-free fallback
//!
//! # Example
//!
//! ```rust
//! use levelr_loudness::{clamp_gain, gain_to_target};
//!
//! let gain = gain_to_target(-20.0, -14.0);
//! assert_eq!(gain, 6.0);
//!
//! // A peak of +0.5 dB with a -1 dB ceiling needs 1.5 dB of attenuation
//! assert_eq!(clamp_gain(0.5, -1.0), -1.5);
//! ```

#![forbid(unsafe_code)]

mod analyzer;
mod ffmpeg;
mod gain;
mod limiter;
mod report;

pub use analyzer::{integrated_loudness, EbuR128Measurer};
pub use ffmpeg::{AnalysisProfile, FfmpegMeasurer, FfmpegNormalizer};
pub use gain::gain_to_target;
pub use limiter::{clamp_gain, PeakLimiter};
pub use report::{integrated_loudness_from_output, parse_loudnorm_report, LoudnormReport};
