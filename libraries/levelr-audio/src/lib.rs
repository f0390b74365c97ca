//! Audio file I/O for Levelr
//!
//! Decoding goes through Symphonia and keeps the source channel layout.
//! Encoding writes WAV with hound and hands FLAC/MP3 to ffmpeg.

#![forbid(unsafe_code)]

mod decoder;
mod encoder;

pub use decoder::SymphoniaDecoder;
pub use encoder::{write_wav, FileEncoder};
