//! Shared fixtures for the batch integration tests

#![allow(dead_code)]

use levelr_audio::{FileEncoder, SymphoniaDecoder};
use levelr_batch::Services;
use levelr_core::{ExternalNormalizer, LevelError, LoudnessMeasurer, LoudnessPreset, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

/// 16-bit stereo 440 Hz sine at 44.1 kHz
pub fn write_sine(path: &Path, amplitude: f32, seconds: f32) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let frames = (44_100.0 * seconds) as usize;
    for i in 0..frames {
        let t = i as f32 / 44_100.0;
        let s = amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        let value = (s * 32_767.0) as i16;
        writer.write_sample(value).unwrap();
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

/// Measurer returning a fixed loudness, failing for one file name
pub struct FakeMeasurer {
    pub loudness: f64,
    pub fail_for: Option<String>,
}

impl FakeMeasurer {
    pub fn new(loudness: f64) -> Self {
        Self {
            loudness,
            fail_for: None,
        }
    }

    pub fn failing_for(mut self, file_name: &str) -> Self {
        self.fail_for = Some(file_name.to_string());
        self
    }
}

impl LoudnessMeasurer for FakeMeasurer {
    fn measure(&self, path: &Path) -> Result<f64> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        if name.is_some() && name == self.fail_for {
            return Err(LevelError::measurement("loudnorm report missing"));
        }
        Ok(self.loudness)
    }
}

/// Second-pass stand-in: leaves the file as it is and records what it saw
#[derive(Default)]
pub struct FakeNormalizer {
    pub fail: bool,
    pub seen: Mutex<Vec<(PathBuf, bool)>>,
}

impl FakeNormalizer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            seen: Mutex::default(),
        }
    }
}

impl ExternalNormalizer for FakeNormalizer {
    fn normalize(&self, path: &Path, _preset: &LoudnessPreset) -> Result<()> {
        self.seen
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists()));
        if self.fail {
            return Err(LevelError::external_normalization("exit status 1"));
        }
        Ok(())
    }
}

pub fn services(measurer: FakeMeasurer, external: Arc<FakeNormalizer>) -> Services {
    Services {
        decoder: Arc::new(SymphoniaDecoder::new()),
        encoder: Arc::new(FileEncoder::default()),
        measurer: Arc::new(measurer),
        external,
    }
}

/// File names directly inside `dir`, sorted
pub fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
