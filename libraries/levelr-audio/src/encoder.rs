//! Writing processed audio back to disk
//!
//! WAV is written directly with hound. FLAC and MP3 go through a transient
//! WAV that ffmpeg transcodes into the requested container.

use hound::{SampleFormat, WavSpec, WavWriter};
use levelr_core::{AudioAsset, AudioEncoder, LevelError, OutputFormat, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Write `asset` as a WAV file at `path`
///
/// 16 and 24 bit sources keep their integer depth; everything else is
/// written as 32-bit float. Samples beyond full scale are clamped.
pub fn write_wav(asset: &AudioAsset, path: &Path) -> Result<()> {
    let (bits_per_sample, sample_format) = match asset.bits_per_sample {
        1..=16 => (16, SampleFormat::Int),
        17..=24 => (24, SampleFormat::Int),
        _ => (32, SampleFormat::Float),
    };

    let spec = WavSpec {
        channels: asset.channels,
        sample_rate: asset.sample_rate,
        bits_per_sample,
        sample_format,
    };

    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| LevelError::encode(format!("{}: {}", path.display(), e)))?;

    match sample_format {
        SampleFormat::Int => {
            let scale: f32 = if bits_per_sample == 24 {
                8_388_608.0
            } else {
                32_768.0
            };
            let max = scale - 1.0;
            for &sample in &asset.samples {
                let value = (sample * scale).round().clamp(-scale, max) as i32;
                writer
                    .write_sample(value)
                    .map_err(|e| LevelError::encode(e.to_string()))?;
            }
        }
        SampleFormat::Float => {
            for &sample in &asset.samples {
                writer
                    .write_sample(sample.clamp(-1.0, 1.0))
                    .map_err(|e| LevelError::encode(e.to_string()))?;
            }
        }
    }

    writer
        .finalize()
        .map_err(|e| LevelError::encode(e.to_string()))?;
    Ok(())
}

/// Removes the transient WAV when the transcode finishes, whatever the outcome
struct Transient(PathBuf);

impl Drop for Transient {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("Could not remove {}: {}", self.0.display(), e);
            }
        }
    }
}

/// `AudioEncoder` writing WAV natively and FLAC/MP3 through ffmpeg
#[derive(Debug, Clone)]
pub struct FileEncoder {
    ffmpeg_path: PathBuf,
}

impl Default for FileEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FileEncoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn transcode(&self, wav: &Path, output: &Path, format: OutputFormat) -> Result<()> {
        let result = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(wav)
            .arg("-f")
            .arg(format.extension())
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    LevelError::encode(format!("{} not found", self.ffmpeg_path.display()))
                } else {
                    LevelError::encode(format!("failed to run ffmpeg: {e}"))
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(LevelError::encode(format!(
                "ffmpeg could not write {}: {}",
                output.display(),
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl AudioEncoder for FileEncoder {
    fn encode(&self, asset: &AudioAsset, path: &Path, format: OutputFormat) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        match format {
            OutputFormat::Wav => write_wav(asset, path)?,
            OutputFormat::Flac | OutputFormat::Mp3 => {
                let transient = Transient(path.with_extension("encode.wav"));
                write_wav(asset, &transient.0)?;
                self.transcode(&transient.0, path, format)?;
            }
        }

        tracing::debug!("Wrote {} ({})", path.display(), format);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(bits: u16) -> AudioAsset {
        let samples = (0..2000)
            .map(|i| 0.5 * (i as f32 * 0.05).sin())
            .collect();
        AudioAsset::new(samples, 44_100, 2, bits)
    }

    #[test]
    fn wav_keeps_integer_depth() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav(&tone(24), &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 24);
        assert_eq!(reader.spec().sample_format, SampleFormat::Int);
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.len(), 2000);
    }

    #[test]
    fn unusual_depth_falls_back_to_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav(&tone(32), &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_format, SampleFormat::Float);
    }

    #[test]
    fn over_full_scale_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hot.wav");
        let asset = AudioAsset::new(vec![1.5, -1.5, 0.25, -0.25], 44_100, 2, 16);
        write_wav(&asset, &path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples[0], i16::MAX);
        assert_eq!(samples[1], i16::MIN);
        assert_eq!(samples[2], 8192);
    }

    #[test]
    fn encoder_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kick").join("k1.wav");
        FileEncoder::default()
            .encode(&tone(16), &path, OutputFormat::Wav)
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_ffmpeg_is_an_encode_error_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song_final.flac");
        let err = FileEncoder::new("/nonexistent/levelr/ffmpeg")
            .encode(&tone(16), &path, OutputFormat::Flac)
            .unwrap_err();
        assert!(matches!(err, LevelError::Encode(_)));
        assert!(!dir.path().join("song_final.encode.wav").exists());
    }
}
