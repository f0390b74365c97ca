/// Audio decoder implementation using Symphonia
use levelr_core::{AudioAsset, AudioDecoder, LevelError, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Audio decoder using Symphonia
///
/// Supports: WAV, FLAC, MP3, AAC, M4A
///
/// Unlike a playback decoder, the channel layout is kept as-is: normalizing
/// must not downmix the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path) -> Result<AudioAsset> {
        // Check if file exists
        if !path.exists() {
            return Err(LevelError::decode(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path)
            .map_err(|e| LevelError::decode(format!("{}: {}", path.display(), e)))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| LevelError::decode(format!("failed to probe file: {}", e)))?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| LevelError::decode("no audio tracks found"))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
        let mut channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(2);
        let bits_per_sample = track
            .codec_params
            .bits_per_sample
            .map(|b| b as u16)
            .unwrap_or(16);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| LevelError::decode(format!("failed to create decoder: {}", e)))?;

        let mut all_samples = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(LevelError::decode(format!("error reading packet: {}", e)));
                }
            };

            // Skip packets that are not for the selected track
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    // A corrupt frame in a lossy stream is skipped, not fatal
                    tracing::warn!("Skipping undecodable packet in {}: {}", path.display(), e);
                    continue;
                }
                Err(e) => return Err(LevelError::decode(e.to_string())),
            };

            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channels = spec.channels.count() as u16;

            let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            all_samples.extend_from_slice(buf.samples());
        }

        if all_samples.is_empty() {
            return Err(LevelError::decode(format!(
                "no audio decoded from {}",
                path.display()
            )));
        }

        tracing::debug!(
            "Decoded {} ({} Hz, {} ch, {} samples)",
            path.display(),
            sample_rate,
            channels,
            all_samples.len()
        );

        Ok(AudioAsset::new(
            all_samples,
            sample_rate,
            channels,
            bits_per_sample,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = SymphoniaDecoder::new()
            .decode(Path::new("/definitely/not/here.wav"))
            .unwrap_err();
        assert!(matches!(err, LevelError::Decode(_)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"this is not audio at all").unwrap();

        let err = SymphoniaDecoder::new().decode(&path).unwrap_err();
        assert!(matches!(err, LevelError::Decode(_)));
    }
}
