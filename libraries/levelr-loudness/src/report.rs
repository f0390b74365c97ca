//! Parsing of the `loudnorm` analysis report
//!
//! ffmpeg prints the report to stderr surrounded by banner and progress
//! text. The report itself is a flat JSON object whose values are strings:
//!
//! ```text
//! {
//!     "input_i" : "-14.52",
//!     "input_tp" : "-0.95",
//!     "input_lra" : "6.10",
//!     "input_thresh" : "-24.81",
//!     ...
//! }
//! ```

use levelr_core::{LevelError, Result};
use serde::Deserialize;

/// Measurement fields of a `loudnorm` report
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoudnormReport {
    /// Integrated loudness of the input
    pub input_i: String,
    #[serde(default)]
    pub input_tp: Option<String>,
    #[serde(default)]
    pub input_lra: Option<String>,
    #[serde(default)]
    pub input_thresh: Option<String>,
    #[serde(default)]
    pub target_offset: Option<String>,
}

impl LoudnormReport {
    /// Integrated loudness as a number
    ///
    /// Silence is reported as `-inf`, which is rejected.
    pub fn integrated_loudness(&self) -> Result<f64> {
        let value: f64 = self.input_i.trim().parse().map_err(|_| {
            LevelError::measurement(format!("invalid input_i value: {:?}", self.input_i))
        })?;
        if !value.is_finite() {
            return Err(LevelError::measurement(format!(
                "no integrated loudness (input_i = {})",
                self.input_i
            )));
        }
        Ok(value)
    }
}

/// Balanced `{...}` blocks of `output`, last first
///
/// Each block ends at a `}` and starts at the `{` that balances it, so an
/// unmatched `{` in the banner (a title such as `Song {Remix`) cannot run
/// into the report.
fn blocks_from_end(output: &str) -> impl Iterator<Item = &str> {
    let bytes = output.as_bytes();
    (0..bytes.len())
        .rev()
        .filter(move |&end| bytes[end] == b'}')
        .filter_map(move |end| {
            let mut depth = 0_usize;
            for start in (0..=end).rev() {
                match bytes[start] {
                    b'}' => depth += 1,
                    b'{' => {
                        depth -= 1;
                        if depth == 0 {
                            return Some(&output[start..=end]);
                        }
                    }
                    _ => {}
                }
            }
            None
        })
}

/// Find the last well-formed report block in `output`
pub fn parse_loudnorm_report(output: &str) -> Result<LoudnormReport> {
    blocks_from_end(output)
        .find_map(|block| serde_json::from_str::<LoudnormReport>(block).ok())
        .ok_or_else(|| LevelError::measurement("no loudness report found in analyzer output"))
}

/// Integrated loudness from raw analyzer output
pub fn integrated_loudness_from_output(output: &str) -> Result<f64> {
    parse_loudnorm_report(output)?.integrated_loudness()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_OUTPUT: &str = r#"Input #0, wav, from 'song.wav':
  Duration: 00:03:12.00, bitrate: 1411 kb/s
  Stream #0:0: Audio: pcm_s16le, 44100 Hz, stereo, s16, 1411 kb/s
size=N/A time=00:03:12.00 bitrate=N/A speed= 412x
[Parsed_loudnorm_0 @ 0x55d0c8a4f2c0]
{
	"input_i" : "-18.37",
	"input_tp" : "-2.04",
	"input_lra" : "7.30",
	"input_thresh" : "-28.61",
	"output_i" : "-14.12",
	"output_tp" : "-1.50",
	"output_lra" : "5.90",
	"output_thresh" : "-24.29",
	"normalization_type" : "dynamic",
	"target_offset" : "0.12"
}
"#;

    #[test]
    fn extracts_integrated_loudness() {
        let value = integrated_loudness_from_output(SAMPLE_OUTPUT).unwrap();
        assert!((value - (-18.37)).abs() < 1e-9);
    }

    #[test]
    fn keeps_other_fields() {
        let report = parse_loudnorm_report(SAMPLE_OUTPUT).unwrap();
        assert_eq!(report.input_tp.as_deref(), Some("-2.04"));
        assert_eq!(report.target_offset.as_deref(), Some("0.12"));
    }

    #[test]
    fn last_block_wins() {
        let output = format!(
            "{}\n{}",
            r#"{ "input_i" : "-30.00" }"#,
            r#"{ "input_i" : "-12.50" }"#
        );
        let value = integrated_loudness_from_output(&output).unwrap();
        assert!((value - (-12.5)).abs() < 1e-9);
    }

    #[test]
    fn malformed_trailing_block_is_skipped() {
        let output = format!("{}\n{{ not json }}", r#"{ "input_i" : "-20.00" }"#);
        let value = integrated_loudness_from_output(&output).unwrap();
        assert!((value - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn unbalanced_brace_in_banner_is_ignored() {
        let output = format!(
            "Input #0, wav, from 'song.wav':\n  Metadata:\n    title           : Song {{Remix\n{}",
            SAMPLE_OUTPUT
        );
        let value = integrated_loudness_from_output(&output).unwrap();
        assert!((value - (-18.37)).abs() < 1e-9);
    }

    #[test]
    fn braces_in_banner_text_do_not_hide_report() {
        let output = format!("title : Song {{Remix}} }} (live)\n{}", SAMPLE_OUTPUT);
        let report = parse_loudnorm_report(&output).unwrap();
        assert_eq!(report.input_i, "-18.37");
    }

    #[test]
    fn missing_block_is_a_measurement_error() {
        let err = integrated_loudness_from_output("ffmpeg version 6.1\nno report").unwrap_err();
        assert!(matches!(err, LevelError::Measurement(_)));
    }

    #[test]
    fn silence_is_rejected() {
        let err = integrated_loudness_from_output(r#"{ "input_i" : "-inf" }"#).unwrap_err();
        assert!(matches!(err, LevelError::Measurement(_)));
    }
}
