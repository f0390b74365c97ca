/// Command-line interface definition
use clap::{Parser, Subcommand};
use levelr_core::OutputFormat;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "levelr")]
#[command(about = "Batch loudness normalization for samples and tracks", long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./levelr.toml when present)
    #[arg(long, global = true, env = "LEVELR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Normalize sample folders, one per instrument category
    Categories {
        /// Category and its folder, e.g. `kick=./samples/kicks` (repeatable)
        #[arg(short = 'c', long = "category", value_name = "NAME=DIR", value_parser = parse_category, required = true)]
        categories: Vec<(String, PathBuf)>,

        /// Output folder; one subfolder per category is created inside
        #[arg(short, long)]
        output: PathBuf,

        /// Output format (wav, flac, mp3)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Pack the output folder into `<output>.tar.gz` afterwards
        #[arg(long)]
        archive: bool,
    },
    /// Normalize every track of a folder to a platform or custom target
    Tracks {
        /// Folder holding the tracks
        #[arg(short, long)]
        source: PathBuf,

        /// Output folder for `<name>_final.<format>` files
        #[arg(short, long)]
        output: PathBuf,

        /// Platform preset (see `levelr presets`); overrides --lufs/--peak
        #[arg(short, long)]
        platform: Option<String>,

        /// Custom integrated loudness target
        #[arg(long, default_value_t = -14.0, allow_negative_numbers = true)]
        lufs: f64,

        /// Custom peak ceiling in dB
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        peak: f64,

        /// Leave premaster headroom below the ceiling
        #[arg(long)]
        premaster: bool,

        /// Output format (wav, flac, mp3)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Pack the output folder into `<output>.tar.gz` afterwards
        #[arg(long)]
        archive: bool,
    },
    /// List the category and platform presets
    Presets,
}

/// Parse `NAME=DIR`
pub fn parse_category(value: &str) -> Result<(String, PathBuf), String> {
    let (name, dir) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DIR, got `{value}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing category name in `{value}`"));
    }
    Ok((name.to_string(), PathBuf::from(dir)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_argument_is_split_once() {
        assert_eq!(
            parse_category("kick=./a=b").unwrap(),
            ("kick".to_string(), PathBuf::from("./a=b"))
        );
        assert!(parse_category("kick").is_err());
        assert!(parse_category("=dir").is_err());
    }

    #[test]
    fn tracks_command_parses() {
        let cli = Cli::try_parse_from([
            "levelr", "tracks", "--source", "in", "--output", "out", "--lufs", "-9", "--peak",
            "-0.3", "--premaster", "--format", "MP3",
        ])
        .unwrap();

        match cli.command {
            Commands::Tracks {
                lufs,
                peak,
                premaster,
                format,
                platform,
                archive,
                ..
            } => {
                assert_eq!(lufs, -9.0);
                assert_eq!(peak, -0.3);
                assert!(premaster);
                assert!(!archive);
                assert_eq!(format, Some(OutputFormat::Mp3));
                assert!(platform.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn categories_command_collects_pairs() {
        let cli = Cli::try_parse_from([
            "levelr", "categories", "-c", "kick=k", "-c", "bass=b", "--output", "out",
        ])
        .unwrap();

        match cli.command {
            Commands::Categories { categories, .. } => {
                assert_eq!(categories.len(), 2);
                assert_eq!(categories[1].0, "bass");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = Cli::try_parse_from([
            "levelr", "tracks", "--source", "in", "--output", "out", "--format", "ogg",
        ]);
        assert!(result.is_err());
    }
}
