/// Subcommand implementations
use crate::config::AppConfig;
use crate::progress::ProgressReporter;
use anyhow::Context;
use levelr_batch::{archive_output_tree, spawn_batch, BatchRunner};
use levelr_core::{
    BatchJobs, BatchRequest, BatchSummary, CategoryJobSpec, LevelError, OutputFormat, PresetTable,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Options of `levelr tracks`
#[derive(Debug, Clone)]
pub struct TrackOptions {
    pub source: PathBuf,
    pub output: PathBuf,
    pub platform: Option<String>,
    pub lufs: f64,
    pub peak: f64,
    pub premaster: bool,
    pub format: Option<OutputFormat>,
    pub archive: bool,
}

/// Turn `NAME=DIR` pairs into jobs, using the table's spelling of each name
pub fn category_jobs(
    table: &PresetTable,
    categories: &[(String, PathBuf)],
) -> levelr_core::Result<Vec<CategoryJobSpec>> {
    categories
        .iter()
        .map(|(name, dir)| -> levelr_core::Result<CategoryJobSpec> {
            let canonical = table.canonical_name(name).ok_or_else(|| {
                let known: Vec<&str> = table.names().collect();
                LevelError::configuration(format!(
                    "unknown category `{}` (known: {})",
                    name,
                    known.join(", ")
                ))
            })?;
            let preset = table
                .get(canonical)
                .ok_or_else(|| LevelError::configuration(format!("unknown category `{name}`")))?;
            Ok(CategoryJobSpec::new(canonical, Some(dir.clone()), preset))
        })
        .collect()
}

/// Build the request for a track batch
pub fn track_request(config: &AppConfig, options: &TrackOptions) -> BatchRequest {
    let preset = config
        .platform_resolver()
        .resolve(options.platform.as_deref(), options.lufs, options.peak);

    if let Some(platform) = &options.platform {
        if config.platform_resolver().platforms().get(platform).is_none() {
            tracing::warn!("Unknown platform {}, using --lufs/--peak", platform);
        }
    }
    if !preset.is_conventional() {
        tracing::warn!("Unusual target ({}), processing as given", preset);
    }

    BatchRequest {
        jobs: BatchJobs::Tracks {
            source_dir: options.source.clone(),
            preset,
        },
        output_dir: options.output.clone(),
        output_format: options.format.unwrap_or(config.processing.default_format),
        premaster_attenuation: options
            .premaster
            .then_some(config.processing.premaster_db),
    }
}

pub async fn run_categories(
    config: &AppConfig,
    categories: &[(String, PathBuf)],
    output: PathBuf,
    format: Option<OutputFormat>,
    archive: bool,
) -> anyhow::Result<BatchSummary> {
    let jobs = category_jobs(&config.category_table(), categories)?;
    let request = BatchRequest {
        jobs: BatchJobs::Categories(jobs),
        output_dir: output,
        output_format: format.unwrap_or(config.processing.default_format),
        premaster_attenuation: None,
    };
    execute(config, request, archive).await
}

pub async fn run_tracks(config: &AppConfig, options: &TrackOptions) -> anyhow::Result<BatchSummary> {
    let request = track_request(config, options);
    execute(config, request, options.archive).await
}

/// Run the batch in the background while rendering its progress
async fn execute(
    config: &AppConfig,
    request: BatchRequest,
    archive: bool,
) -> anyhow::Result<BatchSummary> {
    request.validate()?;
    let output_dir = request.output_dir.clone();

    let runner = Arc::new(BatchRunner::new(config.build_services()));
    let (mut rx, handle) = spawn_batch(runner, request);

    let reporter = ProgressReporter::new();
    while let Some(event) = rx.recv().await {
        reporter.handle(&event);
    }

    let summary = handle.await.context("batch worker stopped unexpectedly")??;

    if archive && !summary.outcomes.is_empty() {
        let archive_path =
            tokio::task::spawn_blocking(move || archive_output_tree(&output_dir)).await??;
        println!("Archive: {}", archive_path.display());
    }

    Ok(summary)
}

/// Print both preset tables
pub fn list_presets(config: &AppConfig) {
    print_table("Categories", &config.category_table());
    println!();
    print_table("Platforms", config.platform_resolver().platforms());
}

fn print_table(title: &str, table: &PresetTable) {
    println!("{title}:");
    for (name, preset) in table.iter() {
        println!(
            "  {:<14} {:>6.1} LUFS  {:>5.1} dB",
            name, preset.target_loudness, preset.peak_ceiling
        );
    }
}

/// Status line for a finished batch
pub fn status_line(summary: &BatchSummary, output: &Path) -> String {
    if summary.outcomes.is_empty() {
        return summary.summary_text();
    }
    format!("{} -> {}", summary.summary_text(), output.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelr_core::{LoudnessPreset, ProcessingOutcome};

    fn options(platform: Option<&str>, premaster: bool) -> TrackOptions {
        TrackOptions {
            source: PathBuf::from("in"),
            output: PathBuf::from("out"),
            platform: platform.map(str::to_string),
            lufs: -20.0,
            peak: -2.0,
            premaster,
            format: None,
            archive: false,
        }
    }

    #[test]
    fn categories_use_table_spelling_and_preset() {
        let table = PresetTable::builtin_categories();
        let jobs = category_jobs(&table, &[("KICK".to_string(), PathBuf::from("k"))]).unwrap();
        assert_eq!(jobs[0].category, "kick");
        assert_eq!(jobs[0].preset, LoudnessPreset::new(-12.0, -1.0));
        assert_eq!(jobs[0].source_dir, Some(PathBuf::from("k")));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let table = PresetTable::builtin_categories();
        let err = category_jobs(&table, &[("cowbell".to_string(), PathBuf::from("c"))])
            .unwrap_err();
        assert!(matches!(err, LevelError::Configuration(_)));
    }

    #[test]
    fn platform_wins_over_custom_values() {
        let config = AppConfig::default();
        let request = track_request(&config, &options(Some("Ableton Live"), false));
        match request.jobs {
            BatchJobs::Tracks { preset, .. } => {
                assert_eq!(preset, LoudnessPreset::new(-9.0, -0.3));
            }
            BatchJobs::Categories(_) => panic!("expected track jobs"),
        }
        assert_eq!(request.premaster_attenuation, None);
        assert_eq!(request.output_format, OutputFormat::Wav);
    }

    #[test]
    fn custom_values_and_premaster() {
        let config = AppConfig::default();
        let request = track_request(&config, &options(None, true));
        match request.jobs {
            BatchJobs::Tracks { preset, .. } => {
                assert_eq!(preset, LoudnessPreset::new(-20.0, -2.0));
            }
            BatchJobs::Categories(_) => panic!("expected track jobs"),
        }
        assert_eq!(request.premaster_attenuation, Some(6.0));
    }

    #[test]
    fn status_mentions_output() {
        let summary = BatchSummary::new(vec![ProcessingOutcome::Success {
            input_path: PathBuf::from("in/a.wav"),
            output_path: PathBuf::from("out/a_final.wav"),
        }]);
        assert_eq!(
            status_line(&summary, Path::new("out")),
            "Processing complete: 1 normalized, 0 failed -> out"
        );
        assert_eq!(
            status_line(&BatchSummary::default(), Path::new("out")),
            "No audio files processed"
        );
    }
}
