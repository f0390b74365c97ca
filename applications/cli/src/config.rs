/// Levelr configuration
use levelr_audio::{FileEncoder, SymphoniaDecoder};
use levelr_batch::Services;
use levelr_core::{
    LevelError, LoudnessPreset, OutputFormat, PresetResolver, PresetTable, Result,
    DEFAULT_PREMASTER_DB,
};
use levelr_loudness::{EbuR128Measurer, FfmpegMeasurer, FfmpegNormalizer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "levelr.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tools: ToolSettings,

    #[serde(default)]
    pub processing: ProcessingSettings,

    #[serde(default)]
    pub presets: PresetOverrides,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolSettings {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    #[serde(default = "default_ffmpeg_normalize_path")]
    pub ffmpeg_normalize_path: PathBuf,
}

/// Where track loudness is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurerKind {
    /// ffmpeg `loudnorm` analysis
    #[default]
    Ffmpeg,
    /// In-process EBU R128
    Internal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProcessingSettings {
    #[serde(default)]
    pub measurer: MeasurerKind,

    /// Headroom in dB cut by `--premaster`
    #[serde(default = "default_premaster_db")]
    pub premaster_db: f64,

    #[serde(default)]
    pub default_format: OutputFormat,
}

/// Presets replacing or extending the built-in tables, keyed by name
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PresetOverrides {
    #[serde(default)]
    pub categories: BTreeMap<String, LoudnessPreset>,

    #[serde(default)]
    pub platforms: BTreeMap<String, LoudnessPreset>,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `levelr.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables, e.g. LEVELR_TOOLS__FFMPEG_PATH
        settings = settings.add_source(
            config::Environment::with_prefix("LEVELR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| LevelError::configuration(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| LevelError::configuration(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let premaster = self.processing.premaster_db;
        if !premaster.is_finite() || premaster <= 0.0 {
            return Err(LevelError::configuration(format!(
                "premaster_db must be a positive number of dB, got {premaster}"
            )));
        }

        for (name, preset) in self
            .presets
            .categories
            .iter()
            .chain(self.presets.platforms.iter())
        {
            if !preset.is_conventional() {
                tracing::warn!("Preset {} is unusual ({}), using it as given", name, preset);
            }
        }

        Ok(())
    }

    /// Built-in category presets with overrides applied
    pub fn category_table(&self) -> PresetTable {
        apply_overrides(PresetTable::builtin_categories(), &self.presets.categories)
    }

    /// Platform resolver over the built-in table with overrides applied
    pub fn platform_resolver(&self) -> PresetResolver {
        PresetResolver::new(apply_overrides(
            PresetTable::builtin_platforms(),
            &self.presets.platforms,
        ))
    }

    /// Production collaborators for the batch pipeline
    pub fn build_services(&self) -> Services {
        let decoder = Arc::new(SymphoniaDecoder::new());
        let measurer: Arc<dyn levelr_core::LoudnessMeasurer> = match self.processing.measurer {
            MeasurerKind::Ffmpeg => Arc::new(FfmpegMeasurer::new(&self.tools.ffmpeg_path)),
            MeasurerKind::Internal => Arc::new(EbuR128Measurer::new(decoder.clone())),
        };

        Services {
            decoder,
            encoder: Arc::new(FileEncoder::new(&self.tools.ffmpeg_path)),
            measurer,
            external: Arc::new(FfmpegNormalizer::new(&self.tools.ffmpeg_normalize_path)),
        }
    }
}

/// Config keys arrive lowercased, so an override replaces the built-in entry
/// it matches case-insensitively and keeps that entry's spelling
fn apply_overrides(
    mut table: PresetTable,
    overrides: &BTreeMap<String, LoudnessPreset>,
) -> PresetTable {
    for (name, preset) in overrides {
        let name = table
            .canonical_name(name)
            .map_or_else(|| name.clone(), str::to_string);
        table.insert(name, *preset);
    }
    table
}

// Default values
fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffmpeg_normalize_path() -> PathBuf {
    PathBuf::from("ffmpeg-normalize")
}

fn default_premaster_db() -> f64 {
    DEFAULT_PREMASTER_DB
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffmpeg_normalize_path: default_ffmpeg_normalize_path(),
        }
    }
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            measurer: MeasurerKind::default(),
            premaster_db: default_premaster_db(),
            default_format: OutputFormat::default(),
        }
    }
}
