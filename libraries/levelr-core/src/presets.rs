//! Loudness presets and their resolution
//!
//! Two fixed tables ship with Levelr: instrument categories (used by the
//! category batch) and distribution platforms (used by the track batch).
//! Tables are plain values built once at start-up and handed to whoever
//! needs them, so tests can inject their own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Target loudness and peak ceiling for one batch run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoudnessPreset {
    /// Integrated loudness target (LUFS-like, dB)
    pub target_loudness: f64,
    /// Maximum sample peak after processing (dB below full scale)
    pub peak_ceiling: f64,
}

impl LoudnessPreset {
    /// Create a new preset
    pub const fn new(target_loudness: f64, peak_ceiling: f64) -> Self {
        Self {
            target_loudness,
            peak_ceiling,
        }
    }

    /// Whether the preset has a negative target and a ceiling at or below 0 dB
    ///
    /// Values outside this range are still processed as given.
    pub fn is_conventional(&self) -> bool {
        self.target_loudness < 0.0 && self.peak_ceiling <= 0.0
    }
}

impl fmt::Display for LoudnessPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} LUFS, ceiling {} dB",
            self.target_loudness, self.peak_ceiling
        )
    }
}

/// Ordered table of named presets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PresetTable {
    entries: Vec<(String, LoudnessPreset)>,
}

impl PresetTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in instrument category presets
    pub fn builtin_categories() -> Self {
        [
            ("kick", -12.0, -1.0),
            ("bass", -9.0, -1.0),
            ("lead", -10.0, -1.0),
            ("atmo", -20.0, -1.0),
            ("fx", -18.0, -1.0),
            ("vocal", -16.0, -1.0),
            ("drum", -12.0, -1.0),
            ("perc", -14.0, -1.0),
            ("zap", -15.0, -1.0),
            ("noise", -20.0, -1.0),
            ("ambience", -22.0, -1.0),
            ("synth", -14.0, -1.0),
        ]
        .into_iter()
        .collect()
    }

    /// Built-in distribution platform presets
    pub fn builtin_platforms() -> Self {
        [
            ("SoundCloud", -14.0, -1.0),
            ("Bandcamp", -14.0, -1.0),
            ("Spotify", -14.0, -1.0),
            ("YouTube", -14.0, -1.0),
            ("Apple Music", -16.0, -1.0),
            ("Ableton Live", -9.0, -0.3),
            ("DJ Live", -6.0, -0.2),
        ]
        .into_iter()
        .collect()
    }

    /// Insert or replace a preset, keeping the position of an existing entry
    pub fn insert(&mut self, name: impl Into<String>, preset: LoudnessPreset) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = preset,
            None => self.entries.push((name, preset)),
        }
    }

    /// Look up a preset by exact name, then case-insensitively
    pub fn get(&self, name: &str) -> Option<LoudnessPreset> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.entries.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)))
            .map(|(_, preset)| *preset)
    }

    /// Canonical name of a preset (as stored in the table)
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, _)| n.as_str())
    }

    /// Preset names in table order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Entries in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, LoudnessPreset)> {
        self.entries.iter().map(|(n, p)| (n.as_str(), *p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64, f64)> for PresetTable {
    fn from_iter<I: IntoIterator<Item = (S, f64, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, target, ceiling) in iter {
            table.insert(name, LoudnessPreset::new(target, ceiling));
        }
        table
    }
}

/// Turns a platform choice or custom slider values into a preset
#[derive(Debug, Clone)]
pub struct PresetResolver {
    platforms: PresetTable,
}

impl PresetResolver {
    /// Create a resolver over the given platform table
    pub fn new(platforms: PresetTable) -> Self {
        Self { platforms }
    }

    /// Resolve a preset
    ///
    /// A platform present in the table wins over the custom values; anything
    /// else (no platform, unknown platform) yields the custom values as given.
    pub fn resolve(
        &self,
        platform: Option<&str>,
        custom_loudness: f64,
        custom_peak: f64,
    ) -> LoudnessPreset {
        platform
            .filter(|name| !name.is_empty())
            .and_then(|name| self.platforms.get(name))
            .unwrap_or(LoudnessPreset::new(custom_loudness, custom_peak))
    }

    /// The platform table this resolver reads from
    pub fn platforms(&self) -> &PresetTable {
        &self.platforms
    }
}

impl Default for PresetResolver {
    fn default() -> Self {
        Self::new(PresetTable::builtin_platforms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_preset_ignores_custom_values() {
        let resolver = PresetResolver::default();
        assert_eq!(
            resolver.resolve(Some("SoundCloud"), -30.0, -3.0),
            LoudnessPreset::new(-14.0, -1.0)
        );
        assert_eq!(
            resolver.resolve(Some("DJ Live"), -30.0, -3.0),
            LoudnessPreset::new(-6.0, -0.2)
        );
    }

    #[test]
    fn custom_values_without_platform() {
        let resolver = PresetResolver::default();
        assert_eq!(
            resolver.resolve(None, -20.0, -1.5),
            LoudnessPreset::new(-20.0, -1.5)
        );
        assert_eq!(
            resolver.resolve(Some(""), -20.0, -1.5),
            LoudnessPreset::new(-20.0, -1.5)
        );
    }

    #[test]
    fn unknown_platform_falls_back_to_custom() {
        let resolver = PresetResolver::default();
        assert_eq!(
            resolver.resolve(Some("Tidal"), -18.0, -2.0),
            LoudnessPreset::new(-18.0, -2.0)
        );
    }

    #[test]
    fn out_of_range_custom_values_are_kept() {
        let resolver = PresetResolver::default();
        let preset = resolver.resolve(None, 3.0, 1.5);
        assert_eq!(preset, LoudnessPreset::new(3.0, 1.5));
        assert!(!preset.is_conventional());
    }

    #[test]
    fn lookup_is_case_insensitive_after_exact() {
        let platforms = PresetTable::builtin_platforms();
        assert_eq!(platforms.get("apple music"), Some(LoudnessPreset::new(-16.0, -1.0)));
        assert_eq!(platforms.canonical_name("youtube"), Some("YouTube"));
    }

    #[test]
    fn builtin_tables_keep_order() {
        let categories = PresetTable::builtin_categories();
        assert_eq!(categories.len(), 12);
        assert_eq!(categories.names().next(), Some("kick"));
        assert_eq!(categories.get("bass"), Some(LoudnessPreset::new(-9.0, -1.0)));
        assert_eq!(categories.get("ambience"), Some(LoudnessPreset::new(-22.0, -1.0)));
        assert!(categories.iter().all(|(_, p)| p.is_conventional()));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut table = PresetTable::builtin_categories();
        table.insert("kick", LoudnessPreset::new(-10.0, -0.5));
        table.insert("808", LoudnessPreset::new(-8.0, -0.5));
        assert_eq!(table.names().next(), Some("kick"));
        assert_eq!(table.get("kick"), Some(LoudnessPreset::new(-10.0, -0.5)));
        assert_eq!(table.names().last(), Some("808"));
    }
}
