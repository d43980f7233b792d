use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ScoringConfig {
    /// Mean attempt amplitude below which the attempt counts as silence
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold: f32,
    /// Normalized value a point must exceed (in either signal) to be compared
    #[serde(default = "default_significance_threshold")]
    pub significance_threshold: f32,
    #[serde(default = "default_duration_weight")]
    pub duration_weight: f32,
    #[serde(default = "default_pitch_weight")]
    pub pitch_weight: f32,
    #[serde(default = "default_amplitude_weight")]
    pub amplitude_weight: f32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    /// Recording length used when a clip's own duration is unknown
    #[serde(default = "default_fallback_record_secs")]
    pub fallback_record_secs: f32,
}

/// A reference clip in the catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct ClipEntry {
    pub id: String,
    pub name: String,
    pub file: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fft_size: default_fft_size(),
            window_size: default_window_size(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            silence_threshold: default_silence_threshold(),
            significance_threshold: default_significance_threshold(),
            duration_weight: default_duration_weight(),
            pitch_weight: default_pitch_weight(),
            amplitude_weight: default_amplitude_weight(),
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            fallback_record_secs: default_fallback_record_secs(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            anyhow::bail!("window_size must be at least 1");
        }
        if self.fft_size < 2 || self.fft_size % 2 != 0 {
            anyhow::bail!("fft_size must be an even number >= 2, got {}", self.fft_size);
        }
        Ok(())
    }
}

impl GameConfig {
    pub fn fallback_window(&self) -> Duration {
        Duration::try_from_secs_f32(self.fallback_record_secs)
            .unwrap_or_else(|_| Duration::from_secs_f32(default_fallback_record_secs()))
    }
}

impl Config {
    /// Make relative clip paths relative to `base` (the config file's directory).
    pub fn resolve_clip_paths(&mut self, base: &Path) {
        for clip in &mut self.clips {
            if clip.file.is_relative() {
                clip.file = base.join(&clip.file);
            }
        }
    }
}

pub fn default_fft_size() -> usize { 2048 }
pub fn default_window_size() -> usize { 1024 }
pub fn default_silence_threshold() -> f32 { 0.01 }
fn default_significance_threshold() -> f32 { 0.1 }
fn default_duration_weight() -> f32 { 0.2 }
fn default_pitch_weight() -> f32 { 0.4 }
fn default_amplitude_weight() -> f32 { 0.4 }
fn default_rounds() -> usize { 5 }
fn default_fallback_record_secs() -> f32 { 5.0 }

/// Explicit path, or the first of `mimicry.toml`, `~/.config/mimicry/config.toml`
/// and the platform config dir that exists.
pub fn find_config(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let local = PathBuf::from("mimicry.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("mimicry").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("mimicry").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    if let Some(base) = path.parent() {
        config.resolve_clip_paths(base);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.analysis.fft_size, 2048);
        assert_eq!(config.analysis.window_size, 1024);
        assert_eq!(config.scoring.silence_threshold, 0.01);
        assert_eq!(config.scoring.significance_threshold, 0.1);
        assert_eq!(config.game.rounds, 5);
        assert!(config.clips.is_empty());
    }

    #[test]
    fn parses_clip_catalog() {
        let config: Config = toml::from_str(
            r#"
            [scoring]
            silence_threshold = 0.02

            [[clips]]
            id = "clip1"
            name = "Wahoo"
            file = "audio/wahoo.mp3"

            [[clips]]
            id = "clip2"
            name = "Boo Laugh"
            file = "/abs/boo.mp3"
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring.silence_threshold, 0.02);
        assert_eq!(config.scoring.pitch_weight, 0.4);
        assert_eq!(config.clips.len(), 2);
        assert_eq!(config.clips[0].name, "Wahoo");
    }

    #[test]
    fn relative_clip_paths_follow_config_dir() {
        let mut config = Config {
            clips: vec![
                ClipEntry {
                    id: "a".into(),
                    name: "A".into(),
                    file: PathBuf::from("audio/a.mp3"),
                },
                ClipEntry {
                    id: "b".into(),
                    name: "B".into(),
                    file: PathBuf::from("/abs/b.mp3"),
                },
            ],
            ..Default::default()
        };
        config.resolve_clip_paths(Path::new("/games/mimicry"));

        assert_eq!(config.clips[0].file, PathBuf::from("/games/mimicry/audio/a.mp3"));
        assert_eq!(config.clips[1].file, PathBuf::from("/abs/b.mp3"));
    }

    #[test]
    fn rejects_bad_analysis_sizes() {
        assert!(AnalysisConfig::default().validate().is_ok());
        let zero_window = AnalysisConfig { window_size: 0, ..Default::default() };
        assert!(zero_window.validate().is_err());
        let odd_fft = AnalysisConfig { fft_size: 1023, ..Default::default() };
        assert!(odd_fft.validate().is_err());
    }

    #[test]
    fn negative_fallback_window_uses_default() {
        let game = GameConfig { fallback_record_secs: -1.0, ..Default::default() };
        assert_eq!(game.fallback_window(), Duration::from_secs(5));
    }
}
