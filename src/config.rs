use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio_system::clip::{ClipId, ClipLibrary};
use crate::audio_system::fade::DEFAULT_FADE_MS;
use crate::audio_system::pool::PoolConfig;
use crate::audio_system::source::SoundEffect;
use crate::error::{AudioError, ConfigError};

/// A clip file listed in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipEntry {
    pub id: ClipId,

    /// File path, relative to the directory given to `load_clips` unless absolute
    pub path: String,

    /// Playback length when known (used by the headless backend)
    #[serde(default)]
    pub length_ms: Option<u64>,
}

fn default_fade_duration_ms() -> u64 {
    DEFAULT_FADE_MS
}

fn default_effects() -> HashMap<SoundEffect, ClipId> {
    SoundEffect::all()
        .into_iter()
        .map(|effect| (effect, ClipId::new(effect.to_string().to_lowercase())))
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Length of each crossfade ramp in milliseconds
    #[serde(default = "default_fade_duration_ms")]
    pub fade_duration_ms: u64,

    /// Effect channel pool sizing
    #[serde(default)]
    pub pool: PoolConfig,

    /// Track started by `initialize`
    #[serde(default)]
    pub default_music: Option<ClipId>,

    /// Clip played for each gameplay effect
    #[serde(default = "default_effects")]
    pub effects: HashMap<SoundEffect, ClipId>,

    /// Clip files to preload
    #[serde(default)]
    pub clips: Vec<ClipEntry>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let clip = |id: &str| ClipEntry {
            id: ClipId::new(id),
            path: format!("audio/{}.mp3", id),
            length_ms: None,
        };

        Self {
            fade_duration_ms: DEFAULT_FADE_MS,
            pool: PoolConfig::default(),
            default_music: Some(ClipId::new("main_theme")),
            effects: default_effects(),
            clips: vec![
                clip("main_theme"),
                clip("game_over"),
                clip("pop"),
                clip("swap"),
                clip("win"),
                clip("blast"),
            ],
        }
    }
}

impl EngineConfig {
    /// Load configuration from the app's config directory.
    /// Creates default config if file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let config = Self::load_from(&config_path)?;
            tracing::info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default config at: {}", config_path.display());
            Ok(config)
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let load_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::LoadFailed {
            path: path.display().to_string(),
            source,
        };

        let content = fs::read_to_string(path).map_err(|e| load_failed(Box::new(e)))?;
        let config: EngineConfig =
            serde_json::from_str(&content).map_err(|e| load_failed(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let save_failed = |source: Box<dyn std::error::Error + Send + Sync>| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|e| save_failed(Box::new(e)))?;
        fs::write(path, json).map_err(|e| save_failed(Box::new(e)))?;

        Ok(())
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fade_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "fade_duration_ms must be greater than 0".to_string(),
            ));
        }

        if self.pool.max_size == Some(0) {
            return Err(ConfigError::Invalid(
                "pool.max_size must be greater than 0 when set".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.clips {
            if !seen.insert(&entry.id) {
                return Err(ConfigError::Invalid(format!("duplicate clip id: {}", entry.id)));
            }
        }

        Ok(())
    }

    /// Length of each crossfade ramp
    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }

    /// Clip mapped to a gameplay effect
    pub fn effect_clip(&self, effect: SoundEffect) -> Option<&ClipId> {
        self.effects.get(&effect)
    }

    /// Preload every listed clip, resolving relative paths against `base_dir`
    ///
    /// Clips that fail to load are skipped and reported; playing them later is
    /// a no-op.
    pub fn load_clips(&self, base_dir: &Path) -> (ClipLibrary, Vec<AudioError>) {
        let mut library = ClipLibrary::new();
        let mut failures = Vec::new();

        for entry in &self.clips {
            let path = Self::resolve(base_dir, &entry.path);
            let length = entry.length_ms.map(Duration::from_millis);
            if let Err(e) = library.load_file(entry.id.clone(), &path, length) {
                tracing::warn!("Skipping clip {}: {}", entry.id, e);
                failures.push(e);
            }
        }

        (library, failures)
    }

    /// Get the config file path (in app's base directory)
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|_| ConfigError::NoConfigDir)?;
        let exe_dir = exe_path.parent().ok_or(ConfigError::NoConfigDir)?;

        Ok(exe_dir.join("config").join("audio.json"))
    }

    /// Get the config directory path (for display purposes)
    pub fn config_dir_display() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    fn resolve(base_dir: &Path, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.fade_duration(), Duration::from_millis(1000));
        assert_eq!(config.pool.seed_size, 5);
        assert_eq!(config.default_music, Some(ClipId::new("main_theme")));
        assert_eq!(config.effect_clip(SoundEffect::Blast), Some(&ClipId::new("blast")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.fade_duration_ms, deserialized.fade_duration_ms);
        assert_eq!(config.effects, deserialized.effects);
        assert_eq!(config.clips, deserialized.clips);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.fade_duration_ms, DEFAULT_FADE_MS);
        assert_eq!(config.pool, PoolConfig::default());
        assert_eq!(config.effects.len(), 4);
        assert!(config.default_music.is_none());
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig::default();
        config.fade_duration_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = EngineConfig::default();
        config.pool.max_size = Some(0);
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        let duplicate = config.clips[0].clone();
        config.clips.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("audio.json");

        let mut config = EngineConfig::default();
        config.fade_duration_ms = 750;
        config.pool.max_size = Some(12);
        config.save_to(&path).unwrap();

        let loaded = EngineConfig::load_from(&path).unwrap();
        assert_eq!(loaded.fade_duration_ms, 750);
        assert_eq!(loaded.pool.max_size, Some(12));
    }

    #[test]
    fn test_load_clips_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("audio")).unwrap();
        fs::write(dir.path().join("audio").join("pop.mp3"), [0u8; 8]).unwrap();

        let config = EngineConfig {
            clips: vec![
                ClipEntry {
                    id: ClipId::new("pop"),
                    path: "audio/pop.mp3".to_string(),
                    length_ms: Some(300),
                },
                ClipEntry {
                    id: ClipId::new("win"),
                    path: "audio/win.mp3".to_string(),
                    length_ms: None,
                },
            ],
            ..EngineConfig::default()
        };

        let (library, failures) = config.load_clips(dir.path());
        assert_eq!(library.len(), 1);
        assert_eq!(failures.len(), 1);
        let pop = library.get(&ClipId::new("pop")).unwrap();
        assert_eq!(pop.length(), Some(Duration::from_millis(300)));
    }
}
