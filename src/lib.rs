//! Candy Pop Blast audio engine
//!
//! Music with crossfades, pooled one-shot effects, a master/music/sfx volume
//! hierarchy with mute, and persisted audio preferences.

pub mod audio_system;
pub mod config;
pub mod error;
pub mod messaging;
pub mod settings;

pub use audio_system::{AudioEngine, ClipId, ClipLibrary, SoundEffect, VirtualBackend};
pub use config::EngineConfig;
pub use error::{AppResult, AudioError, ConfigError, SettingsError};
pub use settings::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore, Preferences};
