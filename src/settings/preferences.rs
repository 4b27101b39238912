/// Audio preferences persistence
///
/// Maps the four persisted audio preferences onto fixed store keys.

use crate::audio_system::volume::{clamp_volume, VolumeModel};
use crate::error::SettingsError;

use super::store::PreferenceStore;

pub const MASTER_KEY: &str = "MasterVol";
pub const MUSIC_KEY: &str = "MusicVol";
pub const SFX_KEY: &str = "SFXVol";
pub const MUTED_KEY: &str = "Muted";

/// Persisted audio preferences
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preferences {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
    pub muted: bool,
}

impl Preferences {
    pub const DEFAULT_MASTER: f32 = 0.8;
    pub const DEFAULT_MUSIC: f32 = 0.7;
    pub const DEFAULT_SFX: f32 = 0.9;

    /// Snapshot of a volume model
    pub fn from_volume(volume: &VolumeModel) -> Self {
        Self {
            master: volume.master(),
            music: volume.music(),
            sfx: volume.sfx(),
            muted: volume.is_muted(),
        }
    }

    /// Build the volume model these preferences describe
    pub fn to_volume(&self) -> VolumeModel {
        let mut volume = VolumeModel::new(self.master, self.music, self.sfx);
        volume.set_muted(self.muted);
        volume
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            master: Self::DEFAULT_MASTER,
            music: Self::DEFAULT_MUSIC,
            sfx: Self::DEFAULT_SFX,
            muted: false,
        }
    }
}

/// Stateless adapter between [`Preferences`] and a [`PreferenceStore`]
pub struct SettingsStore;

impl SettingsStore {
    /// Read preferences, substituting defaults for missing keys
    pub fn load(store: &dyn PreferenceStore) -> Preferences {
        let prefs = Preferences {
            master: clamp_volume(store.get_float(MASTER_KEY, Preferences::DEFAULT_MASTER)),
            music: clamp_volume(store.get_float(MUSIC_KEY, Preferences::DEFAULT_MUSIC)),
            sfx: clamp_volume(store.get_float(SFX_KEY, Preferences::DEFAULT_SFX)),
            muted: store.get_int(MUTED_KEY, 0) != 0,
        };
        tracing::debug!("Loaded audio preferences: {:?}", prefs);
        prefs
    }

    /// Write all keys without flushing
    pub fn stage(store: &mut dyn PreferenceStore, prefs: &Preferences) {
        store.set_float(MASTER_KEY, prefs.master);
        store.set_float(MUSIC_KEY, prefs.music);
        store.set_float(SFX_KEY, prefs.sfx);
        store.set_int(MUTED_KEY, i32::from(prefs.muted));
    }

    /// Write all keys and flush the store
    pub fn save(store: &mut dyn PreferenceStore, prefs: &Preferences) -> Result<(), SettingsError> {
        Self::stage(store, prefs);
        store.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::store::MemoryPreferenceStore;

    #[test]
    fn test_defaults_when_empty() {
        let store = MemoryPreferenceStore::new();
        let prefs = SettingsStore::load(&store);
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.master, 0.8);
        assert_eq!(prefs.music, 0.7);
        assert_eq!(prefs.sfx, 0.9);
        assert!(!prefs.muted);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = MemoryPreferenceStore::new();
        let prefs = Preferences {
            master: 0.5,
            music: 0.0,
            sfx: 1.0,
            muted: true,
        };

        SettingsStore::save(&mut store, &prefs).unwrap();
        assert_eq!(SettingsStore::load(&store), prefs);
        assert_eq!(store.flush_count(), 1);
    }

    #[test]
    fn test_muted_layout_is_int() {
        let mut store = MemoryPreferenceStore::new();
        let prefs = Preferences {
            muted: true,
            ..Preferences::default()
        };
        SettingsStore::stage(&mut store, &prefs);

        assert_eq!(store.get_int(MUTED_KEY, 0), 1);
        assert_eq!(store.flush_count(), 0);
    }

    #[test]
    fn test_partial_store_fills_defaults() {
        let mut store = MemoryPreferenceStore::new();
        store.set_float(MUSIC_KEY, 0.3);

        let prefs = SettingsStore::load(&store);
        assert_eq!(prefs.music, 0.3);
        assert_eq!(prefs.master, Preferences::DEFAULT_MASTER);
    }

    #[test]
    fn test_out_of_range_values_clamped_on_load() {
        let mut store = MemoryPreferenceStore::new();
        store.set_float(MASTER_KEY, 4.0);
        store.set_float(SFX_KEY, -1.0);

        let prefs = SettingsStore::load(&store);
        assert_eq!(prefs.master, 1.0);
        assert_eq!(prefs.sfx, 0.0);
    }

    #[test]
    fn test_volume_conversion() {
        let prefs = Preferences {
            master: 0.6,
            music: 0.5,
            sfx: 0.4,
            muted: true,
        };
        let volume = prefs.to_volume();
        assert!(volume.is_muted());
        assert_eq!(Preferences::from_volume(&volume), prefs);
    }
}
