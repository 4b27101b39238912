/// Settings persistence module
///
/// Audio preferences survive across sessions through a key-value
/// [`PreferenceStore`]. [`SettingsStore`] is the only code that reads or
/// writes the audio keys:
///
/// | Key         | Type  | Default |
/// |-------------|-------|---------|
/// | `MasterVol` | float | 0.8     |
/// | `MusicVol`  | float | 0.7     |
/// | `SFXVol`    | float | 0.9     |
/// | `Muted`     | int   | 0       |

pub mod preferences;
pub mod store;

pub use preferences::{Preferences, SettingsStore};
pub use store::{JsonPreferenceStore, MemoryPreferenceStore, PreferenceStore};
