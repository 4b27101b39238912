/// Audio system module
///
/// Mixing for one looping music track plus any number of overlapping
/// one-shot effects:
/// - A three-level volume hierarchy (master x music, master x sfx) with mute
/// - A growable pool of effect channels
/// - Music switching with a fade-out / swap / fade-in crossfade
///
/// ## Architecture
///
/// ```text
/// AudioEngine
///   ├── VolumeModel
///   ├── MusicController ── music channel ─┐
///   ├── SourcePool                        │ ChannelBackend
///   │     └── effect channels ───────────┘ (virtual or rodio)
///   └── SettingsStore ── PreferenceStore
/// ```
///
/// ## Usage
///
/// ```rust,ignore
/// use candy_audio::audio_system::{AudioEngine, SoundEffect, VirtualBackend};
///
/// let mut engine = AudioEngine::new(backend, config, clips, store);
/// engine.initialize();
///
/// engine.play_effect(SoundEffect::Pop);
/// engine.play_music(Some(&ClipId::new("game_over")), true);
///
/// // Once per frame
/// engine.tick(frame_time);
/// ```
pub mod channel;
pub mod clip;
pub mod engine;
pub mod fade;
pub mod music;
#[cfg(feature = "rodio-output")]
pub mod player;
pub mod pool;
pub mod source;
pub mod volume;

// Re-export commonly used types
pub use channel::{ChannelBackend, PlaybackChannel, VirtualBackend, VirtualChannel};
pub use clip::{Clip, ClipId, ClipLibrary};
pub use engine::AudioEngine;
pub use fade::{Crossfade, FadePhase, Ramp};
pub use music::{MusicController, MusicState, MusicTransition};
#[cfg(feature = "rodio-output")]
pub use player::{RodioBackend, RodioChannel};
pub use pool::{AcquireKind, PoolConfig, SourcePool};
pub use source::{ChannelClass, SoundEffect};
pub use volume::VolumeModel;
