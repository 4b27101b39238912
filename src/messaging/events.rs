/// Event types for the audio engine
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.

use crate::audio_system::clip::ClipId;
use crate::audio_system::source::{ChannelClass, SoundEffect};

/// Audio engine events
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// A one-shot effect started on a pool channel
    EffectPlayed {
        effect: SoundEffect,
        channel: usize,
        volume: f32,
    },

    /// Music started immediately
    MusicStarted { clip: ClipId },

    /// A crossfade began (or replaced an in-flight one)
    CrossfadeStarted { target: ClipId, preempted: bool },

    /// A crossfade finished with the target playing steadily
    CrossfadeCompleted { clip: ClipId },

    /// A volume scalar changed (stored value, after clamping)
    VolumeChanged { class: VolumeTarget, level: f32 },

    /// Mute was toggled
    MuteChanged { muted: bool },

    /// The effect pool created a new channel
    PoolGrew { size: usize },

    /// Preferences were flushed to storage
    SettingsSaved,
}

/// Which scalar of the volume hierarchy changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTarget {
    Master,
    Class(ChannelClass),
}

impl AudioEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            AudioEvent::EffectPlayed { effect, channel, volume } => {
                format!("{} on channel {} at {:.2}", effect, channel, volume)
            }
            AudioEvent::MusicStarted { clip } => format!("Music started: {}", clip),
            AudioEvent::CrossfadeStarted { target, preempted } => {
                if *preempted {
                    format!("Crossfade redirected to {}", target)
                } else {
                    format!("Crossfade to {}", target)
                }
            }
            AudioEvent::CrossfadeCompleted { clip } => format!("Crossfade complete: {}", clip),
            AudioEvent::VolumeChanged { class, level } => match class {
                VolumeTarget::Master => format!("Master volume: {:.2}", level),
                VolumeTarget::Class(class) => format!("{} volume: {:.2}", class, level),
            },
            AudioEvent::MuteChanged { muted } => {
                if *muted {
                    "Muted".to_string()
                } else {
                    "Unmuted".to_string()
                }
            }
            AudioEvent::PoolGrew { size } => format!("Effect pool grew to {}", size),
            AudioEvent::SettingsSaved => "Settings saved".to_string(),
        }
    }
}
