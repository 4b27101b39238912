/// Command types for the audio engine
///
/// Commands represent requests to perform actions (imperative). Gameplay and
/// UI code may send them from any thread; the engine executes them on its own
/// thread at the start of the next tick.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::audio_system::clip::ClipId;
use crate::audio_system::source::SoundEffect;

/// Audio engine commands
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Play a one-shot effect
    PlayEffect { effect: SoundEffect },

    /// Switch background music
    PlayMusic { clip: Option<ClipId>, fade: bool },

    SetMasterVolume { level: f32 },

    SetMusicVolume { level: f32 },

    SetSfxVolume { level: f32 },

    ToggleMute { muted: bool },

    /// Flush preferences to storage
    SaveSettings,
}

impl AudioCommand {
    /// Get a human-readable description of the command
    pub fn description(&self) -> String {
        match self {
            AudioCommand::PlayEffect { effect } => format!("Play effect {}", effect),
            AudioCommand::PlayMusic { clip, fade } => match clip {
                Some(clip) if *fade => format!("Crossfade music to {}", clip),
                Some(clip) => format!("Play music {}", clip),
                None => "Play music (no clip)".to_string(),
            },
            AudioCommand::SetMasterVolume { level } => format!("Set master volume {:.2}", level),
            AudioCommand::SetMusicVolume { level } => format!("Set music volume {:.2}", level),
            AudioCommand::SetSfxVolume { level } => format!("Set sfx volume {:.2}", level),
            AudioCommand::ToggleMute { muted } => format!("Set muted {}", muted),
            AudioCommand::SaveSettings => "Save settings".to_string(),
        }
    }
}

/// Cloneable handle for submitting commands to the engine
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<AudioCommand>,
}

impl CommandSender {
    /// Queue a command; returns false once the engine is gone
    pub fn send(&self, command: AudioCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    pub fn play_effect(&self, effect: SoundEffect) -> bool {
        self.send(AudioCommand::PlayEffect { effect })
    }

    pub fn play_music(&self, clip: impl Into<ClipId>, fade: bool) -> bool {
        self.send(AudioCommand::PlayMusic {
            clip: Some(clip.into()),
            fade,
        })
    }
}

/// Receiving end owned by the engine
#[derive(Debug)]
pub struct CommandQueue {
    tx: Sender<AudioCommand>,
    rx: Receiver<AudioCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Get a sender for submitting commands
    pub fn sender(&self) -> CommandSender {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every queued command, in submission order
    pub fn drain(&self) -> Vec<AudioCommand> {
        self.rx.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_preserves_order() {
        let queue = CommandQueue::new();
        let sender = queue.sender();

        assert!(sender.play_effect(SoundEffect::Pop));
        assert!(sender.send(AudioCommand::SetSfxVolume { level: 0.5 }));
        assert!(sender.play_music("game_over", true));
        assert_eq!(queue.pending(), 3);

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                AudioCommand::PlayEffect { effect: SoundEffect::Pop },
                AudioCommand::SetSfxVolume { level: 0.5 },
                AudioCommand::PlayMusic {
                    clip: Some(ClipId::new("game_over")),
                    fade: true,
                },
            ]
        );
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_sender_from_other_thread() {
        let queue = CommandQueue::new();
        let sender = queue.sender();

        std::thread::spawn(move || {
            sender.send(AudioCommand::ToggleMute { muted: true });
        })
        .join()
        .unwrap();

        assert_eq!(queue.drain(), vec![AudioCommand::ToggleMute { muted: true }]);
    }

    #[test]
    fn test_command_description() {
        let command = AudioCommand::PlayMusic {
            clip: Some(ClipId::new("main_theme")),
            fade: true,
        };
        assert_eq!(command.description(), "Crossfade music to main_theme");
        assert_eq!(AudioCommand::SaveSettings.description(), "Save settings");
    }
}
