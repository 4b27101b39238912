/// Audio engine facade
///
/// The one object gameplay and UI code talk to. It is created once by the
/// host, owned by the thread that ticks it, and reached by other code either
/// through `&mut` borrows or through a [`CommandSender`].

use std::time::Duration;

use super::channel::ChannelBackend;
use super::clip::{ClipId, ClipLibrary};
use super::music::{MusicController, MusicState, MusicTransition};
use super::pool::{AcquireKind, SourcePool};
use super::source::{ChannelClass, SoundEffect};
use super::volume::VolumeModel;
use crate::config::EngineConfig;
use crate::messaging::{AudioCommand, AudioEvent, CommandQueue, CommandSender, EventBus, VolumeTarget};
use crate::settings::store::error_chain;
use crate::settings::{PreferenceStore, Preferences, SettingsStore};

/// Audio engine
pub struct AudioEngine<B: ChannelBackend, S: PreferenceStore> {
    backend: B,
    config: EngineConfig,
    clips: ClipLibrary,
    volume: VolumeModel,
    pool: SourcePool<B::Channel>,
    music: MusicController<B::Channel>,
    store: S,
    commands: CommandQueue,
    events: EventBus,
    initialized: bool,
}

impl<B: ChannelBackend, S: PreferenceStore> AudioEngine<B, S> {
    /// Create an engine; nothing plays until [`initialize`](Self::initialize)
    pub fn new(mut backend: B, config: EngineConfig, clips: ClipLibrary, store: S) -> Self {
        let music_channel = backend.create_channel();
        let music = MusicController::new(music_channel, config.fade_duration());
        let pool = SourcePool::new(config.pool.max_size);

        Self {
            backend,
            config,
            clips,
            volume: VolumeModel::default(),
            pool,
            music,
            store,
            commands: CommandQueue::new(),
            events: EventBus::new(),
            initialized: false,
        }
    }

    /// Load preferences, seed the effect pool and start the default track
    ///
    /// Only the first call does anything.
    pub fn initialize(&mut self) {
        if self.initialized {
            tracing::debug!("Audio engine already initialized, ignoring");
            return;
        }

        let prefs = SettingsStore::load(&self.store);
        self.volume = prefs.to_volume();
        self.backend.set_output_muted(prefs.muted);
        self.pool.seed(&mut self.backend, self.config.pool.seed_size);
        self.initialized = true;

        tracing::info!(
            "Audio engine initialized: master={:.2} music={:.2} sfx={:.2} muted={} pool={} cap={:?}",
            prefs.master,
            prefs.music,
            prefs.sfx,
            prefs.muted,
            self.pool.len(),
            self.pool.max_size()
        );

        if let Some(track) = self.config.default_music.clone() {
            self.play_music(Some(&track), false);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Play a one-shot effect; returns the pool channel used
    ///
    /// Muted, or no clip for the effect: nothing is allocated.
    pub fn play_effect(&mut self, effect: SoundEffect) -> Option<usize> {
        if self.volume.is_muted() {
            tracing::debug!("Effect {} skipped while muted", effect);
            return None;
        }

        let Some(clip) = self
            .config
            .effect_clip(effect)
            .and_then(|id| self.clips.get(id))
        else {
            tracing::debug!("No clip loaded for effect {}", effect);
            return None;
        };

        let acquired = self.pool.acquire(&mut self.backend);
        let volume = self.volume.effective(effect.class());
        self.pool.start(acquired.index, clip, volume);

        tracing::debug!(
            "Playing {} ({}) on channel {} at {:.2}",
            effect,
            clip.id(),
            acquired.index,
            volume
        );

        if acquired.kind == AcquireKind::Grown {
            self.events.publish(AudioEvent::PoolGrew {
                size: self.pool.len(),
            });
        }
        self.events.publish(AudioEvent::EffectPlayed {
            effect,
            channel: acquired.index,
            volume,
        });

        Some(acquired.index)
    }

    /// Switch background music, crossfading when `fade` is set
    pub fn play_music(&mut self, clip: Option<&ClipId>, fade: bool) {
        let resolved = match clip.map(|id| self.clips.require(id)).transpose() {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!("Music request ignored: {}", e);
                None
            }
        };

        let transition = self.music.play(resolved, fade, &self.volume);
        self.publish_music(transition);
    }

    pub fn set_master_volume(&mut self, level: f32) {
        self.volume.set_master(level);
        self.after_volume_change(VolumeTarget::Master, self.volume.master());
    }

    pub fn set_music_volume(&mut self, level: f32) {
        self.volume.set_music(level);
        self.after_volume_change(
            VolumeTarget::Class(ChannelClass::Music),
            self.volume.music(),
        );
    }

    pub fn set_sfx_volume(&mut self, level: f32) {
        self.volume.set_sfx(level);
        self.after_volume_change(
            VolumeTarget::Class(ChannelClass::Effect),
            self.volume.sfx(),
        );
    }

    /// Mute or unmute everything, including the listener-level output
    pub fn toggle_mute(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.backend.set_output_muted(muted);
        self.refresh_channels();
        self.stage_preferences();

        tracing::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        self.events.publish(AudioEvent::MuteChanged { muted });
    }

    /// Flush preferences to storage
    ///
    /// Failures are logged and otherwise ignored.
    pub fn save_settings(&mut self) {
        let prefs = self.preferences();
        match SettingsStore::save(&mut self.store, &prefs) {
            Ok(()) => {
                tracing::info!("Audio settings saved");
                self.events.publish(AudioEvent::SettingsSaved);
            }
            Err(e) => tracing::warn!("{}: {}", e, error_chain(&e)),
        }
    }

    /// Current preferences, e.g. to initialize settings sliders
    pub fn preferences(&self) -> Preferences {
        Preferences::from_volume(&self.volume)
    }

    /// Advance one frame: run queued commands, then playback and crossfade
    pub fn tick(&mut self, dt: Duration) {
        self.process_commands();

        self.pool.advance(dt);
        self.music.advance_channel(dt);

        for transition in self.music.tick(dt, &self.volume) {
            self.publish_music(transition);
        }
    }

    /// Execute every queued command in submission order
    pub fn process_commands(&mut self) -> usize {
        let commands = self.commands.drain();
        let count = commands.len();
        for command in commands {
            self.execute(command);
        }
        count
    }

    /// Execute a single command now
    pub fn execute(&mut self, command: AudioCommand) {
        tracing::trace!("Executing command: {}", command.description());
        match command {
            AudioCommand::PlayEffect { effect } => {
                self.play_effect(effect);
            }
            AudioCommand::PlayMusic { clip, fade } => self.play_music(clip.as_ref(), fade),
            AudioCommand::SetMasterVolume { level } => self.set_master_volume(level),
            AudioCommand::SetMusicVolume { level } => self.set_music_volume(level),
            AudioCommand::SetSfxVolume { level } => self.set_sfx_volume(level),
            AudioCommand::ToggleMute { muted } => self.toggle_mute(muted),
            AudioCommand::SaveSettings => self.save_settings(),
        }
    }

    /// Handle for queueing commands from other code or threads
    pub fn command_sender(&self) -> CommandSender {
        self.commands.sender()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Stop all playback (teardown)
    pub fn shutdown(&mut self) {
        self.music.stop();
        self.pool.stop_all();
        tracing::info!("Audio engine stopped");
    }

    pub fn volume(&self) -> &VolumeModel {
        &self.volume
    }

    /// Number of effect channels created so far
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn busy_effects(&self) -> usize {
        self.pool.busy_count()
    }

    pub fn pool(&self) -> &SourcePool<B::Channel> {
        &self.pool
    }

    pub fn music(&self) -> &MusicController<B::Channel> {
        &self.music
    }

    pub fn music_state(&self) -> &MusicState {
        self.music.state()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clips(&self) -> &ClipLibrary {
        &self.clips
    }

    fn after_volume_change(&mut self, class: VolumeTarget, level: f32) {
        self.refresh_channels();
        self.stage_preferences();
        tracing::debug!("Volume {:?} set to {:.2}", class, level);
        self.events.publish(AudioEvent::VolumeChanged { class, level });
    }

    /// Push effective volumes to the music channel and busy effect channels
    fn refresh_channels(&mut self) {
        self.music.refresh(&self.volume);
        let refreshed = self
            .pool
            .refresh_busy(self.volume.effective(ChannelClass::Effect));
        tracing::trace!("Refreshed {} busy effect channels", refreshed);
    }

    /// Write current preferences to the store without flushing
    fn stage_preferences(&mut self) {
        let prefs = self.preferences();
        SettingsStore::stage(&mut self.store, &prefs);
    }

    fn publish_music(&self, transition: MusicTransition) {
        let event = match transition {
            MusicTransition::Started(clip) => AudioEvent::MusicStarted { clip },
            MusicTransition::CrossfadeStarted(target) => AudioEvent::CrossfadeStarted {
                target,
                preempted: false,
            },
            MusicTransition::CrossfadeRestarted(target) => AudioEvent::CrossfadeStarted {
                target,
                preempted: true,
            },
            MusicTransition::CrossfadeCompleted(clip) => AudioEvent::CrossfadeCompleted { clip },
            MusicTransition::Ignored | MusicTransition::Swapped(_) => return,
        };
        self.events.publish(event);
    }
}
