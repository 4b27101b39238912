/// Background music controller
///
/// Owns the single music channel and the crossfade state machine:
///
/// ```text
/// Idle ──play──> PlayingSteady ──play(fade)──> CrossFading ──tick…──> PlayingSteady
///                      ^                           │  │
///                      └──────play(no fade)────────┘  └─play(fade): restart toward new target
/// ```

use std::time::Duration;

use super::channel::PlaybackChannel;
use super::clip::{Clip, ClipId};
use super::fade::{Crossfade, FadePhase};
use super::source::ChannelClass;
use super::volume::VolumeModel;

/// Music playback state
#[derive(Debug, Clone)]
pub enum MusicState {
    /// No clip loaded
    Idle,

    /// Clip looping at the effective music volume
    PlayingSteady,

    /// Transition to another clip in progress
    CrossFading(Crossfade),
}

impl MusicState {
    pub fn is_idle(&self) -> bool {
        matches!(self, MusicState::Idle)
    }

    pub fn is_steady(&self) -> bool {
        matches!(self, MusicState::PlayingSteady)
    }

    pub fn is_crossfading(&self) -> bool {
        matches!(self, MusicState::CrossFading(_))
    }

    /// Get a human-readable description of the state
    pub fn description(&self) -> &'static str {
        match self {
            MusicState::Idle => "Idle",
            MusicState::PlayingSteady => "Playing",
            MusicState::CrossFading(fade) => match fade.phase {
                FadePhase::FadeOut => "Fading out",
                FadePhase::FadeIn => "Fading in",
            },
        }
    }
}

/// What a music call or tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicTransition {
    /// Missing clip or muted; nothing changed
    Ignored,

    /// Clip started immediately
    Started(ClipId),

    /// Crossfade toward the clip began
    CrossfadeStarted(ClipId),

    /// In-flight crossfade replaced by one toward the clip
    CrossfadeRestarted(ClipId),

    /// Channel swapped to the target clip at silence
    Swapped(ClipId),

    /// Crossfade finished with the clip playing steadily
    CrossfadeCompleted(ClipId),
}

/// Music channel plus crossfade state machine
pub struct MusicController<C> {
    channel: C,
    current: Option<Clip>,
    state: MusicState,
    fade_duration: Duration,
}

impl<C: PlaybackChannel> MusicController<C> {
    pub fn new(channel: C, fade_duration: Duration) -> Self {
        Self {
            channel,
            current: None,
            state: MusicState::Idle,
            fade_duration,
        }
    }

    /// Play `clip`, crossfading from the current clip when `fade` is set
    pub fn play(&mut self, clip: Option<&Clip>, fade: bool, volume: &VolumeModel) -> MusicTransition {
        let Some(clip) = clip else {
            tracing::debug!("Music request without clip ignored");
            return MusicTransition::Ignored;
        };
        if volume.is_muted() {
            tracing::debug!("Music request for {} ignored while muted", clip.id());
            return MusicTransition::Ignored;
        }

        if !fade || self.state.is_idle() {
            self.start_now(clip, volume);
            return MusicTransition::Started(clip.id().clone());
        }

        let preempted = self.state.is_crossfading();
        if preempted {
            // Exactly one fade: the new one starts from where the old one is now
            tracing::info!("Crossfade preempted, now fading to {}", clip.id());
        } else {
            tracing::info!(
                "Crossfading music to {} over {}ms per ramp",
                clip.id(),
                self.fade_duration.as_millis()
            );
        }
        self.state = MusicState::CrossFading(Crossfade::begin(
            clip.clone(),
            self.channel.volume(),
            volume.effective(ChannelClass::Music),
            self.fade_duration,
        ));

        if preempted {
            MusicTransition::CrossfadeRestarted(clip.id().clone())
        } else {
            MusicTransition::CrossfadeStarted(clip.id().clone())
        }
    }

    /// Advance the crossfade by one tick
    pub fn tick(&mut self, dt: Duration, volume: &VolumeModel) -> Vec<MusicTransition> {
        let mut transitions = Vec::new();
        let MusicState::CrossFading(fade) = &mut self.state else {
            return transitions;
        };

        let overflow = fade.ramp.advance(dt);
        self.channel.set_volume(fade.ramp.value());

        if fade.phase == FadePhase::FadeOut && fade.ramp.is_complete() {
            let target = fade.target.clone();
            self.channel.stop();
            self.channel.play(&target, true);
            fade.start_fade_in(volume.effective(ChannelClass::Music), self.fade_duration);
            fade.ramp.advance(overflow);
            self.channel.set_volume(fade.ramp.value());

            tracing::debug!("Music swapped to {}", target.id());
            transitions.push(MusicTransition::Swapped(target.id().clone()));
            self.current = Some(target);
        }

        if fade.phase == FadePhase::FadeIn && fade.ramp.is_complete() {
            let end = fade.ramp.end();
            self.state = MusicState::PlayingSteady;
            self.channel.set_volume(end);

            if let Some(current) = &self.current {
                tracing::info!("Crossfade to {} complete", current.id());
                transitions.push(MusicTransition::CrossfadeCompleted(current.id().clone()));
            }
        }

        transitions
    }

    /// Re-apply the music volume after a volume or mute change
    ///
    /// Steady playback takes the new volume at once. During a crossfade only
    /// the ramp endpoints move, unless muted: mute silences immediately.
    pub fn refresh(&mut self, volume: &VolumeModel) {
        let effective = volume.effective(ChannelClass::Music);
        match &mut self.state {
            MusicState::Idle => {}
            MusicState::PlayingSteady => self.channel.set_volume(effective),
            MusicState::CrossFading(fade) => {
                fade.retarget(effective);
                if volume.is_muted() {
                    self.channel.set_volume(0.0);
                }
            }
        }
    }

    /// Stop music and return to idle
    pub fn stop(&mut self) {
        self.channel.stop();
        self.current = None;
        self.state = MusicState::Idle;
    }

    pub fn advance_channel(&mut self, dt: Duration) {
        self.channel.advance(dt);
    }

    pub fn state(&self) -> &MusicState {
        &self.state
    }

    /// Clip currently on the music channel
    pub fn current_clip(&self) -> Option<&ClipId> {
        self.current.as_ref().map(|c| c.id())
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    fn start_now(&mut self, clip: &Clip, volume: &VolumeModel) {
        if self.state.is_crossfading() {
            tracing::debug!("Crossfade cancelled by immediate music change");
        }
        self.channel.stop();
        self.channel.set_volume(volume.effective(ChannelClass::Music));
        self.channel.play(clip, true);
        self.current = Some(clip.clone());
        self.state = MusicState::PlayingSteady;
        tracing::info!("Music started: {}", clip.id());
    }
}
