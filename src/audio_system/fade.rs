/// Crossfade ramps
///
/// A crossfade is two linear ramps of equal length: the playing clip fades
/// out to silence, the channel swaps to the target clip, and the target fades
/// in to the music volume. The ramps are plain values advanced by the engine
/// tick.

use std::time::Duration;

use super::clip::Clip;
use super::volume::{clamp_volume, lerp};

/// Default length of each crossfade ramp
pub const DEFAULT_FADE_MS: u64 = 1000;

/// Linear volume ramp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    start: f32,
    end: f32,
    elapsed: Duration,
    duration: Duration,
}

impl Ramp {
    pub fn new(start: f32, end: f32, duration: Duration) -> Self {
        Self {
            start,
            end,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    /// Advance by `dt`; returns the time left over past the end of the ramp
    pub fn advance(&mut self, dt: Duration) -> Duration {
        self.elapsed = self.elapsed.saturating_add(dt);
        self.elapsed.saturating_sub(self.duration)
    }

    /// Fraction of the ramp completed (0.0-1.0)
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Volume at the current position
    pub fn value(&self) -> f32 {
        lerp(self.start, self.end, self.progress())
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn set_start(&mut self, start: f32) {
        self.start = start;
    }

    pub fn set_end(&mut self, end: f32) {
        self.end = end;
    }
}

/// Which half of the crossfade is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadePhase {
    /// Old clip ramping down to silence
    FadeOut,

    /// Target clip ramping up to the music volume
    FadeIn,
}

/// An in-flight crossfade
#[derive(Debug, Clone)]
pub struct Crossfade {
    pub target: Clip,
    pub phase: FadePhase,
    pub ramp: Ramp,
    /// Effective music volume the ramp endpoints were computed for
    music_level: f32,
}

impl Crossfade {
    /// Begin fading out from `from_volume` toward a swap to `target`
    ///
    /// `music_level` is the effective music volume at this moment.
    pub fn begin(target: Clip, from_volume: f32, music_level: f32, duration: Duration) -> Self {
        Self {
            target,
            phase: FadePhase::FadeOut,
            ramp: Ramp::new(from_volume, 0.0, duration),
            music_level,
        }
    }

    /// Switch to the fade-in half, ramping from silence to `music_level`
    pub fn start_fade_in(&mut self, music_level: f32, duration: Duration) {
        self.phase = FadePhase::FadeIn;
        self.ramp = Ramp::new(0.0, music_level, duration);
        self.music_level = music_level;
    }

    pub fn music_level(&self) -> f32 {
        self.music_level
    }

    /// Follow a change of the effective music volume
    ///
    /// Fading out, the start scales with the volume so the level never
    /// rises; fading in, the end becomes the new volume. Unchanged volume
    /// leaves the ramp alone.
    pub fn retarget(&mut self, music_level: f32) {
        if music_level == self.music_level {
            return;
        }

        match self.phase {
            FadePhase::FadeOut => {
                // From silence there is nothing to scale; stay silent
                let start = if self.music_level > 0.0 {
                    self.ramp.start() * music_level / self.music_level
                } else {
                    self.ramp.start()
                };
                self.ramp.set_start(clamp_volume(start));
            }
            FadePhase::FadeIn => self.ramp.set_end(music_level),
        }
        self.music_level = music_level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_system::clip::ClipId;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn test_ramp_interpolates_linearly() {
        let mut ramp = Ramp::new(0.8, 0.0, Duration::from_millis(1000));
        assert_relative_eq!(ramp.value(), 0.8, epsilon = 1e-6);

        ramp.advance(Duration::from_millis(250));
        assert_relative_eq!(ramp.value(), 0.6, epsilon = 1e-6);
        assert!(!ramp.is_complete());

        ramp.advance(Duration::from_millis(750));
        assert_relative_eq!(ramp.value(), 0.0, epsilon = 1e-6);
        assert!(ramp.is_complete());
    }

    #[test]
    fn test_ramp_overflow() {
        let mut ramp = Ramp::new(0.0, 1.0, Duration::from_millis(100));
        assert_eq!(ramp.advance(Duration::from_millis(60)), Duration::ZERO);
        assert_eq!(ramp.advance(Duration::from_millis(60)), Duration::from_millis(20));
        assert_eq!(ramp.value(), 1.0);
    }

    #[test]
    fn test_zero_length_ramp_is_complete() {
        let ramp = Ramp::new(0.3, 0.9, Duration::ZERO);
        assert!(ramp.is_complete());
        assert_eq!(ramp.value(), 0.9);
    }

    #[test]
    fn test_ramp_advance_saturates() {
        let mut ramp = Ramp::new(0.5, 0.0, Duration::from_millis(100));
        ramp.advance(Duration::from_millis(50));
        ramp.advance(Duration::MAX);
        assert!(ramp.is_complete());
        assert_eq!(ramp.elapsed(), Duration::MAX);
        assert_eq!(ramp.value(), 0.0);
    }

    fn target() -> Clip {
        Clip::new(ClipId::new("game_over"), Arc::new(Vec::new()))
    }

    #[test]
    fn test_retarget_fade_out_scales_start() {
        // Preempted at a partial level of a 0.8 music volume
        let mut fade = Crossfade::begin(target(), 0.3, 0.8, Duration::from_secs(1));
        fade.retarget(0.4);
        assert_relative_eq!(fade.ramp.start(), 0.15, epsilon = 1e-6);
        assert_eq!(fade.ramp.end(), 0.0);
        assert_eq!(fade.music_level(), 0.4);
    }

    #[test]
    fn test_retarget_same_level_is_noop() {
        let mut fade = Crossfade::begin(target(), 0.3, 0.8, Duration::from_secs(1));
        fade.retarget(0.8);
        assert_eq!(fade.ramp.start(), 0.3);
    }

    #[test]
    fn test_retarget_from_silence_keeps_start() {
        let mut fade = Crossfade::begin(target(), 0.0, 0.0, Duration::from_secs(1));
        fade.retarget(0.6);
        assert_eq!(fade.ramp.start(), 0.0);
        assert_eq!(fade.music_level(), 0.6);
    }

    #[test]
    fn test_retarget_fade_in_moves_end() {
        let mut fade = Crossfade::begin(target(), 0.5, 0.5, Duration::from_secs(1));
        fade.start_fade_in(0.5, Duration::from_secs(1));
        fade.retarget(0.7);
        assert_eq!(fade.phase, FadePhase::FadeIn);
        assert_eq!(fade.ramp.start(), 0.0);
        assert_eq!(fade.ramp.end(), 0.7);
    }
}
