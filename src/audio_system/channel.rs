/// Playback channels
///
/// A channel is one concurrent output slot emitting one clip at a time. The
/// engine only talks to channels through [`PlaybackChannel`], and only creates
/// them through a [`ChannelBackend`], so the same pool and music logic drives
/// the real output device and the headless virtual device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::clip::{Clip, ClipId};

/// One output slot
pub trait PlaybackChannel {
    /// Start playing `clip` from the beginning, replacing whatever was playing
    fn play(&mut self, clip: &Clip, looping: bool);

    /// Stop playback and release the clip
    fn stop(&mut self);

    /// Whether the channel is currently emitting sound
    fn is_busy(&self) -> bool;

    /// Set the channel volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    /// Last volume assigned to the channel
    fn volume(&self) -> f32;

    /// Clip currently assigned to the channel
    fn clip_id(&self) -> Option<&ClipId>;

    /// Advance the channel's playback clock by one tick
    fn advance(&mut self, _dt: Duration) {}
}

/// Factory for channels on one output device
pub trait ChannelBackend {
    type Channel: PlaybackChannel;

    /// Whether playback runs against the wall clock
    const REAL_TIME: bool = false;

    /// Create a new idle channel
    fn create_channel(&mut self) -> Self::Channel;

    /// Listener-level mute applied on top of every channel volume
    fn set_output_muted(&mut self, muted: bool);

    fn is_output_muted(&self) -> bool;
}

/// Headless output device
///
/// Channels keep a playback clock advanced by the engine tick. A one-shot
/// clip stops being busy once its length has elapsed; clips without a known
/// length use the backend's default one-shot length.
#[derive(Debug, Clone)]
pub struct VirtualBackend {
    default_length: Duration,
    output_muted: Arc<AtomicBool>,
    created: usize,
}

impl VirtualBackend {
    /// Default one-shot length for clips without a known length
    pub const DEFAULT_ONE_SHOT: Duration = Duration::from_millis(500);

    pub fn new() -> Self {
        Self {
            default_length: Self::DEFAULT_ONE_SHOT,
            output_muted: Arc::new(AtomicBool::new(false)),
            created: 0,
        }
    }

    /// Override the length used for clips without a known length
    pub fn with_default_length(mut self, length: Duration) -> Self {
        self.default_length = length;
        self
    }

    /// Number of channels created so far
    pub fn created_count(&self) -> usize {
        self.created
    }
}

impl Default for VirtualBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelBackend for VirtualBackend {
    type Channel = VirtualChannel;

    fn create_channel(&mut self) -> VirtualChannel {
        self.created += 1;
        tracing::trace!("Created virtual channel #{}", self.created);
        VirtualChannel {
            clip: None,
            volume: 1.0,
            looping: false,
            playing: false,
            position: Duration::ZERO,
            length: self.default_length,
            default_length: self.default_length,
            output_muted: Arc::clone(&self.output_muted),
            play_count: 0,
        }
    }

    fn set_output_muted(&mut self, muted: bool) {
        self.output_muted.store(muted, Ordering::Relaxed);
    }

    fn is_output_muted(&self) -> bool {
        self.output_muted.load(Ordering::Relaxed)
    }
}

/// Channel of the [`VirtualBackend`]
#[derive(Debug)]
pub struct VirtualChannel {
    clip: Option<ClipId>,
    volume: f32,
    looping: bool,
    playing: bool,
    position: Duration,
    length: Duration,
    default_length: Duration,
    output_muted: Arc<AtomicBool>,
    play_count: u32,
}

impl VirtualChannel {
    /// Volume actually reaching the listener after listener-level mute
    pub fn output_volume(&self) -> f32 {
        if self.output_muted.load(Ordering::Relaxed) {
            0.0
        } else {
            self.volume
        }
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Playback position within the current clip
    pub fn position(&self) -> Duration {
        self.position
    }

    /// How many times playback was started on this channel
    pub fn play_count(&self) -> u32 {
        self.play_count
    }
}

impl PlaybackChannel for VirtualChannel {
    fn play(&mut self, clip: &Clip, looping: bool) {
        self.clip = Some(clip.id().clone());
        self.length = clip.length().unwrap_or(self.default_length);
        self.looping = looping;
        self.position = Duration::ZERO;
        self.playing = true;
        self.play_count += 1;
    }

    fn stop(&mut self) {
        self.playing = false;
        self.position = Duration::ZERO;
    }

    fn is_busy(&self) -> bool {
        self.playing
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn clip_id(&self) -> Option<&ClipId> {
        self.clip.as_ref()
    }

    fn advance(&mut self, dt: Duration) {
        if !self.playing {
            return;
        }
        self.position = self.position.saturating_add(dt);
        if self.position >= self.length {
            if self.looping && !self.length.is_zero() {
                let length = self.length.as_nanos();
                let wrapped = self.position.as_nanos() % length;
                self.position = Duration::from_nanos(wrapped as u64);
            } else {
                self.playing = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(id: &str, length_ms: u64) -> Clip {
        Clip::new(ClipId::new(id), Arc::new(Vec::new()))
            .with_length(Duration::from_millis(length_ms))
    }

    #[test]
    fn test_new_channel_is_idle() {
        let mut backend = VirtualBackend::new();
        let channel = backend.create_channel();
        assert!(!channel.is_busy());
        assert!(channel.clip_id().is_none());
        assert_eq!(backend.created_count(), 1);
    }

    #[test]
    fn test_one_shot_finishes_after_length() {
        let mut backend = VirtualBackend::new();
        let mut channel = backend.create_channel();
        channel.play(&clip("pop", 100), false);
        assert!(channel.is_busy());

        channel.advance(Duration::from_millis(60));
        assert!(channel.is_busy());

        channel.advance(Duration::from_millis(60));
        assert!(!channel.is_busy());
    }

    #[test]
    fn test_looping_stays_busy() {
        let mut backend = VirtualBackend::new();
        let mut channel = backend.create_channel();
        channel.play(&clip("theme", 100), true);

        channel.advance(Duration::from_millis(250));
        assert!(channel.is_busy());
        assert_eq!(channel.position(), Duration::from_millis(50));
    }

    #[test]
    fn test_unknown_length_uses_default() {
        let mut backend = VirtualBackend::new().with_default_length(Duration::from_millis(10));
        let mut channel = backend.create_channel();
        let unsized_clip = Clip::new(ClipId::new("blast"), Arc::new(Vec::new()));
        channel.play(&unsized_clip, false);

        channel.advance(Duration::from_millis(10));
        assert!(!channel.is_busy());
    }

    #[test]
    fn test_huge_advance_saturates() {
        let mut backend = VirtualBackend::new();
        let mut channel = backend.create_channel();
        channel.play(&clip("theme", 1000), true);
        channel.advance(Duration::from_millis(400));
        channel.advance(Duration::MAX);
        assert!(channel.is_busy());
        assert!(channel.position() < Duration::from_millis(1000));

        channel.play(&clip("pop", 200), false);
        channel.advance(Duration::MAX);
        assert!(!channel.is_busy());
    }

    #[test]
    fn test_volume_clamped() {
        let mut backend = VirtualBackend::new();
        let mut channel = backend.create_channel();
        channel.set_volume(1.5);
        assert_eq!(channel.volume(), 1.0);
        channel.set_volume(-0.5);
        assert_eq!(channel.volume(), 0.0);
    }

    #[test]
    fn test_output_mute_is_shared() {
        let mut backend = VirtualBackend::new();
        let mut channel = backend.create_channel();
        channel.set_volume(0.6);

        backend.set_output_muted(true);
        assert!(backend.is_output_muted());
        assert_eq!(channel.output_volume(), 0.0);
        assert_eq!(channel.volume(), 0.6);

        backend.set_output_muted(false);
        assert_eq!(channel.output_volume(), 0.6);
    }
}
