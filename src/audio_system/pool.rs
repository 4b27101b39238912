/// Sound-effect channel pool
///
/// Channels are handed out in creation order: the first idle channel wins.
/// When every channel is busy the pool grows by exactly one channel. The pool
/// never shrinks. An optional cap turns growth into reuse of the channel whose
/// playback started earliest.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::channel::{ChannelBackend, PlaybackChannel};
use super::clip::Clip;

/// Pool sizing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Idle channels created up front
    #[serde(default = "default_seed_size")]
    pub seed_size: usize,

    /// Upper bound on pool size; `None` grows without limit
    #[serde(default)]
    pub max_size: Option<usize>,
}

fn default_seed_size() -> usize {
    5
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            seed_size: default_seed_size(),
            max_size: None,
        }
    }
}

/// How a channel was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireKind {
    /// An existing idle channel
    Idle,
    /// A newly created channel appended to the pool
    Grown,
    /// The oldest busy channel, stopped and reassigned (capped pools only)
    Reused,
}

/// Result of [`SourcePool::acquire`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Acquisition {
    pub index: usize,
    pub kind: AcquireKind,
}

struct Slot<C> {
    channel: C,
    /// Sequence number of the last playback started on this slot
    started: u64,
}

/// Growable pool of effect channels
pub struct SourcePool<C> {
    slots: Vec<Slot<C>>,
    max_size: Option<usize>,
    next_start: u64,
}

impl<C: PlaybackChannel> SourcePool<C> {
    /// Create an empty pool
    pub fn new(max_size: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            max_size,
            next_start: 0,
        }
    }

    /// Create a pool seeded according to `config`
    pub fn with_config<B>(backend: &mut B, config: &PoolConfig) -> Self
    where
        B: ChannelBackend<Channel = C>,
    {
        let mut pool = Self::new(config.max_size);
        pool.seed(backend, config.seed_size);
        pool
    }

    /// Grow the pool to at least `size` idle channels (bounded by the cap)
    pub fn seed<B>(&mut self, backend: &mut B, size: usize)
    where
        B: ChannelBackend<Channel = C>,
    {
        let target = match self.max_size {
            Some(max) => size.min(max),
            None => size,
        };
        while self.slots.len() < target {
            self.push(backend.create_channel());
        }
        tracing::debug!("Effect pool seeded with {} channels", self.slots.len());
    }

    /// Hand out a channel for a new one-shot
    pub fn acquire<B>(&mut self, backend: &mut B) -> Acquisition
    where
        B: ChannelBackend<Channel = C>,
    {
        if let Some(index) = self.slots.iter().position(|s| !s.channel.is_busy()) {
            return Acquisition {
                index,
                kind: AcquireKind::Idle,
            };
        }

        let at_cap = self.max_size.is_some_and(|max| self.slots.len() >= max);
        if at_cap {
            if let Some(index) = self.oldest_busy() {
                self.slots[index].channel.stop();
                tracing::debug!("Effect pool at cap, reusing channel {}", index);
                return Acquisition {
                    index,
                    kind: AcquireKind::Reused,
                };
            }
        }

        self.push(backend.create_channel());
        let index = self.slots.len() - 1;
        tracing::debug!("Effect pool grew to {} channels", self.slots.len());
        Acquisition {
            index,
            kind: AcquireKind::Grown,
        }
    }

    /// Start a one-shot on an acquired channel
    pub fn start(&mut self, index: usize, clip: &Clip, volume: f32) {
        let started = self.next_start;
        if let Some(slot) = self.slots.get_mut(index) {
            slot.channel.set_volume(volume);
            slot.channel.play(clip, false);
            slot.started = started;
            self.next_start += 1;
        }
    }

    /// Re-apply `volume` to every busy channel; idle channels are left alone
    pub fn refresh_busy(&mut self, volume: f32) -> usize {
        let mut refreshed = 0;
        for slot in self.slots.iter_mut().filter(|s| s.channel.is_busy()) {
            slot.channel.set_volume(volume);
            refreshed += 1;
        }
        refreshed
    }

    /// Advance every channel's playback clock
    pub fn advance(&mut self, dt: Duration) {
        for slot in &mut self.slots {
            slot.channel.advance(dt);
        }
    }

    /// Stop every channel (teardown)
    pub fn stop_all(&mut self) {
        for slot in &mut self.slots {
            slot.channel.stop();
        }
    }

    pub fn channel(&self, index: usize) -> Option<&C> {
        self.slots.get(index).map(|s| &s.channel)
    }

    /// Number of channels ever created
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn busy_count(&self) -> usize {
        self.slots.iter().filter(|s| s.channel.is_busy()).count()
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    fn push(&mut self, channel: C) {
        self.slots.push(Slot {
            channel,
            started: 0,
        });
    }

    fn oldest_busy(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.channel.is_busy())
            .min_by_key(|(_, s)| s.started)
            .map(|(i, _)| i)
    }
}
