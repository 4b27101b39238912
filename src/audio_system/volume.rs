/// Volume hierarchy
///
/// Master, music and effect scalars plus a mute flag. Channels never store a
/// class volume of their own; they are always assigned the effective volume
/// computed here.

use super::source::ChannelClass;

/// Clamp a volume into 0.0-1.0, mapping NaN to silence
pub fn clamp_volume(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Linear interpolation between two volumes, `t` clamped to 0.0-1.0
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    start * (1.0 - t) + end * t
}

/// Volume model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeModel {
    master: f32,
    music: f32,
    sfx: f32,
    muted: bool,
}

impl VolumeModel {
    /// Create a volume model from raw scalars (clamped)
    pub fn new(master: f32, music: f32, sfx: f32) -> Self {
        Self {
            master: clamp_volume(master),
            music: clamp_volume(music),
            sfx: clamp_volume(sfx),
            muted: false,
        }
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    pub fn music(&self) -> f32 {
        self.music
    }

    pub fn sfx(&self) -> f32 {
        self.sfx
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_master(&mut self, level: f32) {
        self.master = clamp_volume(level);
    }

    pub fn set_music(&mut self, level: f32) {
        self.music = clamp_volume(level);
    }

    pub fn set_sfx(&mut self, level: f32) {
        self.sfx = clamp_volume(level);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Raw class scalar, before master and mute
    pub fn raw(&self, class: ChannelClass) -> f32 {
        match class {
            ChannelClass::Music => self.music,
            ChannelClass::Effect => self.sfx,
        }
    }

    /// Volume to assign to a channel of `class`
    pub fn effective(&self, class: ChannelClass) -> f32 {
        if self.muted {
            return 0.0;
        }
        self.raw(class) * self.master
    }
}

impl Default for VolumeModel {
    fn default() -> Self {
        Self {
            master: 1.0,
            music: 1.0,
            sfx: 1.0,
            muted: false,
        }
    }
}
