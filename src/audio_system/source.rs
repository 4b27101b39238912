/// Sound categories
///
/// Logical effect identifiers raised by gameplay, and the channel classes
/// the volume hierarchy distinguishes.
use std::fmt;

use serde::{Deserialize, Serialize};

/// One-shot sound effects triggered by gameplay events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundEffect {
    /// Candies cleared by a match
    Pop,

    /// Two tiles swapped
    Swap,

    /// Level goal reached
    Win,

    /// Special candy detonated
    Blast,
}

impl fmt::Display for SoundEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundEffect::Pop => write!(f, "Pop"),
            SoundEffect::Swap => write!(f, "Swap"),
            SoundEffect::Win => write!(f, "Win"),
            SoundEffect::Blast => write!(f, "Blast"),
        }
    }
}

impl SoundEffect {
    /// All effects, in declaration order
    pub fn all() -> [SoundEffect; 4] {
        [
            SoundEffect::Pop,
            SoundEffect::Swap,
            SoundEffect::Win,
            SoundEffect::Blast,
        ]
    }

    /// The class whose volume scalar applies to this effect
    pub fn class(&self) -> ChannelClass {
        ChannelClass::Effect
    }
}

/// Volume class of a playback channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelClass {
    /// The dedicated background-music channel
    Music,

    /// Pooled one-shot effect channels
    Effect,
}

impl fmt::Display for ChannelClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelClass::Music => write!(f, "Music"),
            ChannelClass::Effect => write!(f, "Effect"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_display() {
        assert_eq!(SoundEffect::Pop.to_string(), "Pop");
        assert_eq!(SoundEffect::Blast.to_string(), "Blast");
    }

    #[test]
    fn test_effects_use_effect_class() {
        for effect in SoundEffect::all() {
            assert_eq!(effect.class(), ChannelClass::Effect);
        }
    }

    #[test]
    fn test_effect_serde_names() {
        let json = serde_json::to_string(&SoundEffect::Swap).unwrap();
        assert_eq!(json, "\"swap\"");

        let parsed: SoundEffect = serde_json::from_str("\"win\"").unwrap();
        assert_eq!(parsed, SoundEffect::Win);
    }
}
