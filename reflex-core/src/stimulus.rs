use serde::{Deserialize, Serialize};

/// What the player is expected to do when the stimulus appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StimulusKind {
    Go,
    NoGo,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Red,
    Blue,
}

impl Color {
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Color::Green => [34, 197, 94, 255],
            Color::Red => [239, 68, 68, 255],
            Color::Blue => [59, 130, 246, 255],
        }
    }
}

/// One trial's stimulus. A stimulus without a color is audio-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stimulus {
    pub kind: StimulusKind,
    pub color: Option<Color>,
    pub emits_sound: bool,
}

impl Stimulus {
    pub const fn new(kind: StimulusKind, color: Option<Color>, emits_sound: bool) -> Self {
        Self {
            kind,
            color,
            emits_sound,
        }
    }

    pub fn is_audio_only(&self) -> bool {
        self.color.is_none() && self.emits_sound
    }
}
