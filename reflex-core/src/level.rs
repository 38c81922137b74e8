use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A difficulty level, guaranteed to lie in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub const ALL: [Level; 6] = [
        Level(1),
        Level(2),
        Level(3),
        Level(4),
        Level(5),
        Level(6),
    ];

    pub fn new(id: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(CoreError::InvalidLevel(id))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Position of the level in `Level::ALL`.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Level {
    type Error = CoreError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LV.{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_one_through_six() {
        for id in 1..=6 {
            assert_eq!(Level::new(id).map(Level::get), Ok(id));
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(Level::new(0), Err(CoreError::InvalidLevel(0)));
        assert_eq!(Level::try_from(7), Err(CoreError::InvalidLevel(7)));
    }

    #[test]
    fn deserialize_validates() {
        let ok: Level = serde_json::from_str("4").unwrap();
        assert_eq!(ok.get(), 4);
        assert!(serde_json::from_str::<Level>("9").is_err());
    }

    #[test]
    fn index_matches_all() {
        for (i, level) in Level::ALL.iter().enumerate() {
            assert_eq!(level.index(), i);
        }
    }
}
