use serde::{Deserialize, Serialize};

/// Horizontal displacement, in pixels, above which a release counts as a swipe.
pub const DEFAULT_SWIPE_THRESHOLD_PX: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputAction {
    Tap,
    Left,
    Right,
}

/// Classifies a press/release pair by its horizontal displacement `dx`.
pub fn classify_swipe(dx: f32, threshold: f32) -> InputAction {
    if dx.abs() > threshold {
        if dx > 0.0 {
            InputAction::Right
        } else {
            InputAction::Left
        }
    } else {
        InputAction::Tap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_displacement_is_tap() {
        assert_eq!(classify_swipe(0.0, 40.0), InputAction::Tap);
        assert_eq!(classify_swipe(40.0, 40.0), InputAction::Tap);
        assert_eq!(classify_swipe(-39.5, 40.0), InputAction::Tap);
    }

    #[test]
    fn direction_follows_sign() {
        assert_eq!(classify_swipe(41.0, 40.0), InputAction::Right);
        assert_eq!(classify_swipe(-120.0, 40.0), InputAction::Left);
    }
}
