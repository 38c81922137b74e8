use reflex_core::{InputAction, Level, Screen};
use winit::keyboard::KeyCode;

/// What a key or click means on the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    StartLevel(Level),
    Respond(InputAction),
    MathOption(usize),
    Retry,
    /// Ranking of the given level, or of the level last played.
    ShowRanking(Option<Level>),
    Title,
    Quit,
}

fn digit(key: KeyCode) -> Option<u8> {
    let n = match key {
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        _ => return None,
    };
    Some(n)
}

fn level_key(key: KeyCode) -> Option<Level> {
    digit(key).and_then(|n| Level::new(n).ok())
}

pub fn map_key(screen: Screen, key: KeyCode) -> Option<UiAction> {
    match screen {
        Screen::Setup => match key {
            KeyCode::Escape => Some(UiAction::Quit),
            KeyCode::KeyK => Some(UiAction::ShowRanking(None)),
            k => level_key(k).map(UiAction::StartLevel),
        },
        Screen::Game => match key {
            KeyCode::Space => Some(UiAction::Respond(InputAction::Tap)),
            KeyCode::ArrowLeft => Some(UiAction::Respond(InputAction::Left)),
            KeyCode::ArrowRight => Some(UiAction::Respond(InputAction::Right)),
            KeyCode::Escape => Some(UiAction::Title),
            k => digit(k)
                .filter(|n| (1..=4).contains(n))
                .map(|n| UiAction::MathOption(usize::from(n - 1))),
        },
        Screen::Result => match key {
            KeyCode::Enter => Some(UiAction::Retry),
            KeyCode::KeyK => Some(UiAction::ShowRanking(None)),
            KeyCode::Escape => Some(UiAction::Title),
            _ => None,
        },
        Screen::Ranking => match key {
            KeyCode::Escape => Some(UiAction::Title),
            k => level_key(k).map(|level| UiAction::ShowRanking(Some(level))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u8) -> Level {
        Level::new(n).unwrap()
    }

    #[test]
    fn setup_keys() {
        assert_eq!(
            map_key(Screen::Setup, KeyCode::Digit4),
            Some(UiAction::StartLevel(level(4)))
        );
        assert_eq!(map_key(Screen::Setup, KeyCode::Digit7), None);
        assert_eq!(
            map_key(Screen::Setup, KeyCode::KeyK),
            Some(UiAction::ShowRanking(None))
        );
        assert_eq!(map_key(Screen::Setup, KeyCode::Escape), Some(UiAction::Quit));
    }

    #[test]
    fn game_keys() {
        assert_eq!(
            map_key(Screen::Game, KeyCode::Space),
            Some(UiAction::Respond(InputAction::Tap))
        );
        assert_eq!(
            map_key(Screen::Game, KeyCode::ArrowLeft),
            Some(UiAction::Respond(InputAction::Left))
        );
        assert_eq!(
            map_key(Screen::Game, KeyCode::Digit1),
            Some(UiAction::MathOption(0))
        );
        assert_eq!(
            map_key(Screen::Game, KeyCode::Numpad4),
            Some(UiAction::MathOption(3))
        );
        assert_eq!(map_key(Screen::Game, KeyCode::Digit5), None);
    }

    #[test]
    fn result_and_ranking_keys() {
        assert_eq!(map_key(Screen::Result, KeyCode::Enter), Some(UiAction::Retry));
        assert_eq!(map_key(Screen::Result, KeyCode::Space), None);
        assert_eq!(
            map_key(Screen::Ranking, KeyCode::Digit6),
            Some(UiAction::ShowRanking(Some(level(6))))
        );
        assert_eq!(map_key(Screen::Ranking, KeyCode::Escape), Some(UiAction::Title));
    }
}
