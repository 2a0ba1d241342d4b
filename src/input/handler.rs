use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{Action, Direction};

/// Keys understood while a game is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    GameAction(Action),
    Quit,
    None,
}

/// Keys understood on the trainer (settings and results) screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerKey {
    PrevField,
    NextField,
    Decrease,
    Increase,
    StartGame,
    ShowGraph,
    Export,
    Clear,
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Map a key press during a game to a move or quit
    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        if is_ctrl_c(key) || is_quit(key.code) {
            return KeyAction::Quit;
        }

        direction_for(key.code)
            .map(|direction| KeyAction::GameAction(direction.into()))
            .unwrap_or(KeyAction::None)
    }

    pub fn handle_trainer_key(&self, key: KeyEvent) -> TrainerKey {
        if is_ctrl_c(key) {
            return TrainerKey::Quit;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => TrainerKey::PrevField,
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => TrainerKey::NextField,
            KeyCode::Left | KeyCode::Char('-') => TrainerKey::Decrease,
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => TrainerKey::Increase,
            KeyCode::Enter | KeyCode::Char(' ') => TrainerKey::StartGame,
            KeyCode::Char('g') | KeyCode::Char('G') => TrainerKey::ShowGraph,
            KeyCode::Char('e') | KeyCode::Char('E') => TrainerKey::Export,
            KeyCode::Char('c') | KeyCode::Char('C') => TrainerKey::Clear,
            code if is_quit(code) => TrainerKey::Quit,
            _ => TrainerKey::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Arrow keys and WASD, either case
fn direction_for(code: KeyCode) -> Option<Direction> {
    let direction = match code {
        KeyCode::Up => Direction::Up,
        KeyCode::Down => Direction::Down,
        KeyCode::Left => Direction::Left,
        KeyCode::Right => Direction::Right,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Direction::Up,
            's' => Direction::Down,
            'a' => Direction::Left,
            'd' => Direction::Right,
            _ => return None,
        },
        _ => return None,
    };
    Some(direction)
}

fn is_quit(code: KeyCode) -> bool {
    matches!(code, KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q'))
}

fn is_ctrl_c(key: KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_movement_keys() {
        let handler = InputHandler::new();
        let cases = [
            (KeyCode::Up, Direction::Up),
            (KeyCode::Down, Direction::Down),
            (KeyCode::Left, Direction::Left),
            (KeyCode::Right, Direction::Right),
            (KeyCode::Char('w'), Direction::Up),
            (KeyCode::Char('A'), Direction::Left),
            (KeyCode::Char('s'), Direction::Down),
            (KeyCode::Char('D'), Direction::Right),
        ];

        for (code, direction) in cases {
            assert_eq!(
                handler.handle_key_event(press(code)),
                KeyAction::GameAction(Action::Move(direction)),
                "{code:?}"
            );
        }
    }

    #[test]
    fn test_quit_and_unknown_keys() {
        let handler = InputHandler::new();

        for code in [KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc] {
            assert_eq!(handler.handle_key_event(press(code)), KeyAction::Quit);
        }
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_key_event(ctrl_c), KeyAction::Quit);

        assert_eq!(handler.handle_key_event(press(KeyCode::Char('x'))), KeyAction::None);
        assert_eq!(handler.handle_key_event(press(KeyCode::Enter)), KeyAction::None);
    }

    #[test]
    fn test_trainer_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_trainer_key(press(KeyCode::Up)), TrainerKey::PrevField);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Tab)), TrainerKey::NextField);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Char('-'))), TrainerKey::Decrease);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Right)), TrainerKey::Increase);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Enter)), TrainerKey::StartGame);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Char('g'))), TrainerKey::ShowGraph);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Char('E'))), TrainerKey::Export);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Char('c'))), TrainerKey::Clear);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Esc)), TrainerKey::Quit);
        assert_eq!(handler.handle_trainer_key(press(KeyCode::Char('x'))), TrainerKey::None);
    }

    #[test]
    fn test_trainer_ctrl_c_quits() {
        let handler = InputHandler::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handler.handle_trainer_key(ctrl_c), TrainerKey::Quit);
    }
}
