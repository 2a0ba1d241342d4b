use std::collections::VecDeque;
use std::fmt;

use super::action::Direction;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake in the game
///
/// The head sits at the back of `body`; the tail is at the front and is
/// trimmed whenever the body grows past `target_length`.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
    /// Current direction of movement
    pub direction: Direction,
    target_length: usize,
}

impl Snake {
    /// Create a one-cell snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: VecDeque::from([head]),
            direction,
            target_length: 1,
        }
    }

    /// Build a snake from segments ordered tail first, head last
    pub fn from_segments(
        segments: impl IntoIterator<Item = Position>,
        direction: Direction,
    ) -> Self {
        let body: VecDeque<Position> = segments.into_iter().collect();
        let target_length = body.len().max(1);
        Self {
            body,
            direction,
            target_length,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    /// Get the tail position (oldest segment)
    pub fn tail(&self) -> Position {
        self.body[0]
    }

    /// Segments from tail to head
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &Position> + ExactSizeIterator {
        self.body.iter()
    }

    /// Check if any segment, head included, occupies `pos`
    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Push a new head and drop tail cells beyond the target length
    pub fn advance(&mut self, new_head: Position) {
        self.body.push_back(new_head);
        while self.body.len() > self.target_length {
            self.body.pop_front();
        }
    }

    /// Raise the target length; the body catches up on following ticks
    pub fn grow(&mut self, by: usize) {
        self.target_length += by;
    }

    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// What kind of item sits on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Food,
    Bonus,
}

impl ItemKind {
    pub fn score_value(&self) -> u32 {
        match self {
            ItemKind::Food => 1,
            ItemKind::Bonus => 3,
        }
    }

    pub fn growth(&self) -> usize {
        match self {
            ItemKind::Food => 1,
            ItemKind::Bonus => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub position: Position,
    pub kind: ItemKind,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Player asked to stop
    UserQuit,
}

impl fmt::Display for GameOverCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameOverCause::Wall => "wall collision",
            GameOverCause::SelfCollision => "self collision",
            GameOverCause::UserQuit => "user quit",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    GameOver(GameOverCause),
}

/// Complete run state of one session
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Position,
    pub bonuses: Vec<Position>,
    pub grid_width: u32,
    pub grid_height: u32,
    pub score: u32,
    pub level: u32,
    /// Ticks per second
    pub speed: u32,
    pub ticks: u32,
    pub status: Status,
}

impl GameState {
    /// Create a new game state at level 1
    pub fn new(
        snake: Snake,
        food: Position,
        grid_width: u32,
        grid_height: u32,
        base_speed: u32,
    ) -> Self {
        Self {
            snake,
            food,
            bonuses: Vec::new(),
            grid_width,
            grid_height,
            score: 0,
            level: 1,
            speed: base_speed,
            ticks: 0,
            status: Status::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn game_over_cause(&self) -> Option<GameOverCause> {
        match self.status {
            Status::Running => None,
            Status::GameOver(cause) => Some(cause),
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by the snake
    pub fn is_occupied_by_snake(&self, pos: Position) -> bool {
        self.snake.contains(pos)
    }

    /// Food first, then bonuses in slot order
    pub fn items(&self) -> impl Iterator<Item = Item> + '_ {
        std::iter::once(Item {
            position: self.food,
            kind: ItemKind::Food,
        })
        .chain(self.bonuses.iter().map(|&position| Item {
            position,
            kind: ItemKind::Bonus,
        }))
    }

    pub fn cell_count(&self) -> usize {
        self.grid_width as usize * self.grid_height as usize
    }
}
