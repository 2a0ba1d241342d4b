use super::{
    action::{Action, Direction},
    config::GameConfig,
    state::{GameOverCause, GameState, ItemKind, Position, Snake, Status},
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, info};

/// Rejection sampling gives up after this many draws per grid cell
const SPAWN_ATTEMPTS_PER_CELL: usize = 4;

/// Points needed per level
const POINTS_PER_LEVEL: u32 = 5;

/// Extra ticks per second gained on each level
const SPEED_STEP: u32 = 2;

/// Information about a step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// Number of bonuses eaten this step
    pub bonuses_eaten: u32,
    /// Whether the level (and speed) changed this step
    pub leveled_up: bool,
    /// Set on the step that ended the session
    pub game_over: Option<GameOverCause>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// Which item slot is being respawned; that slot's own cell does not block it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Food,
    Bonus(usize),
}

/// Level reached at a given score
pub fn level_for_score(score: u32) -> u32 {
    score / POINTS_PER_LEVEL + 1
}

/// Ticks per second at a given level
pub fn speed_for_level(base_speed: u32, level: u32) -> u32 {
    base_speed + (level.saturating_sub(1)) * SPEED_STEP
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with deterministic item placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state
    pub fn reset(&mut self) -> GameState {
        let center_x = (self.config.columns / 2) as i32;
        let center_y = (self.config.rows / 2) as i32;
        let head = Position::new(center_x, center_y);

        let snake = Snake::new(head, Direction::Right);
        let mut state = GameState::new(
            snake,
            head,
            self.config.columns,
            self.config.rows,
            self.config.base_speed,
        );

        state.food = self.spawn(&state, Slot::Food, head);
        for _ in 0..self.config.bonus_count {
            let slot = Slot::Bonus(state.bonuses.len());
            let pos = self.spawn(&state, slot, head);
            state.bonuses.push(pos);
        }

        state
    }

    /// Execute one tick of the game
    pub fn step(&mut self, state: &mut GameState, action: Action) -> StepResult {
        if !state.is_running() {
            return StepResult {
                terminated: true,
                info: StepInfo::default(),
            };
        }

        match action {
            Action::Move(new_direction) => {
                if !state.snake.direction.is_opposite(new_direction) {
                    state.snake.direction = new_direction;
                }
            }
            Action::Continue => {}
            Action::Quit => return Self::end(state, GameOverCause::UserQuit),
        }

        let new_head = state.snake.head().moved_in_direction(state.snake.direction);

        if let Some(cause) = self.check_collision(state, new_head) {
            state.ticks += 1;
            return Self::end(state, cause);
        }

        state.snake.advance(new_head);

        let mut info = StepInfo::default();

        if new_head == state.food {
            self.consume(state, ItemKind::Food);
            state.food = self.spawn(state, Slot::Food, state.food);
            info.ate_food = true;
        }

        for i in 0..state.bonuses.len() {
            if state.bonuses[i] == new_head {
                self.consume(state, ItemKind::Bonus);
                state.bonuses[i] = self.spawn(state, Slot::Bonus(i), state.bonuses[i]);
                info.bonuses_eaten += 1;
            }
        }

        let level = level_for_score(state.score);
        if level != state.level {
            state.level = level;
            state.speed = speed_for_level(self.config.base_speed, level);
            info.leveled_up = true;
            info!(level, speed = state.speed, "Level up");
        }

        state.ticks += 1;

        StepResult {
            terminated: false,
            info,
        }
    }

    fn end(state: &mut GameState, cause: GameOverCause) -> StepResult {
        state.status = Status::GameOver(cause);
        debug!(%cause, score = state.score, ticks = state.ticks, "Game over");
        StepResult {
            terminated: true,
            info: StepInfo {
                game_over: Some(cause),
                ..Default::default()
            },
        }
    }

    fn consume(&self, state: &mut GameState, kind: ItemKind) {
        state.score += kind.score_value();
        state.snake.grow(kind.growth());
    }

    /// Check if the new head position causes a collision
    fn check_collision(&self, state: &GameState, pos: Position) -> Option<GameOverCause> {
        if !state.is_in_bounds(pos) {
            return Some(GameOverCause::Wall);
        }

        // The whole body counts, including the tail cell that is about to move.
        if state.is_occupied_by_snake(pos) {
            return Some(GameOverCause::SelfCollision);
        }

        None
    }

    fn is_free(state: &GameState, pos: Position, slot: Slot) -> bool {
        if state.is_occupied_by_snake(pos) {
            return false;
        }
        if slot != Slot::Food && pos == state.food {
            return false;
        }
        state
            .bonuses
            .iter()
            .enumerate()
            .all(|(i, &bonus)| slot == Slot::Bonus(i) || bonus != pos)
    }

    /// Pick a uniformly random free cell for `slot`, keeping `current` if the grid is full
    fn spawn(&mut self, state: &GameState, slot: Slot, current: Position) -> Position {
        let attempts = state.cell_count() * SPAWN_ATTEMPTS_PER_CELL;
        for _ in 0..attempts {
            let x = self.rng.gen_range(0..self.config.columns) as i32;
            let y = self.rng.gen_range(0..self.config.rows) as i32;
            let pos = Position::new(x, y);

            if Self::is_free(state, pos, slot) {
                return pos;
            }
        }

        let free: Vec<Position> = (0..state.grid_height as i32)
            .flat_map(|y| (0..state.grid_width as i32).map(move |x| Position::new(x, y)))
            .filter(|&pos| Self::is_free(state, pos, slot))
            .collect();
        match free.choose(&mut self.rng) {
            Some(&pos) => pos,
            None => {
                debug!(?slot, "No free cell left, item stays in place");
                current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_bonus_config() -> GameConfig {
        GameConfig {
            bonus_count: 0,
            ..GameConfig::default()
        }
    }

    fn assert_items_disjoint(state: &GameState) {
        assert!(!state.snake.contains(state.food));
        for (i, bonus) in state.bonuses.iter().enumerate() {
            assert!(!state.snake.contains(*bonus));
            assert_ne!(*bonus, state.food);
            for (j, other) in state.bonuses.iter().enumerate() {
                if i != j {
                    assert_ne!(bonus, other);
                }
            }
        }
    }

    #[test]
    fn test_reset() {
        let config = GameConfig {
            bonus_count: 5,
            ..GameConfig::default()
        };
        let mut engine = GameEngine::with_seed(config, 7);
        let state = engine.reset();

        assert!(state.is_running());
        assert_eq!(state.score, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.speed, 10);
        assert_eq!(state.ticks, 0);
        assert_eq!(state.snake.len(), 1);
        assert_eq!(state.snake.head(), Position::new(15, 10));
        assert_eq!(state.snake.direction, Direction::Right);
        assert_eq!(state.bonuses.len(), 5);
        assert_items_disjoint(&state);
    }

    #[test]
    fn test_reset_without_bonuses() {
        let mut engine = GameEngine::with_seed(no_bonus_config(), 1);
        let state = engine.reset();
        assert!(state.bonuses.is_empty());
    }

    #[test]
    fn test_basic_movement() {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 3);
        let mut state = engine.reset();
        state.food = Position::new(0, 0);
        state.bonuses.clear();
        let initial_head = state.snake.head();

        let result = engine.step(&mut state, Action::Continue);

        assert!(!result.terminated);
        assert!(!result.info.ate_food);
        assert_eq!(state.ticks, 1);
        assert_eq!(state.snake.head(), initial_head.moved_by(1, 0));
        assert_eq!(state.snake.len(), 1);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 11);
        let mut state = engine.reset();

        let head = state.snake.head();
        state.food = head.moved_in_direction(state.snake.direction);
        state.bonuses = vec![Position::new(0, 0)];
        let initial_target = state.snake.target_length();

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.info.ate_food);
        assert_eq!(state.score, 1);
        assert_eq!(state.snake.target_length(), initial_target + 1);
        assert_items_disjoint(&state);

        // The body catches up on the next tick.
        state.food = Position::new(0, 7);
        engine.step(&mut state, Action::Continue);
        assert_eq!(state.snake.len(), 2);
    }

    #[test]
    fn test_bonus_consumption() {
        let config = GameConfig {
            bonus_count: 3,
            ..GameConfig::small()
        };
        let mut engine = GameEngine::with_seed(config, 5);
        let mut state = engine.reset();

        let head = state.snake.head();
        state.food = Position::new(0, 0);
        state.bonuses = vec![
            Position::new(0, 1),
            head.moved_in_direction(Direction::Right),
            Position::new(0, 2),
        ];
        let initial_target = state.snake.target_length();

        let result = engine.step(&mut state, Action::Continue);

        assert_eq!(result.info.bonuses_eaten, 1);
        assert!(!result.info.ate_food);
        assert_eq!(state.score, 3);
        assert_eq!(state.snake.target_length(), initial_target + 2);
        assert_eq!(state.bonuses[0], Position::new(0, 1));
        assert_eq!(state.bonuses[2], Position::new(0, 2));
        assert_items_disjoint(&state);
    }

    #[test]
    fn test_level_up_at_threshold() {
        let mut engine = GameEngine::with_seed(no_bonus_config(), 2);
        let mut state = engine.reset();
        state.score = 4;
        state.food = state.snake.head().moved_by(1, 0);

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.info.leveled_up);
        assert_eq!(state.score, 5);
        assert_eq!(state.level, 2);
        assert_eq!(state.speed, 12);
    }

    #[test]
    fn test_level_formula() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(4), 1);
        assert_eq!(level_for_score(5), 2);
        assert_eq!(level_for_score(9), 2);
        assert_eq!(level_for_score(10), 3);
        assert_eq!(speed_for_level(10, 1), 10);
        assert_eq!(speed_for_level(10, 3), 14);
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 0);
        let mut state = GameState::new(
            Snake::new(Position::new(0, 5), Direction::Left),
            Position::new(5, 5),
            10,
            10,
            10,
        );

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert!(!state.is_running());
        assert_eq!(result.info.game_over, Some(GameOverCause::Wall));
        assert_eq!(state.snake.head(), Position::new(0, 5));
    }

    #[test]
    fn test_moving_right_from_center_hits_wall() {
        let mut engine = GameEngine::with_seed(no_bonus_config(), 42);
        let mut state = engine.reset();
        state.food = Position::new(0, 0);

        let mut ticks = 0;
        while state.is_running() {
            engine.step(&mut state, Action::Move(Direction::Right));
            ticks += 1;
            assert!(ticks <= 30, "session should have ended at the wall");
        }

        assert_eq!(ticks, 15);
        assert_eq!(state.game_over_cause(), Some(GameOverCause::Wall));
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_self_collision() {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 0);

        // Tail first: (2,5) (3,5) (4,5) (5,5) with head at (5,5)
        let snake = Snake::from_segments(
            (2..=5).map(|x| Position::new(x, 5)),
            Direction::Right,
        );
        let mut state = GameState::new(snake, Position::new(8, 7), 10, 10, 10);

        // Right: head (6,5)
        engine.step(&mut state, Action::Continue);
        // Down: head (6,6)
        engine.step(&mut state, Action::Move(Direction::Down));
        // Left: head (5,6)
        engine.step(&mut state, Action::Move(Direction::Left));
        // Up: (5,5) is still part of the body
        let result = engine.step(&mut state, Action::Move(Direction::Up));

        assert!(result.terminated);
        assert_eq!(result.info.game_over, Some(GameOverCause::SelfCollision));
    }

    #[test]
    fn test_prevent_180_degree_turn() {
        for dir in Direction::ALL {
            let mut engine = GameEngine::with_seed(GameConfig::default(), 9);
            let mut state = engine.reset();
            state.snake.direction = dir;

            engine.step(&mut state, Action::Move(dir.opposite()));

            assert_eq!(state.snake.direction, dir);
        }
    }

    #[test]
    fn test_quit_ends_without_moving() {
        let mut engine = GameEngine::with_seed(GameConfig::default(), 4);
        let mut state = engine.reset();
        let head = state.snake.head();

        let result = engine.step(&mut state, Action::Quit);

        assert!(result.terminated);
        assert_eq!(result.info.game_over, Some(GameOverCause::UserQuit));
        assert_eq!(state.snake.head(), head);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = GameEngine::with_seed(GameConfig::small(), 8);
        let mut state = engine.reset();
        state.status = Status::GameOver(GameOverCause::Wall);
        let steps_before = state.ticks;

        let result = engine.step(&mut state, Action::Continue);

        assert!(result.terminated);
        assert_eq!(result.info.game_over, None);
        assert_eq!(state.ticks, steps_before);
    }

    #[test]
    fn test_spawn_on_nearly_full_grid_finds_last_cell() {
        let config = GameConfig {
            bonus_count: 0,
            ..GameConfig::small()
        };
        let mut engine = GameEngine::with_seed(config, 12);
        let segments: Vec<Position> = (0..8)
            .flat_map(|y| (0..10).map(move |x| Position::new(x, y)))
            .filter(|&pos| pos != Position::new(9, 7))
            .collect();
        let snake = Snake::from_segments(segments, Direction::Right);
        let state = GameState::new(snake, Position::new(0, 0), 10, 8, 10);

        let pos = engine.spawn(&state, Slot::Food, state.food);
        assert_eq!(pos, Position::new(9, 7));
    }
}
