//! Game state and the per-tick update
//!
//! One call to [`Game::tick`] is one step of the snake: apply the queued
//! direction, move the head, then either crash, eat or shift the tail.
//! The caller owns the timer and reads [`Game::speed`] to pace it.

use crate::grid::{Cell, Direction, Grid};
use crate::store::HighScoreStore;
use rand::seq::IteratorRandom;
use rand::Rng;
use std::collections::VecDeque;

/// Rejection attempts before falling back to scanning free tiles
const FOOD_ATTEMPTS: usize = 64;

/// Game configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Tiles per side
    pub tile_count: u16,
    /// Head position of a fresh snake
    pub start: Cell,
    /// Initial heading
    pub start_direction: Direction,
    /// Length of a fresh snake, body trailing behind the head
    pub initial_length: usize,
    /// Score awarded per food
    pub food_points: u32,
    /// Level up every time the score is a multiple of this
    pub level_every: u32,
    /// Tick interval at level 1 in milliseconds
    pub initial_speed_ms: u32,
    /// Interval reduction per level
    pub speed_step_ms: u32,
    /// Fastest interval
    pub min_speed_ms: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tile_count: 20,
            start: Cell::new(10, 10),
            start_direction: Direction::Right,
            initial_length: 1,
            food_points: 10,
            level_every: 50,
            initial_speed_ms: 150,
            speed_step_ms: 20,
            min_speed_ms: 50,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tile_count(mut self, tiles: u16) -> Self {
        self.tile_count = tiles;
        self
    }

    pub fn start(mut self, cell: Cell, direction: Direction) -> Self {
        self.start = cell;
        self.start_direction = direction;
        self
    }

    pub fn initial_length(mut self, length: usize) -> Self {
        self.initial_length = length.max(1);
        self
    }

    pub fn speed(mut self, initial_ms: u32, step_ms: u32, min_ms: u32) -> Self {
        self.initial_speed_ms = initial_ms;
        self.speed_step_ms = step_ms;
        self.min_speed_ms = min_ms;
        self
    }
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Fresh board, waiting for start
    Ready,
    Running,
    Paused,
    /// Terminal: crashed or board full
    Over,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing happened
    Idle,
    /// Moved one tile
    Moved,
    /// Ate food; `level_up` when the speed changed
    Ate { level_up: bool },
    /// Hit a wall or itself
    Crashed,
    /// No free tile left for food
    Won,
}

/// A single snake game
pub struct Game<S, R> {
    config: GameConfig,
    grid: Grid,
    /// Head first
    snake: VecDeque<Cell>,
    food: Option<Cell>,
    direction: Direction,
    next_direction: Direction,
    score: u32,
    high_score: u32,
    speed_ms: u32,
    level: u32,
    state: GameState,
    store: S,
    rng: R,
}

impl<S: HighScoreStore, R: Rng> Game<S, R> {
    pub fn new(config: GameConfig, store: S, rng: R) -> Self {
        let high_score = match store.load() {
            Ok(score) => score.unwrap_or(0),
            Err(e) => {
                tracing::warn!(error = %e, "could not load high score, starting from 0");
                0
            }
        };

        let mut game = Self {
            grid: Grid::new(config.tile_count),
            snake: VecDeque::new(),
            food: None,
            direction: config.start_direction,
            next_direction: config.start_direction,
            score: 0,
            high_score,
            speed_ms: config.initial_speed_ms,
            level: 1,
            state: GameState::Ready,
            store,
            rng,
            config,
        };
        game.reset();
        game
    }

    /// Queue a direction for the next tick. Reversing onto the current
    /// heading is ignored.
    pub fn steer(&mut self, direction: Direction) {
        if direction != self.direction.opposite() {
            self.next_direction = direction;
        }
    }

    pub fn start(&mut self) {
        if matches!(self.state, GameState::Ready | GameState::Paused) {
            self.state = GameState::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            GameState::Running => GameState::Paused,
            GameState::Ready | GameState::Paused => GameState::Running,
            GameState::Over => GameState::Over,
        };
    }

    /// Fresh snake, score and speed. The high score is kept.
    pub fn reset(&mut self) {
        let start = self.config.start;
        let back = self.config.start_direction.opposite();

        self.snake.clear();
        let mut cell = start;
        for _ in 0..self.config.initial_length.max(1) {
            if !self.grid.contains(cell) {
                break;
            }
            self.snake.push_back(cell);
            cell = cell.step(back);
        }

        self.direction = self.config.start_direction;
        self.next_direction = self.config.start_direction;
        self.score = 0;
        self.speed_ms = self.config.initial_speed_ms;
        self.level = 1;
        self.state = GameState::Ready;
        self.food = self.spawn_food();
    }

    /// Advance the snake by one tile
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != GameState::Running {
            return TickOutcome::Idle;
        }

        self.direction = self.next_direction;
        let head = self.head().step(self.direction);

        if !self.grid.contains(head) || self.snake.contains(&head) {
            self.state = GameState::Over;
            tracing::debug!(score = self.score, x = head.x, y = head.y, "snake crashed");
            return TickOutcome::Crashed;
        }

        self.snake.push_front(head);

        if self.food != Some(head) {
            self.snake.pop_back();
            return TickOutcome::Moved;
        }

        self.score += self.config.food_points;
        self.record_high_score();

        let level_up = self.config.level_every > 0 && self.score % self.config.level_every == 0;
        if level_up {
            self.level += 1;
            self.speed_ms = self
                .speed_ms
                .saturating_sub(self.config.speed_step_ms)
                .max(self.config.min_speed_ms);
            tracing::debug!(level = self.level, speed_ms = self.speed_ms, "level up");
        }

        self.food = self.spawn_food();
        if self.food.is_none() {
            self.state = GameState::Over;
            tracing::debug!(score = self.score, "board full");
            return TickOutcome::Won;
        }

        TickOutcome::Ate { level_up }
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Body cells, head first
    pub fn snake(&self) -> &VecDeque<Cell> {
        &self.snake
    }

    pub fn head(&self) -> Cell {
        // reset() always places at least the start cell
        self.snake.front().copied().unwrap_or(self.config.start)
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Current tick interval in milliseconds
    pub fn speed(&self) -> u32 {
        self.speed_ms
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == GameState::Running
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn record_high_score(&mut self) {
        if self.score <= self.high_score {
            return;
        }
        self.high_score = self.score;
        if let Err(e) = self.store.save(self.score) {
            tracing::warn!(error = %e, score = self.score, "could not persist high score");
        }
    }

    /// Random free tile, `None` when the snake covers the board
    fn spawn_food(&mut self) -> Option<Cell> {
        if self.snake.len() >= self.grid.area() {
            return None;
        }

        let tiles = self.grid.tile_count();
        for _ in 0..FOOD_ATTEMPTS {
            let cell = Cell::new(self.rng.gen_range(0..tiles), self.rng.gen_range(0..tiles));
            if !self.snake.contains(&cell) {
                return Some(cell);
            }
        }

        let snake = &self.snake;
        self.grid
            .cells()
            .filter(|cell| !snake.contains(cell))
            .choose(&mut self.rng)
    }

    #[cfg(test)]
    fn place_food(&mut self, cell: Cell) {
        assert!(!self.snake.contains(&cell));
        self.food = Some(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::{Error, Result};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    type TestGame = Game<MemoryStore, SmallRng>;

    fn game_with(config: GameConfig, store: MemoryStore) -> TestGame {
        Game::new(config, store, SmallRng::seed_from_u64(7))
    }

    fn game() -> TestGame {
        game_with(GameConfig::default(), MemoryStore::new())
    }

    /// Put food directly ahead and tick once
    fn eat(game: &mut TestGame) -> TickOutcome {
        let ahead = game.head().step(game.next_direction);
        game.place_food(ahead);
        game.tick()
    }

    #[test]
    fn test_initial_state() {
        let g = game();
        assert_eq!(g.state(), GameState::Ready);
        assert_eq!(g.snake().len(), 1);
        assert_eq!(g.head(), Cell::new(10, 10));
        assert_eq!(g.direction(), Direction::Right);
        assert_eq!(g.score(), 0);
        assert_eq!(g.level(), 1);
        assert_eq!(g.speed(), 150);
        assert_ne!(g.food(), Some(g.head()));
    }

    #[test]
    fn test_tick_requires_running() {
        let mut g = game();
        assert_eq!(g.tick(), TickOutcome::Idle);
        assert_eq!(g.head(), Cell::new(10, 10));

        g.start();
        g.place_food(Cell::new(0, 0));
        assert_eq!(g.tick(), TickOutcome::Moved);
        assert_eq!(g.head(), Cell::new(11, 10));
        assert_eq!(g.snake().len(), 1);
    }

    #[test]
    fn test_pause_toggles() {
        let mut g = game();
        g.toggle_pause();
        assert_eq!(g.state(), GameState::Running);
        g.toggle_pause();
        assert_eq!(g.state(), GameState::Paused);
        assert_eq!(g.tick(), TickOutcome::Idle);
        g.start();
        assert!(g.is_running());
    }

    #[test]
    fn test_reverse_is_ignored() {
        let mut g = game();
        g.start();
        g.place_food(Cell::new(0, 0));
        g.steer(Direction::Left);
        g.tick();
        assert_eq!(g.direction(), Direction::Right);
        assert_eq!(g.head(), Cell::new(11, 10));
    }

    #[test]
    fn test_last_steer_wins() {
        let mut g = game();
        g.start();
        g.place_food(Cell::new(0, 0));
        g.steer(Direction::Up);
        g.steer(Direction::Down);
        g.tick();
        assert_eq!(g.head(), Cell::new(10, 11));
    }

    #[test]
    fn test_wall_collision_is_terminal() {
        let mut g = game();
        g.start();
        g.place_food(Cell::new(0, 0));
        g.steer(Direction::Up);

        for _ in 0..10 {
            assert_eq!(g.tick(), TickOutcome::Moved);
        }
        assert_eq!(g.head(), Cell::new(10, 0));

        assert_eq!(g.tick(), TickOutcome::Crashed);
        assert_eq!(g.state(), GameState::Over);
        assert_eq!(g.head(), Cell::new(10, 0));

        // No further movement once over
        g.start();
        g.toggle_pause();
        assert_eq!(g.tick(), TickOutcome::Idle);
        assert_eq!(g.head(), Cell::new(10, 0));
    }

    #[test]
    fn test_self_collision_is_terminal() {
        let mut g = game_with(GameConfig::new().initial_length(5), MemoryStore::new());
        g.start();
        g.place_food(Cell::new(0, 0));

        g.steer(Direction::Up);
        g.tick();
        g.steer(Direction::Left);
        g.tick();
        g.steer(Direction::Down);
        let body_before: Vec<Cell> = g.snake().iter().copied().collect();

        assert_eq!(g.tick(), TickOutcome::Crashed);
        assert_eq!(g.state(), GameState::Over);
        let body_after: Vec<Cell> = g.snake().iter().copied().collect();
        assert_eq!(body_before, body_after);
    }

    #[test]
    fn test_eating_grows_and_scores() {
        let mut g = game();
        g.start();

        assert_eq!(eat(&mut g), TickOutcome::Ate { level_up: false });
        assert_eq!(g.score(), 10);
        assert_eq!(g.snake().len(), 2);

        let food = g.food().unwrap();
        assert!(!g.snake().contains(&food));
        assert!(g.grid().contains(food));
    }

    #[test]
    fn test_level_up_every_fifty() {
        let mut g = game();
        g.start();

        for _ in 0..4 {
            assert_eq!(eat(&mut g), TickOutcome::Ate { level_up: false });
        }
        assert_eq!(eat(&mut g), TickOutcome::Ate { level_up: true });
        assert_eq!(g.score(), 50);
        assert_eq!(g.level(), 2);
        assert_eq!(g.speed(), 130);
    }

    #[test]
    fn test_speed_floor() {
        let config = GameConfig::new().tile_count(40).start(Cell::new(0, 20), Direction::Right);
        let mut g = game_with(config, MemoryStore::new());
        g.start();

        for _ in 0..35 {
            eat(&mut g);
        }
        assert_eq!(g.score(), 350);
        assert_eq!(g.level(), 8);
        assert_eq!(g.speed(), 50);
    }

    #[test]
    fn test_high_score_persists_across_restarts() {
        let store = MemoryStore::new();
        let mut g = game_with(GameConfig::default(), store.clone());
        g.start();
        eat(&mut g);
        eat(&mut g);
        assert_eq!(g.high_score(), 20);
        assert_eq!(store.get(), Some(20));

        let restarted = game_with(GameConfig::default(), store.clone());
        assert_eq!(restarted.high_score(), 20);
        assert_eq!(restarted.score(), 0);
    }

    #[test]
    fn test_high_score_only_raised() {
        let store = MemoryStore::with_score(100);
        let mut g = game_with(GameConfig::default(), store.clone());
        g.start();
        eat(&mut g);
        assert_eq!(g.high_score(), 100);
        assert_eq!(store.get(), Some(100));
    }

    #[test]
    fn test_reset_keeps_high_score() {
        let mut g = game();
        g.start();
        eat(&mut g);
        g.reset();
        assert_eq!(g.state(), GameState::Ready);
        assert_eq!(g.score(), 0);
        assert_eq!(g.high_score(), 10);
        assert_eq!(g.snake().len(), 1);
        assert_eq!(g.speed(), 150);
    }

    #[test]
    fn test_board_full_is_won() {
        let config = GameConfig::new().tile_count(2).start(Cell::new(0, 0), Direction::Right);
        let mut g = game_with(config, MemoryStore::new());
        g.start();

        assert_eq!(eat(&mut g), TickOutcome::Ate { level_up: false });
        g.steer(Direction::Down);
        assert_eq!(eat(&mut g), TickOutcome::Ate { level_up: false });
        g.steer(Direction::Left);
        assert_eq!(eat(&mut g), TickOutcome::Won);
        assert_eq!(g.state(), GameState::Over);
        assert_eq!(g.food(), None);
    }

    #[test]
    fn test_food_never_on_body() {
        let config = GameConfig::new().tile_count(4).initial_length(4);
        let mut g = Game::new(
            config.start(Cell::new(3, 0), Direction::Right),
            MemoryStore::new(),
            SmallRng::seed_from_u64(42),
        );
        for _ in 0..50 {
            g.reset();
            let food = g.food().unwrap();
            assert!(!g.snake().contains(&food));
        }
    }

    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn load(&self) -> Result<Option<u32>> {
            Err(Error::Storage("unavailable".into()))
        }

        fn save(&mut self, _score: u32) -> Result<()> {
            Err(Error::Storage("unavailable".into()))
        }
    }

    #[test]
    fn test_store_failures_do_not_stop_play() {
        let mut g = Game::new(GameConfig::default(), BrokenStore, SmallRng::seed_from_u64(1));
        assert_eq!(g.high_score(), 0);
        g.start();
        let ahead = g.head().step(Direction::Right);
        g.place_food(ahead);
        assert_eq!(g.tick(), TickOutcome::Ate { level_up: false });
        assert_eq!(g.high_score(), 10);
    }
}
