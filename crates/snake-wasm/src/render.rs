//! Board rendering
//!
//! Draws a [`Game`] onto any 2D surface implementing [`Canvas`]. The
//! browser binding implements it for a canvas context; tests record calls.

use rand::Rng;
use snake_core::{Game, GameState, HighScoreStore};

const BACKGROUND: &str = "#000";
const GRID_LINE: &str = "rgba(0, 255, 136, 0.1)";
const HEAD: &str = "#00ff88";
const BODY_FROM: &str = "#00cc6a";
const BODY_TO: &str = "#009955";
const FOOD: &str = "#ff4757";
const OVERLAY: &str = "rgba(0, 0, 0, 0.75)";
const TEXT: &str = "white";

const HEAD_GLOW: f64 = 10.0;
const FOOD_GLOW: f64 = 15.0;

/// Minimal 2D drawing surface
pub trait Canvas {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn set_fill(&mut self, color: &str);
    fn set_stroke(&mut self, color: &str, line_width: f64);
    /// Glow around subsequent fills; blur 0 disables it
    fn set_shadow(&mut self, color: &str, blur: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    /// Fill with a diagonal gradient from the top-left to the bottom-right
    fn fill_gradient_rect(&mut self, x: f64, y: f64, w: f64, h: f64, from: &str, to: &str);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64);
    /// Text centered horizontally on `x`, font size in pixels
    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64);
}

/// Draws the board at a fixed tile size
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    tile: f64,
}

impl Renderer {
    /// Tile size is the canvas width split into whole pixels per tile
    pub fn new(canvas_width: f64, tile_count: i32) -> Self {
        Self {
            tile: (canvas_width / f64::from(tile_count.max(1))).floor(),
        }
    }

    pub fn tile(&self) -> f64 {
        self.tile
    }

    /// Draw a full frame, with the game-over overlay once the run ended
    pub fn draw<C, S, R>(&self, canvas: &mut C, game: &Game<S, R>)
    where
        C: Canvas,
        S: HighScoreStore,
        R: Rng,
    {
        let g = self.tile;

        canvas.set_fill(BACKGROUND);
        canvas.fill_rect(0.0, 0.0, canvas.width(), canvas.height());

        canvas.set_stroke(GRID_LINE, 1.0);
        let tiles = game.grid().tile_count();
        for i in 0..tiles {
            for j in 0..tiles {
                canvas.stroke_rect(f64::from(i) * g, f64::from(j) * g, g, g);
            }
        }

        for (index, cell) in game.snake().iter().enumerate() {
            let (x, y) = (f64::from(cell.x) * g, f64::from(cell.y) * g);
            if index == 0 {
                canvas.set_fill(HEAD);
                canvas.fill_rect(x, y, g - 1.0, g - 1.0);
                canvas.set_shadow(HEAD, HEAD_GLOW);
                canvas.fill_rect(x, y, g - 1.0, g - 1.0);
                canvas.set_shadow(HEAD, 0.0);
            } else {
                canvas.fill_gradient_rect(x, y, g - 1.0, g - 1.0, BODY_FROM, BODY_TO);
                canvas.set_stroke(HEAD, 1.0);
                canvas.stroke_rect(x, y, g - 1.0, g - 1.0);
            }
        }

        if let Some(food) = game.food() {
            let cx = f64::from(food.x) * g + g / 2.0;
            let cy = f64::from(food.y) * g + g / 2.0;
            let radius = (g / 2.0 - 2.0).max(1.0);

            canvas.set_fill(FOOD);
            canvas.fill_circle(cx, cy, radius);
            canvas.set_shadow(FOOD, FOOD_GLOW);
            canvas.fill_circle(cx, cy, radius);
            canvas.set_shadow(FOOD, 0.0);
        }

        if game.state() == GameState::Over {
            self.draw_game_over(canvas, game.score());
        }
    }

    /// Dim the board and show the final score
    pub fn draw_game_over<C: Canvas>(&self, canvas: &mut C, score: u32) {
        let (w, h) = (canvas.width(), canvas.height());

        canvas.set_fill(OVERLAY);
        canvas.fill_rect(0.0, 0.0, w, h);

        canvas.set_fill(TEXT);
        canvas.fill_text("GAME OVER", w / 2.0, h / 2.0 - 20.0, w / 10.0);
        canvas.fill_text(&format!("Final score: {}", score), w / 2.0, h / 2.0 + 20.0, w / 15.0);
    }
}

/// Text for the status line under the board
pub fn status_text(state: GameState, score: u32) -> String {
    match state {
        GameState::Ready => "Press space to start".to_string(),
        GameState::Running => "Playing".to_string(),
        GameState::Paused => "Paused".to_string(),
        GameState::Over => format!("Game over! Score: {}", score),
    }
}
