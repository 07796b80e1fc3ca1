//! WASM bindings for the browser page
//!
//! `new SnakeApp("game-canvas")` wires the canvas, keyboard, buttons,
//! touch swipes and the tick timer to a [`Game`].

use crate::input::{command_for_key, Command, Swipe, BUTTONS};
use crate::render::{status_text, Canvas, Renderer};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use snake_core::{
    parse_score, Direction, Error as StoreError, Game, GameConfig, GameState, HighScoreStore,
    TickOutcome, HIGH_SCORE_KEY,
};
use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, HtmlCanvasElement,
    KeyboardEvent, Storage, TouchEvent, Window,
};

/// Largest canvas side in pixels
const MAX_CANVAS: f64 = 400.0;
/// Share of the viewport width the canvas may take
const VIEWPORT_SHARE: f64 = 0.9;

const SCORE_ID: &str = "score";
const HIGH_SCORE_ID: &str = "high-score";
const LEVEL_ID: &str = "speed-level";
const STATUS_ID: &str = "game-status";

// ============================================================================
// Storage
// ============================================================================

/// High score in `window.localStorage`
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn new(window: &Window) -> Self {
        // Private browsing may deny access; play continues without persistence
        let storage = window.local_storage().ok().flatten();
        Self { storage }
    }

    fn storage(&self) -> snake_core::Result<&Storage> {
        self.storage
            .as_ref()
            .ok_or_else(|| StoreError::Storage("localStorage unavailable".into()))
    }
}

impl HighScoreStore for LocalStorageStore {
    fn load(&self) -> snake_core::Result<Option<u32>> {
        let raw = self
            .storage()?
            .get_item(HIGH_SCORE_KEY)
            .map_err(|e| StoreError::Storage(format!("{:?}", e)))?;
        raw.as_deref().map(parse_score).transpose()
    }

    fn save(&mut self, score: u32) -> snake_core::Result<()> {
        self.storage()?
            .set_item(HIGH_SCORE_KEY, &score.to_string())
            .map_err(|e| StoreError::Storage(format!("{:?}", e)))
    }
}

// ============================================================================
// Canvas
// ============================================================================

/// 2D context of an HTML canvas
pub struct WebCanvas {
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl WebCanvas {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        Ok(Self {
            ctx,
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        })
    }
}

impl Canvas for WebCanvas {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn set_fill(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke(&mut self, color: &str, line_width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
    }

    fn set_shadow(&mut self, color: &str, blur: f64) {
        self.ctx.set_shadow_color(color);
        self.ctx.set_shadow_blur(blur);
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn fill_gradient_rect(&mut self, x: f64, y: f64, w: f64, h: f64, from: &str, to: &str) {
        let gradient = self.ctx.create_linear_gradient(x, y, x + w, y + h);
        if gradient.add_color_stop(0.0, from).is_err() || gradient.add_color_stop(1.0, to).is_err() {
            self.ctx.set_fill_style_str(from);
        } else {
            self.ctx.set_fill_style_canvas_gradient(&gradient);
        }
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.ctx.begin_path();
        if self.ctx.arc(cx, cy, radius, 0.0, PI * 2.0).is_ok() {
            self.ctx.fill();
        }
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, size: f64) {
        self.ctx.set_font(&format!("{}px Arial", size));
        self.ctx.set_text_align("center");
        let _ = self.ctx.fill_text(text, x, y);
    }
}

// ============================================================================
// App
// ============================================================================

struct Inner {
    game: Game<LocalStorageStore, SmallRng>,
    canvas: WebCanvas,
    renderer: Renderer,
    swipe: Swipe,
    window: Window,
    document: Document,
    /// Tick callback, kept to restart the interval at a new speed
    tick: Option<js_sys::Function>,
    interval: Option<i32>,
}

impl Inner {
    fn apply(&mut self, command: Command) {
        match command {
            Command::Steer(direction) => self.game.steer(direction),
            Command::StartOrPause => {
                if self.game.is_running() {
                    self.toggle_pause();
                } else {
                    self.start();
                }
            }
            Command::Start => self.start(),
            Command::TogglePause => self.toggle_pause(),
            Command::Reset => self.reset(),
        }
    }

    fn start(&mut self) {
        self.game.start();
        self.sync_timer();
        self.refresh();
    }

    fn toggle_pause(&mut self) {
        self.game.toggle_pause();
        self.sync_timer();
        self.refresh();
    }

    fn reset(&mut self) {
        self.stop_timer();
        self.game.reset();
        self.refresh();
    }

    fn on_tick(&mut self) {
        match self.game.tick() {
            TickOutcome::Idle => self.stop_timer(),
            TickOutcome::Ate { level_up: true } => {
                self.stop_timer();
                self.sync_timer();
            }
            TickOutcome::Crashed | TickOutcome::Won => self.stop_timer(),
            TickOutcome::Moved | TickOutcome::Ate { level_up: false } => {}
        }
        self.refresh();
    }

    /// Run the interval exactly while the game is running
    fn sync_timer(&mut self) {
        if !self.game.is_running() {
            self.stop_timer();
            return;
        }
        if self.interval.is_some() {
            return;
        }
        let Some(tick) = self.tick.as_ref() else {
            return;
        };

        let speed = i32::try_from(self.game.speed()).unwrap_or(i32::MAX);
        match self
            .window
            .set_interval_with_callback_and_timeout_and_arguments_0(tick, speed)
        {
            Ok(handle) => self.interval = Some(handle),
            Err(e) => tracing::error!(error = ?e, "could not start game timer"),
        }
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.interval.take() {
            self.window.clear_interval_with_handle(handle);
        }
    }

    fn refresh(&mut self) {
        self.renderer.draw(&mut self.canvas, &self.game);

        let game = &self.game;
        self.set_text(SCORE_ID, &game.score().to_string());
        self.set_text(HIGH_SCORE_ID, &game.high_score().to_string());
        self.set_text(LEVEL_ID, &game.level().to_string());
        self.set_text(STATUS_ID, &status_text(game.state(), game.score()));
    }

    fn set_text(&self, id: &str, text: &str) {
        if let Some(element) = self.document.get_element_by_id(id) {
            element.set_text_content(Some(text));
        }
    }
}

/// Snake game bound to a canvas element
#[wasm_bindgen]
pub struct SnakeApp {
    inner: Rc<RefCell<Inner>>,
}

#[wasm_bindgen]
impl SnakeApp {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<SnakeApp, JsValue> {
        crate::console::init_logging(tracing::Level::INFO);

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let element: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{}", canvas_id)))?
            .dyn_into()?;

        let viewport = window.inner_width()?.as_f64().unwrap_or(MAX_CANVAS);
        let side = (viewport * VIEWPORT_SHARE).min(MAX_CANVAS).floor().max(1.0) as u32;
        element.set_width(side);
        element.set_height(side);

        let config = GameConfig::default();
        let renderer = Renderer::new(f64::from(side), i32::from(config.tile_count));
        let seed = (js_sys::Math::random() * u64::MAX as f64) as u64 ^ js_sys::Date::now() as u64;
        let game = Game::new(
            config,
            LocalStorageStore::new(&window),
            SmallRng::seed_from_u64(seed),
        );

        let inner = Rc::new(RefCell::new(Inner {
            game,
            canvas: WebCanvas::new(&element)?,
            renderer,
            swipe: Swipe::new(),
            window,
            document,
            tick: None,
            interval: None,
        }));

        let app = SnakeApp { inner };
        app.bind_tick();
        app.bind_keyboard()?;
        app.bind_buttons()?;
        app.bind_touch(&element)?;
        app.bind_visibility()?;
        app.inner.borrow_mut().refresh();

        Ok(app)
    }

    pub fn start(&self) {
        self.inner.borrow_mut().apply(Command::Start);
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&self) {
        self.inner.borrow_mut().apply(Command::TogglePause);
    }

    pub fn reset(&self) {
        self.inner.borrow_mut().apply(Command::Reset);
    }

    /// Steer by name: "up", "down", "left" or "right"
    pub fn steer(&self, direction: &str) {
        let direction = match direction {
            "up" => Direction::Up,
            "down" => Direction::Down,
            "left" => Direction::Left,
            "right" => Direction::Right,
            _ => return,
        };
        self.inner.borrow_mut().apply(Command::Steer(direction));
    }

    #[wasm_bindgen(getter)]
    pub fn score(&self) -> u32 {
        self.inner.borrow().game.score()
    }

    #[wasm_bindgen(getter, js_name = highScore)]
    pub fn high_score(&self) -> u32 {
        self.inner.borrow().game.high_score()
    }

    #[wasm_bindgen(getter)]
    pub fn level(&self) -> u32 {
        self.inner.borrow().game.level()
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        let inner = self.inner.borrow();
        status_text(inner.game.state(), inner.game.score())
    }

    #[wasm_bindgen(getter, js_name = isOver)]
    pub fn is_over(&self) -> bool {
        self.inner.borrow().game.state() == GameState::Over
    }
}

impl SnakeApp {
    fn bind_tick(&self) {
        let inner = Rc::clone(&self.inner);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.on_tick();
            }
        });
        self.inner.borrow_mut().tick = Some(closure.as_ref().unchecked_ref::<js_sys::Function>().clone());
        // Lives as long as the page
        closure.forget();
    }

    fn bind_keyboard(&self) -> Result<(), JsValue> {
        let inner = Rc::clone(&self.inner);
        let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let Some(command) = command_for_key(&event.key()) else {
                return;
            };
            if command == Command::StartOrPause {
                event.prevent_default();
            }
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.apply(command);
            }
        });

        let document = self.inner.borrow().document.clone();
        document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn bind_buttons(&self) -> Result<(), JsValue> {
        let document = self.inner.borrow().document.clone();

        for &(id, command) in BUTTONS {
            let Some(button) = document.get_element_by_id(id) else {
                tracing::debug!(id, "button not on page");
                continue;
            };

            let inner = Rc::clone(&self.inner);
            let closure = Closure::<dyn FnMut()>::new(move || {
                if let Ok(mut inner) = inner.try_borrow_mut() {
                    inner.apply(command);
                }
            });
            button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn bind_touch(&self, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let options = AddEventListenerOptions::new();
        options.set_passive(false);

        let inner = Rc::clone(&self.inner);
        let start = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
            event.prevent_default();
            let Some(touch) = event.touches().get(0) else {
                return;
            };
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner
                    .swipe
                    .begin(f64::from(touch.client_x()), f64::from(touch.client_y()));
            }
        });

        let inner = Rc::clone(&self.inner);
        let moved = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
            event.prevent_default();
            let Some(touch) = event.touches().get(0) else {
                return;
            };
            if let Ok(mut inner) = inner.try_borrow_mut() {
                let swiped = inner
                    .swipe
                    .moved(f64::from(touch.client_x()), f64::from(touch.client_y()));
                if let Some(direction) = swiped {
                    inner.apply(Command::Steer(direction));
                }
            }
        });

        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            start.as_ref().unchecked_ref(),
            &options,
        )?;
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchmove",
            moved.as_ref().unchecked_ref(),
            &options,
        )?;
        start.forget();
        moved.forget();
        Ok(())
    }

    /// Pause a running game when the tab is hidden
    fn bind_visibility(&self) -> Result<(), JsValue> {
        let inner = Rc::clone(&self.inner);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                if inner.document.hidden() && inner.game.is_running() {
                    inner.toggle_pause();
                }
            }
        });

        let document = self.inner.borrow().document.clone();
        document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}
