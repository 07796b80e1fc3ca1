//! snake-wasm: browser front end for the snake game
//!
//! Input mapping and canvas rendering are plain Rust and tested natively;
//! the DOM bindings sit behind the `wasm` feature.

pub mod input;
pub mod render;

#[cfg(feature = "wasm")]
mod console;
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use console::init_logging;
#[cfg(feature = "wasm")]
pub use wasm::*;

pub use input::{command_for_key, Command, Swipe, BUTTONS};
pub use render::{status_text, Canvas, Renderer};
