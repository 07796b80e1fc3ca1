//! snake-serve: Static file HTTP server
//!
//! Serves a directory with hyper on tokio. `GET /<path>` answers with the
//! file below the root, a content type guessed from its extension, `404`
//! when it does not exist and `500` for any other filesystem failure.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod request;
pub mod response;
pub mod server;

// Re-exports
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use handlers::{MimeProfile, StaticFileConfig, StaticFiles};
pub use logging::{init_logging, Verbosity};
pub use request::{Method, Request};
pub use response::{Response, ResponseBuilder, StatusCode};
pub use server::{create_optimized_socket, from_hyper_request, to_hyper_response};
pub use server::{ConnectionTracker, Server};
