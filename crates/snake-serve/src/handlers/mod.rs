//! Built-in request handlers

pub mod mime;
pub mod static_files;

pub use mime::MimeProfile;
pub use static_files::{StaticFileConfig, StaticFiles};
