//! Content-type guessing by file extension
//!
//! Three tables of increasing completeness. `Basic` and `Extended` keep the
//! exact values older deployments were served with.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extension to content-type table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeProfile {
    /// Core web types, unknown files as `text/plain`
    Basic,
    /// Web types plus media, fonts and wasm, unknown as octet-stream
    Extended,
    /// Full table with charset parameters
    #[default]
    Full,
}

impl MimeProfile {
    /// Content type for `path`, matching the extension case-insensitively
    pub fn content_type(&self, path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match self {
            MimeProfile::Basic => basic(&ext),
            MimeProfile::Extended => extended(&ext),
            MimeProfile::Full => full(&ext),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeProfile::Basic => "basic",
            MimeProfile::Extended => "extended",
            MimeProfile::Full => "full",
        }
    }
}

impl std::fmt::Display for MimeProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn basic(ext: &str) -> &'static str {
    match ext {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "text/plain",
    }
}

fn extended(ext: &str) -> &'static str {
    match ext {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" => "image/jpg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "woff" => "application/font-woff",
        "ttf" => "application/font-ttf",
        "eot" => "application/vnd.ms-fontobject",
        "otf" => "application/font-otf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

fn full(ext: &str) -> &'static str {
    match ext {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "csv" => "text/csv",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Audio/Video
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Documents
        "pdf" => "application/pdf",

        // WebAssembly
        "wasm" => "application/wasm",

        _ => "application/octet-stream",
    }
}
