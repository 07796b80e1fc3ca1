//! Static file serving handler
//!
//! Maps a request path onto a file below the served root.

use super::mime::MimeProfile;
use crate::{Error, Method, Request, Response, ResponseBuilder, Result, StatusCode};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Static file configuration
#[derive(Debug, Clone)]
pub struct StaticFileConfig {
    /// Root directory
    pub root: PathBuf,
    /// Index file name
    pub index: String,
    /// Extra request paths that serve the index file
    pub aliases: Vec<String>,
    /// Content-type table
    pub mime: MimeProfile,
    /// Cache max-age in seconds, 0 sends no Cache-Control
    pub max_age: u32,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Serve hidden files (dot files)
    pub hidden: bool,
}

impl Default for StaticFileConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            index: "index.html".to_string(),
            aliases: vec!["/game".to_string()],
            mime: MimeProfile::default(),
            max_age: 0,
            headers: HashMap::new(),
            hidden: false,
        }
    }
}

impl StaticFileConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.index = name.into();
        self
    }

    pub fn alias(mut self, path: impl Into<String>) -> Self {
        self.aliases.push(path.into());
        self
    }

    pub fn mime(mut self, profile: MimeProfile) -> Self {
        self.mime = profile;
        self
    }

    pub fn max_age(mut self, seconds: u32) -> Self {
        self.max_age = seconds;
        self
    }

    pub fn hidden(mut self, enabled: bool) -> Self {
        self.hidden = enabled;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// Static file handler
#[derive(Debug)]
pub struct StaticFiles {
    config: StaticFileConfig,
}

impl StaticFiles {
    pub fn new(config: StaticFileConfig) -> Self {
        Self { config }
    }

    /// Serve static files from directory
    pub fn serve(root: impl Into<PathBuf>) -> Self {
        Self::new(StaticFileConfig::new(root))
    }

    pub fn config(&self) -> &StaticFileConfig {
        &self.config
    }

    /// Handle request for static file
    pub async fn handle(&self, req: &Request) -> Response {
        tracing::info!(method = %req.method, path = %req.path, "Request: {}", req.path);

        if !req.method.is_read() {
            return Response::method_not_allowed();
        }

        let relative = match self.resolve(&req.decoded_path()) {
            Some(p) => p,
            None => {
                tracing::warn!(path = %req.path, "rejected path");
                return Response::not_found();
            }
        };
        let full_path = self.config.root.join(&relative);

        match self.read(&full_path).await {
            Ok((served, content)) => self.ok(&served, content, req.method),
            Err(e) if e.is_not_found() => {
                tracing::warn!("File not found: {}", full_path.display());
                Response::not_found()
            }
            Err(e) => {
                tracing::error!(code = e.code(), error = %e, path = %full_path.display(), "Server error: {}", e.code());
                Response::server_error(e.code())
            }
        }
    }

    /// Map a decoded request path to a path relative to the root.
    /// `None` for traversal attempts and (unless enabled) hidden files.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let path = if path == "/" || self.config.aliases.iter().any(|a| a == path) {
            self.config.index.as_str()
        } else {
            path
        };
        self.sanitize_path(path)
    }

    /// Sanitize request path to prevent directory traversal
    fn sanitize_path(&self, path: &str) -> Option<PathBuf> {
        let path = path.trim_start_matches('/');

        if !self.config.hidden && path.split('/').any(|s| s.starts_with('.') && s != ".") {
            return None;
        }

        let mut result = PathBuf::new();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(c) => result.push(c),
                Component::ParentDir => return None,
                Component::CurDir => {}
                // Absolute or drive-prefixed segments after decoding
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        Some(result)
    }

    /// Read a file, descending into the index for directories.
    /// Returns the path actually served with its bytes.
    async fn read(&self, full_path: &Path) -> Result<(PathBuf, Vec<u8>)> {
        let meta = tokio::fs::metadata(full_path).await?;

        if meta.is_dir() {
            let index_path = full_path.join(&self.config.index);
            return match tokio::fs::read(&index_path).await {
                Ok(content) => Ok((index_path, content)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(Error::IsDirectory(full_path.to_path_buf()))
                }
                Err(e) => Err(e.into()),
            };
        }

        let content = tokio::fs::read(full_path).await?;
        Ok((full_path.to_path_buf(), content))
    }

    fn ok(&self, path: &Path, content: Vec<u8>, method: Method) -> Response {
        let mut builder = ResponseBuilder::new(StatusCode::OK)
            .header("Content-Type", self.config.mime.content_type(path))
            .header("Content-Length", content.len().to_string());

        if self.config.max_age > 0 {
            builder = builder.header("Cache-Control", format!("max-age={}", self.config.max_age));
        }

        for (k, v) in &self.config.headers {
            builder = builder.header(k, v);
        }

        // HEAD request - no body
        if method == Method::Head {
            builder.build()
        } else {
            builder.body(content).build()
        }
    }
}
