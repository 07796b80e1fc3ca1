//! Command-line interface for the `snake-serve` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::ServerConfig;
use crate::handlers::MimeProfile;
use crate::logging::Verbosity;

/// snake-serve - serve a directory over HTTP
///
/// Maps `GET /<path>` to the file at `<path>` below the root and answers
/// with a content type guessed from the extension.
#[derive(Debug, Parser)]
#[command(name = "snake-serve")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory to serve
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Content-type table
    #[arg(short, long, value_enum)]
    pub mime: Option<MimeArg>,

    /// File served for `/` and aliases
    #[arg(long, value_name = "FILE")]
    pub index: Option<String>,

    /// Extra path that serves the index file (repeatable)
    #[arg(long = "alias", value_name = "PATH")]
    pub aliases: Vec<String>,

    /// Runtime worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Content-type table selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MimeArg {
    Basic,
    Extended,
    Full,
}

impl From<MimeArg> for MimeProfile {
    fn from(arg: MimeArg) -> Self {
        match arg {
            MimeArg::Basic => MimeProfile::Basic,
            MimeArg::Extended => MimeProfile::Extended,
            MimeArg::Full => MimeProfile::Full,
        }
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::Trace,
            }
        }
    }

    /// Override loaded configuration with the flags that were given.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(root) = &self.root {
            config.root = root.clone();
        }
        if let Some(host) = &self.host {
            config.hostname = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(mime) = self.mime {
            config.mime = mime.into();
        }
        if let Some(index) = &self.index {
            config.index = index.clone();
        }
        if !self.aliases.is_empty() {
            config.aliases = self.aliases.clone();
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
    }
}
