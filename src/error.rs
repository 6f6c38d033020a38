//! Errors raised by the hosting side: documents, configuration and the terminal.
//!
//! The scroll coordinator itself has no error path; its failures are state transitions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failure while loading documents, reading configuration or driving the terminal.
pub enum SpyError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A configuration file was not valid.
    #[error("invalid config {}: {message}", path.display())]
    Config {
        /// Configuration file at fault.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// The markdown grammar could not be loaded or queried.
    #[error("tree-sitter: {0}")]
    Parser(String),
    /// A document contained no headings to navigate between.
    #[error("no sections found in {}", .0.display())]
    NoSections(PathBuf),
    /// Terminal setup, drawing or event polling failed.
    #[error("terminal: {0}")]
    Terminal(#[from] std::io::Error),
}
