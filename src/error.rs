//! Error types for xmlbind
//!
//! This module defines all error types used throughout the library.
//! Configuration problems (bad path expressions, unregistered namespace
//! prefixes) surface at attach time; stream-level problems surface at
//! parse time with no partial document returned.

use std::fmt;
use thiserror::Error;

/// Result type alias using the xmlbind Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmlbind operations
#[derive(Error, Debug)]
pub enum Error {
    /// A path expression referenced an unregistered namespace prefix
    #[error("namespace resolution error: {0}")]
    Namespace(#[from] NamespaceResolutionError),

    /// Hook resolution reached a tree position whose reserved slot is missing
    #[error("attachment lookup error: {0}")]
    Attachment(#[from] AttachmentLookupError),

    /// Malformed path expression
    #[error("path error: {0}")]
    Path(String),

    /// Schema lookup or construction error
    #[error("schema error: {0}")]
    Schema(String),

    /// XML parsing error from the event source
    #[error("XML error: {0}")]
    Xml(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A path expression used a namespace prefix missing from the prefix table.
///
/// Raised during path compilation, before any matcher-tree mutation, so a
/// failed attach never corrupts the tree.
#[derive(Debug, Clone)]
pub struct NamespaceResolutionError {
    /// The unresolved prefix
    pub prefix: String,
    /// The path expression being compiled
    pub path: Option<String>,
}

impl NamespaceResolutionError {
    /// Create a new namespace resolution error
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            path: None,
        }
    }

    /// Set the path expression that referenced the prefix
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for NamespaceResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no namespace registered for prefix '{}'", self.prefix)?;

        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for NamespaceResolutionError {}

/// Hook resolution expected a reserved slot at the matcher-tree root but
/// found none.
///
/// This indicates an internal invariant violation rather than bad input:
/// a matcher chain existed for the element's ancestor path but the slot
/// for the requested hook was never populated.
#[derive(Debug, Clone)]
pub struct AttachmentLookupError {
    /// The reserved slot that was requested ("_before" or "_after")
    pub hook: String,
    /// Ancestor path of the element whose resolution failed
    pub path: Option<String>,
}

impl AttachmentLookupError {
    /// Create a new attachment lookup error
    pub fn new(hook: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            path: None,
        }
    }

    /// Set the ancestor path of the failing element
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for AttachmentLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing '{}' slot at the end of a matcher chain", self.hook)?;

        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for AttachmentLookupError {}
