//! Namespace URI interning
//!
//! This module provides the registry mapping namespace URI strings to
//! compact internal handles, and the qualified keys built from them.
//! Schema rules and parse-time lookups both speak in handles so that
//! element and attribute resolution never compares URI strings.

use indexmap::IndexSet;
use std::sync::RwLock;

/// Compact handle for an interned namespace URI
pub type NsId = usize;

/// Qualified lookup key: interned namespace plus local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QKey {
    /// Interned namespace of the name
    pub namespace: NsId,
    /// Local part of the name
    pub local: String,
}

impl QKey {
    /// Create a new qualified key
    pub fn new(namespace: NsId, local: impl Into<String>) -> Self {
        Self {
            namespace,
            local: local.into(),
        }
    }
}

/// Registry interning namespace URIs to [`NsId`] handles.
///
/// One registry is shared by a schema and every parse against it.
/// Registration is idempotent; documents may introduce new URIs mid-parse
/// (via `xmlns` attributes), so registration stays available behind a lock
/// while concurrent parses read.
#[derive(Debug, Default)]
pub struct Context {
    uris: RwLock<IndexSet<String>>,
}

impl Context {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a URI, returning its handle. Re-registering returns the
    /// existing handle.
    pub fn register(&self, uri: &str) -> NsId {
        let mut uris = self.uris.write().expect("namespace registry poisoned");
        uris.insert_full(uri.to_string()).0
    }

    /// Look up the handle of an already-interned URI
    pub fn lookup(&self, uri: &str) -> Option<NsId> {
        let uris = self.uris.read().expect("namespace registry poisoned");
        uris.get_index_of(uri)
    }

    /// Get the URI interned under a handle
    pub fn uri(&self, id: NsId) -> Option<String> {
        let uris = self.uris.read().expect("namespace registry poisoned");
        uris.get_index(id).cloned()
    }

    /// Check whether a handle maps to the given URI without cloning
    pub fn uri_is(&self, id: NsId, uri: &str) -> bool {
        let uris = self.uris.read().expect("namespace registry poisoned");
        uris.get_index(id).map(|u| u == uri).unwrap_or(false)
    }

    /// Number of interned URIs
    pub fn len(&self) -> usize {
        self.uris.read().expect("namespace registry poisoned").len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
