//! Attachable element handlers
//!
//! A handler bundles the hooks and named methods merged onto a schema
//! type by [`crate::parser::Parser::attach`].

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::path::Hook;
use crate::schema::Method;
use crate::value::{Node, Value};

/// Method names that can never be merged as ordinary methods
pub const RESERVED_HOOK_NAMES: [&str; 2] = ["_before", "_after"];

/// Hooks and methods destined for one schema type
#[derive(Default, Clone)]
pub struct Handler {
    methods: IndexMap<String, Method>,
    before: Option<Hook>,
    after: Option<Hook>,
}

impl Handler {
    /// An empty handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hook fired when an opening tag and its attributes have
    /// been parsed
    pub fn before(mut self, hook: impl Fn(&mut Node) + Send + Sync + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    /// Set the hook fired when a closing tag and all children have been
    /// parsed
    pub fn after(mut self, hook: impl Fn(&mut Node) + Send + Sync + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    /// Add a named method. Reserved hook names are silently dropped at
    /// merge time; use [`Handler::before`] / [`Handler::after`] instead.
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&mut Node, &[Value]) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    /// Whether either hook is defined
    pub fn has_hooks(&self) -> bool {
        self.before.is_some() || self.after.is_some()
    }

    pub(crate) fn into_parts(self) -> (IndexMap<String, Method>, Option<Hook>, Option<Hook>) {
        (self.methods, self.before, self.after)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}
