//! Streaming binder
//!
//! [`Parser`] is the public surface: attach handlers, then parse any
//! number of documents against the same schema and matcher tree. Each
//! parse owns its own state; the shared structures are only read, so
//! separate parses may run concurrently from separate threads.

mod handler;
mod machine;
mod reader;
mod state;

pub use handler::{Handler, RESERVED_HOOK_NAMES};
pub use reader::{drive_reader, drive_str, EventSink};

use std::collections::HashMap;
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::path::{self, MatcherNode};
use crate::schema::Schema;
use crate::value::Value;

use machine::BindMachine;

/// A configured binder: a schema plus the matcher tree built by attach
/// calls.
///
/// Attaching requires exclusive access and must complete before the
/// parses that depend on it; parsing borrows shared, so the borrow
/// checker enforces that ordering.
#[derive(Debug)]
pub struct Parser {
    schema: Schema,
    tree: MatcherNode,
    prefixes: HashMap<String, String>,
}

impl Parser {
    /// A parser over a schema, with no path prefixes registered
    pub fn new(schema: Schema) -> Self {
        Self::with_prefixes(schema, HashMap::new())
    }

    /// A parser whose path expressions may use the given prefix → URI
    /// table, e.g. `{"bp": "http://www.biopax.org/release/biopax-level3.owl#"}`
    pub fn with_prefixes(schema: Schema, prefixes: HashMap<String, String>) -> Self {
        Self {
            schema,
            tree: MatcherNode::new(),
            prefixes,
        }
    }

    /// The schema this parser binds against
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub(crate) fn tree(&self) -> &MatcherNode {
        &self.tree
    }

    /// Attach a handler to the schema type named `type_name`.
    ///
    /// Named methods merge into the type's method table, visible to
    /// every node of that type in every subsequent parse. If the handler
    /// defines hooks and a path is given, the path is compiled and the
    /// hooks inserted into the matcher tree; with no path the hooks land
    /// at the tree root. Hook dispatch matches name, namespace, and
    /// predicates level by level without verifying the entire ancestor
    /// chain identity, so two same-named elements sharing a structural
    /// ancestor pattern can both trigger a hook meant for only one of
    /// them. That looseness is part of the contract, not a defect.
    ///
    /// A path using an unregistered prefix fails before any tree
    /// mutation.
    pub fn attach(&mut self, type_name: &str, handler: Handler, path: Option<&str>) -> Result<()> {
        let rule_id = self
            .schema
            .rule_by_name(type_name)
            .ok_or_else(|| Error::Schema(format!("no type named '{}'", type_name)))?;

        let (methods, before, after) = handler.into_parts();

        if before.is_some() || after.is_some() {
            let steps = match path {
                Some(path) => path::compile(path, &self.prefixes)?,
                None => Vec::new(),
            };
            self.tree.insert(steps, before, after);
        }

        let rule = self.schema.rule_mut(rule_id);
        for (name, method) in methods {
            if RESERVED_HOOK_NAMES.contains(&name.as_str()) {
                continue;
            }
            rule.merge_method(name, method);
        }
        rule.mark_custom();

        Ok(())
    }

    /// Parse a whole XML string into a bound document tree.
    ///
    /// The result settles exactly once: the document node on success, an
    /// error on stream failure or hook-resolution failure, with no
    /// partial document either way.
    pub fn parse_str(&self, xml: &str) -> Result<Value> {
        let mut machine = BindMachine::new(self);
        reader::drive_str(xml, &mut machine)?;
        machine.finish()
    }

    /// Parse from a buffered reader
    pub fn parse_reader<R: BufRead>(&self, source: R) -> Result<Value> {
        let mut machine = BindMachine::new(self);
        reader::drive_reader(source, &mut machine)?;
        machine.finish()
    }
}
