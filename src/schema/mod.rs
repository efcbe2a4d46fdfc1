//! Schema rule graph
//!
//! The compiled schema the binder parses against: an arena of [`Rule`]s
//! connected by [`MemberRef`] edges, entered through an implicit document
//! rule whose children are the permitted root elements.

mod builder;
mod member;
mod rule;

pub use builder::{Member, SchemaBuilder};
pub use member::{MemberRef, UNBOUNDED};
pub use rule::{Method, PrimitiveKind, Rule, RuleId};

use std::sync::Arc;

use crate::context::Context;
use crate::value::{Node, Value};

/// A compiled schema: the rule arena plus its namespace registry.
///
/// Read-only once built, except for the per-rule method tables which
/// [`crate::parser::Parser::attach`] merges into.
#[derive(Debug)]
pub struct Schema {
    context: Arc<Context>,
    rules: Vec<Rule>,
}

impl Schema {
    /// Rule id of the implicit document rule
    pub const DOCUMENT: RuleId = 0;

    pub(crate) fn new(context: Arc<Context>, rules: Vec<Rule>) -> Self {
        Self { context, rules }
    }

    /// The namespace registry shared by this schema and its parses
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Get a rule by id
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id]
    }

    pub(crate) fn rule_mut(&mut self, id: RuleId) -> &mut Rule {
        &mut self.rules[id]
    }

    /// Find a rule by its declared type name
    pub fn rule_by_name(&self, name: &str) -> Option<RuleId> {
        if name.is_empty() {
            return None;
        }
        self.rules.iter().position(|r| r.name() == name)
    }

    /// Number of rules, the implicit document rule included
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the schema holds only the document rule
    pub fn is_empty(&self) -> bool {
        self.rules.len() <= 1
    }

    /// Dispatch a merged handler method on a node of this schema.
    /// Returns `None` when the node's type carries no such method.
    pub fn call(&self, node: &mut Node, method: &str, args: &[Value]) -> Option<Value> {
        let method = self.rules[node.rule()].method(method)?.clone();
        Some(method(node, args))
    }
}
