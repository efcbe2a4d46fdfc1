//! Dynamic typed-node values
//!
//! Bound documents are trees of [`Node`]s whose field slots hold
//! [`Value`]s. Nodes are dynamic because their shape comes from a schema
//! compiled at runtime; the schema rule a node was built from travels with
//! it as a handle.

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

use crate::schema::RuleId;

/// Field name holding the character data of a mixed-content element
/// (an element that carries attributes or children alongside direct text).
pub const CONTENT_FIELD: &str = "content";

/// A bound value: a converted primitive, a list member slot, or a nested
/// element node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing or unconvertible value
    Null,
    /// String content
    Text(String),
    /// Numeric content; unconvertible numeric text yields NaN
    Number(f64),
    /// Boolean content
    Bool(bool),
    /// Date content with its source timezone offset
    Date(XmlDate),
    /// Repeated member slot, in document order
    List(Vec<Value>),
    /// Nested element
    Node(Node),
}

impl Value {
    /// Get string content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get numeric content. String content that parses as a number is
    /// coerced, matching how predicate operands compare.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Get boolean content
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get date content
    pub fn as_date(&self) -> Option<&XmlDate> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Get list content
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get node content
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Get mutable node content
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Whether this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Project this value to JSON. NaN numbers and nulls map to JSON null;
    /// dates map to their formatted text.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Number(n) if n.is_nan() => serializer.serialize_unit(),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Date(d) => serializer.collect_str(d),
            Value::List(items) => items.serialize(serializer),
            Value::Node(node) => node.serialize(serializer),
        }
    }
}

/// An element bound to its schema rule.
///
/// Created when the element opens, populated with converted attributes,
/// mutated as children close into it, and finally linked into its parent's
/// member slot. The original tag name is retained for diagnostics and hook
/// context only; the binder never re-traverses through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    rule: RuleId,
    name: String,
    fields: IndexMap<String, Value>,
}

impl Node {
    /// Create an empty node for a rule. `name` is the tag as it appeared
    /// in the document, prefix included.
    pub fn new(rule: RuleId, name: impl Into<String>) -> Self {
        Self {
            rule,
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// The schema rule this node was built from
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// The original tag name, prefix included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a field value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get a mutable field value
    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.fields.get_mut(field)
    }

    /// Set a field, overwriting any previous value
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    /// Append to a list field, creating the list on first use.
    /// A non-list value already in the slot is replaced by a fresh list.
    pub fn push(&mut self, field: impl Into<String>, value: Value) {
        let slot = self
            .fields
            .entry(field.into())
            .or_insert_with(|| Value::List(Vec::new()));
        match slot {
            Value::List(items) => items.push(value),
            other => *other = Value::List(vec![value]),
        }
    }

    /// Iterate fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of populated fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are populated
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Character data of a mixed-content element, if any
    pub fn content(&self) -> Option<&Value> {
        self.fields.get(CONTENT_FIELD)
    }

    /// A copy of this node restricted to a single field. Used to narrow
    /// the payload of attribute-scoped before-hooks.
    pub fn attribute_view(&self, field: &str) -> Node {
        let mut view = Node::new(self.rule, self.name.clone());
        if let Some(value) = self.fields.get(field) {
            view.set(field, value.clone());
        }
        view
    }

    /// Project this node to JSON: its fields only, in insertion order.
    /// The rule handle and tag name stay hidden.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A parsed date: the absolute instant plus the timezone offset that was
/// explicit in the source text, kept separately so the original local
/// rendering can be reconstructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XmlDate {
    /// The absolute instant
    pub instant: DateTime<Utc>,
    /// Offset from the source text, in minutes east of UTC
    pub timezone_offset: i32,
}

impl fmt::Display for XmlDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match FixedOffset::east_opt(self.timezone_offset * 60) {
            Some(tz) => write!(
                f,
                "{}",
                self.instant.with_timezone(&tz).format("%Y-%m-%dT%H:%M:%S%.3f%:z")
            ),
            None => write!(f, "{}", self.instant.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
        }
    }
}
