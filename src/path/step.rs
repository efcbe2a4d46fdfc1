//! Compiled path steps and predicates

use crate::value::{Node, Value};

/// Traversal axis of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `/name` — element child
    Child,
    /// `@name` — attribute restriction
    Attribute,
}

/// Comparison operator inside a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// Parse an operator token
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    fn holds<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// Right-hand side of a predicate comparison
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    /// Bare numeric literal
    Number(f64),
    /// Quoted (or non-numeric bare) literal
    Text(String),
}

/// Attribute comparison gating a step match, e.g. `[@CenterX>1]`
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Attribute read from the candidate node
    pub left: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Literal compared against
    pub right: PredicateValue,
}

impl Predicate {
    /// Evaluate against an in-progress node. Only attributes parsed so
    /// far are visible; a missing attribute fails the predicate.
    pub fn evaluate(&self, candidate: &Node) -> bool {
        let value = match candidate.get(&self.left) {
            Some(value) => value,
            None => return false,
        };
        match &self.right {
            PredicateValue::Number(right) => match value.as_f64() {
                Some(left) => self.op.holds(left, *right),
                None => false,
            },
            PredicateValue::Text(right) => match value {
                Value::Text(left) => self.op.holds(left.as_str(), right.as_str()),
                other => match (other.as_f64(), right.parse::<f64>()) {
                    (Some(left), Ok(right)) => self.op.holds(left, right),
                    _ => false,
                },
            },
        }
    }
}

/// One compiled segment of a path expression.
///
/// Structural equality over all fields is the matcher-tree key equality:
/// two attachments whose paths share a tail share tree nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct StepMatcher {
    /// Step axis
    pub axis: Axis,
    /// Namespace URI; empty matches members in any namespace
    pub namespace: String,
    /// Local name; `None` is the wildcard `*`
    pub name: Option<String>,
    /// Predicates, all of which must hold
    pub predicates: Vec<Predicate>,
    /// Attribute restriction carried by a trailing `@name`/`@*` segment.
    /// Never a tree key; only narrows the before-hook payload.
    pub attribute: Option<String>,
}

impl StepMatcher {
    /// A bare element step
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            axis: Axis::Child,
            namespace: String::new(),
            name: Some(name.into()),
            predicates: Vec::new(),
            attribute: None,
        }
    }

    /// A trailing attribute step
    pub fn attribute(name: impl Into<String>) -> Self {
        Self {
            axis: Axis::Attribute,
            namespace: String::new(),
            name: None,
            predicates: Vec::new(),
            attribute: Some(name.into()),
        }
    }

    /// Whether this is an attribute restriction step
    pub fn is_attribute(&self) -> bool {
        self.attribute.is_some()
    }

    /// Whether the attribute restriction is the wildcard `@*`
    pub fn is_wildcard_attribute(&self) -> bool {
        self.attribute.as_deref() == Some("*")
    }

    /// Name-and-predicate part of a parse-time match: the name equals the
    /// member name (or is the wildcard) and every predicate holds against
    /// the candidate node. Predicates on a node-less candidate never hold.
    pub fn matches_member(&self, member_name: &str, candidate: Option<&Node>) -> bool {
        if let Some(name) = &self.name {
            if name != member_name {
                return false;
            }
        }
        if self.predicates.is_empty() {
            return true;
        }
        match candidate {
            Some(node) => self.predicates.iter().all(|p| p.evaluate(node)),
            None => false,
        }
    }
}
