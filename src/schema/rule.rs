//! Compiled schema rules
//!
//! A rule describes one XML type: its child elements, attributes,
//! primitive nature, and the method table that attached handlers merge
//! into. Rules live in an arena owned by the schema and refer to each
//! other by index.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::context::{NsId, QKey};
use crate::schema::MemberRef;
use crate::value::{Node, Value};

/// Index of a rule inside its schema
pub type RuleId = usize;

/// Scalar conversion applied to primitive content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Text kept as-is
    String,
    /// Numeric coercion; non-numeric text becomes NaN
    Number,
    /// True iff the text is exactly `true`
    Boolean,
    /// Date with optional time and timezone offset
    Date,
}

/// A named method merged onto a schema type by an attached handler.
/// Every node of that type, in any parse, dispatches it.
pub type Method = Arc<dyn Fn(&mut Node, &[Value]) -> Value + Send + Sync>;

/// Compiled description of one XML type
pub struct Rule {
    name: String,
    namespace: NsId,
    child_tbl: IndexMap<QKey, MemberRef>,
    attribute_tbl: IndexMap<QKey, MemberRef>,
    is_primitive: bool,
    is_plain_primitive: bool,
    is_list: bool,
    primitive: Option<PrimitiveKind>,
    methods: IndexMap<String, Method>,
    custom: bool,
}

impl Rule {
    fn empty(name: impl Into<String>, namespace: NsId) -> Self {
        Self {
            name: name.into(),
            namespace,
            child_tbl: IndexMap::new(),
            attribute_tbl: IndexMap::new(),
            is_primitive: false,
            is_plain_primitive: false,
            is_list: false,
            primitive: None,
            methods: IndexMap::new(),
            custom: false,
        }
    }

    /// An object-bearing type with child and attribute tables.
    pub(crate) fn complex(name: impl Into<String>, namespace: NsId) -> Self {
        Self::empty(name, namespace)
    }

    /// A primitive whose converted value replaces the node entirely.
    pub(crate) fn plain_primitive(kind: PrimitiveKind, namespace: NsId) -> Self {
        let mut rule = Self::empty(kind.label(), namespace);
        rule.is_primitive = true;
        rule.is_plain_primitive = true;
        rule.primitive = Some(kind);
        rule
    }

    /// A whitespace-separated list of plain primitives.
    pub(crate) fn plain_primitive_list(kind: PrimitiveKind, namespace: NsId) -> Self {
        let mut rule = Self::plain_primitive(kind, namespace);
        rule.is_list = true;
        rule
    }

    /// A primitive that still carries a node, so it can hold attributes
    /// and children next to its character data.
    pub(crate) fn mixed(name: impl Into<String>, kind: PrimitiveKind, namespace: NsId) -> Self {
        let mut rule = Self::empty(name, namespace);
        rule.is_primitive = true;
        rule.primitive = Some(kind);
        rule
    }

    /// Type name; empty for the implicit document rule
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace the type was declared in
    pub fn namespace(&self) -> NsId {
        self.namespace
    }

    /// Look up a child member by qualified name
    pub fn child(&self, key: &QKey) -> Option<&MemberRef> {
        self.child_tbl.get(key)
    }

    /// Look up an attribute member by qualified name
    pub fn attribute(&self, key: &QKey) -> Option<&MemberRef> {
        self.attribute_tbl.get(key)
    }

    /// Iterate child members in declaration order
    pub fn children(&self) -> impl Iterator<Item = &MemberRef> {
        self.child_tbl.values()
    }

    /// Iterate attribute members in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &MemberRef> {
        self.attribute_tbl.values()
    }

    /// Whether the type has primitive content (plain or mixed)
    pub fn is_primitive(&self) -> bool {
        self.is_primitive
    }

    /// Whether the converted value replaces the node entirely
    pub fn is_plain_primitive(&self) -> bool {
        self.is_plain_primitive
    }

    /// Whether primitive content is a whitespace-separated list
    pub fn is_list(&self) -> bool {
        self.is_list
    }

    /// Converter selecting tag, if the type is primitive
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        self.primitive
    }

    /// Look up a merged method by name
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    /// Whether any handler has been attached to this type
    pub fn has_custom_handlers(&self) -> bool {
        self.custom
    }

    pub(crate) fn add_child(&mut self, key: QKey, member: MemberRef) {
        self.child_tbl.insert(key, member);
    }

    pub(crate) fn add_attribute(&mut self, key: QKey, member: MemberRef) {
        self.attribute_tbl.insert(key, member);
    }

    pub(crate) fn merge_method(&mut self, name: impl Into<String>, method: Method) {
        self.methods.insert(name.into(), method);
    }

    pub(crate) fn mark_custom(&mut self) {
        self.custom = true;
    }
}

impl PrimitiveKind {
    /// Lowercase tag naming the converter
    pub fn label(self) -> &'static str {
        match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Date => "date",
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("children", &self.child_tbl.len())
            .field("attributes", &self.attribute_tbl.len())
            .field("is_primitive", &self.is_primitive)
            .field("is_plain_primitive", &self.is_plain_primitive)
            .field("is_list", &self.is_list)
            .field("primitive", &self.primitive)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_flags() {
        let plain = Rule::plain_primitive(PrimitiveKind::Number, 0);
        assert!(plain.is_primitive());
        assert!(plain.is_plain_primitive());
        assert!(!plain.is_list());
        assert_eq!(plain.primitive(), Some(PrimitiveKind::Number));

        let mixed = Rule::mixed("Comment", PrimitiveKind::String, 0);
        assert!(mixed.is_primitive());
        assert!(!mixed.is_plain_primitive());

        let list = Rule::plain_primitive_list(PrimitiveKind::Number, 0);
        assert!(list.is_list());
    }

    #[test]
    fn test_method_merge() {
        let mut rule = Rule::complex("dir", 0);
        assert!(rule.method("describe").is_none());
        assert!(!rule.has_custom_handlers());

        rule.merge_method(
            "describe",
            Arc::new(|node: &mut Node, _: &[Value]| Value::Text(node.name().to_string())),
        );
        rule.mark_custom();

        assert!(rule.method("describe").is_some());
        assert!(rule.has_custom_handlers());
    }
}
