//! Fluent construction of rule graphs
//!
//! The builder assembles the rule arena the binder parses against. It is
//! the write-side of the schema: once built, a schema is only read.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::{Context, NsId, QKey};
use crate::schema::{MemberRef, PrimitiveKind, Rule, RuleId, Schema, UNBOUNDED};
use crate::XML_NAMESPACE;

/// Declarative member edge passed to [`SchemaBuilder::child`] and
/// [`SchemaBuilder::root`]
#[derive(Debug, Clone)]
pub struct Member {
    name: String,
    safe_name: Option<String>,
    namespace: Option<NsId>,
    rule: RuleId,
    min: u32,
    max: u32,
    proxy: Option<Box<Member>>,
}

impl Member {
    /// A required, single-occurrence member
    pub fn new(name: impl Into<String>, rule: RuleId) -> Self {
        Self {
            name: name.into(),
            safe_name: None,
            namespace: None,
            rule,
            min: 1,
            max: 1,
            proxy: None,
        }
    }

    /// Allow zero occurrences
    pub fn optional(mut self) -> Self {
        self.min = 0;
        self
    }

    /// Allow unbounded occurrences; parsed values collect into a list
    pub fn repeated(mut self) -> Self {
        self.max = UNBOUNDED;
        self
    }

    /// Store the parsed value under a key other than the XML name
    pub fn stored_as(mut self, safe_name: impl Into<String>) -> Self {
        self.safe_name = Some(safe_name.into());
        self
    }

    /// Qualify the member in a namespace other than its rule's
    pub fn in_namespace(mut self, namespace: NsId) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Route this member through a transparent wrapper type. The wrapper
    /// member names the slot the wrapper object occupies in the parent;
    /// this member names the slot the parsed child occupies inside the
    /// wrapper.
    pub fn via(mut self, proxy: Member) -> Self {
        self.proxy = Some(Box::new(proxy));
        self
    }
}

/// Builder for [`Schema`]
#[derive(Debug)]
pub struct SchemaBuilder {
    context: Arc<Context>,
    rules: Vec<Rule>,
    default_ns: NsId,
    primitives: HashMap<(PrimitiveKind, bool), RuleId>,
}

impl SchemaBuilder {
    /// Start a schema whose unprefixed names live in `default_namespace`
    /// (pass the empty string for no namespace)
    pub fn new(default_namespace: &str) -> Self {
        Self::with_context(Arc::new(Context::new()), default_namespace)
    }

    /// Start a schema against an existing namespace registry
    pub fn with_context(context: Arc<Context>, default_namespace: &str) -> Self {
        let default_ns = context.register(default_namespace);
        context.register(XML_NAMESPACE);
        let document = Rule::complex("", default_ns);
        Self {
            context,
            rules: vec![document],
            default_ns,
            primitives: HashMap::new(),
        }
    }

    /// The namespace registry this schema interns against
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Handle of the default namespace
    pub fn default_namespace(&self) -> NsId {
        self.default_ns
    }

    /// Intern an additional namespace URI
    pub fn namespace(&mut self, uri: &str) -> NsId {
        self.context.register(uri)
    }

    /// A plain primitive rule: its converted value replaces the node.
    /// Repeated calls for the same kind return the same rule.
    pub fn primitive(&mut self, kind: PrimitiveKind) -> RuleId {
        if let Some(&id) = self.primitives.get(&(kind, false)) {
            return id;
        }
        let id = self.push(Rule::plain_primitive(kind, self.default_ns));
        self.primitives.insert((kind, false), id);
        id
    }

    /// A whitespace-separated list of plain primitives
    pub fn primitive_list(&mut self, kind: PrimitiveKind) -> RuleId {
        if let Some(&id) = self.primitives.get(&(kind, true)) {
            return id;
        }
        let id = self.push(Rule::plain_primitive_list(kind, self.default_ns));
        self.primitives.insert((kind, true), id);
        id
    }

    /// An object-bearing type in the default namespace
    pub fn complex(&mut self, name: &str) -> RuleId {
        self.push(Rule::complex(name, self.default_ns))
    }

    /// An object-bearing type in a specific namespace
    pub fn complex_in(&mut self, name: &str, namespace: NsId) -> RuleId {
        self.push(Rule::complex(name, namespace))
    }

    /// A mixed-content type: character data converted per `kind` lands in
    /// the node's content field, next to attributes and children
    pub fn mixed(&mut self, name: &str, kind: PrimitiveKind) -> RuleId {
        self.push(Rule::mixed(name, kind, self.default_ns))
    }

    /// A mixed-content type in a specific namespace
    pub fn mixed_in(&mut self, name: &str, kind: PrimitiveKind, namespace: NsId) -> RuleId {
        self.push(Rule::mixed(name, kind, namespace))
    }

    /// Declare an attribute on `owner`, qualified in the owner's namespace
    pub fn attribute(&mut self, owner: RuleId, name: &str, rule: RuleId) {
        let namespace = self.rules[owner].namespace();
        self.attribute_in(owner, name, namespace, rule);
    }

    /// Declare an attribute on `owner` in a specific namespace
    pub fn attribute_in(&mut self, owner: RuleId, name: &str, namespace: NsId, rule: RuleId) {
        let member = MemberRef::new(name, name, namespace, rule, 0, 1, None);
        self.rules[owner].add_attribute(QKey::new(namespace, name), member);
    }

    /// Declare a child element member on `owner`
    pub fn child(&mut self, owner: RuleId, member: Member) {
        let member = self.resolve(member);
        let key = QKey::new(member.namespace(), member.name());
        self.rules[owner].add_child(key, member);
    }

    /// Declare a document-level root element
    pub fn root(&mut self, member: Member) {
        self.child(Schema::DOCUMENT, member);
    }

    /// Finish the schema
    pub fn build(self) -> Schema {
        Schema::new(self.context, self.rules)
    }

    fn push(&mut self, rule: Rule) -> RuleId {
        self.rules.push(rule);
        self.rules.len() - 1
    }

    fn resolve(&self, member: Member) -> MemberRef {
        let namespace = member
            .namespace
            .unwrap_or_else(|| self.rules[member.rule].namespace());
        let safe_name = member.safe_name.unwrap_or_else(|| member.name.clone());
        let proxy = member.proxy.map(|p| Box::new(self.resolve(*p)));
        MemberRef::new(
            member.name, safe_name, namespace, member.rule, member.min, member.max, proxy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert_primitive;
    use crate::value::Value;

    #[test]
    fn test_builds_child_and_attribute_tables() {
        let mut b = SchemaBuilder::new("");
        let string = b.primitive(PrimitiveKind::String);
        let number = b.primitive(PrimitiveKind::Number);
        let file = b.mixed("file", PrimitiveKind::String);
        b.attribute(file, "name", string);
        b.attribute(file, "size", number);
        let dir = b.complex("dir");
        b.attribute(dir, "name", string);
        b.child(dir, Member::new("file", file).optional().repeated());
        b.root(Member::new("dir", dir).optional());
        let ns = b.default_namespace();
        let schema = b.build();

        let doc = schema.rule(Schema::DOCUMENT);
        let dir_member = doc.child(&QKey::new(ns, "dir")).unwrap();
        assert_eq!(dir_member.safe_name(), "dir");
        assert!(!dir_member.is_repeated());

        let dir_rule = schema.rule(dir_member.rule());
        assert_eq!(dir_rule.name(), "dir");
        let file_member = dir_rule.child(&QKey::new(ns, "file")).unwrap();
        assert!(file_member.is_repeated());
        assert!(dir_rule.attribute(&QKey::new(ns, "name")).is_some());
    }

    #[test]
    fn test_primitive_rules_are_shared() {
        let mut b = SchemaBuilder::new("");
        assert_eq!(
            b.primitive(PrimitiveKind::String),
            b.primitive(PrimitiveKind::String)
        );
        assert_ne!(
            b.primitive(PrimitiveKind::String),
            b.primitive_list(PrimitiveKind::String)
        );
    }

    #[test]
    fn test_rule_by_name() {
        let mut b = SchemaBuilder::new("");
        let dir = b.complex("dir");
        b.root(Member::new("dir", dir));
        let schema = b.build();

        assert_eq!(schema.rule_by_name("dir"), Some(dir));
        assert_eq!(schema.rule_by_name("nope"), None);
    }

    #[test]
    fn test_member_defaults_and_overrides() {
        let mut b = SchemaBuilder::new("http://example.com/default");
        let other = b.namespace("http://example.com/other");
        let item = b.complex("item");
        let holder = b.complex("holder");
        b.child(
            holder,
            Member::new("item", item)
                .stored_as("items")
                .in_namespace(other)
                .optional()
                .repeated(),
        );
        let schema = b.build();

        let member = schema
            .rule(holder)
            .child(&QKey::new(other, "item"))
            .unwrap();
        assert_eq!(member.safe_name(), "items");
        assert_eq!(member.namespace(), other);
        assert_eq!(member.min(), 0);
        assert_eq!(member.max(), UNBOUNDED);
    }

    #[test]
    fn test_list_primitive_conversion() {
        let mut b = SchemaBuilder::new("");
        let numbers = b.primitive_list(PrimitiveKind::Number);
        let schema = b.build();

        let value = convert_primitive("  1 2.5\t3 ", schema.rule(numbers));
        assert_eq!(
            value,
            Value::List(vec![
                Value::Number(1.0),
                Value::Number(2.5),
                Value::Number(3.0),
            ])
        );
    }

    #[test]
    fn test_xml_namespace_is_preregistered() {
        let b = SchemaBuilder::new("");
        assert!(b.context().lookup(XML_NAMESPACE).is_some());
    }
}
