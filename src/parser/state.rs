//! Per-element parse state
//!
//! One frame exists per currently-open element, linked to its parent by
//! index into the machine's frame stack. Frames chain upward only;
//! siblings never see each other.

use std::collections::HashMap;
use std::rc::Rc;

use crate::context::NsId;
use crate::schema::{MemberRef, RuleId};
use crate::value::Node;

/// Prefix table visible inside one element. Shared by reference with the
/// parent until the element introduces new prefixes.
pub(crate) type NamespaceTable = Rc<HashMap<String, NsId>>;

/// Parse state for one open element
pub(crate) struct Frame<'s> {
    /// Index of the enclosing frame; `None` at the document root
    pub parent: Option<usize>,
    /// Active schema rule; `None` for schema-unknown elements
    pub rule: Option<RuleId>,
    /// Member edge that produced this frame; `None` at the document root
    pub member: Option<&'s MemberRef>,
    /// In-progress node; `None` for plain-primitive or unknown content
    pub node: Option<Node>,
    /// Buffered character data, possibly in multiple chunks
    pub text: Vec<String>,
    /// Namespace prefixes visible to this element and its children
    pub namespaces: NamespaceTable,
}

impl<'s> Frame<'s> {
    pub fn new(
        parent: Option<usize>,
        rule: Option<RuleId>,
        member: Option<&'s MemberRef>,
        node: Option<Node>,
        namespaces: NamespaceTable,
    ) -> Self {
        Self {
            parent,
            rule,
            member,
            node,
            text: Vec::new(),
            namespaces,
        }
    }
}
