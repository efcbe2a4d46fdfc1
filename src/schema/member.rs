//! Member references
//!
//! A member reference is a named, cardinality-bounded edge from a rule to
//! a child rule, covering both element children and attributes. A member
//! may carry a proxy reference: a transparent wrapper type the schema
//! inserts between parent and child with no XML-visible effect.

use crate::context::NsId;
use crate::schema::RuleId;

/// Upper occurrence bound meaning "unbounded"
pub const UNBOUNDED: u32 = u32::MAX;

/// A named, cardinality-bounded edge from a rule to a child rule
#[derive(Debug, Clone)]
pub struct MemberRef {
    name: String,
    safe_name: String,
    namespace: NsId,
    rule: RuleId,
    min: u32,
    max: u32,
    proxy: Option<Box<MemberRef>>,
}

impl MemberRef {
    pub(crate) fn new(
        name: impl Into<String>,
        safe_name: impl Into<String>,
        namespace: NsId,
        rule: RuleId,
        min: u32,
        max: u32,
        proxy: Option<Box<MemberRef>>,
    ) -> Self {
        Self {
            name: name.into(),
            safe_name: safe_name.into(),
            namespace,
            rule,
            min,
            max,
            proxy,
        }
    }

    /// XML name of the member
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property key under which the parsed value is stored; may differ
    /// from the XML name
    pub fn safe_name(&self) -> &str {
        &self.safe_name
    }

    /// Namespace of the member
    pub fn namespace(&self) -> NsId {
        self.namespace
    }

    /// Rule of the member's type
    pub fn rule(&self) -> RuleId {
        self.rule
    }

    /// Minimum occurrence bound
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Maximum occurrence bound; values above one select list storage
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Whether more than one occurrence may be stored
    pub fn is_repeated(&self) -> bool {
        self.max > 1
    }

    /// Proxy indirection, if the schema wraps this member in a
    /// transparent relay type
    pub fn proxy(&self) -> Option<&MemberRef> {
        self.proxy.as_deref()
    }
}
