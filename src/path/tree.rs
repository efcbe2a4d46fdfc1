//! The matcher tree
//!
//! A trie of step matchers carrying before/after hooks. Paths are stored
//! leaf-to-root: resolution at parse time walks the live frame chain from
//! the innermost element outward, so lookup mirrors the storage direction
//! with no re-reversal.

use std::fmt;
use std::sync::Arc;

use crate::path::StepMatcher;
use crate::value::Node;

/// Callable invoked at an element boundary, bound to the element's node
pub type Hook = Arc<dyn Fn(&mut Node) + Send + Sync>;

/// Which reserved slot a resolution walk is after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    /// Fires when the opening tag and its attributes have been parsed
    Before,
    /// Fires when the closing tag and all children have been parsed
    After,
}

impl HookKind {
    /// Reserved slot name, for diagnostics
    pub fn label(self) -> &'static str {
        match self {
            HookKind::Before => "_before",
            HookKind::After => "_after",
        }
    }
}

/// One node of the matcher tree.
///
/// Children are keyed by structural step-matcher equality and scanned
/// linearly; insertion order is irrelevant. The reserved hook slots live
/// as fields, so they can never collide with structural keys.
#[derive(Default)]
pub struct MatcherNode {
    children: Vec<(StepMatcher, MatcherNode)>,
    before: Option<Hook>,
    after: Option<Hook>,
}

impl MatcherNode {
    /// An empty tree node
    pub fn new() -> Self {
        Self::default()
    }

    /// The reserved slot for `kind`, if populated
    pub fn hook(&self, kind: HookKind) -> Option<&Hook> {
        match kind {
            HookKind::Before => self.before.as_ref(),
            HookKind::After => self.after.as_ref(),
        }
    }

    /// Iterate child entries in insertion order
    pub fn children(&self) -> impl Iterator<Item = &(StepMatcher, MatcherNode)> {
        self.children.iter()
    }

    /// Whether the node has no children and no hooks
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.before.is_none() && self.after.is_none()
    }

    /// Insert hooks at the position named by `steps` (root-first, as the
    /// compiler produces them).
    ///
    /// The walk runs in reverse, sharing existing tree nodes whose keys
    /// are structurally equal. A trailing attribute step is stripped
    /// first: a named attribute wraps the before-hook so it receives a
    /// single-field view of the element, the wildcard `@*` passes the
    /// element through unchanged, and the after-hook is never restricted.
    /// With no steps at all the hooks land in this node's own slots.
    pub fn insert(
        &mut self,
        mut steps: Vec<StepMatcher>,
        before: Option<Hook>,
        after: Option<Hook>,
    ) {
        let has_attribute_tail = steps.last().map(|s| s.is_attribute()).unwrap_or(false);
        let attribute_step = if has_attribute_tail { steps.pop() } else { None };
        let before = match (before, attribute_step.and_then(|step| step.attribute)) {
            (Some(hook), Some(attribute)) if attribute != "*" => {
                Some(restrict_to_attribute(hook, attribute))
            }
            (before, _) => before,
        };

        let mut node = self;
        for step in steps.into_iter().rev() {
            let index = match node.children.iter().position(|(key, _)| *key == step) {
                Some(index) => index,
                None => {
                    node.children.push((step, MatcherNode::new()));
                    node.children.len() - 1
                }
            };
            node = &mut node.children[index].1;
        }

        if let Some(hook) = before {
            node.before = Some(hook);
        }
        if let Some(hook) = after {
            node.after = Some(hook);
        }
    }
}

fn restrict_to_attribute(hook: Hook, attribute: String) -> Hook {
    Arc::new(move |node: &mut Node| {
        let mut view = node.attribute_view(&attribute);
        hook(&mut view);
    })
}

impl fmt::Debug for MatcherNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatcherNode")
            .field(
                "children",
                &self.children.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}
