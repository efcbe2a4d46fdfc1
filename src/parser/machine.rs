//! Streaming bind state machine
//!
//! The core loop: consumes the event contract, maintains the frame
//! stack, resolves schema rules and namespaces, constructs typed nodes,
//! converts primitive content, and walks the matcher tree at every
//! element boundary to fire attached hooks.

use indexmap::IndexMap;
use std::rc::Rc;

use crate::context::QKey;
use crate::convert::convert_primitive;
use crate::error::{AttachmentLookupError, Error, Result};
use crate::parser::reader::EventSink;
use crate::parser::state::{Frame, NamespaceTable};
use crate::parser::Parser;
use crate::path::{Hook, HookKind};
use crate::schema::{MemberRef, RuleId, Schema};
use crate::value::{Node, Value, CONTENT_FIELD};
use crate::XML_NAMESPACE;

/// Lifecycle of one parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MachineState {
    /// Before the root element, or between a closed root and end of stream
    AwaitingRoot,
    /// Inside this many nested open elements
    InElement(usize),
    /// Stream ended, result delivered
    Done,
    /// Stream error, parse abandoned
    Failed,
}

/// One in-flight parse against a parser's schema and matcher tree
pub(crate) struct BindMachine<'p> {
    parser: &'p Parser,
    frames: Vec<Frame<'p>>,
    state: MachineState,
}

impl<'p> BindMachine<'p> {
    pub fn new(parser: &'p Parser) -> Self {
        let schema = parser.schema();
        let document = Schema::DOCUMENT;

        let mut namespaces = std::collections::HashMap::new();
        namespaces.insert(String::new(), schema.rule(document).namespace());
        namespaces.insert("xml".to_string(), schema.context().register(XML_NAMESPACE));

        let root = Frame::new(
            None,
            Some(document),
            None,
            Some(Node::new(document, "")),
            Rc::new(namespaces),
        );

        Self {
            parser,
            frames: vec![root],
            state: MachineState::AwaitingRoot,
        }
    }

    /// Deliver the result once the event stream has ended
    pub fn finish(mut self) -> Result<Value> {
        match self.state {
            MachineState::AwaitingRoot => {
                let root = self.frames.swap_remove(0);
                Ok(root.node.map(Value::Node).unwrap_or(Value::Null))
            }
            MachineState::InElement(depth) => Err(Error::Xml(format!(
                "end of stream with {} unclosed element(s)",
                depth
            ))),
            MachineState::Done | MachineState::Failed => {
                Err(Error::Xml("parse already finished".into()))
            }
        }
    }

    fn top(&self) -> usize {
        self.frames.len() - 1
    }

    /// Extend the prefix table from xmlns attributes, copying it only
    /// when this element actually introduces new prefixes.
    fn read_namespace_declarations(
        &self,
        attributes: &IndexMap<String, String>,
    ) -> NamespaceTable {
        let context = self.parser.schema().context();
        let mut namespaces = Rc::clone(&self.frames[self.top()].namespaces);

        for (key, value) in attributes {
            let prefix = if key == "xmlns" {
                Some("")
            } else {
                key.strip_prefix("xmlns:")
            };
            if let Some(prefix) = prefix {
                let id = context.register(value);
                if namespaces.get(prefix) != Some(&id) {
                    Rc::make_mut(&mut namespaces).insert(prefix.to_string(), id);
                }
            }
        }

        namespaces
    }

    /// Walk the frame chain from `start` outward, mirrored against the
    /// matcher tree, and return the requested hook if the chain matches.
    ///
    /// At each frame with a member name, the current tree level is
    /// scanned for a key matching name, namespace, and predicates; no
    /// match means no hook. Reaching a frame with no member name ends
    /// the walk at the current level's reserved slot, which must exist
    /// when the walk descended to get there.
    fn resolve_attached(&self, start: usize, kind: HookKind) -> Result<Option<Hook>> {
        let context = self.parser.schema().context();
        let mut tree = self.parser.tree();
        let mut index = start;
        let mut descended = false;

        loop {
            let frame = &self.frames[index];
            let member = match frame.member {
                Some(member) => member,
                None => {
                    return match tree.hook(kind) {
                        Some(hook) => Ok(Some(hook.clone())),
                        None if descended => {
                            let error = AttachmentLookupError::new(kind.label())
                                .with_path(self.frame_path(start));
                            log::error!("{}", error);
                            Err(error.into())
                        }
                        None => Ok(None),
                    };
                }
            };

            let mut matched = None;
            for (key, child) in tree.children() {
                if !key.namespace.is_empty() && !context.uri_is(member.namespace(), &key.namespace)
                {
                    continue;
                }
                if !key.matches_member(member.name(), frame.node.as_ref()) {
                    continue;
                }
                matched = Some(child);
                break;
            }

            let child = match matched {
                Some(child) => child,
                None => return Ok(None),
            };

            match frame.parent {
                Some(parent) => {
                    tree = child;
                    index = parent;
                    descended = true;
                }
                None => return Ok(child.hook(kind).cloned()),
            }
        }
    }

    /// Member-name path of a frame chain, for diagnostics
    fn frame_path(&self, start: usize) -> String {
        let mut names = Vec::new();
        let mut index = Some(start);
        while let Some(at) = index {
            let frame = &self.frames[at];
            if let Some(member) = frame.member {
                names.push(member.name());
            }
            index = frame.parent;
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    fn fire_hook(&mut self, at: usize, kind: HookKind) -> Result<()> {
        if self.frames[at].node.is_none() {
            return Ok(());
        }
        if let Some(hook) = self.resolve_attached(at, kind)? {
            if let Some(node) = self.frames[at].node.as_mut() {
                hook(node);
            }
        }
        Ok(())
    }

    fn fail(&mut self, error: Error) -> Error {
        self.state = MachineState::Failed;
        error
    }
}

fn split_name(name: &str) -> (&str, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (prefix, local),
        None => ("", name),
    }
}

impl EventSink for BindMachine<'_> {
    fn open_tag(&mut self, name: &str, attributes: &IndexMap<String, String>) -> Result<()> {
        self.state = match self.state {
            MachineState::AwaitingRoot => MachineState::InElement(1),
            MachineState::InElement(depth) => MachineState::InElement(depth + 1),
            MachineState::Done | MachineState::Failed => {
                return Err(self.fail(Error::Xml("open tag after end of parse".into())));
            }
        };

        let schema = self.parser.schema();
        let namespaces = self.read_namespace_declarations(attributes);

        let (prefix, local) = split_name(name);
        let element_ns = namespaces.get(prefix).copied();
        if element_ns.is_none() {
            log::warn!("no namespace bound for element prefix '{}'", prefix);
        }

        // Resolve the child member in the enclosing rule's child table.
        // A miss leaves both rule and member unset: the element is
        // schema-unknown, its content is ignored, but the stack still
        // grows so close events stay balanced.
        let mut parent = self.top();
        let mut member: Option<&MemberRef> = None;
        let mut rule: Option<RuleId> = None;

        if let (Some(current), Some(ns)) = (self.frames[parent].rule, element_ns) {
            if let Some(child) = schema.rule(current).child(&QKey::new(ns, local)) {
                if let Some(proxy) = child.proxy() {
                    // Invisible relay: push the wrapper's own frame first.
                    let relay = Frame::new(
                        Some(parent),
                        Some(proxy.rule()),
                        Some(proxy),
                        Some(Node::new(proxy.rule(), proxy.name())),
                        Rc::clone(&namespaces),
                    );
                    self.frames.push(relay);
                    parent = self.top();
                }
                member = Some(child);
                rule = Some(child.rule());
            }
        }

        // Instantiate the node and convert its attributes, unless the
        // rule is a plain primitive (whose value replaces the node).
        let mut node = None;
        if let Some(id) = rule {
            let r = schema.rule(id);
            if !r.is_plain_primitive() {
                let mut item = Node::new(id, name);

                for (key, value) in attributes {
                    if key == "xmlns" || key.starts_with("xmlns:") {
                        continue;
                    }
                    let attr_key = match key.split_once(':') {
                        Some((attr_prefix, attr_local)) => {
                            match namespaces.get(attr_prefix) {
                                Some(&ns) => QKey::new(ns, attr_local),
                                None => {
                                    log::warn!(
                                        "no namespace bound for attribute prefix '{}'",
                                        attr_prefix
                                    );
                                    continue;
                                }
                            }
                        }
                        // Unprefixed attributes take the element's namespace.
                        None => match element_ns {
                            Some(ns) => QKey::new(ns, key.as_str()),
                            None => continue,
                        },
                    };

                    if let Some(attr) = r.attribute(&attr_key) {
                        let attr_rule = schema.rule(attr.rule());
                        if attr_rule.is_plain_primitive() {
                            item.set(attr.safe_name(), convert_primitive(value, attr_rule));
                        }
                    }
                }

                node = Some(item);
            }
        }

        self.frames
            .push(Frame::new(Some(parent), rule, member, node, namespaces));

        let top = self.top();
        self.fire_hook(top, HookKind::Before)
            .map_err(|e| self.fail(e))
    }

    fn text(&mut self, chunk: &str) -> Result<()> {
        let top = self.top();
        if let Some(id) = self.frames[top].rule {
            if self.parser.schema().rule(id).is_primitive() {
                self.frames[top].text.push(chunk.to_string());
            }
        }
        Ok(())
    }

    fn close_tag(&mut self, name: &str) -> Result<()> {
        let top = self.top();
        if top == 0 {
            return Err(self.fail(Error::Xml(format!("unexpected closing tag </{}>", name))));
        }
        self.state = match self.state {
            MachineState::InElement(1) => MachineState::AwaitingRoot,
            MachineState::InElement(depth) => MachineState::InElement(depth - 1),
            other => {
                return Err(self.fail(Error::Xml(format!(
                    "closing tag </{}> in state {:?}",
                    name, other
                ))));
            }
        };

        let schema = self.parser.schema();

        // Finalize primitive content: plain primitives become the item
        // itself, mixed content lands in the node's content field.
        let mut plain_value: Option<Value> = None;
        if let Some(id) = self.frames[top].rule {
            let r = schema.rule(id);
            if r.is_primitive() {
                let text = self.frames[top].text.concat();
                let text = text.trim();
                if !text.is_empty() {
                    let content = convert_primitive(text, r);
                    if r.is_plain_primitive() {
                        plain_value = Some(content);
                    } else if let Some(node) = self.frames[top].node.as_mut() {
                        node.set(CONTENT_FIELD, content);
                    }
                }
            }
        }

        let after = if self.frames[top].node.is_some() {
            self.resolve_attached(top, HookKind::After)
                .map_err(|e| self.fail(e))?
        } else {
            None
        };

        let frame = match self.frames.pop() {
            Some(frame) => frame,
            None => return Err(self.fail(Error::Xml("frame stack underflow".into()))),
        };
        let mut node = frame.node;
        if let (Some(hook), Some(obj)) = (after, node.as_mut()) {
            hook(obj);
        }

        let mut item = match (node, plain_value) {
            (Some(node), _) => Some(Value::Node(node)),
            (None, Some(value)) => Some(value),
            (None, None) => None,
        };
        let mut member = frame.member;

        // Proxy propagation: hand the item to the wrapper frame, then
        // continue the attach step with the wrapper as the item and the
        // proxy member as the edge.
        if let Some(m) = member {
            if let Some(proxy) = m.proxy() {
                let relay = match self.frames.pop() {
                    Some(relay) => relay,
                    None => return Err(self.fail(Error::Xml("missing relay frame".into()))),
                };
                let mut relay_node = relay.node;
                if let (Some(value), Some(wrapper)) = (item.take(), relay_node.as_mut()) {
                    wrapper.set(m.safe_name(), value);
                }
                item = relay_node.map(Value::Node);
                member = Some(proxy);
            }
        }

        if let (Some(item), Some(m)) = (item, member) {
            let parent = self.top();
            if let Some(parent_node) = self.frames[parent].node.as_mut() {
                if m.is_repeated() {
                    parent_node.push(m.safe_name(), item);
                } else {
                    parent_node.set(m.safe_name(), item);
                }
            }
        }

        Ok(())
    }
}
