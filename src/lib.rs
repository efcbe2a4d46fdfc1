//! # xmlbind
//!
//! Streaming XML to typed-object binding. A pre-compiled schema drives
//! an event-based parse that builds a strongly-shaped tree of dynamic
//! nodes, converting primitive content along the way; user handlers
//! attach to schema types and fire at element open and close, scoped by
//! an XPath-like path expression with attribute and comparison
//! predicates.
//!
//! ## Features
//!
//! - Incremental, event-driven binding (no DOM is retained)
//! - Schema-directed node construction with cardinality-aware member slots
//! - Before/after hooks resolved by a bottom-up matcher-tree walk
//! - Attribute-scoped hooks (`/A/@Name`) and predicates (`/A/B[@X>1]`)
//! - Transparent proxy member indirection
//! - Primitive conversion for strings, numbers, booleans, dates, and
//!   whitespace-separated lists
//!
//! ## Example
//!
//! ```rust
//! use xmlbind::{Handler, Member, Parser, PrimitiveKind, SchemaBuilder, Value};
//!
//! let mut b = SchemaBuilder::new("");
//! let string = b.primitive(PrimitiveKind::String);
//! let dir = b.complex("dir");
//! b.attribute(dir, "name", string);
//! b.root(Member::new("dir", dir).optional());
//!
//! let mut parser = Parser::new(b.build());
//! parser.attach(
//!     "dir",
//!     Handler::new()
//!         .before(|dir| assert_eq!(dir.get("name").and_then(Value::as_str), Some("empty")))
//!         .after(|_| {}),
//!     Some("/dir"),
//! )?;
//!
//! let doc = parser.parse_str(r#"<dir name="empty"></dir>"#)?;
//! assert_eq!(doc.to_json().to_string(), r#"{"dir":{"name":"empty"}}"#);
//! # Ok::<(), xmlbind::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod context;
pub mod error;

// Data model
pub mod convert;
pub mod value;

// Schema rule graph
pub mod schema;

// Path matching
pub mod path;

// Streaming binder
pub mod parser;

// Re-exports for convenience
pub use context::{Context, NsId, QKey};
pub use error::{AttachmentLookupError, Error, NamespaceResolutionError, Result};
pub use parser::{EventSink, Handler, Parser};
pub use schema::{Member, MemberRef, PrimitiveKind, Rule, RuleId, Schema, SchemaBuilder};
pub use value::{Node, Value, XmlDate};

/// Version of the xmlbind library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML namespace, bound to the `xml` prefix in every parse
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
