//! Shared schema fixtures for the integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use xmlbind::{Member, Parser, PrimitiveKind, Schema, SchemaBuilder};

/// GPML namespace used by the pathway fixtures
pub const GPML_NS: &str = "http://pathvisio.org/GPML/2013a";

/// BioPAX level 3 namespace
pub const BIOPAX_NS: &str = "http://www.biopax.org/release/biopax-level3.owl#";

/// Directory-listing schema: a `dir` with attributes, repeated `file`
/// children carrying text content, and a singular `readme` child.
pub fn dir_schema() -> Schema {
    let mut b = SchemaBuilder::new("");
    let string = b.primitive(PrimitiveKind::String);
    let number = b.primitive(PrimitiveKind::Number);

    let file = b.mixed("file", PrimitiveKind::String);
    b.attribute(file, "name", string);
    b.attribute(file, "size", number);

    let readme = b.mixed("readme", PrimitiveKind::String);

    let dir = b.complex("dir");
    b.attribute(dir, "name", string);
    b.attribute(dir, "owner", string);
    b.child(dir, Member::new("file", file).optional().repeated());
    b.child(dir, Member::new("readme", readme).optional());

    b.root(Member::new("dir", dir).optional());
    b.build()
}

/// Parser over the directory schema
pub fn dir_parser() -> Parser {
    Parser::new(dir_schema())
}

/// Pathway schema modeled after GPML: Pathway with comments, data nodes
/// carrying graphics, and a BioPAX section in a second namespace.
pub fn gpml_schema() -> Schema {
    let mut b = SchemaBuilder::new(GPML_NS);
    let biopax = b.namespace(BIOPAX_NS);

    let string = b.primitive(PrimitiveKind::String);
    let number = b.primitive(PrimitiveKind::Number);
    let date = b.primitive(PrimitiveKind::Date);

    let comment = b.mixed("Comment", PrimitiveKind::String);
    b.attribute(comment, "Source", string);

    let graphics = b.complex("Graphics");
    b.attribute(graphics, "CenterX", number);
    b.attribute(graphics, "CenterY", number);
    b.attribute(graphics, "BoardWidth", number);

    let data_node = b.complex("DataNode");
    b.attribute(data_node, "GraphId", string);
    b.attribute(data_node, "Type", string);
    b.child(data_node, Member::new("Comment", comment).optional().repeated());
    b.child(data_node, Member::new("Graphics", graphics).optional());

    let id = b.mixed_in("ID", PrimitiveKind::String, biopax);
    let publication_xref = b.complex_in("PublicationXref", biopax);
    b.child(publication_xref, Member::new("ID", id).optional());

    let biopax_section = b.complex("Biopax");
    b.child(
        biopax_section,
        Member::new("PublicationXref", publication_xref)
            .optional()
            .repeated(),
    );

    let pathway = b.complex("Pathway");
    b.attribute(pathway, "Name", string);
    b.attribute(pathway, "Organism", string);
    b.attribute(pathway, "LastModified", date);
    b.child(pathway, Member::new("Comment", comment).optional().repeated());
    b.child(pathway, Member::new("DataNode", data_node).optional().repeated());
    b.child(pathway, Member::new("Graphics", graphics).optional());
    b.child(pathway, Member::new("Biopax", biopax_section).optional());

    b.root(Member::new("Pathway", pathway).optional());
    b.build()
}

/// Parser over the pathway schema
pub fn gpml_parser() -> Parser {
    Parser::new(gpml_schema())
}

/// A shareable invocation counter for hooks
pub fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let c = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&c), c)
}

/// Read a counter
pub fn count(c: &AtomicUsize) -> usize {
    c.load(Ordering::SeqCst)
}

/// Bump a counter from inside a hook
pub fn bump(c: &AtomicUsize) {
    c.fetch_add(1, Ordering::SeqCst);
}
