//! Event-source driver
//!
//! The tokenizing scanner side of the binder: a quick-xml reader loop
//! translating raw XML into the fixed open/text/close event contract the
//! bind machine consumes. Namespace declarations are NOT resolved here;
//! `xmlns` attributes travel as ordinary map entries for the machine to
//! interpret.

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

use crate::error::{Error, Result};

/// Contract between the tokenizing scanner and the bind machine.
///
/// Events arrive in document order, nesting well-formed: every open is
/// matched by exactly one close. Character data may be delivered in
/// multiple chunks per element.
pub trait EventSink {
    /// An opening tag with its raw attribute map, `xmlns` entries included
    fn open_tag(&mut self, name: &str, attributes: &IndexMap<String, String>) -> Result<()>;

    /// A chunk of character data
    fn text(&mut self, chunk: &str) -> Result<()>;

    /// A closing tag matching an earlier open
    fn close_tag(&mut self, name: &str) -> Result<()>;
}

/// Feed a whole XML string through `sink`
pub fn drive_str<S: EventSink>(xml: &str, sink: &mut S) -> Result<()> {
    drive_reader(xml.as_bytes(), sink)
}

/// Feed a buffered reader through `sink` until end of stream.
///
/// Reader errors abort the drive immediately; the sink sees no further
/// events and no partial result should be taken from it.
pub fn drive_reader<R: BufRead, S: EventSink>(source: R, sink: &mut S) -> Result<()> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let (name, attributes) = read_tag(&e)?;
                sink.open_tag(&name, &attributes)?;
            }
            Ok(Event::Empty(e)) => {
                let (name, attributes) = read_tag(&e)?;
                sink.open_tag(&name, &attributes)?;
                sink.close_tag(&name)?;
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Xml(format!("failed to unescape text: {}", e)))?;
                sink.text(&text)?;
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                let text = std::str::from_utf8(bytes.as_ref())
                    .map_err(|e| Error::Xml(format!("invalid CDATA: {}", e)))?;
                sink.text(text)?;
            }
            Ok(Event::End(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
                    .to_string();
                sink.close_tag(&name)?;
            }
            Ok(Event::Eof) => return Ok(()),
            Ok(_) => {} // Ignore comments, processing instructions, declarations
            Err(e) => {
                return Err(Error::Xml(format!(
                    "error parsing XML at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
        buf.clear();
    }
}

/// Read tag name and raw attributes from a start event
fn read_tag(start: &BytesStart) -> Result<(String, IndexMap<String, String>)> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
        .to_string();

    let mut attributes = IndexMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;

        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?
            .to_string();

        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
            .to_string();

        attributes.insert(key, value);
    }

    Ok((name, attributes))
}
