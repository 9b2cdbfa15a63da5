//! XHTML document tree and markup constructors.
//!
//! The whole generator works on one value type: [`Element`], a rooted ordered
//! tree of named elements with ordered attributes and mixed element/text
//! children. Sections are built with the small constructors in this module
//! ([`h2`], [`link`], [`list_item`]), externally-authored fragments are parsed
//! into the same type by [`crate::embed`], and the finished tree is serialized
//! with [`to_document_string`].
//!
//! Every generated element belongs to the XHTML namespace ([`XHTML_NS`]),
//! declared exactly once on the document root. Fragments spliced into the
//! tree inherit that declaration.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// The XHTML namespace. Declared on the root element of every generated
/// document; all constructors in this module produce elements in this
/// namespace.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

const XHTML_STRICT_DOCTYPE: &str = "html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\" \
     \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\"";

/// A child of an element: either a nested element or a text node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// One element in the document tree.
///
/// Attributes keep insertion order and have unique keys: setting an existing
/// key replaces its value in place. Children keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An element with a single text child.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut e = Self::new(name);
        e.append_text(text);
        e
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set an attribute, replacing any existing value for the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Builder-style [`Element::set_attribute`].
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove_attribute(&mut self, key: &str) {
        self.attributes.retain(|(k, _)| k != key);
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn append_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    pub fn append_node(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements only, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of all direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// An `h1` heading with the given text.
pub fn h1(text: &str) -> Element {
    Element::with_text("h1", text)
}

/// An `h2` heading with the given text.
pub fn h2(text: &str) -> Element {
    Element::with_text("h2", text)
}

/// An `h3` heading with the given text.
pub fn h3(text: &str) -> Element {
    Element::with_text("h3", text)
}

/// A link to `target` with the given text: exactly one `href` attribute and
/// exactly one text child.
pub fn link(target: &str, text: &str) -> Element {
    Element::with_text("a", text).with_attribute("href", target)
}

/// A list item wrapping the given element.
pub fn list_item(element: Element) -> Element {
    let mut li = Element::new("li");
    li.append(element);
    li
}

/// A paragraph with the given text.
pub fn para(text: &str) -> Element {
    Element::with_text("p", text)
}

/// A `div` with the given `id` attribute.
pub fn div_id(id: &str) -> Element {
    Element::new("div").with_attribute("id", id)
}

/// Serialize a complete XHTML document: XML declaration, XHTML 1.0 Strict
/// doctype, then the tree, UTF-8 encoded.
pub fn to_document_string(root: &Element) -> String {
    serialize(root, true)
}

/// Serialize an XML document without a doctype (used for the Atom feed).
pub fn to_xml_string(root: &Element) -> String {
    serialize(root, false)
}

fn serialize(root: &Element, doctype: bool) -> String {
    let mut writer = Writer::new(Vec::new());
    write_document(&mut writer, root, doctype)
        .expect("writing to an in-memory buffer cannot fail");
    String::from_utf8(writer.into_inner())
        .expect("serialized documents are always valid UTF-8")
}

fn write_document(
    writer: &mut Writer<Vec<u8>>,
    root: &Element,
    doctype: bool,
) -> std::io::Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    if doctype {
        writer.write_event(Event::DocType(BytesText::from_escaped(
            XHTML_STRICT_DOCTYPE,
        )))?;
        writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
    }
    write_element(writer, root)?;
    writer.write_event(Event::Text(BytesText::from_escaped("\n")))
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> std::io::Result<()> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key, value));
    }

    if element.children().is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in element.children() {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name())))
}
