use indexmap::IndexMap;
use quick_xml::escape::escape;

/// A decoded XML element: tag name, attributes, accumulated text content,
/// and child elements, each owned exclusively by this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Create an element with the given tag and nothing else.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// The tag name, fixed at creation.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in first-insertion order.
    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    /// Accumulated text content; empty when the element carries none.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Set an attribute. Writing a name again replaces its value but keeps
    /// its original position.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Append a run of character data to this element's text.
    pub fn append_text(&mut self, value: &str) {
        self.text.push_str(value);
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}

const XML_DECLARATION: &str = "<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>";

/// A decoded ABX document: the root element plus whether that root is the
/// synthetic multi-root wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Element,
    synthetic_root: bool,
}

impl Document {
    /// A document with a real root element.
    pub fn new(root: Element) -> Self {
        Self {
            root,
            synthetic_root: false,
        }
    }

    /// A multi-root document. The wrapper element itself is never rendered;
    /// its children appear at the top level of the output.
    pub fn with_synthetic_root(root: Element) -> Self {
        Self {
            root,
            synthetic_root: true,
        }
    }

    /// The root element (the synthetic wrapper in multi-root documents).
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Render the document as indented textual XML, declaration included.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push('\n');
        if self.synthetic_root {
            for child in self.root.children() {
                write_element(&mut out, child, 0);
            }
        } else {
            write_element(&mut out, &self.root, 0);
        }
        out
    }
}

fn write_element(out: &mut String, element: &Element, indent: usize) {
    let indentation = " ".repeat(indent);
    out.push_str(&indentation);
    out.push('<');
    out.push_str(element.tag());
    for (name, value) in element.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }

    if element.children().is_empty() && element.text().is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push('>');
    if !element.text().is_empty() {
        out.push_str(&escape(element.text()));
    }
    if !element.children().is_empty() {
        out.push('\n');
        for child in element.children() {
            write_element(out, child, indent + 2);
        }
        out.push_str(&indentation);
    }
    out.push_str("</");
    out.push_str(element.tag());
    out.push_str(">\n");
}
