//! Binding objects: an owned XML element tree
//!
//! Entities convert to and from [`Element`] trees. Parsing builds them from
//! documents and export renders them back to XML text with the prefixes
//! chosen by a [`NamespaceCollector`](crate::collector::NamespaceCollector).

use std::fmt;

use indexmap::IndexMap;

use crate::error::NamespaceError;
use crate::xml::{escape_attribute, escape_text, NS_XSI};

const INDENT: &str = "    ";

/// Namespace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    /// Namespace URI, `None` for unqualified names
    pub namespace: Option<String>,

    /// Local part
    pub local: String,
}

impl QName {
    /// Create a name, qualified when `namespace` is given.
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Create an unqualified name.
    pub fn local(local: &str) -> Self {
        Self::new(None, local)
    }

    /// Create a qualified name.
    pub fn qualified(namespace: &str, local: &str) -> Self {
        Self::new(Some(namespace), local)
    }

    /// Parse Clark notation (`{uri}local` or `local`).
    pub fn from_clark(tag: &str) -> Self {
        match tag.strip_prefix('{').and_then(|rest| rest.split_once('}')) {
            Some((ns, local)) => Self::qualified(ns, local),
            None => Self::local(tag),
        }
    }

    /// Render with a prefix from `prefixes` (namespace URI to prefix).
    fn prefixed(&self, prefixes: &IndexMap<String, String>) -> Result<String, NamespaceError> {
        match &self.namespace {
            None => Ok(self.local.clone()),
            Some(ns) => match prefixes.get(ns) {
                Some(prefix) if !prefix.is_empty() => Ok(format!("{}:{}", prefix, self.local)),
                Some(_) => Ok(self.local.clone()),
                None => Err(NamespaceError::NoPrefixes(ns.clone())),
            },
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An XML element with its attributes, children, text and the namespace
/// declarations in scope where it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element name
    pub name: QName,

    /// Attributes in document order
    pub attributes: IndexMap<QName, String>,

    /// Child elements
    pub children: Vec<Element>,

    /// Character content, if not blank
    pub text: Option<String>,

    /// In-scope namespaces, prefix to URI; `""` is the default namespace
    pub nsmap: IndexMap<String, String>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            children: Vec::new(),
            text: None,
            nsmap: IndexMap::new(),
        }
    }

    /// Builder: set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// The element tag in Clark notation.
    pub fn tag(&self) -> String {
        self.name.to_string()
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Look up an attribute value by its Clark notation name.
    pub fn attribute_clark(&self, name: &str) -> Option<&str> {
        self.attribute(&QName::from_clark(name))
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        self.attributes.insert(name, value.into());
    }

    /// The `xsi:type` attribute value.
    pub fn xsi_type(&self) -> Option<&str> {
        self.attribute(&QName::qualified(NS_XSI, "type"))
    }

    /// Children whose local name is `local`, in document order.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name.local == local)
    }

    /// Change the element name.
    pub fn rename(&mut self, name: QName) {
        self.name = name;
    }

    /// Build an owned tree from a parsed document node.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let mut element = Element::new(QName::new(tag.namespace(), tag.name()));

        for attr in node.attributes() {
            element.set_attribute(QName::new(attr.namespace(), attr.name()), attr.value());
        }

        for ns in node.namespaces() {
            let prefix = ns.name().unwrap_or("");
            if prefix != "xml" {
                element.nsmap.insert(prefix.to_string(), ns.uri().to_string());
            }
        }

        let mut text = String::new();
        for child in node.children() {
            if child.is_element() {
                element.children.push(Element::from_node(child));
            } else if child.is_text() {
                text.push_str(child.text().unwrap_or(""));
            }
        }
        if !text.trim().is_empty() {
            element.text = Some(text);
        }

        element
    }

    // ═══════════════════════════════════════════════════════════════════
    // Export
    // ═══════════════════════════════════════════════════════════════════

    /// Render the tree as XML text.
    ///
    /// `prefixes` maps namespace URIs to the prefixes used in element and
    /// attribute names. `namespacedef` is written verbatim into the root
    /// start tag (the `xmlns` and `xsi:schemaLocation` declarations).
    ///
    /// # Errors
    ///
    /// `NoPrefixes` if a name uses a namespace missing from `prefixes`.
    pub fn to_xml_string(
        &self,
        prefixes: &IndexMap<String, String>,
        namespacedef: &str,
        pretty: bool,
    ) -> Result<String, NamespaceError> {
        let mut out = String::new();
        self.write_xml(&mut out, prefixes, namespacedef, pretty, 0)?;
        Ok(out.trim().to_string())
    }

    fn write_xml(
        &self,
        out: &mut String,
        prefixes: &IndexMap<String, String>,
        namespacedef: &str,
        pretty: bool,
        level: usize,
    ) -> Result<(), NamespaceError> {
        let name = self.name.prefixed(prefixes)?;
        if pretty {
            out.push_str(&INDENT.repeat(level));
        }

        out.push('<');
        out.push_str(&name);
        if !namespacedef.trim().is_empty() {
            out.push(' ');
            out.push_str(namespacedef.trim());
        }
        for (attr, value) in &self.attributes {
            out.push(' ');
            out.push_str(&attr.prefixed(prefixes)?);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }

        if self.children.is_empty() && self.text.is_none() {
            out.push_str("/>");
            if pretty {
                out.push('\n');
            }
            return Ok(());
        }

        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape_text(text));
        }
        if !self.children.is_empty() {
            if pretty {
                out.push('\n');
            }
            for child in &self.children {
                child.write_xml(out, prefixes, "", pretty, level + 1)?;
            }
            if pretty {
                out.push_str(&INDENT.repeat(level));
            }
        }
        out.push_str("</");
        out.push_str(&name);
        out.push('>');
        if pretty {
            out.push('\n');
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefixes() -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        map.insert("urn:test".to_string(), "t".to_string());
        map
    }

    #[test]
    fn test_clark_round_trip() {
        let name = QName::from_clark("{urn:test}Thing");
        assert_eq!(name, QName::qualified("urn:test", "Thing"));
        assert_eq!(name.to_string(), "{urn:test}Thing");
        assert_eq!(QName::from_clark("plain"), QName::local("plain"));
    }

    #[test]
    fn test_compact_output() {
        let mut root = Element::new(QName::qualified("urn:test", "Root"));
        root.set_attribute(QName::local("id"), "a&b");
        root.children
            .push(Element::new(QName::qualified("urn:test", "Child")).with_text("x < y"));
        root.children.push(Element::new(QName::qualified("urn:test", "Empty")));

        let xml = root.to_xml_string(&prefixes(), "", false).unwrap();
        assert_eq!(
            xml,
            r#"<t:Root id="a&amp;b"><t:Child>x &lt; y</t:Child><t:Empty/></t:Root>"#
        );
    }

    #[test]
    fn test_pretty_output_indents_children() {
        let root = Element::new(QName::qualified("urn:test", "Root"))
            .with_child(Element::new(QName::qualified("urn:test", "Child")).with_text("v"));

        let xml = root
            .to_xml_string(&prefixes(), "xmlns:t=\"urn:test\"", true)
            .unwrap();
        assert_eq!(
            xml,
            "<t:Root xmlns:t=\"urn:test\">\n    <t:Child>v</t:Child>\n</t:Root>"
        );
    }

    #[test]
    fn test_unmapped_namespace_fails() {
        let root = Element::new(QName::qualified("urn:other", "Root"));
        assert_eq!(
            root.to_xml_string(&prefixes(), "", false),
            Err(NamespaceError::NoPrefixes("urn:other".to_string()))
        );
    }
}
