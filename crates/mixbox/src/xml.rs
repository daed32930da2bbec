//! XML constants and document loading

use std::fs;
use std::path::PathBuf;

use crate::binding::Element;
use crate::error::ParseError;

/// XML Schema instance namespace URI
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// `xsi:type` in Clark notation
pub const TAG_XSI_TYPE: &str = "{http://www.w3.org/2001/XMLSchema-instance}type";

/// `xsi:schemaLocation` in Clark notation
pub const TAG_SCHEMALOCATION: &str = "{http://www.w3.org/2001/XMLSchema-instance}schemaLocation";

/// Parse an XML schema boolean (`true`, `1`, `false`, `0`).
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Escape character data for element content.
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for use inside a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}

/// Source of an XML document.
#[derive(Debug, Clone)]
pub enum XmlInput {
    /// A file on disk
    Path(PathBuf),

    /// Document text
    Text(String),

    /// An already loaded element tree
    Element(Element),
}

impl XmlInput {
    /// Input read from a file.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        XmlInput::Path(path.into())
    }

    /// Input from document text.
    pub fn text(text: impl Into<String>) -> Self {
        XmlInput::Text(text.into())
    }
}

impl From<Element> for XmlInput {
    fn from(element: Element) -> Self {
        XmlInput::Element(element)
    }
}

/// Load a document and return its root element.
///
/// Comments and whitespace-only text are dropped. DTDs are refused, so no
/// external entities are ever resolved.
///
/// # Errors
///
/// - `Io` if the file can't be read
/// - `Xml` if the document is malformed
pub fn load_document(input: XmlInput) -> Result<Element, ParseError> {
    let text = match input {
        XmlInput::Element(element) => return Ok(element),
        XmlInput::Text(text) => text,
        XmlInput::Path(path) => fs::read_to_string(&path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?,
    };

    let doc = roxmltree::Document::parse(&text).map_err(|e| ParseError::Xml(e.to_string()))?;
    Ok(Element::from_node(doc.root_element()))
}

/// The `(namespace, location)` pairs of the `xsi:schemaLocation` attribute
/// on `element`, or `None` when the attribute is absent.
pub fn get_schemaloc_pairs(element: &Element) -> Option<Vec<(String, String)>> {
    let raw = element.attribute_clark(TAG_SCHEMALOCATION)?;
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    Some(
        tokens
            .chunks_exact(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("True"), None);
    }

    #[test]
    fn test_escape_leaves_unicode_alone() {
        let s = "❤ ♎ ☀ ★ ☂ ♞ ☯ ☭ ☢ €☎⚑ ❄♫✂";
        assert_eq!(escape_text(s), s);
        assert_eq!(escape_attribute(s), s);
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_load_malformed() {
        let err = load_document(XmlInput::text("<a><b></a>")).unwrap_err();
        assert!(matches!(err, ParseError::Xml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document(XmlInput::path("/nonexistent/mixbox/doc.xml")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }

    #[test]
    fn test_schemaloc_pairs() {
        let root = load_document(XmlInput::text(
            r#"<a xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                  xsi:schemaLocation="urn:one one.xsd  urn:two two.xsd"/>"#,
        ))
        .unwrap();
        assert_eq!(
            get_schemaloc_pairs(&root).unwrap(),
            vec![
                ("urn:one".to_string(), "one.xsd".to_string()),
                ("urn:two".to_string(), "two.xsd".to_string()),
            ]
        );

        let bare = load_document(XmlInput::text("<a/>")).unwrap();
        assert!(get_schemaloc_pairs(&bare).is_none());
    }
}
