//! Document parsing framework
//!
//! Libraries built on mixbox implement [`EntityParser`] for their root
//! document types. The trait supplies the shared pipeline: load the
//! document, check its root element and version, build the binding tree and
//! convert it into an entity that remembers the input document's namespaces
//! and schema locations.

mod version;

pub use version::DocumentVersion;

use std::sync::Arc;

use crate::binding::Element;
use crate::entities::{Entity, EntityClass};
use crate::error::ParseError;
use crate::events;
use crate::options::ParseOptions;
use crate::xml::{self, XmlInput};

/// Parser for the root documents of an entity library.
///
/// Tags are in Clark notation (`{namespace}local`).
pub trait EntityParser {
    /// Root element tags this parser accepts.
    fn supported_tags(&self) -> Vec<String>;

    /// The version string declared on `root`, if any.
    fn get_version(&self, root: &Element) -> Option<String>;

    /// Versions supported for documents rooted at `tag`.
    fn supported_versions(&self, tag: &str) -> Vec<String>;

    /// The entity class documents rooted at `tag` parse into.
    fn entity_class(&self, tag: &str) -> Result<Arc<EntityClass>, ParseError>;

    /// The parsed version of `root`.
    ///
    /// # Errors
    ///
    /// - `UnknownVersion` if `root` declares no version
    /// - `InvalidVersion` if the declared version isn't a strict version
    fn document_version(&self, root: &Element) -> Result<DocumentVersion, ParseError> {
        match self.get_version(root) {
            Some(version) if !version.is_empty() => version.parse(),
            _ => Err(ParseError::UnknownVersion),
        }
    }

    /// Ensure `root` declares a supported version.
    ///
    /// # Errors
    ///
    /// `UnsupportedVersion` unless the document version equals one of
    /// [`supported_versions`](EntityParser::supported_versions).
    fn check_version(&self, root: &Element) -> Result<(), ParseError> {
        let version = self.document_version(root)?;
        let supported = self.supported_versions(&root.tag());

        let found = supported
            .iter()
            .filter_map(|s| s.parse::<DocumentVersion>().ok())
            .any(|s| s == version);
        if found {
            return Ok(());
        }

        Err(ParseError::UnsupportedVersion {
            expected: supported,
            found: version.to_string(),
        })
    }

    /// Ensure `root` is one of the supported root elements.
    ///
    /// # Errors
    ///
    /// `UnsupportedRootElement` otherwise.
    fn check_root_tag(&self, root: &Element) -> Result<(), ParseError> {
        let tag = root.tag();
        let supported = self.supported_tags();
        if supported.contains(&tag) {
            return Ok(());
        }
        Err(ParseError::UnsupportedRootElement {
            expected: supported,
            found: tag,
        })
    }

    /// Load a document and run the enabled checks, returning the binding
    /// tree of its root element.
    fn parse_xml_to_obj(&self, input: XmlInput, options: &ParseOptions) -> Result<Element, ParseError> {
        let root = xml::load_document(input)?;

        if options.check_root {
            self.check_root_tag(&root)?;
        }
        if options.check_version {
            self.check_version(&root)?;
        }

        // Resolve the class up front so unknown roots fail before building
        self.entity_class(&root.tag())?;

        events::emit(events::EVENT_BINDINGS_PRE_BUILD, &root);
        tracing::debug!(tag = %root.tag(), "built binding tree");
        events::emit(events::EVENT_BINDINGS_POST_BUILD, &root);
        Ok(root)
    }

    /// Parse a document into an entity.
    ///
    /// The root element's namespace declarations and `xsi:schemaLocation`
    /// pairs are stored on the entity so that re-serializing it keeps them.
    fn parse_xml(&self, input: XmlInput, options: &ParseOptions) -> Result<Entity, ParseError> {
        let root = self.parse_xml_to_obj(input, options)?;
        let class = self.entity_class(&root.tag())?;
        let mut entity = Entity::from_obj(&class, &root)?;

        entity.set_input_namespaces(root.nsmap.clone());
        if let Some(pairs) = xml::get_schemaloc_pairs(&root) {
            entity.set_input_schemalocations(pairs.into_iter().collect());
        }
        Ok(entity)
    }
}
