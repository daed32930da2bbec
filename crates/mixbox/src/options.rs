//! Export and parse configuration

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Configuration for [`Entity::to_xml`](crate::Entity::to_xml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Emit `xmlns` and `xsi:schemaLocation` attributes on the root element
    pub include_namespaces: bool,

    /// Extra namespace URI to prefix mappings to declare
    pub namespace_dict: Option<IndexMap<String, String>>,

    /// Namespace URI to schema location overrides
    pub schemaloc_dict: Option<IndexMap<String, String>>,

    /// Indented, multi-line output
    pub pretty: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_namespaces: true,
            namespace_dict: None,
            schemaloc_dict: None,
            pretty: true,
        }
    }
}

impl ExportOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compact single-line output.
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Default::default()
        }
    }

    /// Add a namespace declaration (builder pattern).
    pub fn with_namespace(mut self, uri: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.namespace_dict
            .get_or_insert_with(IndexMap::new)
            .insert(uri.into(), prefix.into());
        self
    }

    /// Add a schema location override (builder pattern).
    pub fn with_schema_location(
        mut self,
        uri: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        self.schemaloc_dict
            .get_or_insert_with(IndexMap::new)
            .insert(uri.into(), location.into());
        self
    }
}

/// Configuration for [`EntityParser`](crate::parser::EntityParser) entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reject documents whose version is not supported
    pub check_version: bool,

    /// Reject documents whose root element is not supported
    pub check_root: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            check_version: true,
            check_root: true,
        }
    }
}

impl ParseOptions {
    /// Create options with every check enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip both the version and root element checks.
    pub fn lenient() -> Self {
        Self {
            check_version: false,
            check_root: false,
        }
    }
}
