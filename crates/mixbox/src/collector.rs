//! Namespace collection for XML export
//!
//! While an entity tree is converted to binding objects, every entity is
//! handed to a [`NamespaceCollector`]. Finalizing the collector turns the
//! visited classes, the caller's extra namespaces and any namespaces carried
//! over from a parsed input document into one consistent [`NamespaceSet`]
//! with a prefix for every namespace.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::entities::{Entity, EntityClass};
use crate::error::NamespaceError;
use crate::idgen;
use crate::namespaces::{self, NamespaceSet};

const EXAMPLE_PREFIX: &str = "example";

/// Gathers namespace information from entities during serialization.
#[derive(Debug, Default)]
pub struct NamespaceCollector {
    /// Namespaces found for the collected classes
    collected_namespaces: NamespaceSet,

    /// Classes seen so far, keyed by name
    collected_classes: IndexMap<String, Arc<EntityClass>>,

    /// Prefix to URI mappings from parsed input documents
    input_namespaces: IndexMap<String, String>,

    /// URI to schema location mappings from parsed input documents
    input_schemalocs: IndexMap<String, String>,

    finalized_schemalocs: Option<IndexMap<String, String>>,
    binding_namespaces: Option<IndexMap<String, String>>,
}

impl NamespaceCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entity`'s class chain and the input document data it carries.
    pub fn collect(&mut self, entity: &Entity) {
        let mut class = Some(entity.class());
        while let Some(current) = class {
            self.collected_classes
                .entry(current.name().to_string())
                .or_insert_with(|| current.clone());
            class = current.parent();
        }

        self.input_namespaces.extend(
            entity
                .input_namespaces()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self.input_schemalocs.extend(
            entity
                .input_schemalocations()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
    }

    /// Merge everything another collector has gathered.
    pub fn update(&mut self, other: &NamespaceCollector) {
        for (name, class) in &other.collected_classes {
            self.collected_classes
                .entry(name.clone())
                .or_insert_with(|| class.clone());
        }
        self.input_namespaces.extend(other.input_namespaces.clone());
        self.input_schemalocs.extend(other.input_schemalocs.clone());
    }

    /// The namespaces gathered so far.
    pub fn collected_namespaces(&self) -> &NamespaceSet {
        &self.collected_namespaces
    }

    /// Build the collected namespace set from the visited classes.
    ///
    /// A class's namespace alias comes from its `xsi_ns`, else from the
    /// prefix of its `xsi:type`. Namespace data is taken from the global
    /// registry; aliases only fill in missing preferred prefixes.
    ///
    /// # Errors
    ///
    /// `NamespaceNotFound` for class namespaces missing from the registry.
    pub fn parse_collected_classes(&mut self) -> Result<(), NamespaceError> {
        let mut alias_to_uri: IndexMap<String, String> = IndexMap::new();
        let mut no_alias: IndexSet<String> = IndexSet::new();

        for class in self.collected_classes.values() {
            let Some(ns) = class.namespace() else {
                continue;
            };

            if let Some(alias) = class.xsi_ns() {
                alias_to_uri.insert(alias.to_string(), ns.to_string());
                continue;
            }

            let alias = class.xsi_type().and_then(|xsi_type| {
                let parts: Vec<&str> = xsi_type.split(':').collect();
                (parts.len() == 2).then(|| parts[0].to_string())
            });
            match alias {
                Some(alias) => {
                    alias_to_uri.insert(alias, ns.to_string());
                }
                None => {
                    no_alias.insert(ns.to_string());
                }
            }
        }

        let uris: Vec<&str> = alias_to_uri
            .values()
            .chain(no_alias.iter())
            .map(String::as_str)
            .collect();
        let mut nsset = namespaces::make_namespace_subset_from_uris(uris)?;

        for (prefix, uri) in &alias_to_uri {
            if nsset.preferred_prefix_for_namespace(uri)?.is_none() {
                nsset.set_preferred_prefix_for_namespace(uri, Some(prefix), true)?;
            }
        }

        self.collected_namespaces = nsset;
        Ok(())
    }

    /// Point the parsed `example` prefix at the ID generator's example
    /// namespace, so documents using a variant of the example URI don't
    /// clash with it.
    fn fix_example_namespace(&mut self) {
        if idgen::get_id_namespace_prefix() != EXAMPLE_PREFIX {
            return;
        }
        if let Some(uri) = self.input_namespaces.get_mut(EXAMPLE_PREFIX) {
            uri.clone_from(&idgen::EXAMPLE_NAMESPACE.name);
        }
    }

    fn finalize_namespaces(
        &mut self,
        ns_dict: Option<&IndexMap<String, String>>,
    ) -> Result<(), NamespaceError> {
        let set = &mut self.collected_namespaces;

        if let Some(ns_dict) = ns_dict {
            for (uri, prefix) in ns_dict {
                set.add_namespace_uri(uri, Some(prefix), None)?;
            }
        }

        set.add_namespace_uri(
            &idgen::get_id_namespace(),
            Some(&idgen::get_id_namespace_alias()),
            None,
        )?;

        self.fix_example_namespace();

        let set = &mut self.collected_namespaces;
        for (prefix, uri) in &self.input_namespaces {
            let prefix = (!prefix.is_empty()).then_some(prefix.as_str());
            set.add_namespace_uri(uri, prefix, None)?;
        }

        set.import_from(namespaces::xml_namespaces(), false)?;

        // Bindings can't express default namespaces; every namespace gets a prefix
        let uris: Vec<String> = set.namespace_uris().map(str::to_string).collect();
        for uri in uris {
            if set.preferred_prefix_for_namespace(&uri)?.is_some() {
                continue;
            }

            let prefix = match set.get_prefixes(&uri)?.first() {
                Some(prefix) => Some(prefix.clone()),
                None => namespaces::lookup_name(&uri).ok().flatten(),
            };
            let Some(prefix) = prefix else {
                return Err(NamespaceError::NoPrefixes(uri));
            };
            set.set_preferred_prefix_for_namespace(&uri, Some(&prefix), true)?;
        }
        Ok(())
    }

    fn finalize_schemalocs(
        &mut self,
        schemaloc_dict: Option<&IndexMap<String, String>>,
    ) -> Result<(), NamespaceError> {
        let mut schemalocs = schemaloc_dict.cloned().unwrap_or_default();
        for (uri, location) in &self.input_schemalocs {
            schemalocs
                .entry(uri.clone())
                .or_insert_with(|| location.clone());
        }

        let set = &mut self.collected_namespaces;
        for (uri, location) in &schemalocs {
            if set.contains_namespace(uri) && set.get_schema_location(uri)?.is_none() {
                set.set_schema_location(uri, Some(location), false)?;
            }
        }

        let id_ns = idgen::get_id_namespace();
        let xml_namespaces = namespaces::xml_namespaces();
        for uri in set.namespace_uris() {
            if set.get_schema_location(uri)?.is_some()
                || uri == id_ns
                || xml_namespaces.contains_namespace(uri)
                || schemalocs.contains_key(uri)
            {
                continue;
            }
            tracing::warn!(namespace = %uri, "unable to map namespace to schemaLocation");
        }
        Ok(())
    }

    /// Finalize the namespaces and schema locations for export.
    ///
    /// `ns_dict` maps extra namespace URIs to prefixes; `schemaloc_dict`
    /// maps namespace URIs to schema locations and wins over locations
    /// carried by parsed input.
    ///
    /// # Errors
    ///
    /// - `NamespaceNotFound` for class namespaces missing from the registry
    /// - `DuplicatePrefix` when one prefix ends up mapped to two namespaces
    /// - `NoPrefixes` for a namespace no prefix can be found for
    pub fn finalize(
        &mut self,
        ns_dict: Option<&IndexMap<String, String>>,
        schemaloc_dict: Option<&IndexMap<String, String>>,
    ) -> Result<(), NamespaceError> {
        self.parse_collected_classes()?;
        self.finalize_namespaces(ns_dict)?;
        self.finalize_schemalocs(schemaloc_dict)?;

        self.finalized_schemalocs = Some(self.collected_namespaces.get_uri_schemaloc_map());
        self.binding_namespaces = Some(self.collected_namespaces.get_uri_prefix_map()?);
        Ok(())
    }

    /// `xmlns` declarations for every collected prefix.
    pub fn get_xmlns_string(&self, delim: &str) -> Result<String, NamespaceError> {
        if self.collected_namespaces.is_empty() {
            return Ok(String::new());
        }
        self.collected_namespaces
            .get_xmlns_string(None, false, false, delim)
    }

    /// The `xsi:schemaLocation` attribute, or `""`.
    pub fn get_schema_location_string(&self, delim: &str) -> Result<String, NamespaceError> {
        self.collected_namespaces
            .get_schemaloc_string(None, false, delim)
    }

    /// Namespace URI to prefix map for the bindings, once finalized
    pub fn binding_namespaces(&self) -> Option<&IndexMap<String, String>> {
        self.binding_namespaces.as_ref()
    }

    /// Namespace URI to schema location map, once finalized
    pub fn finalized_schemalocs(&self) -> Option<&IndexMap<String, String>> {
        self.finalized_schemalocs.as_ref()
    }
}
