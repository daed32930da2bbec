//! XML namespace bookkeeping: namespaces, namespace sets and the global registry

mod registry;

pub use registry::{
    get_full_ns_map, get_full_prefix_map, get_full_schemaloc_map, get_schemaloc_string,
    get_xmlns_string, lookup_name, lookup_prefix, make_namespace_subset_from_uris,
    register_namespace, xml_namespaces, NS_XLINK, NS_XML_DSIG, NS_XML_SCHEMA,
    NS_XML_SCHEMA_INSTANCE,
};

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::NamespaceError;

/// Simplified namespace info: exactly one namespace URI, a prefix and an
/// optional schema location URI.
///
/// Handy for building up big tables of namespace data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    /// The namespace URI
    pub name: String,

    /// The prefix used for the namespace
    pub prefix: String,

    /// Location of the schema defining the namespace
    pub schema_location: Option<String>,
}

impl Namespace {
    /// Create a namespace without a schema location.
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            schema_location: None,
        }
    }

    /// Attach a schema location (builder pattern). Empty locations are dropped.
    pub fn with_schema_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.schema_location = (!location.is_empty()).then_some(location);
        self
    }
}

/// Everything known about one namespace inside a [`NamespaceSet`].
///
/// `preferred_prefix` is a member of `prefixes`, or `None` meaning the
/// namespace prefers to be the XML default namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NamespaceInfo {
    uri: String,
    prefixes: IndexSet<String>,
    preferred_prefix: Option<String>,
    schema_location: Option<String>,
}

impl NamespaceInfo {
    fn new(uri: &str, prefix: Option<&str>, schema_location: Option<&str>) -> Self {
        let prefix = prefix.filter(|p| !p.is_empty());
        let mut prefixes = IndexSet::new();
        if let Some(p) = prefix {
            prefixes.insert(p.to_string());
        }

        Self {
            uri: uri.to_string(),
            prefixes,
            preferred_prefix: prefix.map(str::to_string),
            schema_location: schema_location
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    fn first_prefix(&self) -> Option<&str> {
        self.prefixes.first().map(String::as_str)
    }

    /// Merge an incoming schema location: adopt it if we have none, keep
    /// ours if it is absent, fail if both are set and differ.
    fn merge_schema_location(&mut self, incoming: Option<&str>) -> Result<(), NamespaceError> {
        let incoming = incoming.filter(|s| !s.is_empty());
        let current = self.schema_location.clone();
        match (current.as_deref(), incoming) {
            (current, new) if current == new => Ok(()),
            (None, new) => {
                self.schema_location = new.map(str::to_string);
                Ok(())
            }
            (Some(_), None) => Ok(()),
            (Some(current), Some(new)) => Err(NamespaceError::ConflictingSchemaLocation {
                ns_uri: self.uri.clone(),
                schema_locations: vec![current.to_string(), new.to_string()],
            }),
        }
    }
}

impl fmt::Display for NamespaceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefixes: Vec<&str> = self.prefixes.iter().map(String::as_str).collect();
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "  {:?}", prefixes)?;
        writeln!(
            f,
            "  preferred: {}",
            self.preferred_prefix.as_deref().unwrap_or("(default)")
        )?;
        write!(f, "  {}", self.schema_location.as_deref().unwrap_or("None"))
    }
}

/// A set of XML namespaces.
///
/// For each namespace a set of prefixes and a schema location URI are also
/// maintained. Prefixes and schema location are optional; the namespace URI
/// is always required.
///
/// Each namespace has a preferred prefix. If `None`, the namespace prefers to
/// be the default namespace. Nothing prevents several namespaces from
/// preferring to be default, but [`NamespaceSet::get_xmlns_string`] may fail
/// when too many of them have no prefix at all.
///
/// # Example
///
/// ```
/// use mixbox::NamespaceSet;
///
/// let mut set = NamespaceSet::new();
/// set.add_namespace_uri("http://example.com/a", Some("a"), None).unwrap();
/// set.add_prefix("http://example.com/a", "aa", false).unwrap();
///
/// assert_eq!(set.namespace_for_prefix("aa"), Some("http://example.com/a"));
/// assert_eq!(
///     set.preferred_prefix_for_namespace("http://example.com/a").unwrap(),
///     Some("a")
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct NamespaceSet {
    /// Namespace URI to its info
    ns_uri_map: IndexMap<String, NamespaceInfo>,

    /// Prefix to the namespace URI that owns it
    prefix_map: IndexMap<String, String>,
}

impl NamespaceSet {
    /// Create an empty namespace set.
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_uri(&self, uri: &str) -> Result<&NamespaceInfo, NamespaceError> {
        self.ns_uri_map
            .get(uri)
            .ok_or_else(|| NamespaceError::NamespaceNotFound(uri.to_string()))
    }

    fn lookup_uri_mut(&mut self, uri: &str) -> Result<&mut NamespaceInfo, NamespaceError> {
        self.ns_uri_map
            .get_mut(uri)
            .ok_or_else(|| NamespaceError::NamespaceNotFound(uri.to_string()))
    }

    /// Add an info record directly. No conflict checks are done.
    fn insert_info(&mut self, info: NamespaceInfo) {
        for prefix in &info.prefixes {
            self.prefix_map.insert(prefix.clone(), info.uri.clone());
        }
        self.ns_uri_map.insert(info.uri.clone(), info);
    }

    /// Fail if `prefix` is already mapped to a namespace other than `uri`.
    fn check_prefix_conflict(&self, uri: &str, prefix: &str) -> Result<(), NamespaceError> {
        match self.prefix_map.get(prefix) {
            Some(owner) if owner != uri => Err(NamespaceError::DuplicatePrefix {
                prefix: prefix.to_string(),
                namespaces: vec![owner.clone(), uri.to_string()],
            }),
            _ => Ok(()),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Whether the namespace identified by `uri` is in this set.
    pub fn contains_namespace(&self, uri: &str) -> bool {
        self.ns_uri_map.contains_key(uri)
    }

    /// The namespace the given prefix maps to, if any.
    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.prefix_map.get(prefix).map(String::as_str)
    }

    /// The preferred prefix of a namespace. `None` means the namespace
    /// prefers to be used as the default namespace.
    pub fn preferred_prefix_for_namespace(&self, uri: &str) -> Result<Option<&str>, NamespaceError> {
        Ok(self.lookup_uri(uri)?.preferred_prefix.as_deref())
    }

    /// A copy of the prefix set for the given namespace.
    pub fn get_prefixes(&self, uri: &str) -> Result<IndexSet<String>, NamespaceError> {
        Ok(self.lookup_uri(uri)?.prefixes.clone())
    }

    /// An iterator over the prefixes of the given namespace.
    pub fn prefix_iter(&self, uri: &str) -> Result<impl Iterator<Item = &str>, NamespaceError> {
        Ok(self.lookup_uri(uri)?.prefixes.iter().map(String::as_str))
    }

    /// The schema location of the given namespace, if one has been set.
    pub fn get_schema_location(&self, uri: &str) -> Result<Option<&str>, NamespaceError> {
        Ok(self.lookup_uri(uri)?.schema_location.as_deref())
    }

    /// The namespace URIs in this set, in insertion order.
    pub fn namespace_uris(&self) -> impl Iterator<Item = &str> {
        self.ns_uri_map.keys().map(String::as_str)
    }

    /// Number of namespaces in this set.
    pub fn len(&self) -> usize {
        self.ns_uri_map.len()
    }

    /// Whether this set holds no namespaces.
    pub fn is_empty(&self) -> bool {
        self.ns_uri_map.is_empty()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Mutation
    // ═══════════════════════════════════════════════════════════════════

    /// Add a namespace from a [`Namespace`] value.
    pub fn add_namespace(&mut self, ns: &Namespace) -> Result<(), NamespaceError> {
        self.add_namespace_uri(
            &ns.name,
            Some(ns.prefix.as_str()),
            ns.schema_location.as_deref(),
        )
    }

    /// Add a namespace, optionally with a prefix and schema location.
    ///
    /// If the namespace already exists, the prefix is added to its prefix
    /// set (the preferred prefix is left alone) and the schema location is
    /// merged. A brand new namespace takes the given prefix as preferred, or
    /// prefers to be default when no prefix is given.
    ///
    /// Either the whole operation applies or nothing changes.
    ///
    /// # Errors
    ///
    /// - `DuplicatePrefix` if the prefix already maps to another namespace
    /// - `ConflictingSchemaLocation` if the namespace has a different location
    pub fn add_namespace_uri(
        &mut self,
        uri: &str,
        prefix: Option<&str>,
        schema_location: Option<&str>,
    ) -> Result<(), NamespaceError> {
        if uri.is_empty() {
            return Err(NamespaceError::EmptyUri);
        }
        let prefix = prefix.filter(|p| !p.is_empty());
        if let Some(p) = prefix {
            self.check_prefix_conflict(uri, p)?;
        }

        match self.ns_uri_map.get(uri) {
            Some(existing) => {
                // Work on a copy so a failure leaves the set untouched
                let mut info = existing.clone();
                if let Some(p) = prefix {
                    info.prefixes.insert(p.to_string());
                }
                info.merge_schema_location(schema_location)?;
                self.insert_info(info);
            }
            None => self.insert_info(NamespaceInfo::new(uri, prefix, schema_location)),
        }
        Ok(())
    }

    /// Remove the namespace and all its prefixes. No-op when absent.
    pub fn remove_namespace(&mut self, uri: &str) {
        if let Some(info) = self.ns_uri_map.shift_remove(uri) {
            for prefix in &info.prefixes {
                self.prefix_map.shift_remove(prefix);
            }
        }
    }

    /// Add a prefix to an existing namespace, optionally making it preferred.
    ///
    /// A default preference can't be set this way; see
    /// [`NamespaceSet::set_preferred_prefix_for_namespace`].
    pub fn add_prefix(
        &mut self,
        uri: &str,
        prefix: &str,
        set_as_preferred: bool,
    ) -> Result<(), NamespaceError> {
        if prefix.is_empty() {
            return Err(NamespaceError::EmptyPrefix);
        }
        self.lookup_uri(uri)?;
        self.check_prefix_conflict(uri, prefix)?;

        let info = self.lookup_uri_mut(uri)?;
        info.prefixes.insert(prefix.to_string());
        if set_as_preferred {
            info.preferred_prefix = Some(prefix.to_string());
        }
        self.prefix_map.insert(prefix.to_string(), uri.to_string());
        Ok(())
    }

    /// Remove a prefix from whichever namespace owns it. No-op when absent.
    ///
    /// If the removed prefix was preferred, the first remaining prefix (or
    /// the default preference) takes its place.
    pub fn remove_prefix(&mut self, prefix: &str) {
        let Some(uri) = self.prefix_map.shift_remove(prefix) else {
            return;
        };
        if let Some(info) = self.ns_uri_map.get_mut(&uri) {
            info.prefixes.shift_remove(prefix);
            if info.preferred_prefix.as_deref() == Some(prefix) {
                info.preferred_prefix = info.first_prefix().map(str::to_string);
            }
        }
    }

    /// Set the preferred prefix of a namespace.
    ///
    /// `None` always works and indicates a preference to be default. A
    /// prefix not yet registered for the namespace is added when
    /// `add_if_not_exist` is true, otherwise it is an error.
    pub fn set_preferred_prefix_for_namespace(
        &mut self,
        uri: &str,
        prefix: Option<&str>,
        add_if_not_exist: bool,
    ) -> Result<(), NamespaceError> {
        let known = match prefix.filter(|p| !p.is_empty()) {
            Some(p) => self.lookup_uri(uri)?.prefixes.contains(p),
            None => false,
        };

        match prefix.filter(|p| !p.is_empty()) {
            None => {
                self.lookup_uri_mut(uri)?.preferred_prefix = None;
                Ok(())
            }
            Some(p) if known => {
                self.lookup_uri_mut(uri)?.preferred_prefix = Some(p.to_string());
                Ok(())
            }
            Some(p) if add_if_not_exist => self.add_prefix(uri, p, true),
            Some(p) => Err(NamespaceError::PrefixNotFound(p.to_string())),
        }
    }

    /// Set the schema location of a namespace.
    ///
    /// With `replace`, any existing location is overwritten. Otherwise a
    /// different existing location is an error. Setting `None` erases the
    /// location; that is not considered replacement.
    pub fn set_schema_location(
        &mut self,
        uri: &str,
        schema_location: Option<&str>,
        replace: bool,
    ) -> Result<(), NamespaceError> {
        let info = self.lookup_uri_mut(uri)?;
        let current = info.schema_location.clone();

        match (current.as_deref(), schema_location) {
            (current, new) if current == new => {}
            (None, _) | (_, None) => info.schema_location = schema_location.map(str::to_string),
            (Some(_), Some(new)) if replace => info.schema_location = Some(new.to_string()),
            (Some(current), Some(new)) => {
                return Err(NamespaceError::ConflictingSchemaLocation {
                    ns_uri: uri.to_string(),
                    schema_locations: vec![current.to_string(), new.to_string()],
                })
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Rendering
    // ═══════════════════════════════════════════════════════════════════

    fn select_uris(&self, ns_uris: Option<&[&str]>, sort: bool) -> Vec<String> {
        let mut uris: Vec<String> = match ns_uris {
            Some(uris) => uris.iter().map(|u| u.to_string()).collect(),
            None => self.ns_uri_map.keys().cloned().collect(),
        };
        if sort {
            uris.sort();
        }
        uris
    }

    /// Generate XML namespace declarations for namespaces in this set.
    ///
    /// Returns `xmlns:foo="bar"<delim>xmlns:foo2="bar2"<delim>...`. With
    /// `preferred_prefixes_only` each namespace contributes its preferred
    /// prefix; otherwise every registered prefix is declared. The first
    /// namespace preferring to be default is declared as `xmlns="..."`;
    /// later ones fall back to their first prefix.
    ///
    /// `None` selects every namespace; an empty slice selects none and
    /// yields `""`.
    ///
    /// # Errors
    ///
    /// - `NamespaceNotFound` if `ns_uris` names a namespace not in the set
    /// - `TooManyDefaultNamespaces` if a second default-preferring namespace
    ///   has no prefix at all
    pub fn get_xmlns_string(
        &self,
        ns_uris: Option<&[&str]>,
        sort: bool,
        preferred_prefixes_only: bool,
        delim: &str,
    ) -> Result<String, NamespaceError> {
        let mut have_default = false;
        let mut entries = Vec::new();

        for uri in self.select_uris(ns_uris, sort) {
            let info = self.lookup_uri(&uri)?;

            if preferred_prefixes_only {
                if let Some(prefix) = &info.preferred_prefix {
                    entries.push(format!("xmlns:{}=\"{}\"", prefix, info.uri));
                }
            } else {
                for prefix in &info.prefixes {
                    entries.push(format!("xmlns:{}=\"{}\"", prefix, info.uri));
                }
            }

            if info.preferred_prefix.is_none() {
                if !have_default {
                    entries.push(format!("xmlns=\"{}\"", info.uri));
                    have_default = true;
                } else {
                    match info.first_prefix() {
                        None => {
                            return Err(NamespaceError::TooManyDefaultNamespaces(
                                info.uri.clone(),
                            ))
                        }
                        Some(prefix) if preferred_prefixes_only => {
                            entries.push(format!("xmlns:{}=\"{}\"", prefix, info.uri));
                        }
                        // Every prefix was declared above already
                        Some(_) => {}
                    }
                }
            }
        }

        if entries.is_empty() {
            return Ok(String::new());
        }
        let mut out = entries.join(delim);
        out.push_str(delim);
        Ok(out)
    }

    /// Build an `xsi:schemaLocation` attribute, or an empty string when none
    /// of the selected namespaces has a schema location.
    pub fn get_schemaloc_string(
        &self,
        ns_uris: Option<&[&str]>,
        sort: bool,
        delim: &str,
    ) -> Result<String, NamespaceError> {
        let mut pairs = Vec::new();
        for uri in self.select_uris(ns_uris, sort) {
            let info = self.lookup_uri(&uri)?;
            if let Some(location) = &info.schema_location {
                pairs.push(format!("{} {}", info.uri, location));
            }
        }

        if pairs.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("xsi:schemaLocation=\"{}\"", pairs.join(delim)))
    }

    fn chosen_prefix(info: &NamespaceInfo) -> Result<&str, NamespaceError> {
        info.preferred_prefix
            .as_deref()
            .or_else(|| info.first_prefix())
            .ok_or_else(|| NamespaceError::NoPrefixes(info.uri.clone()))
    }

    /// Map every namespace URI to a prefix: the preferred one, else the
    /// first registered one.
    pub fn get_uri_prefix_map(&self) -> Result<IndexMap<String, String>, NamespaceError> {
        self.ns_uri_map
            .values()
            .map(|info| Ok((info.uri.clone(), Self::chosen_prefix(info)?.to_string())))
            .collect()
    }

    /// Map a chosen prefix of every namespace to its URI.
    pub fn get_prefix_uri_map(&self) -> Result<IndexMap<String, String>, NamespaceError> {
        self.ns_uri_map
            .values()
            .map(|info| Ok((Self::chosen_prefix(info)?.to_string(), info.uri.clone())))
            .collect()
    }

    /// Map namespace URIs to schema locations, skipping namespaces without one.
    pub fn get_uri_schemaloc_map(&self) -> IndexMap<String, String> {
        self.ns_uri_map
            .values()
            .filter_map(|info| {
                info.schema_location
                    .as_ref()
                    .map(|loc| (info.uri.clone(), loc.clone()))
            })
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Set Operations
    // ═══════════════════════════════════════════════════════════════════

    /// A new set holding only the given namespaces.
    pub fn subset<'a, I>(&self, ns_uris: I) -> Result<NamespaceSet, NamespaceError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut sub = NamespaceSet::new();
        for uri in ns_uris {
            sub.insert_info(self.lookup_uri(uri)?.clone());
        }
        Ok(sub)
    }

    /// Import namespaces from `other`.
    ///
    /// Namespaces missing here are copied over. Namespaces present in both
    /// are left alone unless `replace` is set, in which case our data is
    /// replaced wholesale. There is no merging.
    pub fn import_from(&mut self, other: &NamespaceSet, replace: bool) -> Result<(), NamespaceError> {
        for (uri, other_info) in &other.ns_uri_map {
            let exists = self.contains_namespace(uri);
            if exists && !replace {
                tracing::debug!(namespace = %uri, "skipping import of existing namespace");
                continue;
            }

            for prefix in &other_info.prefixes {
                self.check_prefix_conflict(uri, prefix)?;
            }
            if exists {
                self.remove_namespace(uri);
            }
            self.insert_info(other_info.clone());
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Validation
    // ═══════════════════════════════════════════════════════════════════

    /// Sanity-check the internal invariants of this set.
    pub fn assert_valid(&self) -> Result<(), NamespaceError> {
        let invalid = |msg: String| Err(NamespaceError::InvalidNamespaceSet(msg));

        for (uri, info) in &self.ns_uri_map {
            if info.uri.is_empty() {
                return invalid(format!("URI not set in namespace info:\n{}", info));
            }
            if *uri != info.uri {
                return invalid(format!(
                    "URI mismatch in map ({}) and namespace info ({})",
                    uri, info.uri
                ));
            }
            if let Some(preferred) = &info.preferred_prefix {
                if !info.prefixes.contains(preferred) {
                    return invalid(format!(
                        "Namespace {}: preferred prefix \"{}\" not in prefixes {:?}",
                        info.uri, preferred, info.prefixes
                    ));
                }
            }
            for prefix in &info.prefixes {
                if prefix.is_empty() {
                    return invalid(format!(
                        "Namespace {}: empty value in prefix set: {:?}",
                        info.uri, info.prefixes
                    ));
                }
                match self.prefix_map.get(prefix) {
                    None => {
                        return invalid(format!(
                            "Namespace {}: prefix \"{}\" not in prefix map",
                            info.uri, prefix
                        ))
                    }
                    Some(owner) if *owner != info.uri => {
                        return invalid(format!(
                            "Namespace {}: prefix \"{}\" maps to wrong namespace ({})",
                            info.uri, prefix, owner
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        if self.prefix_map.contains_key("") {
            return invalid("empty prefix is in prefix map".to_string());
        }
        Ok(())
    }

    /// Whether [`NamespaceSet::assert_valid`] passes.
    pub fn is_valid(&self) -> bool {
        self.assert_valid().is_ok()
    }
}

impl PartialEq for NamespaceSet {
    /// Equal sets contain the same namespaces, and for each the same
    /// prefixes, preferred prefix and schema location.
    fn eq(&self, other: &Self) -> bool {
        self.ns_uri_map == other.ns_uri_map
    }
}

impl Eq for NamespaceSet {}

impl fmt::Display for NamespaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, info) in self.ns_uri_map.values().enumerate() {
            if i > 0 {
                write!(f, "\n\n")?;
            }
            write!(f, "{}", info)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS_A: &str = "a:b:c";
    const NS_B: &str = "d:e:f";

    #[test]
    fn test_failed_merge_leaves_set_unchanged() {
        let mut set = NamespaceSet::new();
        set.add_namespace_uri(NS_A, Some("a"), Some("loc1")).unwrap();
        set.add_namespace_uri(NS_B, Some("b"), None).unwrap();
        let before = set.clone();

        let err = set
            .add_namespace_uri(NS_A, Some("a2"), Some("loc2"))
            .unwrap_err();
        assert!(matches!(err, NamespaceError::ConflictingSchemaLocation { .. }));
        assert_eq!(set, before);
        assert_eq!(set.namespace_for_prefix("a2"), None);
    }

    #[test]
    fn test_remove_preferred_prefix_promotes_next() {
        let mut set = NamespaceSet::new();
        set.add_namespace_uri(NS_A, Some("a"), None).unwrap();
        set.add_prefix(NS_A, "a2", false).unwrap();

        set.remove_prefix("a");
        assert_eq!(set.preferred_prefix_for_namespace(NS_A).unwrap(), Some("a2"));

        set.remove_prefix("a2");
        assert_eq!(set.preferred_prefix_for_namespace(NS_A).unwrap(), None);
        assert!(set.is_valid());
    }

    #[test]
    fn test_empty_uri_rejected() {
        let mut set = NamespaceSet::new();
        assert_eq!(
            set.add_namespace_uri("", Some("x"), None),
            Err(NamespaceError::EmptyUri)
        );
    }

    #[test]
    fn test_display_marks_default_preference() {
        let mut set = NamespaceSet::new();
        set.add_namespace_uri(NS_A, None, None).unwrap();
        assert!(set.to_string().contains("preferred: (default)"));
    }
}
