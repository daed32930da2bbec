//! Process-wide namespace registry shared by every consumer library

use std::sync::{LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;

use super::{Namespace, NamespaceSet};
use crate::error::NamespaceError;

/// XLink namespace
pub static NS_XLINK: LazyLock<Namespace> =
    LazyLock::new(|| Namespace::new("http://www.w3.org/1999/xlink", "xlink"));

/// XML digital signature namespace
pub static NS_XML_DSIG: LazyLock<Namespace> =
    LazyLock::new(|| Namespace::new("http://www.w3.org/2000/09/xmldsig#", "ds"));

/// XML Schema namespace
pub static NS_XML_SCHEMA: LazyLock<Namespace> =
    LazyLock::new(|| Namespace::new("http://www.w3.org/2001/XMLSchema", "xs"));

/// XML Schema instance namespace
pub static NS_XML_SCHEMA_INSTANCE: LazyLock<Namespace> =
    LazyLock::new(|| Namespace::new("http://www.w3.org/2001/XMLSchema-instance", "xsi"));

fn builtin_namespaces() -> [&'static Namespace; 4] {
    [&NS_XLINK, &NS_XML_DSIG, &NS_XML_SCHEMA, &NS_XML_SCHEMA_INSTANCE]
}

fn builtin_set() -> NamespaceSet {
    let mut set = NamespaceSet::new();
    for ns in builtin_namespaces() {
        set.add_namespace(ns)
            .expect("built-in namespaces have distinct URIs and prefixes");
    }
    set
}

static XML_NAMESPACES: LazyLock<NamespaceSet> = LazyLock::new(builtin_set);

static ALL_NAMESPACES: LazyLock<RwLock<NamespaceSet>> =
    LazyLock::new(|| RwLock::new(builtin_set()));

fn read() -> RwLockReadGuard<'static, NamespaceSet> {
    ALL_NAMESPACES.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, NamespaceSet> {
    ALL_NAMESPACES.write().unwrap_or_else(PoisonError::into_inner)
}

/// The standard XML namespaces (xlink, ds, xs, xsi).
pub fn xml_namespaces() -> &'static NamespaceSet {
    &XML_NAMESPACES
}

/// Register a namespace with the global set.
pub fn register_namespace(ns: &Namespace) -> Result<(), NamespaceError> {
    write().add_namespace(ns)?;
    tracing::debug!(namespace = %ns.name, prefix = %ns.prefix, "registered namespace");
    Ok(())
}

/// The preferred prefix for a registered namespace URI.
pub fn lookup_name(uri: &str) -> Result<Option<String>, NamespaceError> {
    Ok(read().preferred_prefix_for_namespace(uri)?.map(str::to_string))
}

/// The namespace URI mapped to a registered prefix.
pub fn lookup_prefix(prefix: &str) -> Option<String> {
    read().namespace_for_prefix(prefix).map(str::to_string)
}

/// A subset of the global set containing only the given namespaces.
pub fn make_namespace_subset_from_uris<'a, I>(ns_uris: I) -> Result<NamespaceSet, NamespaceError>
where
    I: IntoIterator<Item = &'a str>,
{
    read().subset(ns_uris)
}

/// URI to prefix mapping for every registered namespace.
pub fn get_full_ns_map() -> Result<IndexMap<String, String>, NamespaceError> {
    read().get_uri_prefix_map()
}

/// Prefix to URI mapping for every registered namespace.
pub fn get_full_prefix_map() -> Result<IndexMap<String, String>, NamespaceError> {
    read().get_prefix_uri_map()
}

/// URI to schema location mapping for every registered namespace that has one.
pub fn get_full_schemaloc_map() -> IndexMap<String, String> {
    read().get_uri_schemaloc_map()
}

/// `xmlns` declarations for the given registered namespaces (all when `None`).
pub fn get_xmlns_string(ns_uris: Option<&[&str]>, sort: bool) -> Result<String, NamespaceError> {
    read().get_xmlns_string(ns_uris, sort, true, "\n")
}

/// `xsi:schemaLocation` attribute for the given registered namespaces (all when `None`).
pub fn get_schemaloc_string(ns_uris: Option<&[&str]>, sort: bool) -> Result<String, NamespaceError> {
    read().get_schemaloc_string(ns_uris, sort, "\n")
}
