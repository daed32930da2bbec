//! Tests for namespace sets and the global namespace registry

use indexmap::IndexSet;
use mixbox::namespaces::{self, NS_XLINK};
use mixbox::*;
use pretty_assertions::assert_eq;

fn prefixes(items: &[&str]) -> IndexSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Namespace
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_namespace_equality() {
    let ns1 = Namespace::new("http://example.com/", "example");
    let ns2 = Namespace::new("http://example.com/", "example");
    let ns3 = Namespace::new("http://example.com", "example");

    assert_eq!(ns1, ns2);
    assert_ne!(ns1, ns3);
}

// ═══════════════════════════════════════════════════════════════════════
// NamespaceSet
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_set_semantics() {
    let mut set = NamespaceSet::new();
    assert_eq!(set.len(), 0);

    let ns1 = Namespace::new("http://example.com/", "example");
    set.add_namespace(&ns1).unwrap();
    assert_eq!(set.len(), 1);

    // Re-adding an equal namespace has no effect
    set.add_namespace(&ns1).unwrap();
    set.add_namespace(&Namespace::new("http://example.com/", "example"))
        .unwrap();
    assert_eq!(set.len(), 1);

    // Neither does adding a prefix
    set.add_namespace_uri("http://example.com/", Some("example2"), None)
        .unwrap();
    assert_eq!(set.len(), 1);

    assert!(set.contains_namespace("http://example.com/"));
    assert!(set.is_valid());
}

#[test]
fn test_prefixes() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("a:b:c", Some("pfx"), None).unwrap();
    set.add_namespace_uri("a:b:c", Some("pfx2"), None).unwrap();
    set.add_prefix("a:b:c", "pfx3", false).unwrap();
    assert_eq!(set.get_prefixes("a:b:c").unwrap().len(), 3);
    assert!(set.is_valid());

    set.remove_prefix("pfx3");
    assert_eq!(set.get_prefixes("a:b:c").unwrap(), prefixes(&["pfx", "pfx2"]));

    let iterated: Vec<&str> = set.prefix_iter("a:b:c").unwrap().collect();
    assert_eq!(iterated, vec!["pfx", "pfx2"]);

    assert_eq!(set.namespace_for_prefix("pfx"), Some("a:b:c"));
    assert_eq!(set.namespace_for_prefix("pfx2"), Some("a:b:c"));

    assert!(matches!(
        set.add_namespace_uri("x:y:z", Some("pfx"), None),
        Err(NamespaceError::DuplicatePrefix { .. })
    ));
    assert!(matches!(
        set.add_namespace(&Namespace::new("x:y:z", "pfx")),
        Err(NamespaceError::DuplicatePrefix { .. })
    ));

    assert!(matches!(
        set.get_prefixes("does:not:exist"),
        Err(NamespaceError::NamespaceNotFound(_))
    ));
    assert!(set.prefix_iter("does:not:exist").is_err());
    assert!(matches!(
        set.add_prefix("does:not:exist", "dne", false),
        Err(NamespaceError::NamespaceNotFound(_))
    ));

    // Removing an unknown prefix is a no-op
    set.remove_prefix("does:not:exist");
    assert!(set.is_valid());
}

#[test]
fn test_preferred_prefixes() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("a:b:c", Some("abc"), None).unwrap();
    set.add_namespace_uri("a:b:c", Some("def"), None).unwrap();
    assert_eq!(set.preferred_prefix_for_namespace("a:b:c").unwrap(), Some("abc"));

    set.set_preferred_prefix_for_namespace("a:b:c", Some("def"), false)
        .unwrap();
    assert_eq!(set.preferred_prefix_for_namespace("a:b:c").unwrap(), Some("def"));

    set.set_preferred_prefix_for_namespace("a:b:c", None, false)
        .unwrap();
    assert_eq!(set.preferred_prefix_for_namespace("a:b:c").unwrap(), None);

    set.set_preferred_prefix_for_namespace("a:b:c", Some("ghi"), true)
        .unwrap();
    assert_eq!(set.preferred_prefix_for_namespace("a:b:c").unwrap(), Some("ghi"));

    set.add_prefix("a:b:c", "jkl", true).unwrap();
    assert_eq!(set.preferred_prefix_for_namespace("a:b:c").unwrap(), Some("jkl"));

    assert!(matches!(
        set.preferred_prefix_for_namespace("does:not:exist"),
        Err(NamespaceError::NamespaceNotFound(_))
    ));
    assert!(matches!(
        set.set_preferred_prefix_for_namespace("does:not:exist", Some("dne"), false),
        Err(NamespaceError::NamespaceNotFound(_))
    ));
    assert!(matches!(
        set.set_preferred_prefix_for_namespace("a:b:c", Some("notaprefix"), false),
        Err(NamespaceError::PrefixNotFound(_))
    ));

    assert!(set.is_valid());
}

#[test]
fn test_schema_locations() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("a:b:c", Some("abc"), Some("sc:he:ma"))
        .unwrap();
    assert_eq!(set.get_schema_location("a:b:c").unwrap(), Some("sc:he:ma"));

    assert!(matches!(
        set.set_schema_location("a:b:c", Some("other:schemaloc"), false),
        Err(NamespaceError::ConflictingSchemaLocation { .. })
    ));
    assert!(matches!(
        set.add_namespace(&Namespace::new("a:b:c", "abc").with_schema_location("other:schemaloc")),
        Err(NamespaceError::ConflictingSchemaLocation { .. })
    ));
    assert!(matches!(
        set.add_namespace_uri("a:b:c", Some("abc"), Some("other:schemaloc")),
        Err(NamespaceError::ConflictingSchemaLocation { .. })
    ));
    assert!(matches!(
        set.set_schema_location("does:not:exist", Some("sc:he:ma"), false),
        Err(NamespaceError::NamespaceNotFound(_))
    ));
    assert!(set.get_schema_location("does:not:exist").is_err());

    set.set_schema_location("a:b:c", Some("sc:he:ma2"), true)
        .unwrap();
    assert_eq!(set.get_schema_location("a:b:c").unwrap(), Some("sc:he:ma2"));

    // Merging an absent location keeps the existing one
    set.add_namespace_uri("a:b:c", Some("abc"), None).unwrap();
    assert_eq!(set.get_schema_location("a:b:c").unwrap(), Some("sc:he:ma2"));

    set.add_namespace_uri("d:e:f", Some("def"), None).unwrap();
    set.add_namespace_uri("d:e:f", Some("def"), Some("def:schema"))
        .unwrap();
    assert_eq!(set.get_schema_location("d:e:f").unwrap(), Some("def:schema"));

    assert!(set.is_valid());
}

#[test]
fn test_maps() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("a:b:c", Some("abc"), Some("abcschema"))
        .unwrap();
    set.add_prefix("a:b:c", "abc2", false).unwrap();
    set.add_namespace_uri("d:e:f", Some("def"), Some("defschema"))
        .unwrap();
    set.set_preferred_prefix_for_namespace("d:e:f", None, false)
        .unwrap();

    let uri_prefix = set.get_uri_prefix_map().unwrap();
    assert_eq!(uri_prefix.get("a:b:c").map(String::as_str), Some("abc"));
    assert_eq!(uri_prefix.get("d:e:f").map(String::as_str), Some("def"));

    let prefix_uri = set.get_prefix_uri_map().unwrap();
    assert_eq!(prefix_uri.get("abc").map(String::as_str), Some("a:b:c"));
    assert_eq!(prefix_uri.get("def").map(String::as_str), Some("d:e:f"));

    // Maps need every namespace to have at least one prefix
    set.add_namespace_uri("g:h:i", None, None).unwrap();
    assert!(matches!(
        set.get_prefix_uri_map(),
        Err(NamespaceError::NoPrefixes(_))
    ));
    assert!(matches!(
        set.get_uri_prefix_map(),
        Err(NamespaceError::NoPrefixes(_))
    ));

    let schemalocs = set.get_uri_schemaloc_map();
    assert_eq!(schemalocs.len(), 2);
    assert_eq!(schemalocs.get("a:b:c").map(String::as_str), Some("abcschema"));

    // Without a preferred prefix, one of the others is chosen
    set.add_prefix("g:h:i", "ghi1", false).unwrap();
    set.add_prefix("g:h:i", "ghi2", false).unwrap();
    let uri_prefix = set.get_uri_prefix_map().unwrap();
    assert!(["ghi1", "ghi2"].contains(&uri_prefix["g:h:i"].as_str()));

    assert!(set.is_valid());
}

#[test]
fn test_empty_selection_declares_nothing() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("urn:a", Some("a"), Some("a.xsd")).unwrap();

    assert_eq!(set.get_xmlns_string(Some(&[][..]), false, false, "\n").unwrap(), "");
    assert_eq!(set.get_schemaloc_string(Some(&[][..]), false, " ").unwrap(), "");
    assert_eq!(
        set.get_xmlns_string(None, false, false, "\n").unwrap(),
        "xmlns:a=\"urn:a\"\n"
    );
}

#[test]
fn test_strings() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("a:b:c", Some("abc"), Some("abcschema"))
        .unwrap();
    set.add_prefix("a:b:c", "abc2", false).unwrap();
    set.add_namespace_uri("d:e:f", Some("def"), Some("defschema"))
        .unwrap();
    set.add_namespace_uri("g:h:i", None, None).unwrap();

    let preferred = set.get_xmlns_string(None, false, true, "\n").unwrap();
    assert_eq!(
        preferred,
        "xmlns:abc=\"a:b:c\"\nxmlns:def=\"d:e:f\"\nxmlns=\"g:h:i\"\n"
    );

    let all = set.get_xmlns_string(None, false, false, " ").unwrap();
    assert!(all.contains("xmlns:abc2=\"a:b:c\""));
    assert!(all.contains("xmlns=\"g:h:i\""));

    let schemaloc = set.get_schemaloc_string(None, false, " ").unwrap();
    assert_eq!(
        schemaloc,
        "xsi:schemaLocation=\"a:b:c abcschema d:e:f defschema\""
    );

    let only = set.get_schemaloc_string(Some(&["g:h:i"][..]), false, " ").unwrap();
    assert_eq!(only, "");

    // A second namespace without prefixes can't be declared
    set.add_namespace_uri("j:k:l", None, None).unwrap();
    assert!(matches!(
        set.get_xmlns_string(None, false, true, "\n"),
        Err(NamespaceError::TooManyDefaultNamespaces(_))
    ));
}

#[test]
fn test_sorted_strings() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("z:z", Some("z"), Some("zloc")).unwrap();
    set.add_namespace_uri("a:a", Some("a"), Some("aloc")).unwrap();

    assert_eq!(
        set.get_xmlns_string(None, true, true, " ").unwrap(),
        "xmlns:a=\"a:a\" xmlns:z=\"z:z\" "
    );
    assert_eq!(
        set.get_schemaloc_string(None, true, " ").unwrap(),
        "xsi:schemaLocation=\"a:a aloc z:z zloc\""
    );
}

#[test]
fn test_subset() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("a:b:c", Some("abc"), Some("abcschema"))
        .unwrap();
    set.add_namespace_uri("d:e:f", Some("def"), Some("defschema"))
        .unwrap();

    let mut expected = NamespaceSet::new();
    expected
        .add_namespace_uri("a:b:c", Some("abc"), Some("abcschema"))
        .unwrap();

    assert_eq!(set.subset(["a:b:c"]).unwrap(), expected);
    assert!(set.subset(["nope"]).is_err());
}

#[test]
fn test_import() {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("a:b:c", Some("abc"), Some("abcschema"))
        .unwrap();

    let mut imported = NamespaceSet::new();
    imported
        .add_namespace_uri("d:e:f", Some("def"), Some("defschema"))
        .unwrap();

    let mut union = NamespaceSet::new();
    union
        .add_namespace_uri("a:b:c", Some("abc"), Some("abcschema"))
        .unwrap();
    union
        .add_namespace_uri("d:e:f", Some("def"), Some("defschema"))
        .unwrap();

    set.import_from(&imported, false).unwrap();
    assert_eq!(set, union);

    // Replacing swaps the whole entry
    let mut imported2 = NamespaceSet::new();
    imported2.add_namespace_uri("a:b:c", Some("abc2"), None).unwrap();
    set.import_from(&imported2, true).unwrap();
    assert_eq!(set.get_prefixes("a:b:c").unwrap(), prefixes(&["abc2"]));
    assert_eq!(set.get_schema_location("a:b:c").unwrap(), None);
    assert_eq!(set.namespace_for_prefix("abc"), None);

    let mut imported3 = NamespaceSet::new();
    imported3.add_namespace_uri("g:h:i", Some("def"), None).unwrap();
    assert!(matches!(
        set.import_from(&imported3, false),
        Err(NamespaceError::DuplicatePrefix { .. })
    ));

    assert!(set.is_valid());
}

// ═══════════════════════════════════════════════════════════════════════
// Global Registry
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_registry_builtins() {
    assert_eq!(
        namespaces::lookup_name(&NS_XLINK.name).unwrap(),
        Some("xlink".to_string())
    );
    assert_eq!(
        namespaces::lookup_prefix("xsi").as_deref(),
        Some("http://www.w3.org/2001/XMLSchema-instance")
    );
    assert_eq!(namespaces::xml_namespaces().len(), 4);
}

#[test]
fn test_register_and_subset() {
    let ns = Namespace::new("urn:registry:test", "regtest").with_schema_location("regtest.xsd");
    namespaces::register_namespace(&ns).unwrap();

    let subset = namespaces::make_namespace_subset_from_uris(["urn:registry:test"]).unwrap();
    assert_eq!(subset.len(), 1);
    assert_eq!(
        subset.get_schema_location("urn:registry:test").unwrap(),
        Some("regtest.xsd")
    );
    assert_eq!(
        namespaces::get_full_schemaloc_map()
            .get("urn:registry:test")
            .map(String::as_str),
        Some("regtest.xsd")
    );
    assert_eq!(
        namespaces::get_xmlns_string(Some(&["urn:registry:test"][..]), false).unwrap(),
        "xmlns:regtest=\"urn:registry:test\"\n"
    );

    // A prefix owned by another namespace is refused
    let clash = Namespace::new("urn:registry:other", "regtest");
    assert!(namespaces::register_namespace(&clash).is_err());
}
