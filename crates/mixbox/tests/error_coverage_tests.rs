// Coverage tests for error messages and conversions
use mixbox::*;
use pretty_assertions::assert_eq;

// ═══════════════════════════════════════════════════════════════════════
// NamespaceError Display
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_duplicate_prefix_message() {
    let err = NamespaceError::DuplicatePrefix {
        prefix: "a".to_string(),
        namespaces: vec!["urn:one".to_string(), "urn:two".to_string()],
    };
    assert_eq!(
        err.to_string(),
        r#"Can't map prefix 'a' to different namespaces: ["urn:one", "urn:two"]"#
    );
}

#[test]
fn test_conflicting_schema_location_message() {
    let err = NamespaceError::ConflictingSchemaLocation {
        ns_uri: "urn:one".to_string(),
        schema_locations: vec!["loc1".to_string(), "loc2".to_string()],
    };
    assert_eq!(
        err.to_string(),
        r#"Can't map namespace 'urn:one' to different schema locations: ["loc1", "loc2"]"#
    );
}

#[test]
fn test_namespace_lookup_messages() {
    assert_eq!(
        NamespaceError::NamespaceNotFound("urn:x".into()).to_string(),
        "Namespace not found: urn:x"
    );
    assert_eq!(
        NamespaceError::PrefixNotFound("x".into()).to_string(),
        "Prefix not found: x"
    );
    assert_eq!(
        NamespaceError::NoPrefixes("urn:x".into()).to_string(),
        "Namespace 'urn:x' has no prefixes!"
    );
    assert_eq!(
        NamespaceError::TooManyDefaultNamespaces("urn:x".into()).to_string(),
        "Too many default namespaces: needed a prefix for namespace 'urn:x' but none are defined!"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// Field and Entity Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_type_mismatch_message() {
    let err = FieldError::TypeMismatch {
        field: "Count".into(),
        expected: "integer".into(),
        got: FieldValue::from("x").type_name().into(),
    };
    assert_eq!(err.to_string(), "Count must be a integer, not a string");
}

#[test]
fn test_unknown_field_message() {
    let err = FieldError::UnknownField {
        class: "Widget".into(),
        field: "color".into(),
    };
    assert_eq!(err.to_string(), "Widget has no field named 'color'");
}

#[test]
fn test_entity_error_is_transparent_for_fields() {
    let field = FieldError::Rejected {
        field: "Name".into(),
        reason: "too long".into(),
    };
    let err: EntityError = field.clone().into();
    assert_eq!(err.to_string(), field.to_string());
}

#[test]
fn test_entity_error_messages() {
    assert_eq!(
        EntityError::UnknownTypeKey(Some("x:Thing".into())).to_string(),
        r#"No entity class registered for type key Some("x:Thing")"#
    );
    assert_eq!(
        EntityError::MissingKeys(vec!["id".into(), "name".into()]).to_string(),
        r#"["id", "name"] keys are missing"#
    );
    assert_eq!(
        EntityError::Cast {
            class: "Widget".into(),
            got: "bool".into(),
        }
        .to_string(),
        "Could not instantiate a Widget from a bool"
    );
    assert_eq!(
        EntityError::NotAnEntityList("Widget".into()).to_string(),
        "Widget is not an entity list class"
    );
}

#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: EntityError = json_err.into();
    assert!(err.to_string().starts_with("JSON error: "));
}

// ═══════════════════════════════════════════════════════════════════════
// Parse, Cache and Id Errors
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_parse_error_messages() {
    assert_eq!(
        ParseError::InvalidVersion("1.x".into()).to_string(),
        "Invalid version number '1.x'"
    );
    assert_eq!(
        ParseError::UnsupportedVersion {
            expected: vec!["1.0".into()],
            found: "2.0".into(),
        }
        .to_string(),
        r#"Document version (2.0) not in supported versions (["1.0"])"#
    );
    assert!(ParseError::UnknownVersion
        .to_string()
        .starts_with("Unable to determine the version"));
}

#[test]
fn test_io_error_keeps_source() {
    use std::error::Error as _;

    let err = ParseError::Io {
        path: "missing.xml".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };
    assert_eq!(err.to_string(), "Unable to read missing.xml: gone");
    assert!(err.source().is_some());
}

#[test]
fn test_cache_error_messages() {
    let err = CacheError::MultipleCached {
        id: "x:1".into(),
        criteria: "{}".into(),
    };
    assert_eq!(
        err.to_string(),
        "Multiple cached items for id: 'x:1' and criteria: {}"
    );
}

#[test]
fn test_id_error_message() {
    assert_eq!(
        IdError::InvalidMethod("sequence".into()).to_string(),
        "invalid method: sequence"
    );
}

// ═══════════════════════════════════════════════════════════════════════
// MixboxError Conversions
// ═══════════════════════════════════════════════════════════════════════

fn fails_with_namespace() -> Result<()> {
    let mut set = NamespaceSet::new();
    set.add_namespace_uri("", Some("x"), None)?;
    Ok(())
}

fn fails_with_id() -> Result<()> {
    "sequence".parse::<idgen::IdMethod>()?;
    Ok(())
}

#[test]
fn test_question_mark_converts_into_mixbox_error() {
    assert!(matches!(
        fails_with_namespace(),
        Err(MixboxError::Namespace(NamespaceError::EmptyUri))
    ));
    assert!(matches!(
        fails_with_id(),
        Err(MixboxError::Id(IdError::InvalidMethod(_)))
    ));
}

#[test]
fn test_mixbox_error_is_transparent() {
    let err: MixboxError = CacheError::Miss {
        id: "x:1".into(),
        criteria: "{}".into(),
    }
    .into();
    assert_eq!(
        err.to_string(),
        "No cached objects for id: 'x:1' and criteria: {}"
    );

    let err: MixboxError = ParseError::UnknownVersion.into();
    assert!(matches!(err, MixboxError::Parse(ParseError::UnknownVersion)));
}
