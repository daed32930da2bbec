//! Error types for mixbox operations

use thiserror::Error;

/// Errors raised while manipulating namespace sets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// A prefix would be mapped to two different namespaces
    #[error("Can't map prefix '{prefix}' to different namespaces: {namespaces:?}")]
    DuplicatePrefix {
        /// The contested prefix
        prefix: String,
        /// The namespace already owning the prefix, then the incoming one
        namespaces: Vec<String>,
    },

    /// A namespace would be associated with two different schema locations
    #[error("Can't map namespace '{ns_uri}' to different schema locations: {schema_locations:?}")]
    ConflictingSchemaLocation {
        /// The namespace URI
        ns_uri: String,
        /// The existing location, then the incoming one
        schema_locations: Vec<String>,
    },

    /// The namespace URI is not in the set
    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    /// The prefix is not in the set
    #[error("Prefix not found: {0}")]
    PrefixNotFound(String),

    /// More than one namespace needs to be the default and one of them has no prefix
    #[error("Too many default namespaces: needed a prefix for namespace '{0}' but none are defined!")]
    TooManyDefaultNamespaces(String),

    /// A prefix is required for the namespace but none is registered
    #[error("Namespace '{0}' has no prefixes!")]
    NoPrefixes(String),

    /// Internal invariants of a namespace set are broken
    #[error("NamespaceSet is invalid: {0}")]
    InvalidNamespaceSet(String),

    /// Namespace URIs must be non-empty
    #[error("Namespace URI must not be empty")]
    EmptyUri,

    /// Prefixes passed to `add_prefix` must be non-empty
    #[error("Prefix must not be empty")]
    EmptyPrefix,
}

/// Errors raised while assigning values to typed fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    /// The value is not of the field's type and could not be cast
    #[error("{field} must be a {expected}, not a {got}")]
    TypeMismatch {
        /// Field (or collection) name
        field: String,
        /// Expected type name
        expected: String,
        /// Type name of the rejected value
        got: String,
    },

    /// The entity class has no field with that name or key
    #[error("{class} has no field named '{field}'")]
    UnknownField {
        /// Entity class name
        class: String,
        /// Requested field
        field: String,
    },

    /// A preset hook refused the value
    #[error("Value rejected for field {field}: {reason}")]
    Rejected {
        /// Field name
        field: String,
        /// Reason returned by the hook
        reason: String,
    },
}

/// Errors raised by entity conversion and construction.
#[derive(Error, Debug)]
pub enum EntityError {
    /// Field assignment failure
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Namespace handling failure
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A factory could not resolve a class for the type key
    #[error("No entity class registered for type key {0:?}")]
    UnknownTypeKey(Option<String>),

    /// An operation that needs an entity-list class got another class
    #[error("{0} is not an entity list class")]
    NotAnEntityList(String),

    /// An entity-list class definition is malformed
    #[error("Invalid entity list class {class}: {reason}")]
    InvalidEntityList {
        /// Entity class name
        class: String,
        /// What is wrong with it
        reason: String,
    },

    /// A dictionary value cannot be represented as a field value
    #[error("Invalid dictionary value for {field}: {reason}")]
    InvalidDictValue {
        /// Field key name
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// Required dictionary keys are absent
    #[error("{0:?} keys are missing")]
    MissingKeys(Vec<String>),

    /// A non-entity value could not be cast into an entity
    #[error("Could not instantiate a {class} from a {got}")]
    Cast {
        /// Entity class name
        class: String,
        /// Type name of the value
        got: String,
    },
}

/// Errors raised by object cache lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Nothing matched the lookup
    #[error("No cached objects for id: '{id}' and criteria: {criteria}")]
    Miss {
        /// Looked-up id
        id: String,
        /// Rendered filter criteria
        criteria: String,
    },

    /// More than one object matched a single-object lookup
    #[error("Multiple cached items for id: '{id}' and criteria: {criteria}")]
    MultipleCached {
        /// Looked-up id
        id: String,
        /// Rendered filter criteria
        criteria: String,
    },
}

/// Errors raised by ID generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// Unknown ID generation method name
    #[error("invalid method: {0}")]
    InvalidMethod(String),
}

/// Errors raised while loading and parsing XML documents.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The document could not be read
    #[error("Unable to read {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The document is not well-formed XML
    #[error("Malformed XML document: {0}")]
    Xml(String),

    /// No version information on the root element
    #[error("Unable to determine the version of the input document. No version information found on the root element.")]
    UnknownVersion,

    /// The version string is not a strict `major.minor[.patch]` version
    #[error("Invalid version number '{0}'")]
    InvalidVersion(String),

    /// The document version is not supported by the parser
    #[error("Document version ({found}) not in supported versions ({expected:?})")]
    UnsupportedVersion {
        /// Supported versions
        expected: Vec<String>,
        /// Version found on the document
        found: String,
    },

    /// The root element is not one the parser handles
    #[error("Document root element ({found}) not one of ({expected:?})")]
    UnsupportedRootElement {
        /// Supported root tags
        expected: Vec<String>,
        /// Root tag found on the document
        found: String,
    },

    /// Converting the parsed tree into an entity failed
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Umbrella error for callers that mix several mixbox areas.
#[derive(Error, Debug)]
pub enum MixboxError {
    /// Namespace error
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    /// Field error
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Entity error
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// ID generation error
    #[error(transparent)]
    Id(#[from] IdError),

    /// Parse error
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Result type alias for mixbox operations
pub type Result<T> = std::result::Result<T, MixboxError>;
