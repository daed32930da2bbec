//! ID generation for entity identifiers

use std::fmt;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::IdError;
use crate::namespaces::Namespace;

/// Namespace used for generated IDs until a consumer sets its own.
pub static EXAMPLE_NAMESPACE: LazyLock<Namespace> =
    LazyLock::new(|| Namespace::new("http://example.com", "example"));

/// Default object prefix for generated IDs.
pub const DEFAULT_ID_PREFIX: &str = "guid";

/// How the unique part of an ID is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdMethod {
    /// Random version 4 UUIDs
    #[default]
    Uuid,

    /// An incrementing counter starting at 1
    Int,
}

impl FromStr for IdMethod {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uuid" => Ok(IdMethod::Uuid),
            "int" => Ok(IdMethod::Int),
            other => Err(IdError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for IdMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdMethod::Uuid => write!(f, "uuid"),
            IdMethod::Int => write!(f, "int"),
        }
    }
}

/// Generates IDs of the form `{namespace prefix}:{object prefix}-{unique}`.
///
/// # Example
///
/// ```
/// use mixbox::idgen::{IdGenerator, IdMethod};
///
/// let mut generator = IdGenerator::with_method(IdMethod::Int);
/// assert_eq!(generator.create_id(None), "example:guid-1");
/// assert_eq!(generator.create_id(Some("indicator")), "example:indicator-2");
/// ```
#[derive(Debug, Clone)]
pub struct IdGenerator {
    namespace: Namespace,
    method: IdMethod,
    next_int: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    /// Create a UUID generator in the example namespace.
    pub fn new() -> Self {
        Self::with(EXAMPLE_NAMESPACE.clone(), IdMethod::Uuid)
    }

    /// Create a generator in the example namespace using `method`.
    pub fn with_method(method: IdMethod) -> Self {
        Self::with(EXAMPLE_NAMESPACE.clone(), method)
    }

    /// Create a generator with an explicit namespace and method.
    pub fn with(namespace: Namespace, method: IdMethod) -> Self {
        Self {
            namespace,
            method,
            next_int: 1,
        }
    }

    /// The namespace IDs are created in.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Change the namespace IDs are created in.
    pub fn set_namespace(&mut self, namespace: Namespace) {
        self.namespace = namespace;
    }

    /// The current generation method.
    pub fn method(&self) -> IdMethod {
        self.method
    }

    /// Change the generation method.
    pub fn set_method(&mut self, method: IdMethod) {
        self.method = method;
    }

    /// The next value the int method will hand out.
    pub fn next_int(&self) -> u64 {
        self.next_int
    }

    /// Restart the int counter at 1.
    pub fn reset(&mut self) {
        self.next_int = 1;
    }

    /// Create a new ID. `prefix` defaults to `"guid"`.
    pub fn create_id(&mut self, prefix: Option<&str>) -> String {
        let prefix = prefix.filter(|p| !p.is_empty()).unwrap_or(DEFAULT_ID_PREFIX);
        let unique = match self.method {
            IdMethod::Uuid => uuid::Uuid::new_v4().to_string(),
            IdMethod::Int => {
                let n = self.next_int;
                self.next_int += 1;
                n.to_string()
            }
        };
        format!("{}:{}-{}", self.namespace.prefix, prefix, unique)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Global Generator
// ═══════════════════════════════════════════════════════════════════

static GENERATOR: LazyLock<Mutex<IdGenerator>> = LazyLock::new(|| Mutex::new(IdGenerator::new()));

fn generator() -> MutexGuard<'static, IdGenerator> {
    GENERATOR.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Create an ID with the global generator.
pub fn create_id(prefix: Option<&str>) -> String {
    generator().create_id(prefix)
}

/// Set the namespace of the global generator.
pub fn set_id_namespace(namespace: Namespace) {
    tracing::debug!(namespace = %namespace.name, "setting id namespace");
    generator().set_namespace(namespace);
}

/// Set the method of the global generator.
pub fn set_id_method(method: IdMethod) {
    generator().set_method(method);
}

/// Restart the global int counter at 1.
pub fn reset_id_counter() {
    generator().reset();
}

/// URI of the global ID namespace.
pub fn get_id_namespace() -> String {
    generator().namespace().name.clone()
}

/// Prefix of the global ID namespace.
pub fn get_id_namespace_prefix() -> String {
    generator().namespace().prefix.clone()
}

/// Alias of the global ID namespace (same as its prefix).
pub fn get_id_namespace_alias() -> String {
    get_id_namespace_prefix()
}
