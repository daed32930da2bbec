//! # Mixbox
//!
//! Shared plumbing for libraries that model XML-schema based threat
//! intelligence formats (STIX, CybOX, MAEC) as typed entities.
//!
//! ## Overview
//!
//! - **Entities**: [`EntityClass`] describes a type through [`TypedField`]s;
//!   [`Entity`] instances convert to and from binding objects
//!   ([`Element`] trees), dictionaries and JSON.
//! - **Namespaces**: [`NamespaceSet`] keeps URI, prefix and schema location
//!   data consistent; a process-wide registry knows every namespace the
//!   formats use.
//! - **XML export**: [`NamespaceCollector`] gathers the namespaces an entity
//!   tree needs and [`Entity::to_xml`] renders the document.
//! - **Parsing**: [`parser::EntityParser`] loads, checks and converts
//!   documents.
//! - **Support**: ID generation ([`idgen`]), dates ([`dates`]), a weak
//!   object cache ([`cache`]), signals and lifecycle events ([`signals`],
//!   [`events`]) and typed lists ([`TypedList`]).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding;
pub mod cache;
pub mod collector;
pub mod dates;
pub mod datautils;
pub mod entities;
pub mod error;
pub mod events;
pub mod fields;
pub mod idgen;
pub mod namespaces;
pub mod options;
pub mod parser;
pub mod signals;
pub mod typedlist;
pub mod value;
pub mod xml;

// Re-export main types
pub use binding::{Element, QName};
pub use cache::{Cached, ObjectCache};
pub use collector::NamespaceCollector;
pub use entities::{Entity, EntityClass, EntityFactory, EntityList, TypeRegistryFactory};
pub use error::{
    CacheError, EntityError, FieldError, IdError, MixboxError, NamespaceError, ParseError, Result,
};
pub use fields::{FieldKind, FieldType, TypedField};
pub use namespaces::{Namespace, NamespaceSet};
pub use options::{ExportOptions, ParseOptions};
pub use parser::{DocumentVersion, EntityParser};
pub use signals::Dispatcher;
pub use typedlist::TypedList;
pub use value::FieldValue;
pub use xml::XmlInput;

/// Mixbox version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
