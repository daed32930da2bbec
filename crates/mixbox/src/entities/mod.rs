//! Entities: typed, field-based API objects
//!
//! An [`Entity`] is an instance of an [`EntityClass`]. It stores
//! [`FieldValue`]s keyed by field and converts to and from binding objects
//! ([`Element`](crate::binding::Element) trees), dictionaries
//! (`serde_json::Value`) and JSON text.

mod class;
mod dict;
mod factory;
mod list;
mod obj;

pub use class::{CastFn, EntityClass, EntityClassBuilder};
pub use factory::{EntityFactory, TypeRegistryFactory};
pub use list::EntityList;

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::cache::Cached;
use crate::error::FieldError;
use crate::fields::TypedField;
use crate::value::FieldValue;

/// An instance of an [`EntityClass`].
///
/// # Example
///
/// ```
/// use mixbox::entities::{Entity, EntityClass};
/// use mixbox::fields::TypedField;
///
/// let class = EntityClass::builder("Thing")
///     .field(TypedField::new("Name"))
///     .field(TypedField::new("Tags").multiple())
///     .build()
///     .unwrap();
///
/// let mut thing = Entity::new(&class);
/// thing.set("name", "a thing").unwrap();
/// thing.set("tags", "one").unwrap();
///
/// assert_eq!(thing.get_str("name"), Some("a thing"));
/// assert_eq!(thing.get_list("tags").len(), 1);
/// ```
#[derive(Clone)]
pub struct Entity {
    class: Arc<EntityClass>,

    /// Field key name to stored value
    fields: IndexMap<String, FieldValue>,

    /// Prefix to URI mappings of the document this entity was parsed from
    input_namespaces: IndexMap<String, String>,

    /// URI to schema location pairs of the document this entity was parsed from
    input_schemalocations: IndexMap<String, String>,
}

impl Entity {
    /// Create an entity with no fields set.
    pub fn new(class: &Arc<EntityClass>) -> Self {
        Self {
            class: class.clone(),
            fields: IndexMap::new(),
            input_namespaces: IndexMap::new(),
            input_schemalocations: IndexMap::new(),
        }
    }

    /// The entity's class
    pub fn class(&self) -> &Arc<EntityClass> {
        &self.class
    }

    fn field_for(&self, key: &str) -> Result<&TypedField, FieldError> {
        self.class.field(key).ok_or_else(|| FieldError::UnknownField {
            class: self.class.name().to_string(),
            field: key.to_string(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Field Access
    // ═══════════════════════════════════════════════════════════════════

    /// The value of a field, looked up by key name or binding name.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        let field = self.class.field(key)?;
        self.fields.get(field.get_key_name())
    }

    /// The items of a field; empty when unset. A single value is returned
    /// as a one-item slice.
    pub fn get_list(&self, key: &str) -> &[FieldValue] {
        match self.get(key) {
            Some(FieldValue::List(items)) => items,
            Some(value) => std::slice::from_ref(value),
            None => &[],
        }
    }

    /// A string field's value
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_str)
    }

    /// A nested entity field's value
    pub fn get_entity(&self, key: &str) -> Option<&Entity> {
        self.get(key).and_then(FieldValue::as_entity)
    }

    /// Mutable access to a stored value. Hooks and validation are bypassed.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        let key = self.class.field(key)?.get_key_name().to_string();
        self.fields.get_mut(&key)
    }

    /// Whether a field holds a value.
    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Assign a field.
    ///
    /// Entities shared through an [`ObjectCache`](crate::cache::ObjectCache)
    /// live behind an `Arc` and can't be borrowed mutably in place. After
    /// changing the `id` of an entity taken back out with `Arc::make_mut`,
    /// re-file it with [`ObjectCache::update`](crate::cache::ObjectCache::update)
    /// and the old id.
    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<(), FieldError> {
        self.set_opt(key, Some(value.into()))
    }

    /// Assign a field, `None` clearing it.
    ///
    /// The value is cleaned by the field (type checks, casts, list
    /// wrapping), then the preset hook may veto it, then it is stored and
    /// the postset hook runs.
    ///
    /// # Errors
    ///
    /// - `UnknownField` if the class has no such field
    /// - `TypeMismatch` if the value can't be made to fit the field type
    /// - `Rejected` if the preset hook refuses the value
    pub fn set_opt(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), FieldError> {
        let field = self.field_for(key)?.clone();
        let value = field.prepare(value)?;

        if let Some(hook) = field.preset() {
            hook(self, value.as_ref()).map_err(|reason| FieldError::Rejected {
                field: field.name().to_string(),
                reason,
            })?;
        }

        let key = field.get_key_name().to_string();
        match &value {
            Some(v) => {
                self.fields.insert(key, v.clone());
            }
            None => {
                self.fields.shift_remove(&key);
            }
        }

        if let Some(hook) = field.postset() {
            hook(self, value.as_ref());
        }
        Ok(())
    }

    /// Clear a field (an empty list for multiple fields).
    pub fn unset(&mut self, key: &str) -> Result<(), FieldError> {
        self.set_opt(key, None)
    }

    /// Key names and values of every set field, in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Input Document Data
    // ═══════════════════════════════════════════════════════════════════

    /// Namespaces (prefix to URI) declared on the parsed source document
    pub fn input_namespaces(&self) -> &IndexMap<String, String> {
        &self.input_namespaces
    }

    /// Record the parsed source document's namespaces.
    pub fn set_input_namespaces(&mut self, nsmap: IndexMap<String, String>) {
        self.input_namespaces = nsmap;
    }

    /// Schema locations (URI to location) of the parsed source document
    pub fn input_schemalocations(&self) -> &IndexMap<String, String> {
        &self.input_schemalocations
    }

    /// Record the parsed source document's schema locations.
    pub fn set_input_schemalocations(&mut self, schemalocs: IndexMap<String, String>) {
        self.input_schemalocations = schemalocs;
    }

    /// Whether `value` is an instance of `class`.
    pub fn istypeof(class: &EntityClass, value: &FieldValue) -> bool {
        value.as_entity().is_some_and(|e| class.istypeof(e))
    }
}

fn values_equal(field: &TypedField, a: Option<&FieldValue>, b: Option<&FieldValue>) -> bool {
    let empty = |v: Option<&FieldValue>| match v {
        None => true,
        Some(FieldValue::List(items)) => items.is_empty(),
        Some(_) => false,
    };

    if field.is_multiple() && empty(a) && empty(b) {
        return true;
    }
    a == b
}

impl PartialEq for Entity {
    /// Entities are equal when they share a class and every comparable
    /// field matches. A class without comparable fields never compares
    /// equal except to the very same instance.
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if self.class.name() != other.class.name() {
            return false;
        }

        let mut comparable = self.class.fields().iter().filter(|f| f.is_comparable()).peekable();
        if comparable.peek().is_none() {
            return false;
        }

        comparable.all(|field| {
            let key = field.get_key_name();
            values_equal(field, self.fields.get(key), other.fields.get(key))
        })
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class.name())?;
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl Cached for Entity {
    fn cache_id(&self) -> Option<String> {
        match self.get("id")? {
            FieldValue::String(s) => Some(s.clone()),
            other => Some(other.to_text()),
        }
    }

    fn cache_attribute(&self, name: &str) -> Option<serde_json::Value> {
        self.get(name).map(FieldValue::to_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class() -> Arc<EntityClass> {
        EntityClass::builder("Foo")
            .field(TypedField::new("Name"))
            .field(TypedField::new("Notes").not_comparable())
            .field(TypedField::new("Tags").multiple())
            .build()
            .unwrap()
    }

    #[test]
    fn test_unset_multiple_equals_empty_list() {
        let class = class();
        let mut a = Entity::new(&class);
        let b = Entity::new(&class);
        a.unset("tags").unwrap();
        assert_eq!(a.get("tags"), Some(&FieldValue::List(vec![])));
        assert_eq!(a, b);
    }

    #[test]
    fn test_not_comparable_fields_ignored() {
        let class = class();
        let mut a = Entity::new(&class);
        let mut b = Entity::new(&class);
        a.set("name", "x").unwrap();
        b.set("name", "x").unwrap();
        a.set("notes", "one").unwrap();
        b.set("notes", "two").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_field() {
        let mut e = Entity::new(&class());
        assert!(matches!(
            e.set("nope", "x"),
            Err(FieldError::UnknownField { .. })
        ));
    }
}
