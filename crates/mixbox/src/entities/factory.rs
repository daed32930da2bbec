//! Type key to entity class resolution at parse time

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use super::{Entity, EntityClass};
use crate::binding::Element;
use crate::datautils;
use crate::error::EntityError;
use crate::value::FieldValue;

/// Resolves the entity class for a type key (normally an `xsi:type` value)
/// while parsing dictionaries and binding objects.
///
/// Only [`entity_class`](EntityFactory::entity_class) is required; the
/// other methods can be overridden for non-standard keys.
pub trait EntityFactory: Send + Sync {
    /// The class registered for `key`.
    ///
    /// # Errors
    ///
    /// `UnknownTypeKey` if nothing is associated with the key.
    fn entity_class(&self, key: Option<&str>) -> Result<Arc<EntityClass>, EntityError>;

    /// Dictionary key holding type information
    fn dict_key(&self) -> &str {
        "xsi:type"
    }

    /// Whether bare strings are parsed as entities instead of passed through
    fn convert_strings(&self) -> bool {
        false
    }

    /// The type key of a binding object: its `xsi:type` attribute.
    fn obj_key(&self, obj: &Element) -> Option<String> {
        obj.xsi_type().map(str::to_string)
    }

    /// The type key of a dictionary, if it carries one.
    fn dict_type_key(&self, value: &Value) -> Option<String> {
        value
            .get(self.dict_key())
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// A fresh instance of the class registered for `key`.
    fn instance(&self, key: Option<&str>) -> Result<Entity, EntityError> {
        Ok(Entity::new(&self.entity_class(key)?))
    }

    /// Parse a dictionary into an entity of the class its type key names.
    ///
    /// Empty input gives `None`. Strings pass through untouched unless
    /// [`convert_strings`](EntityFactory::convert_strings) is set. Input that
    /// is not an object resolves its class with `fallback_xsi_type`.
    fn from_dict(
        &self,
        value: &Value,
        fallback_xsi_type: Option<&str>,
    ) -> Result<Option<FieldValue>, EntityError> {
        if datautils::is_empty(value) {
            return Ok(None);
        }
        if let Value::String(s) = value {
            if !self.convert_strings() {
                return Ok(Some(FieldValue::String(s.clone())));
            }
        }

        let key = match value {
            Value::Object(_) => self.dict_type_key(value),
            _ => fallback_xsi_type.map(str::to_string),
        };
        let class = self.entity_class(key.as_deref())?;
        Ok(Entity::from_dict(&class, value)?.map(FieldValue::entity))
    }

    /// Parse a binding object into an entity of the class its type key names.
    fn from_obj(&self, obj: &Element) -> Result<Entity, EntityError> {
        let class = self.entity_class(self.obj_key(obj).as_deref())?;
        Entity::from_obj(&class, obj)
    }
}

/// An [`EntityFactory`] backed by a map of type keys to classes.
///
/// # Example
///
/// ```
/// use mixbox::entities::{EntityClass, EntityFactory, TypeRegistryFactory};
///
/// let hash = EntityClass::builder("Hash").xsi_type("cyboxCommon:HashType").build().unwrap();
/// let factory = TypeRegistryFactory::new().with_class(&hash);
///
/// let class = factory.entity_class(Some("cyboxCommon:HashType")).unwrap();
/// assert_eq!(class.name(), "Hash");
/// assert!(factory.entity_class(Some("other:Type")).is_err());
/// ```
#[derive(Clone, Default)]
pub struct TypeRegistryFactory {
    classes: IndexMap<String, Arc<EntityClass>>,
    default: Option<Arc<EntityClass>>,
    convert_strings: bool,
}

impl TypeRegistryFactory {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `class` under its `xsi:type` (builder pattern). Classes
    /// without one are ignored.
    pub fn with_class(mut self, class: &Arc<EntityClass>) -> Self {
        self.register(class);
        self
    }

    /// Register `class` under an explicit key (builder pattern).
    pub fn with_key(mut self, key: impl Into<String>, class: &Arc<EntityClass>) -> Self {
        self.classes.insert(key.into(), class.clone());
        self
    }

    /// Class used when the key is missing or unknown (builder pattern).
    pub fn with_default(mut self, class: &Arc<EntityClass>) -> Self {
        self.default = Some(class.clone());
        self
    }

    /// Parse bare strings as entities (builder pattern).
    pub fn converting_strings(mut self) -> Self {
        self.convert_strings = true;
        self
    }

    /// Register `class` under its `xsi:type`.
    pub fn register(&mut self, class: &Arc<EntityClass>) {
        if let Some(key) = class.xsi_type() {
            self.classes.insert(key.to_string(), class.clone());
        }
    }
}

impl EntityFactory for TypeRegistryFactory {
    fn entity_class(&self, key: Option<&str>) -> Result<Arc<EntityClass>, EntityError> {
        key.and_then(|k| self.classes.get(k))
            .or(self.default.as_ref())
            .cloned()
            .ok_or_else(|| EntityError::UnknownTypeKey(key.map(str::to_string)))
    }

    fn convert_strings(&self) -> bool {
        self.convert_strings
    }
}

impl fmt::Debug for TypeRegistryFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistryFactory")
            .field("keys", &self.classes.keys().collect::<Vec<_>>())
            .field("default", &self.default.as_ref().map(|c| c.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TypedField;
    use serde_json::json;

    #[test]
    fn test_strings_pass_through() {
        let factory = TypeRegistryFactory::new();
        let value = factory.from_dict(&json!("plain"), None).unwrap();
        assert_eq!(value, Some(FieldValue::string("plain")));
    }

    #[test]
    fn test_empty_input_gives_none() {
        let factory = TypeRegistryFactory::new();
        assert_eq!(factory.from_dict(&json!({}), None).unwrap(), None);
        assert_eq!(factory.from_dict(&Value::Null, None).unwrap(), None);
    }

    #[test]
    fn test_dict_resolves_by_type_key() {
        let class = EntityClass::builder("Typed")
            .xsi_type("t:TypedType")
            .field(TypedField::new("Value"))
            .build()
            .unwrap();
        let factory = TypeRegistryFactory::new().with_class(&class);

        let value = factory
            .from_dict(&json!({"xsi:type": "t:TypedType", "value": "v"}), None)
            .unwrap()
            .unwrap();
        let entity = value.as_entity().unwrap();
        assert_eq!(entity.class().name(), "Typed");
        assert_eq!(entity.get_str("value"), Some("v"));
    }

    #[test]
    fn test_unknown_key() {
        let factory = TypeRegistryFactory::new();
        assert!(matches!(
            factory.entity_class(Some("x:Y")),
            Err(EntityError::UnknownTypeKey(Some(_)))
        ));
    }
}
