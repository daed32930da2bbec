//! Conversion between entities and dictionaries / JSON

use std::sync::Arc;

use serde_json::{Map, Value};

use super::{Entity, EntityClass, EntityList};
use crate::error::EntityError;
use crate::events;
use crate::fields::TypedField;
use crate::value::FieldValue;

/// Dictionary key carrying the `xsi:type` of typed entities.
pub const XSI_TYPE_KEY: &str = "xsi:type";

impl Entity {
    /// Convert to a dictionary.
    ///
    /// Unset fields and empty lists are left out. Entity lists whose only
    /// field is the list become a JSON array. Classes with an `xsi:type`
    /// record it under the `xsi:type` key.
    pub fn to_dict(&self) -> Value {
        events::emit(events::EVENT_API_PRE_TO_DICT, self);

        let out = if self.class.dict_as_list() {
            Value::Array(self.list_dicts())
        } else {
            let mut map = Map::new();
            for field in self.class.fields() {
                let key = field.get_key_name();
                let Some(value) = self.fields.get(key) else {
                    continue;
                };
                let dict_value = match value {
                    FieldValue::List(items) if items.is_empty() => continue,
                    other => other.to_json(),
                };
                if !dict_value.is_null() {
                    map.insert(key.to_string(), dict_value);
                }
            }
            if let Some(xsi_type) = self.class.xsi_type() {
                map.insert(XSI_TYPE_KEY.to_string(), Value::String(xsi_type.to_string()));
            }
            Value::Object(map)
        };

        events::emit(events::EVENT_API_POST_TO_DICT, self);
        out
    }

    pub(crate) fn list_dicts(&self) -> Vec<Value> {
        match self.class.list_field() {
            Some(field) => self
                .get_list(field.get_key_name())
                .iter()
                .map(FieldValue::to_json)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Build an entity of `class` from a dictionary.
    ///
    /// `null` gives `None`. A non-object value is handed to the class's
    /// cast; list-shaped entity lists parse from arrays.
    pub fn from_dict(class: &Arc<EntityClass>, value: &Value) -> Result<Option<Entity>, EntityError> {
        if value.is_null() {
            return Ok(None);
        }

        if class.dict_as_list() {
            let list = match value {
                Value::Array(items) => EntityList::from_list(class, items)?,
                other => EntityList::from_list(class, std::slice::from_ref(other))?,
            };
            return Ok(list.map(EntityList::into_entity));
        }

        let Value::Object(map) = value else {
            let raw = FieldValue::from_json(class.name(), value)?;
            return match raw {
                Some(raw) => class.cast(raw).map(Some),
                None => Ok(None),
            };
        };

        events::emit(events::EVENT_API_PRE_FROM_DICT, value);

        let mut entity = Entity::new(class);
        for field in class.fields() {
            let raw = map.get(field.get_key_name());
            let value = if field.has_transformer() {
                transform_dict_value(field, raw)?
            } else {
                match raw {
                    Some(v) => FieldValue::from_json(field.get_key_name(), v)?,
                    None => None,
                }
            };
            entity.set_opt(field.get_key_name(), value)?;
        }

        events::emit(events::EVENT_API_POST_FROM_DICT, &entity);
        Ok(Some(entity))
    }

    /// Serialize [`Entity::to_dict`] output as JSON text.
    pub fn to_json(&self) -> Result<String, EntityError> {
        Ok(serde_json::to_string(&self.to_dict())?)
    }

    /// Parse JSON text and build an entity of `class`.
    pub fn from_json(class: &Arc<EntityClass>, json: &str) -> Result<Option<Entity>, EntityError> {
        let value: Value = serde_json::from_str(json)?;
        Entity::from_dict(class, &value)
    }
}

/// Convert one dictionary value through the field's factory or class.
pub(crate) fn dict_value_via(
    field: &TypedField,
    value: &Value,
    fallback_xsi_type: Option<&str>,
) -> Result<Option<FieldValue>, EntityError> {
    if let Some(factory) = field.get_factory() {
        return factory.from_dict(value, fallback_xsi_type);
    }
    match field.entity_class() {
        Some(class) => Ok(Entity::from_dict(class, value)?.map(FieldValue::entity)),
        None => FieldValue::from_json(field.get_key_name(), value),
    }
}

fn transform_dict_value(
    field: &TypedField,
    raw: Option<&Value>,
) -> Result<Option<FieldValue>, EntityError> {
    let Some(raw) = raw.filter(|v| !v.is_null()) else {
        return Ok(None);
    };

    if !field.is_multiple() {
        return dict_value_via(field, raw, None);
    }

    let items = match raw {
        Value::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    let mut values = Vec::with_capacity(items.len());
    for item in items {
        if let Some(v) = dict_value_via(field, item, None)? {
            values.push(v);
        }
    }
    Ok(Some(FieldValue::List(values)))
}
