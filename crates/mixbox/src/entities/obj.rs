//! Conversion between entities and binding objects

use std::sync::Arc;

use super::{Entity, EntityClass, EntityList};
use crate::binding::{Element, QName};
use crate::collector::NamespaceCollector;
use crate::error::EntityError;
use crate::events;
use crate::fields::{FieldKind, TypedField};
use crate::options::ExportOptions;
use crate::signals;
use crate::value::FieldValue;
use crate::xml::NS_XSI;

impl Entity {
    /// Convert to a binding object.
    ///
    /// When a collector is given, this entity and every nested entity are
    /// recorded in it for namespace finalization.
    pub fn to_obj(&self, mut collector: Option<&mut NamespaceCollector>) -> Element {
        events::emit(events::EVENT_API_PRE_TO_OBJ, self);

        if let Some(c) = collector.as_deref_mut() {
            c.collect(self);
        }

        let namespace = self.class.namespace();
        let mut element = Element::new(QName::new(namespace, self.class.element_name()));
        if let Some(xsi_type) = self.class.xsi_type() {
            element.set_attribute(QName::qualified(NS_XSI, "type"), xsi_type);
        }

        for field in self.class.fields() {
            let Some(value) = self.fields.get(field.get_key_name()) else {
                continue;
            };

            match field.kind() {
                FieldKind::Attribute => {
                    element.set_attribute(QName::local(field.name()), value.to_text());
                }
                FieldKind::Text => element.text = Some(value.to_text()),
                FieldKind::Element => {
                    let items = match value {
                        FieldValue::List(items) => items.as_slice(),
                        single => std::slice::from_ref(single),
                    };
                    for item in items {
                        let name = QName::new(namespace, field.name());
                        match item {
                            FieldValue::Entity(child) => {
                                // Entity lists with no items are dropped
                                if child.class.is_entity_list() && list_is_empty(child) {
                                    continue;
                                }
                                let mut child_obj = child.to_obj(collector.as_deref_mut());
                                child_obj.rename(name);
                                element.children.push(child_obj);
                            }
                            scalar => {
                                element
                                    .children
                                    .push(Element::new(name).with_text(scalar.to_text()));
                            }
                        }
                    }
                }
            }
        }

        events::emit(events::EVENT_API_POST_TO_OBJ, self);
        element
    }

    /// Build an entity of `class` from a binding object.
    ///
    /// Emits the `Entity.created.from_obj` signal with the new entity.
    pub fn from_obj(class: &Arc<EntityClass>, obj: &Element) -> Result<Entity, EntityError> {
        events::emit(events::EVENT_API_PRE_FROM_OBJ, obj);

        let mut entity = Entity::new(class);
        for field in class.fields() {
            let value = match field.kind() {
                FieldKind::Attribute => obj
                    .attribute(&QName::local(field.name()))
                    .map(FieldValue::string),
                FieldKind::Text => obj.text.clone().map(FieldValue::String),
                FieldKind::Element => {
                    let mut values = Vec::new();
                    for child in obj.children_named(field.name()) {
                        values.push(value_from_obj(field, child)?);
                    }
                    if field.is_multiple() {
                        Some(FieldValue::List(values))
                    } else {
                        values.into_iter().next()
                    }
                }
            };
            entity.set_opt(field.get_key_name(), value)?;
        }

        signals::emit(signals::ENTITY_CREATED_FROM_OBJ, &entity);
        events::emit(events::EVENT_API_POST_FROM_OBJ, &entity);
        Ok(entity)
    }

    /// Serialize to an XML document string.
    ///
    /// Namespace prefixes are always resolved through a
    /// [`NamespaceCollector`]; `include_namespaces` controls whether the
    /// `xmlns` and `xsi:schemaLocation` declarations are written.
    pub fn to_xml(&self, options: &ExportOptions) -> Result<String, EntityError> {
        let mut collector = NamespaceCollector::new();
        let obj = self.to_obj(Some(&mut collector));

        collector.finalize(options.namespace_dict.as_ref(), options.schemaloc_dict.as_ref())?;

        let namespacedef = if options.include_namespaces {
            let delim = if options.pretty { "\n\t" } else { " " };
            // The xmlns string already ends with the delimiter
            format!(
                "{}{}",
                collector.get_xmlns_string(delim)?,
                collector.get_schema_location_string(delim)?
            )
        } else {
            String::new()
        };

        let prefixes = collector.binding_namespaces().cloned().unwrap_or_default();
        Ok(obj.to_xml_string(&prefixes, &namespacedef, options.pretty)?)
    }

    /// Convert a dictionary straight to a binding object.
    pub fn object_from_dict(
        class: &Arc<EntityClass>,
        value: &serde_json::Value,
    ) -> Result<Option<Element>, EntityError> {
        Ok(Entity::from_dict(class, value)?.map(|e| e.to_obj(None)))
    }

    /// Convert a binding object straight to a dictionary.
    pub fn dict_from_object(
        class: &Arc<EntityClass>,
        obj: &Element,
    ) -> Result<serde_json::Value, EntityError> {
        Ok(Entity::from_obj(class, obj)?.to_dict())
    }
}

fn list_is_empty(entity: &Entity) -> bool {
    entity
        .class
        .list_field()
        .map_or(true, |f| entity.get_list(f.get_key_name()).is_empty())
}

/// Turn one child element into a field value: through the field's
/// factory, else its entity class, else as raw text for the field to cast.
fn value_from_obj(field: &TypedField, child: &Element) -> Result<FieldValue, EntityError> {
    if let Some(factory) = field.get_factory() {
        return Ok(FieldValue::entity(factory.from_obj(child)?));
    }
    if let Some(class) = field.entity_class() {
        return Ok(FieldValue::entity(Entity::from_obj(class, child)?));
    }
    Ok(FieldValue::String(child.text.clone().unwrap_or_default()))
}

impl EntityList {
    /// Convert a binding object straight to a list of dictionaries.
    pub fn list_from_object(
        class: &Arc<EntityClass>,
        obj: &Element,
    ) -> Result<Vec<serde_json::Value>, EntityError> {
        Ok(EntityList::from_entity(Entity::from_obj(class, obj)?)?.to_list())
    }

    /// Convert a list of dictionaries straight to a binding object.
    pub fn object_from_list(
        class: &Arc<EntityClass>,
        items: &[serde_json::Value],
    ) -> Result<Option<Element>, EntityError> {
        Ok(EntityList::from_list(class, items)?.map(|list| list.to_obj(None)))
    }
}
