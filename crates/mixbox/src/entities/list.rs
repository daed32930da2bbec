//! Entity lists: entities that behave like a sequence of entities

use std::ops::Deref;
use std::sync::Arc;

use serde_json::Value;

use super::dict::dict_value_via;
use super::{Entity, EntityClass};
use crate::error::{EntityError, FieldError};
use crate::fields::TypedField;
use crate::value::FieldValue;

/// An entity whose class was built with
/// [`entity_list`](super::EntityClassBuilder::entity_list).
///
/// Sequence operations act on the class's single multiple, entity-typed
/// field. Other fields remain reachable through the wrapped [`Entity`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntityList {
    entity: Entity,
}

impl EntityList {
    /// Create an empty list.
    ///
    /// # Errors
    ///
    /// `NotAnEntityList` if `class` is not an entity-list class.
    pub fn new(class: &Arc<EntityClass>) -> Result<Self, EntityError> {
        Self::from_entity(Entity::new(class))
    }

    /// Create a list holding `items`.
    pub fn with_items<I>(class: &Arc<EntityClass>, items: I) -> Result<Self, EntityError>
    where
        I: IntoIterator<Item = Entity>,
    {
        let mut list = Self::new(class)?;
        for item in items {
            list.push(item)?;
        }
        Ok(list)
    }

    /// Wrap an existing entity of an entity-list class.
    pub fn from_entity(entity: Entity) -> Result<Self, EntityError> {
        if !entity.class.is_entity_list() {
            return Err(EntityError::NotAnEntityList(entity.class.name().to_string()));
        }
        Ok(Self { entity })
    }

    /// The wrapped entity
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Mutable access to the wrapped entity, for its non-list fields
    pub fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// Unwrap into the underlying entity
    pub fn into_entity(self) -> Entity {
        self.entity
    }

    fn list_field(&self) -> Option<&TypedField> {
        self.entity.class.list_field()
    }

    fn items(&self) -> &[FieldValue] {
        match self.list_field() {
            Some(field) => self.entity.get_list(field.get_key_name()),
            None => &[],
        }
    }

    fn with_items_mut<R>(&mut self, f: impl FnOnce(&mut Vec<FieldValue>) -> R) -> R {
        let key = self
            .list_field()
            .map(|field| field.get_key_name().to_string())
            .unwrap_or_default();
        let slot = self
            .entity
            .fields
            .entry(key)
            .or_insert_with(|| FieldValue::List(Vec::new()));

        if let FieldValue::List(items) = slot {
            return f(items);
        }
        let mut items = vec![std::mem::replace(slot, FieldValue::List(Vec::new()))];
        let out = f(&mut items);
        *slot = FieldValue::List(items);
        out
    }

    fn clean(&self, value: FieldValue) -> Result<FieldValue, FieldError> {
        match self.list_field() {
            Some(field) => field.clean(value),
            None => Ok(value),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Sequence Operations
    // ═══════════════════════════════════════════════════════════════════

    /// Number of items
    pub fn len(&self) -> usize {
        self.items().len()
    }

    /// Whether there are no items
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Item at `index`
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.items().get(index).and_then(FieldValue::as_entity)
    }

    /// Iterate over the items
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.items().iter().filter_map(FieldValue::as_entity)
    }

    /// Append an item, casting it to the item class when needed.
    pub fn push(&mut self, value: impl Into<FieldValue>) -> Result<(), FieldError> {
        let value = self.clean(value.into())?;
        self.with_items_mut(|items| items.push(value));
        Ok(())
    }

    /// Insert an item at `index` (clamped to the length). `None` is ignored.
    pub fn insert(&mut self, index: usize, value: Option<FieldValue>) -> Result<(), FieldError> {
        let Some(value) = value else {
            return Ok(());
        };
        let value = self.clean(value)?;
        self.with_items_mut(|items| {
            let index = index.min(items.len());
            items.insert(index, value);
        });
        Ok(())
    }

    /// Remove and return the item at `index`.
    pub fn remove(&mut self, index: usize) -> Option<Entity> {
        let removed = self.with_items_mut(|items| (index < items.len()).then(|| items.remove(index)))?;
        match removed {
            FieldValue::Entity(e) => Some(*e),
            _ => None,
        }
    }

    /// Remove the first item equal to `item`. Returns whether one was found.
    pub fn remove_item(&mut self, item: &Entity) -> bool {
        self.with_items_mut(|items| {
            match items.iter().position(|v| v.as_entity() == Some(item)) {
                Some(index) => {
                    items.remove(index);
                    true
                }
                None => false,
            }
        })
    }

    /// Whether an item equal to `item` is present
    pub fn contains(&self, item: &Entity) -> bool {
        self.iter().any(|e| e == item)
    }

    /// Whether the list has items or any other field holds a value.
    pub fn is_truthy(&self) -> bool {
        !self.is_empty()
            || self.entity.fields.values().any(|v| match v {
                FieldValue::List(items) => !items.is_empty(),
                _ => true,
            })
    }

    // ═══════════════════════════════════════════════════════════════════
    // Dictionary Conversion
    // ═══════════════════════════════════════════════════════════════════

    /// The items as dictionaries
    pub fn to_list(&self) -> Vec<Value> {
        self.entity.list_dicts()
    }

    /// Build a list of `class` from item dictionaries. An empty slice gives
    /// `None`.
    ///
    /// Items go through the list field's factory (with the item class's
    /// `xsi:type` as fallback key) or its item class.
    pub fn from_list(class: &Arc<EntityClass>, items: &[Value]) -> Result<Option<Self>, EntityError> {
        if items.is_empty() {
            return Ok(None);
        }

        let mut list = Self::new(class)?;
        let Some(field) = list.list_field().cloned() else {
            return Err(EntityError::NotAnEntityList(class.name().to_string()));
        };
        let fallback = field
            .entity_class()
            .and_then(|c| c.xsi_type())
            .map(str::to_string);

        for item in items {
            if let Some(value) = dict_value_via(&field, item, fallback.as_deref())? {
                list.push(value)?;
            }
        }
        Ok(Some(list))
    }
}

impl Deref for EntityList {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        &self.entity
    }
}

impl From<EntityList> for FieldValue {
    fn from(list: EntityList) -> Self {
        FieldValue::entity(list.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> (Arc<EntityClass>, Arc<EntityClass>) {
        let item = EntityClass::builder("Item")
            .field(TypedField::new("Name").text())
            .build()
            .unwrap();
        let list = EntityClass::builder("ItemList")
            .field(TypedField::entity("Item", &item).multiple())
            .entity_list()
            .build()
            .unwrap();
        (item, list)
    }

    #[test]
    fn test_insert_ignores_none_and_clamps() {
        let (_, list_class) = classes();
        let mut list = EntityList::new(&list_class).unwrap();
        list.insert(0, None).unwrap();
        assert!(list.is_empty());

        list.insert(10, Some("a".into())).unwrap();
        list.insert(0, Some("b".into())).unwrap();
        let names: Vec<&str> = list.iter().map(|e| e.get_str("name").unwrap()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_remove_out_of_range() {
        let (_, list_class) = classes();
        let mut list = EntityList::new(&list_class).unwrap();
        assert!(list.remove(0).is_none());
    }

    #[test]
    fn test_not_an_entity_list() {
        let (item, _) = classes();
        assert!(matches!(
            EntityList::new(&item),
            Err(EntityError::NotAnEntityList(_))
        ));
    }
}
