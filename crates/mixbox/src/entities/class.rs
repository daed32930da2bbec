//! Entity class definitions

use std::fmt;
use std::sync::Arc;

use super::Entity;
use crate::error::EntityError;
use crate::fields::{FieldKind, FieldType, TypedField};
use crate::value::FieldValue;

/// Custom cast used to build an entity from a non-entity value.
pub type CastFn = Arc<dyn Fn(&mut Entity, FieldValue) -> Result<(), EntityError> + Send + Sync>;

/// Describes an entity type: its fields, XML naming and namespace data.
///
/// Classes form single-inheritance chains. A child sees its parent's fields
/// first, and a field with the same key replaces the inherited one.
/// Namespace and `xsi:type` data not set on a class is inherited.
pub struct EntityClass {
    name: String,
    parent: Option<Arc<EntityClass>>,
    namespace: Option<String>,
    xsi_type: Option<String>,
    xsi_ns: Option<String>,
    element_name: Option<String>,
    fields: Vec<TypedField>,
    try_cast: bool,
    cast: Option<CastFn>,
    list_field: Option<usize>,
}

impl EntityClass {
    /// Start defining a class.
    pub fn builder(name: impl Into<String>) -> EntityClassBuilder {
        EntityClassBuilder::new(name)
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent class, if any
    pub fn parent(&self) -> Option<&Arc<EntityClass>> {
        self.parent.as_ref()
    }

    /// The class followed by its ancestors.
    pub fn ancestors(&self) -> impl Iterator<Item = &EntityClass> {
        std::iter::successors(Some(self), |c| c.parent.as_deref())
    }

    /// Namespace URI of the class's binding element
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `xsi:type` value (`prefix:TypeName`) written on binding elements
    pub fn xsi_type(&self) -> Option<&str> {
        self.xsi_type.as_deref()
    }

    /// Namespace alias for the class's namespace
    pub fn xsi_ns(&self) -> Option<&str> {
        self.xsi_ns.as_deref()
    }

    /// Local name of the root element when the entity is exported on its own
    pub fn element_name(&self) -> &str {
        self.element_name.as_deref().unwrap_or(&self.name)
    }

    /// All fields, inherited first
    pub fn fields(&self) -> &[TypedField] {
        &self.fields
    }

    /// Look up a field by dictionary key, then by binding name.
    pub fn field(&self, key: &str) -> Option<&TypedField> {
        self.fields
            .iter()
            .find(|f| f.get_key_name() == key)
            .or_else(|| self.fields.iter().find(|f| f.name() == key))
    }

    /// Whether instances are entity lists.
    pub fn is_entity_list(&self) -> bool {
        self.list_field.is_some()
    }

    /// The multiple field backing an entity list.
    pub fn list_field(&self) -> Option<&TypedField> {
        self.list_field.and_then(|i| self.fields.get(i))
    }

    /// Whether dictionaries of this class are plain lists: entity lists
    /// whose only field is the list itself.
    pub fn dict_as_list(&self) -> bool {
        self.is_entity_list() && self.fields.len() == 1
    }

    /// Whether `name` is this class or one of its ancestors.
    pub fn is_a(&self, name: &str) -> bool {
        self.ancestors().any(|c| c.name == name)
    }

    /// Whether `entity` is an instance of this class or a subclass.
    pub fn istypeof(&self, entity: &Entity) -> bool {
        entity.class().is_a(&self.name)
    }

    /// Build an instance from a non-entity value.
    ///
    /// A custom cast takes precedence; otherwise the value is assigned to
    /// the class's text field.
    ///
    /// # Errors
    ///
    /// `Cast` when the class does not cast or has nowhere to put the value,
    /// or any error raised while assigning it.
    pub fn cast(self: &Arc<Self>, value: FieldValue) -> Result<Entity, EntityError> {
        let cast_error = |value: &FieldValue| EntityError::Cast {
            class: self.name.clone(),
            got: value.type_name().to_string(),
        };

        if !self.try_cast {
            return Err(cast_error(&value));
        }

        let mut entity = Entity::new(self);
        if let Some(cast) = &self.cast {
            cast(&mut entity, value)?;
            return Ok(entity);
        }

        match self.fields.iter().find(|f| f.kind() == FieldKind::Text) {
            Some(field) => {
                let key = field.get_key_name().to_string();
                entity.set(&key, value)?;
                Ok(entity)
            }
            None => Err(cast_error(&value)),
        }
    }
}

impl fmt::Debug for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("namespace", &self.namespace)
            .field("xsi_type", &self.xsi_type)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Builder for [`EntityClass`].
///
/// # Example
///
/// ```
/// use mixbox::entities::EntityClass;
/// use mixbox::fields::TypedField;
///
/// let class = EntityClass::builder("Indicator")
///     .namespace("http://stix.mitre.org/Indicator-2")
///     .xsi_type("indicator:IndicatorType")
///     .field(TypedField::new("Title"))
///     .build()
///     .unwrap();
///
/// assert_eq!(class.fields().len(), 1);
/// assert_eq!(class.element_name(), "Indicator");
/// ```
pub struct EntityClassBuilder {
    name: String,
    parent: Option<Arc<EntityClass>>,
    namespace: Option<String>,
    xsi_type: Option<String>,
    xsi_ns: Option<String>,
    element_name: Option<String>,
    fields: Vec<TypedField>,
    try_cast: Option<bool>,
    cast: Option<CastFn>,
    entity_list: bool,
}

impl EntityClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            namespace: None,
            xsi_type: None,
            xsi_ns: None,
            element_name: None,
            fields: Vec::new(),
            try_cast: None,
            cast: None,
            entity_list: false,
        }
    }

    /// Inherit from `parent`.
    pub fn extends(mut self, parent: &Arc<EntityClass>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Namespace URI of the binding element.
    pub fn namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespace = Some(uri.into());
        self
    }

    /// `xsi:type` value, `prefix:TypeName`.
    pub fn xsi_type(mut self, xsi_type: impl Into<String>) -> Self {
        self.xsi_type = Some(xsi_type.into());
        self
    }

    /// Namespace alias overriding the `xsi:type` prefix.
    pub fn xsi_ns(mut self, alias: impl Into<String>) -> Self {
        self.xsi_ns = Some(alias.into());
        self
    }

    /// Root element local name (defaults to the class name).
    pub fn element_name(mut self, name: impl Into<String>) -> Self {
        self.element_name = Some(name.into());
        self
    }

    /// Add a field.
    pub fn field(mut self, field: TypedField) -> Self {
        self.fields.push(field);
        self
    }

    /// Never cast non-entity values into this class.
    pub fn no_cast(mut self) -> Self {
        self.try_cast = Some(false);
        self
    }

    /// Cast non-entity values with `cast`.
    pub fn cast_with<F>(mut self, cast: F) -> Self
    where
        F: Fn(&mut Entity, FieldValue) -> Result<(), EntityError> + Send + Sync + 'static,
    {
        self.cast = Some(Arc::new(cast));
        self.try_cast = Some(true);
        self
    }

    /// Make instances behave as lists over the class's single multiple,
    /// entity-typed field.
    pub fn entity_list(mut self) -> Self {
        self.entity_list = true;
        self
    }

    /// Finish the class.
    ///
    /// # Errors
    ///
    /// `InvalidEntityList` when an entity list does not have exactly one
    /// multiple field, or that field is not entity-typed.
    pub fn build(self) -> Result<Arc<EntityClass>, EntityError> {
        let parent = self.parent;
        let mut fields: Vec<TypedField> = parent
            .as_ref()
            .map(|p| p.fields.clone())
            .unwrap_or_default();

        for field in self.fields {
            match fields
                .iter_mut()
                .find(|f| f.get_key_name() == field.get_key_name())
            {
                Some(slot) => *slot = field,
                None => fields.push(field),
            }
        }

        let inherited = |own: Option<String>, get: fn(&EntityClass) -> Option<&str>| {
            own.or_else(|| parent.as_deref().and_then(get).map(str::to_string))
        };
        let namespace = inherited(self.namespace, EntityClass::namespace);
        let xsi_type = inherited(self.xsi_type, EntityClass::xsi_type);
        let xsi_ns = inherited(self.xsi_ns, EntityClass::xsi_ns);

        let is_list = self.entity_list || parent.as_ref().is_some_and(|p| p.is_entity_list());
        let list_field = if is_list {
            let multiples: Vec<usize> = fields
                .iter()
                .enumerate()
                .filter(|(_, f)| f.is_multiple())
                .map(|(i, _)| i)
                .collect();
            let invalid = |reason: &str| EntityError::InvalidEntityList {
                class: self.name.clone(),
                reason: reason.to_string(),
            };
            match multiples.as_slice() {
                [index] if matches!(fields[*index].field_type(), Some(FieldType::Entity(_))) => {
                    Some(*index)
                }
                [_] => return Err(invalid("the multiple field must hold entities")),
                _ => return Err(invalid("exactly one multiple field is required")),
            }
        } else {
            None
        };

        let try_cast = self
            .try_cast
            .or_else(|| parent.as_ref().map(|p| p.try_cast))
            .unwrap_or(!is_list);

        let cast = self
            .cast
            .or_else(|| parent.as_ref().and_then(|p| p.cast.clone()));

        tracing::debug!(class = %self.name, fields = fields.len(), "built entity class");

        Ok(Arc::new(EntityClass {
            name: self.name,
            parent,
            namespace,
            xsi_type,
            xsi_ns,
            element_name: self.element_name,
            fields,
            try_cast,
            cast,
            list_field,
        }))
    }
}
