//! Entity field descriptors (typed fields) and field helpers

use std::fmt;
use std::sync::Arc;

use crate::dates;
use crate::entities::{Entity, EntityClass, EntityFactory};
use crate::error::{EntityError, FieldError};
use crate::value::FieldValue;
use crate::xml;

/// Validation hook run before a value is stored. Returning `Err` vetoes
/// the assignment.
pub type PresetHook = Arc<dyn Fn(&Entity, Option<&FieldValue>) -> Result<(), String> + Send + Sync>;

/// Hook run after a value is stored; may adjust other fields.
pub type PostsetHook = Arc<dyn Fn(&mut Entity, Option<&FieldValue>) + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════
// Field Types
// ═══════════════════════════════════════════════════════════════════

/// Required type for values assigned to a field.
#[derive(Clone)]
pub enum FieldType {
    /// Unicode string
    String,
    /// 64-bit integer
    Integer,
    /// 64-bit float
    Float,
    /// XML boolean
    Boolean,
    /// Calendar date
    Date,
    /// Timestamp with offset
    DateTime,
    /// Instance of an entity class (or one of its subclasses)
    Entity(Arc<EntityClass>),
}

impl FieldType {
    /// Type name used in error messages.
    pub fn name(&self) -> String {
        match self {
            FieldType::String => "string".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Boolean => "bool".to_string(),
            FieldType::Date => "date".to_string(),
            FieldType::DateTime => "datetime".to_string(),
            FieldType::Entity(class) => class.name().to_string(),
        }
    }

    /// Whether `value` already is of this type.
    pub fn istypeof(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldType::String, FieldValue::String(_))
            | (FieldType::Integer, FieldValue::Integer(_))
            | (FieldType::Float, FieldValue::Float(_))
            | (FieldType::Boolean, FieldValue::Bool(_))
            | (FieldType::Date, FieldValue::Date(_))
            | (FieldType::DateTime, FieldValue::DateTime(_)) => true,
            (FieldType::Entity(class), FieldValue::Entity(entity)) => class.istypeof(entity),
            _ => false,
        }
    }

    /// Validate `value`, casting it when it is not of this type.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` naming `field` when no cast applies. Entity casts
    /// surface the field errors of the class's cast behaviour.
    pub fn clean(&self, field: &str, value: FieldValue) -> Result<FieldValue, FieldError> {
        if self.istypeof(&value) {
            return Ok(value);
        }

        let mismatch = |got: &FieldValue| FieldError::TypeMismatch {
            field: field.to_string(),
            expected: self.name(),
            got: got.type_name().to_string(),
        };

        if let FieldType::Entity(class) = self {
            let got = value.type_name();
            return match class.cast(value) {
                Ok(entity) => Ok(FieldValue::entity(entity)),
                Err(EntityError::Field(e)) => Err(e),
                Err(_) => Err(FieldError::TypeMismatch {
                    field: field.to_string(),
                    expected: self.name(),
                    got: got.to_string(),
                }),
            };
        }

        let cast = match (self, &value) {
            (
                FieldType::String,
                FieldValue::Bool(_)
                | FieldValue::Integer(_)
                | FieldValue::Float(_)
                | FieldValue::Date(_)
                | FieldValue::DateTime(_),
            ) => Some(FieldValue::String(value.to_text())),
            (FieldType::Integer, FieldValue::String(s)) => {
                s.trim().parse().ok().map(FieldValue::Integer)
            }
            (FieldType::Float, FieldValue::Integer(n)) => Some(FieldValue::Float(*n as f64)),
            (FieldType::Float, FieldValue::String(s)) => s.trim().parse().ok().map(FieldValue::Float),
            (FieldType::Boolean, FieldValue::String(s)) => xml::parse_bool(s).map(FieldValue::Bool),
            (FieldType::Boolean, FieldValue::Integer(0)) => Some(FieldValue::Bool(false)),
            (FieldType::Boolean, FieldValue::Integer(1)) => Some(FieldValue::Bool(true)),
            (FieldType::Date, FieldValue::DateTime(dt)) => Some(FieldValue::Date(dt.date_naive())),
            (FieldType::Date, FieldValue::String(s)) => {
                dates::parse_date(Some(s)).map(FieldValue::Date)
            }
            (FieldType::DateTime, FieldValue::Date(d)) => d
                .and_hms_opt(0, 0, 0)
                .map(|naive| FieldValue::DateTime(naive.and_utc().fixed_offset())),
            (FieldType::DateTime, FieldValue::String(s)) => {
                dates::parse_datetime(Some(s)).map(FieldValue::DateTime)
            }
            _ => None,
        };

        cast.ok_or_else(|| mismatch(&value))
    }
}

impl fmt::Debug for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Entity(class) => write!(f, "Entity({})", class.name()),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Where a field lives in the binding object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    /// Child element named after the field
    #[default]
    Element,

    /// Unqualified attribute named after the field
    Attribute,

    /// Text content of the element itself
    Text,
}

// ═══════════════════════════════════════════════════════════════════
// TypedField
// ═══════════════════════════════════════════════════════════════════

/// A field of an entity class.
///
/// # Example
///
/// ```
/// use mixbox::fields::{FieldType, TypedField};
///
/// let field = TypedField::new("Some_Field").of_type(FieldType::String).multiple();
/// assert_eq!(field.name(), "Some_Field");
/// assert_eq!(field.get_key_name(), "some_field");
/// assert!(field.is_multiple());
/// ```
#[derive(Clone)]
pub struct TypedField {
    name: String,
    key_name: String,
    field_type: Option<FieldType>,
    comparable: bool,
    multiple: bool,
    kind: FieldKind,
    factory: Option<Arc<dyn EntityFactory>>,
    preset_hook: Option<PresetHook>,
    postset_hook: Option<PostsetHook>,
}

impl TypedField {
    /// Create an untyped, single-valued, comparable element field.
    ///
    /// `name` is the name in the binding object; the dictionary key
    /// defaults to its lowercase form.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key_name: name.to_lowercase(),
            name,
            field_type: None,
            comparable: true,
            multiple: false,
            kind: FieldKind::Element,
            factory: None,
            preset_hook: None,
            postset_hook: None,
        }
    }

    /// Create a field holding instances of `class`.
    pub fn entity(name: impl Into<String>, class: &Arc<EntityClass>) -> Self {
        Self::new(name).of_type(FieldType::Entity(class.clone()))
    }

    /// Set the required value type.
    pub fn of_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    /// Hold a list of values.
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Override the dictionary key.
    pub fn key_name(mut self, key: impl Into<String>) -> Self {
        self.key_name = key.into();
        self
    }

    /// Ignore this field in entity equality.
    pub fn not_comparable(mut self) -> Self {
        self.comparable = false;
        self
    }

    /// Map to an attribute instead of a child element.
    pub fn attribute(mut self) -> Self {
        self.kind = FieldKind::Attribute;
        self
    }

    /// Map to the element's own text content.
    pub fn text(mut self) -> Self {
        self.kind = FieldKind::Text;
        self
    }

    /// Resolve nested entities through `factory` when parsing.
    pub fn factory(mut self, factory: Arc<dyn EntityFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Validate values before they are stored.
    pub fn preset_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Entity, Option<&FieldValue>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.preset_hook = Some(Arc::new(hook));
        self
    }

    /// React to values after they are stored.
    pub fn postset_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Entity, Option<&FieldValue>) + Send + Sync + 'static,
    {
        self.postset_hook = Some(Arc::new(hook));
        self
    }

    // ═══════════════════════════════════════════════════════════════════
    // Accessors
    // ═══════════════════════════════════════════════════════════════════

    /// Name in the binding object
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key in the dictionary representation
    pub fn get_key_name(&self) -> &str {
        &self.key_name
    }

    /// Required value type, if any
    pub fn field_type(&self) -> Option<&FieldType> {
        self.field_type.as_ref()
    }

    /// Whether the field takes part in equality
    pub fn is_comparable(&self) -> bool {
        self.comparable
    }

    /// Whether the field holds a list
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Binding object placement
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Factory used to resolve nested entities
    pub fn get_factory(&self) -> Option<&Arc<dyn EntityFactory>> {
        self.factory.as_ref()
    }

    /// The entity class of values, for entity-typed fields.
    pub fn entity_class(&self) -> Option<&Arc<EntityClass>> {
        match &self.field_type {
            Some(FieldType::Entity(class)) => Some(class),
            _ => None,
        }
    }

    /// Whether nested values go through an entity conversion.
    pub fn has_transformer(&self) -> bool {
        self.factory.is_some() || self.entity_class().is_some()
    }

    pub(crate) fn preset(&self) -> Option<&PresetHook> {
        self.preset_hook.as_ref()
    }

    pub(crate) fn postset(&self) -> Option<&PostsetHook> {
        self.postset_hook.as_ref()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value Handling
    // ═══════════════════════════════════════════════════════════════════

    /// Validate and clean one candidate value.
    pub fn clean(&self, value: FieldValue) -> Result<FieldValue, FieldError> {
        match &self.field_type {
            None => Ok(value),
            Some(field_type) => field_type.clean(&self.name, value),
        }
    }

    /// Turn an assigned value into what gets stored.
    ///
    /// Multiple fields always store a list: `None` becomes an empty list,
    /// a single value a one-item list, and every item is cleaned.
    pub fn prepare(&self, value: Option<FieldValue>) -> Result<Option<FieldValue>, FieldError> {
        if !self.multiple {
            return value.map(|v| self.clean(v)).transpose();
        }

        let items = match value {
            None => Vec::new(),
            Some(FieldValue::List(items)) => items
                .into_iter()
                .map(|v| self.clean(v))
                .collect::<Result<Vec<_>, _>>()?,
            Some(v) => vec![self.clean(v)?],
        };
        Ok(Some(FieldValue::List(items)))
    }
}

impl fmt::Debug for TypedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedField")
            .field("name", &self.name)
            .field("key_name", &self.key_name)
            .field("field_type", &self.field_type)
            .field("multiple", &self.multiple)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_name)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Field Helpers
// ═══════════════════════════════════════════════════════════════════

/// Criteria for [`find`]. Unset criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct FieldQuery {
    /// Binding name to match
    pub name: Option<String>,
    /// Dictionary key to match
    pub key_name: Option<String>,
    /// Multiplicity to match
    pub multiple: Option<bool>,
}

impl FieldQuery {
    /// Match everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match on binding name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match on dictionary key.
    pub fn key_name(mut self, key: impl Into<String>) -> Self {
        self.key_name = Some(key.into());
        self
    }

    /// Match on multiplicity.
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = Some(multiple);
        self
    }

    fn matches(&self, field: &TypedField) -> bool {
        self.name.as_deref().map_or(true, |n| n == field.name)
            && self.key_name.as_deref().map_or(true, |k| k == field.key_name)
            && self.multiple.map_or(true, |m| m == field.multiple)
    }
}

/// The fields of `class`, inherited fields first.
pub fn iterfields(class: &EntityClass) -> impl Iterator<Item = &TypedField> {
    class.fields().iter()
}

/// The fields of `class` matching `query`.
pub fn find<'a>(class: &'a EntityClass, query: &FieldQuery) -> Vec<&'a TypedField> {
    iterfields(class).filter(|f| query.matches(f)).collect()
}

/// Reset the fields of `entity` selected by `filter` as if `None` had been
/// assigned (multiple fields become empty lists).
pub fn unset<F>(entity: &mut Entity, filter: F) -> Result<(), FieldError>
where
    F: Fn(&TypedField) -> bool,
{
    let class = entity.class().clone();
    for field in iterfields(&class).filter(|f| filter(f)) {
        entity.set_opt(field.get_key_name(), None)?;
    }
    Ok(())
}

/// Reset every field of `entity`.
pub fn unset_all(entity: &mut Entity) -> Result<(), FieldError> {
    unset(entity, |_| true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_defaults_to_lowercase() {
        assert_eq!(TypedField::new("From").get_key_name(), "from");
        assert_eq!(TypedField::new("X").key_name("custom").get_key_name(), "custom");
    }

    #[test]
    fn test_prepare_multiple() {
        let field = TypedField::new("Items").multiple();
        assert_eq!(field.prepare(None).unwrap(), Some(FieldValue::List(vec![])));
        assert_eq!(
            field.prepare(Some("a".into())).unwrap(),
            Some(FieldValue::List(vec!["a".into()]))
        );
    }

    #[test]
    fn test_string_casts() {
        let field = TypedField::new("Count").of_type(FieldType::Integer);
        assert_eq!(field.clean("42".into()).unwrap(), FieldValue::Integer(42));

        let err = field.clean("forty-two".into()).unwrap_err();
        assert_eq!(err.to_string(), "Count must be a integer, not a string");

        let flag = TypedField::new("Flag").of_type(FieldType::Boolean);
        assert_eq!(flag.clean("1".into()).unwrap(), FieldValue::Bool(true));
    }
}
