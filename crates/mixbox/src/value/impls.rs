//! FieldValue implementations: constructors, predicates, extractors, From traits, JSON

use serde_json::Value as JsonValue;

use super::*;
use crate::dates;
use crate::error::EntityError;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl FieldValue {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        FieldValue::String(s.into())
    }

    /// Create an entity value
    pub fn entity(e: Entity) -> Self {
        FieldValue::Entity(Box::new(e))
    }

    /// Create a list value
    pub fn list(items: Vec<FieldValue>) -> Self {
        FieldValue::List(items)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Predicates
    // ═══════════════════════════════════════════════════════════════════

    /// Check if value is a nested entity
    pub fn is_entity(&self) -> bool {
        matches!(self, FieldValue::Entity(_))
    }

    /// Check if value is a list
    pub fn is_list(&self) -> bool {
        matches!(self, FieldValue::List(_))
    }

    /// Check if value is a scalar (neither entity nor list)
    pub fn is_scalar(&self) -> bool {
        !self.is_entity() && !self.is_list()
    }

    /// Name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::Date(_) => "date",
            FieldValue::DateTime(_) => "datetime",
            FieldValue::Entity(_) => "entity",
            FieldValue::List(_) => "list",
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value Extractors
    // ═══════════════════════════════════════════════════════════════════

    /// Extract a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract an integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a float; integers widen
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(n) => Some(*n),
            FieldValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a date
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Extract a datetime
    pub fn as_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            FieldValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Borrow a nested entity
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            FieldValue::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Mutably borrow a nested entity
    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            FieldValue::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow list items
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// The value as element or attribute text in a binding object.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    // ═══════════════════════════════════════════════════════════════════
    // JSON Conversion
    // ═══════════════════════════════════════════════════════════════════

    /// Dictionary form of the value. Entities become their `to_dict()`
    /// output and timestamps become ISO 8601 strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Bool(b) => JsonValue::Bool(*b),
            FieldValue::Integer(n) => JsonValue::from(*n),
            FieldValue::Float(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            FieldValue::String(s) => JsonValue::String(s.clone()),
            FieldValue::Date(d) => JsonValue::String(dates::serialize_date(d)),
            FieldValue::DateTime(dt) => JsonValue::String(dates::serialize_datetime(dt)),
            FieldValue::Entity(e) => e.to_dict(),
            FieldValue::List(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
        }
    }

    /// Build a value from dictionary data for the field keyed `key`.
    ///
    /// `null` gives `None` and nulls inside arrays are dropped. Objects have
    /// no untyped representation and are rejected.
    pub fn from_json(key: &str, value: &JsonValue) -> Result<Option<FieldValue>, EntityError> {
        let converted = match value {
            JsonValue::Null => return Ok(None),
            JsonValue::Bool(b) => FieldValue::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => FieldValue::String(s.clone()),
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(v) = Self::from_json(key, item)? {
                        out.push(v);
                    }
                }
                FieldValue::List(out)
            }
            JsonValue::Object(_) => {
                return Err(EntityError::InvalidDictValue {
                    field: key.to_string(),
                    reason: "objects need an entity-typed field".to_string(),
                })
            }
        };
        Ok(Some(converted))
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Integer(n as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Float(n)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl From<Entity> for FieldValue {
    fn from(e: Entity) -> Self {
        FieldValue::Entity(Box::new(e))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(items: Vec<T>) -> Self {
        FieldValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_drops_null_items() {
        let value = FieldValue::from_json("k", &json!(["a", null, 1])).unwrap();
        assert_eq!(
            value,
            Some(FieldValue::List(vec!["a".into(), FieldValue::Integer(1)]))
        );
    }

    #[test]
    fn test_from_json_rejects_objects() {
        let err = FieldValue::from_json("k", &json!({"x": 1})).unwrap_err();
        assert!(matches!(err, EntityError::InvalidDictValue { .. }));
    }

    #[test]
    fn test_to_json_serializes_dates() {
        let date = NaiveDate::from_ymd_opt(2015, 4, 2).unwrap();
        assert_eq!(FieldValue::Date(date).to_json(), json!("2015-04-02"));
    }
}
