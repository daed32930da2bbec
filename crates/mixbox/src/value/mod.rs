//! Value representation for entity field values

mod display;
mod impls;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::entities::Entity;

/// A value stored in an entity field.
///
/// Scalars cover what XML bindings carry as text; `Entity` holds nested API
/// objects and `List` holds the contents of multiple-valued fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    // ═══════════════════════════════════════════════════════════════════
    // Scalars
    // ═══════════════════════════════════════════════════════════════════
    /// Boolean: `true` or `false`
    Bool(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point
    Float(f64),

    /// Unicode string
    String(String),

    /// Calendar date without time
    Date(NaiveDate),

    /// Timestamp with a UTC offset
    DateTime(DateTime<FixedOffset>),

    // ═══════════════════════════════════════════════════════════════════
    // Compound
    // ═══════════════════════════════════════════════════════════════════
    /// Nested entity
    Entity(Box<Entity>),

    /// Items of a multiple field
    List(Vec<FieldValue>),
}
