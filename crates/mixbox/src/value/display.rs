//! Display implementation for FieldValue

use std::fmt;

use super::*;
use crate::dates;

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Float(n) => write!(f, "{}", n),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Date(d) => write!(f, "{}", dates::serialize_date(d)),
            FieldValue::DateTime(dt) => write!(f, "{}", dates::serialize_datetime(dt)),
            FieldValue::Entity(e) => write!(f, "<{}>", e.class().name()),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
