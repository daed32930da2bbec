//! A list that only accepts values of one field type

use std::ops::Index;

use crate::error::FieldError;
use crate::fields::FieldType;
use crate::value::FieldValue;

const LIST_NAME: &str = "TypedList";

/// A mutable sequence whose items are checked, and cast where possible,
/// against a [`FieldType`] on every insertion.
///
/// # Example
///
/// ```
/// use mixbox::fields::FieldType;
/// use mixbox::typedlist::TypedList;
///
/// let mut ints = TypedList::new(FieldType::Integer);
/// ints.push(Some("42".into())).unwrap();
/// ints.push(None).unwrap();
///
/// assert_eq!(ints.len(), 1);
/// assert_eq!(ints[0].as_i64(), Some(42));
/// assert!(ints.push(Some("forty-two".into())).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TypedList {
    item_type: FieldType,
    ignore_none: bool,
    inner: Vec<FieldValue>,
}

impl TypedList {
    /// Create an empty list of `item_type`. `None` values are skipped.
    pub fn new(item_type: FieldType) -> Self {
        Self {
            item_type,
            ignore_none: true,
            inner: Vec::new(),
        }
    }

    /// Create a list from initial items. A list value is flattened into
    /// its items.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` for an item that doesn't fit `item_type`.
    pub fn with_items<I>(item_type: FieldType, items: I) -> Result<Self, FieldError>
    where
        I: IntoIterator<Item = FieldValue>,
    {
        let mut list = Self::new(item_type);
        for item in items {
            match item {
                FieldValue::List(nested) => {
                    for v in nested {
                        list.push(Some(v))?;
                    }
                }
                other => list.push(Some(other))?,
            }
        }
        Ok(list)
    }

    /// Reject `None` values instead of skipping them (builder pattern).
    pub fn rejecting_none(mut self) -> Self {
        self.ignore_none = false;
        self
    }

    /// The item type
    pub fn item_type(&self) -> &FieldType {
        &self.item_type
    }

    fn clean(&self, value: Option<FieldValue>) -> Result<Option<FieldValue>, FieldError> {
        match value {
            Some(v) => self.item_type.clean(LIST_NAME, v).map(Some),
            None if self.ignore_none => Ok(None),
            None => Err(FieldError::TypeMismatch {
                field: LIST_NAME.to_string(),
                expected: self.item_type.name(),
                got: "None".to_string(),
            }),
        }
    }

    /// Append an item.
    pub fn push(&mut self, value: Option<FieldValue>) -> Result<(), FieldError> {
        if let Some(v) = self.clean(value)? {
            self.inner.push(v);
        }
        Ok(())
    }

    /// Insert an item at `index` (clamped to the length).
    pub fn insert(&mut self, index: usize, value: Option<FieldValue>) -> Result<(), FieldError> {
        if let Some(v) = self.clean(value)? {
            let index = index.min(self.inner.len());
            self.inner.insert(index, v);
        }
        Ok(())
    }

    /// Replace the item at `index`. Returns `false` if out of range.
    pub fn set(&mut self, index: usize, value: FieldValue) -> Result<bool, FieldError> {
        let value = self.item_type.clean(LIST_NAME, value)?;
        match self.inner.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove and return the item at `index`.
    pub fn remove(&mut self, index: usize) -> Option<FieldValue> {
        (index < self.inner.len()).then(|| self.inner.remove(index))
    }

    /// Item at `index`
    pub fn get(&self, index: usize) -> Option<&FieldValue> {
        self.inner.get(index)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over the items
    pub fn iter(&self) -> std::slice::Iter<'_, FieldValue> {
        self.inner.iter()
    }

    /// The items as a slice
    pub fn as_slice(&self) -> &[FieldValue] {
        &self.inner
    }
}

impl Index<usize> for TypedList {
    type Output = FieldValue;

    fn index(&self, index: usize) -> &FieldValue {
        &self.inner[index]
    }
}

impl<'a> IntoIterator for &'a TypedList {
    type Item = &'a FieldValue;
    type IntoIter = std::slice::Iter<'a, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}

impl From<TypedList> for FieldValue {
    fn from(list: TypedList) -> Self {
        FieldValue::List(list.inner)
    }
}
