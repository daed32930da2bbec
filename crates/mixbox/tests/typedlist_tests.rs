//! Tests for typed lists

use mixbox::fields::FieldType;
use mixbox::*;
use pretty_assertions::assert_eq;

fn mock_class() -> std::sync::Arc<EntityClass> {
    EntityClass::builder("MockType").build().unwrap()
}

#[test]
fn test_append_good_type() {
    let class = mock_class();
    let mut tl = TypedList::new(FieldType::Entity(class.clone()));
    tl.push(Some(Entity::new(&class).into())).unwrap();

    assert_eq!(tl.len(), 1);
    assert!(Entity::istypeof(&class, &tl[0]));
}

#[test]
fn test_append_bad_type() {
    let mut tl = TypedList::new(FieldType::Entity(mock_class()));
    assert!(matches!(
        tl.push(Some(false.into())),
        Err(FieldError::TypeMismatch { .. })
    ));
    assert!(tl.is_empty());
}

#[test]
fn test_insert_and_remove() {
    let mut tl = TypedList::with_items(FieldType::Integer, vec!["1".into(), 3.into()]).unwrap();
    tl.insert(1, Some(2.into())).unwrap();
    tl.insert(100, None).unwrap();

    let values: Vec<i64> = tl.iter().filter_map(FieldValue::as_i64).collect();
    assert_eq!(values, vec![1, 2, 3]);

    assert_eq!(tl.remove(0), Some(FieldValue::Integer(1)));
    assert_eq!(tl.remove(5), None);
    assert!(tl.set(0, "20".into()).unwrap());
    assert_eq!(tl.get(0), Some(&FieldValue::Integer(20)));

    let as_value: FieldValue = tl.into();
    assert_eq!(as_value.as_list().map(<[FieldValue]>::len), Some(2));
}
