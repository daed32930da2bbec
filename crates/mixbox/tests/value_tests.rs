// Tests for field values
use chrono::NaiveDate;
use mixbox::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn widget() -> Entity {
    let class = EntityClass::builder("Widget")
        .field(TypedField::new("Name"))
        .build()
        .unwrap();
    let mut entity = Entity::new(&class);
    entity.set("Name", "gear").unwrap();
    entity
}

#[test]
fn test_type_names() {
    assert_eq!(FieldValue::from(true).type_name(), "bool");
    assert_eq!(FieldValue::from(1).type_name(), "integer");
    assert_eq!(FieldValue::from(1.5).type_name(), "float");
    assert_eq!(FieldValue::from("x").type_name(), "string");
    assert_eq!(FieldValue::from(widget()).type_name(), "entity");
    assert_eq!(FieldValue::from(vec![1, 2]).type_name(), "list");
}

#[test]
fn test_predicates() {
    assert!(FieldValue::from("x").is_scalar());
    assert!(FieldValue::from(widget()).is_entity());
    assert!(FieldValue::from(vec!["a"]).is_list());
    assert!(!FieldValue::from(vec!["a"]).is_scalar());
}

#[test]
fn test_extractors() {
    assert_eq!(FieldValue::from(7).as_i64(), Some(7));
    assert_eq!(FieldValue::from("7").as_i64(), None);
    assert_eq!(FieldValue::from("abc").as_str(), Some("abc"));
    assert_eq!(FieldValue::from(false).as_bool(), Some(false));
    assert_eq!(
        FieldValue::from(widget())
            .as_entity()
            .and_then(|e| e.get_str("name")),
        Some("gear")
    );
    assert_eq!(FieldValue::from(vec![1, 2]).as_list().map(<[FieldValue]>::len), Some(2));
}

#[test]
fn test_display() {
    let date = NaiveDate::from_ymd_opt(2015, 4, 1).unwrap();
    assert_eq!(FieldValue::from(date).to_text(), "2015-04-01");
    assert_eq!(FieldValue::from(vec![1, 2]).to_string(), "[1, 2]");
    assert_eq!(FieldValue::from(widget()).to_string(), "<Widget>");
    assert_eq!(FieldValue::from(true).to_text(), "true");
}

#[test]
fn test_to_json() {
    assert_eq!(FieldValue::from(vec!["a", "b"]).to_json(), json!(["a", "b"]));
    assert_eq!(FieldValue::from(2.5).to_json(), json!(2.5));
    assert_eq!(FieldValue::from(f64::NAN).to_json(), serde_json::Value::Null);
    assert_eq!(
        FieldValue::from(widget()).to_json(),
        json!({"name": "gear"})
    );
}

#[test]
fn test_from_json() {
    assert_eq!(FieldValue::from_json("k", &json!(null)).unwrap(), None);
    assert_eq!(
        FieldValue::from_json("k", &json!(3)).unwrap(),
        Some(FieldValue::Integer(3))
    );
    assert_eq!(
        FieldValue::from_json("k", &json!(3.25)).unwrap(),
        Some(FieldValue::Float(3.25))
    );
}
