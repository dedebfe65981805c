use serde_json::{Value, json};
use spogather::error::GatherError;
use spogather::flatten::{flatten_records, unravel};
use spogather::table::Table;

#[test]
fn test_flatten_promotes_subkeys_with_prefix() {
    let records = vec![
        json!({"id": "t1", "album": {"id": "al1", "name": "First"}}),
        json!({"id": "t2", "album": {"id": "al2", "name": "Second"}}),
    ];

    let t = flatten_records(&records, &["album"]).unwrap();

    assert!(t.column_index("album").is_none());
    assert_eq!(
        t.column("album_id").unwrap(),
        vec![&json!("al1"), &json!("al2")]
    );
    assert_eq!(
        t.column("album_name").unwrap(),
        vec![&json!("First"), &json!("Second")]
    );
}

#[test]
fn test_flatten_subkey_set_is_union_across_rows() {
    let records = vec![
        json!({"id": "t1", "meta": {"a": 1}}),
        json!({"id": "t2", "meta": {"b": 2}}),
    ];

    let t = flatten_records(&records, &["meta"]).unwrap();

    // the column set is the union; rows missing a subkey get null there
    assert_eq!(t.column("meta_a").unwrap(), vec![&json!(1), &Value::Null]);
    assert_eq!(t.column("meta_b").unwrap(), vec![&Value::Null, &json!(2)]);
}

#[test]
fn test_flatten_non_mapping_values_become_nulls() {
    let records = vec![
        json!({"id": "t1", "album": {"name": "First"}}),
        json!({"id": "t2", "album": "not a mapping"}),
        json!({"id": "t3"}),
    ];

    let t = flatten_records(&records, &["album"]).unwrap();

    assert_eq!(
        t.column("album_name").unwrap(),
        vec![&json!("First"), &Value::Null, &Value::Null]
    );
}

#[test]
fn test_flatten_is_noop_on_already_flat_column() {
    let records = vec![
        json!({"id": "t1", "name": "one"}),
        json!({"id": "t2", "name": "two"}),
    ];
    let t = Table::from_records(&records);

    // no row holds a mapping in `name`, so there is nothing to promote
    let flattened = unravel(&t, &["name"]).unwrap();
    assert_eq!(flattened, t);

    // and therefore flattening is idempotent on flat rows
    let twice = unravel(&flattened, &["name"]).unwrap();
    assert_eq!(twice, flattened);
}

#[test]
fn test_flatten_does_not_mutate_input() {
    let records = vec![json!({"id": "t1", "album": {"name": "First"}})];
    let t = Table::from_records(&records);
    let before = t.clone();

    let _ = unravel(&t, &["album"]).unwrap();
    assert_eq!(t, before);
}

#[test]
fn test_flatten_fields_compose_sequentially() {
    let records = vec![json!({
        "id": "t1",
        "album": {"name": "First"},
        "external": {"isrc": "X1"}
    })];
    let t = Table::from_records(&records);

    let both = unravel(&t, &["album", "external"]).unwrap();
    let one_by_one = unravel(&unravel(&t, &["album"]).unwrap(), &["external"]).unwrap();
    assert_eq!(both, one_by_one);

    assert_eq!(both.column("album_name").unwrap(), vec![&json!("First")]);
    assert_eq!(both.column("external_isrc").unwrap(), vec![&json!("X1")]);
}

#[test]
fn test_nest_then_flatten_round_trip() {
    // synthetic "nest": tuck the flat columns under one field
    let flat = vec![json!({"id": "r1", "x": 1, "y": 2})];
    let nested = vec![json!({"id": "r1", "point": {"x": 1, "y": 2}})];

    let flattened = flatten_records(&nested, &["point"]).unwrap();
    let reference = Table::from_records(&flat);

    // the round trip reproduces the original column set and values
    assert_eq!(flattened.len(), reference.len());
    assert_eq!(
        flattened.column("point_x").unwrap(),
        reference.column("x").unwrap()
    );
    assert_eq!(
        flattened.column("point_y").unwrap(),
        reference.column("y").unwrap()
    );
    assert_eq!(
        flattened.column("id").unwrap(),
        reference.column("id").unwrap()
    );
}

#[test]
fn test_flatten_missing_column_errors() {
    let t = Table::from_records(&[json!({"id": "t1"})]);
    let err = unravel(&t, &["album"]).unwrap_err();
    assert!(matches!(err, GatherError::MissingColumn { column } if column == "album"));
}
