use std::fs;
use std::path::PathBuf;

use chisel_jsonq::{parse, query, query_str, Error, JsonValue, Selection};

const USERS: &str = r#"{"data":{"users":[{"name":"Alice"},{"name":"Bob"}]}}"#;

fn fixture(name: &str) -> JsonValue {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures/json/valid")
        .join(name);
    parse(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn should_select_array_elements_by_index() {
    let root = parse(USERS).unwrap();
    assert_eq!(
        query(&root, "/data/users[0]").unwrap().to_string(),
        r#"{"name":"Alice"}"#
    );
}

#[test]
fn should_filter_arrays_by_attribute() {
    let root = parse(USERS).unwrap();
    let selection = query(&root, "/data/users[@name='Alice']").unwrap();
    assert_eq!(selection.to_string(), r#"[{"name":"Alice"}]"#);
    assert_eq!(
        selection.to_value(),
        parse(r#"[{"name":"Alice"}]"#).unwrap()
    );
}

#[test]
fn should_filter_arrays_numerically() {
    let root = parse(r#"{"data":{"products":[{"price":500},{"price":1500}]}}"#).unwrap();
    assert_eq!(
        query(&root, "/data/products[price>1000]").unwrap().to_string(),
        r#"[{"price":1500}]"#
    );
}

#[test]
fn wildcards_should_select_the_whole_container() {
    let root = parse(r#"{"settings":{"notifications":{"email":true,"sms":false}}}"#).unwrap();
    assert_eq!(
        query(&root, "/settings/notifications/*").unwrap().to_string(),
        r#"{"email":true,"sms":false}"#
    );
}

#[test]
fn missing_keys_should_be_reported() {
    let root = parse(USERS).unwrap();
    assert_eq!(
        query(&root, "/missing/key"),
        Err(Error::KeyNotFound {
            key: "missing".to_string()
        })
    );
}

#[test]
fn equality_should_compare_textual_representations() {
    let root = fixture("users.json");
    let cheap = query(&root, "/data/products[price=500]").unwrap();
    assert_eq!(cheap.as_nodes().map(|n| n.len()), Some(1));
    let none = query(&root, "/data/products[price=500.0]").unwrap();
    assert_eq!(none.as_nodes().map(|n| n.len()), Some(0));
}

#[test]
fn should_chain_filters_with_further_segments() {
    let root = fixture("users.json");
    assert_eq!(
        query(&root, "/data/users[age>=30][1]/email")
            .unwrap()
            .as_node()
            .and_then(|n| n.as_str()),
        Some("carol@example.com")
    );
    assert_eq!(
        query(&root, "/data/users[0]/roles[!='admin']").unwrap().to_string(),
        r#"["dev"]"#
    );
}

#[test]
fn should_read_attributes() {
    let root = fixture("users.json");
    assert_eq!(
        query(&root, "/settings/@theme").unwrap(),
        Selection::Node(&JsonValue::from("dark"))
    );
}

#[test]
fn filters_on_objects_should_yield_the_object_or_null() {
    let root = fixture("users.json");
    assert_eq!(
        query(&root, "/settings[@theme='dark']/theme").unwrap().to_string(),
        "\"dark\""
    );
    assert_eq!(
        query_str(r#"{"settings":{"theme":"dark"}}"#, "/settings[@theme='light']"),
        Ok(JsonValue::Null)
    );
}

#[test]
fn should_report_malformed_paths() {
    let root = fixture("users.json");
    for bad in ["/data/users[@name]", "/data/users[0", "/data/users]", "/@"] {
        assert!(
            matches!(query(&root, bad), Err(Error::InvalidPath { .. })),
            "expected '{}' to be rejected",
            bad
        );
    }
}

#[test]
fn should_report_out_of_range_indexes() {
    let root = fixture("users.json");
    assert_eq!(
        query(&root, "/data/users[3]"),
        Err(Error::IndexOutOfRange {
            index: 3,
            length: 3
        })
    );
}

#[test]
fn should_report_type_mismatches() {
    let root = fixture("users.json");
    assert!(matches!(
        query(&root, "/settings/theme/colour"),
        Err(Error::TypeMismatch { found: "string", .. })
    ));
}

#[test]
fn query_str_should_surface_parse_errors() {
    assert!(query_str("{\"a\": }", "/a").unwrap_err().is_parse_error());
}

#[test]
fn keys_should_match_whitespace_exactly() {
    let root = parse(r#"{" a": 1, "b ": {"c": 2}}"#).unwrap();
    assert_eq!(query(&root, "/ a").unwrap().to_value(), JsonValue::from(1));
    assert_eq!(query(&root, "/b /c").unwrap().to_value(), JsonValue::from(2));
    assert_eq!(
        query(&root, "/a"),
        Err(Error::KeyNotFound {
            key: "a".to_string()
        })
    );
}

#[test]
fn select_should_project_wildcards_over_array_items() {
    let root = parse(USERS).unwrap();
    assert_eq!(
        root.select("/data/users/*/name"),
        parse(r#"["Alice","Bob"]"#)
    );
    assert_eq!(
        root.select("/data/users/1/name"),
        Ok(JsonValue::from("Bob"))
    );
}

#[test]
fn select_should_skip_items_without_the_rest_of_the_path() {
    let root = fixture("users.json");
    assert_eq!(
        root.select("/data/users/*/roles/0"),
        parse(r#"["admin","dev"]"#)
    );
    let mixed = parse(r#"[{"id": 1}, "text", {"id": 2}, {"name": "x"}]"#).unwrap();
    assert_eq!(mixed.select("*/id"), parse("[1,2]"));
    assert_eq!(mixed.select("/*/nothing"), parse("[]"));
}

#[test]
fn select_should_report_bad_steps() {
    let root = fixture("users.json");
    assert_eq!(
        root.select("/data/people"),
        Err(Error::KeyNotFound {
            key: "people".to_string()
        })
    );
    assert!(matches!(
        root.select("/data/users/first/name"),
        Err(Error::InvalidPath { .. })
    ));
    assert!(matches!(
        root.select("/data/users/9"),
        Err(Error::IndexOutOfRange { index: 9, .. })
    ));
    assert!(matches!(
        root.select("/settings/theme/colour"),
        Err(Error::TypeMismatch { found: "string", .. })
    ));
}

#[test]
fn query_wildcards_should_not_project_like_select() {
    let root = parse(USERS).unwrap();
    assert_eq!(
        query(&root, "/data/users/*").unwrap().to_value(),
        root.select("/data/users").unwrap()
    );
    assert!(matches!(
        query(&root, "/data/users/*/name"),
        Err(Error::TypeMismatch { found: "array", .. })
    ));
}
