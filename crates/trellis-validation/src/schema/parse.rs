//! Lenient keyword extraction from raw JSON values.

use super::{Dependency, Exclusive, Items, Schema, SchemaObject, TypeSpec};
use hashlink::LinkedHashMap;
use serde_json::{Map, Value};

pub(super) fn schema_from_value(value: &Value) -> Schema {
    match value {
        Value::Bool(b) => Schema::Bool(*b),
        Value::Object(map) => Schema::Object(Box::new(object_from_map(map))),
        // A malformed subschema constrains nothing.
        _ => Schema::Object(Box::new(SchemaObject::default())),
    }
}

fn object_from_map(map: &Map<String, Value>) -> SchemaObject {
    let mut schema = SchemaObject {
        types: map.get("type").and_then(type_spec),
        enum_values: map.get("enum").and_then(Value::as_array).cloned(),
        const_value: map.get("const").cloned(),
        error_message: string_field(map, "errorMessage"),
        deprecation_message: string_field(map, "deprecationMessage"),

        all_of: schema_list(map, "allOf"),
        any_of: schema_list(map, "anyOf"),
        one_of: schema_list(map, "oneOf"),
        not: subschema(map, "not"),
        if_schema: subschema(map, "if"),
        then_schema: subschema(map, "then"),
        else_schema: subschema(map, "else"),

        multiple_of: number_field(map, "multipleOf"),
        minimum: number_field(map, "minimum"),
        maximum: number_field(map, "maximum"),
        exclusive_minimum: map.get("exclusiveMinimum").and_then(exclusive),
        exclusive_maximum: map.get("exclusiveMaximum").and_then(exclusive),

        min_length: count_field(map, "minLength"),
        max_length: count_field(map, "maxLength"),
        pattern: string_field(map, "pattern"),
        pattern_error_message: string_field(map, "patternErrorMessage"),
        format: string_field(map, "format"),

        items: map.get("items").map(items),
        additional_items: subschema(map, "additionalItems"),
        contains: subschema(map, "contains"),
        min_items: count_field(map, "minItems"),
        max_items: count_field(map, "maxItems"),
        unique_items: map.get("uniqueItems").and_then(Value::as_bool) == Some(true),

        properties: schema_map(map, "properties"),
        pattern_properties: schema_map(map, "patternProperties"),
        additional_properties: subschema(map, "additionalProperties"),
        required: map.get("required").and_then(string_list),
        property_names: subschema(map, "propertyNames"),
        dependencies: None,
        min_properties: count_field(map, "minProperties"),
        max_properties: count_field(map, "maxProperties"),
    };
    if let Some(Value::Object(deps)) = map.get("dependencies") {
        let mut out = LinkedHashMap::new();
        for (key, dep) in deps {
            let dep = match dep {
                Value::Array(names) => Dependency::Required(
                    names
                        .iter()
                        .filter_map(|n| n.as_str().map(str::to_string))
                        .collect(),
                ),
                other => Dependency::Schema(schema_from_value(other)),
            };
            out.insert(key.clone(), dep);
        }
        schema.dependencies = Some(out);
    }
    schema
}

fn type_spec(value: &Value) -> Option<TypeSpec> {
    match value {
        Value::String(name) => Some(TypeSpec::Single(name.clone())),
        Value::Array(names) => Some(TypeSpec::Multiple(
            names
                .iter()
                .filter_map(|n| n.as_str().map(str::to_string))
                .collect(),
        )),
        _ => None,
    }
}

fn exclusive(value: &Value) -> Option<Exclusive> {
    match value {
        Value::Bool(flag) => Some(Exclusive::Flag(*flag)),
        Value::Number(n) => n.as_f64().map(Exclusive::Bound),
        _ => None,
    }
}

fn items(value: &Value) -> Items {
    match value {
        Value::Array(list) => Items::Tuple(list.iter().map(schema_from_value).collect()),
        other => Items::Single(Box::new(schema_from_value(other))),
    }
}

fn subschema(map: &Map<String, Value>, key: &str) -> Option<Box<Schema>> {
    map.get(key).map(|v| Box::new(schema_from_value(v)))
}

fn schema_list(map: &Map<String, Value>, key: &str) -> Option<Vec<Schema>> {
    match map.get(key) {
        Some(Value::Array(list)) => Some(list.iter().map(schema_from_value).collect()),
        _ => None,
    }
}

fn schema_map(map: &Map<String, Value>, key: &str) -> Option<LinkedHashMap<String, Schema>> {
    match map.get(key) {
        Some(Value::Object(entries)) => Some(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), schema_from_value(v)))
                .collect(),
        ),
        _ => None,
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number_field(map: &Map<String, Value>, key: &str) -> Option<f64> {
    map.get(key).and_then(Value::as_f64)
}

fn count_field(map: &Map<String, Value>, key: &str) -> Option<usize> {
    map.get(key).and_then(Value::as_u64).map(|n| n as usize)
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array().map(|list| {
        list.iter()
            .filter_map(|n| n.as_str().map(str::to_string))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> SchemaObject {
        match Schema::from_value(&value) {
            Schema::Object(obj) => *obj,
            other => panic!("expected object schema, got {other:?}"),
        }
    }

    #[test]
    fn boolean_schemas_pass_through() {
        assert_eq!(Schema::from_value(&json!(true)), Schema::Bool(true));
        assert_eq!(Schema::from_value(&json!(false)), Schema::Bool(false));
    }

    #[test]
    fn malformed_schema_constrains_nothing() {
        assert_eq!(
            Schema::from_value(&json!("garbage")),
            Schema::Object(Box::new(SchemaObject::default()))
        );
    }

    #[test]
    fn ill_typed_fields_are_dropped() {
        let schema = object(json!({
            "type": 7,
            "minLength": "three",
            "required": "name",
            "enum": {"not": "a list"},
            "minimum": "0",
        }));
        assert_eq!(schema, SchemaObject::default());
    }

    #[test]
    fn type_keyword_keeps_both_shapes() {
        assert_eq!(
            object(json!({"type": "string"})).types,
            Some(TypeSpec::Single("string".to_string()))
        );
        assert_eq!(
            object(json!({"type": ["string", "null"]})).types,
            Some(TypeSpec::Multiple(vec![
                "string".to_string(),
                "null".to_string()
            ]))
        );
    }

    #[test]
    fn exclusive_bounds_keep_both_drafts() {
        let draft4 = object(json!({"minimum": 2, "exclusiveMinimum": true}));
        assert_eq!(draft4.exclusive_minimum, Some(Exclusive::Flag(true)));
        assert_eq!(draft4.minimum, Some(2.0));

        let draft7 = object(json!({"exclusiveMaximum": 9.5}));
        assert_eq!(draft7.exclusive_maximum, Some(Exclusive::Bound(9.5)));
    }

    #[test]
    fn const_null_is_a_constraint() {
        assert_eq!(object(json!({"const": null})).const_value, Some(Value::Null));
        assert_eq!(object(json!({})).const_value, None);
    }

    #[test]
    fn items_keeps_tuple_and_single_forms() {
        match object(json!({"items": {"type": "number"}})).items {
            Some(Items::Single(_)) => {}
            other => panic!("expected single items schema, got {other:?}"),
        }
        match object(json!({"items": [{"type": "number"}, true]})).items {
            Some(Items::Tuple(list)) => assert_eq!(list.len(), 2),
            other => panic!("expected tuple items, got {other:?}"),
        }
    }

    #[test]
    fn dependencies_keeps_both_forms() {
        let schema = object(json!({
            "dependencies": {
                "a": ["b", "c"],
                "d": {"required": ["e"]},
            }
        }));
        let deps = schema.dependencies.unwrap();
        assert_eq!(
            deps.get("a"),
            Some(&Dependency::Required(vec!["b".to_string(), "c".to_string()]))
        );
        assert!(matches!(
            deps.get("d"),
            Some(Dependency::Schema(Schema::Object(_)))
        ));
    }

    #[test]
    fn property_order_follows_the_schema_source() {
        let schema = object(json!({
            "properties": {"z": true, "a": true, "m": true}
        }));
        let properties = schema.properties.unwrap();
        let keys: Vec<&str> = properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }
}
