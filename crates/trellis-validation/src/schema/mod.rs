//! JSON-Schema-flavored schema model.
//!
//! A schema is either a bare boolean (`true` matches anything, `false`
//! matches nothing) or a keyword bag. Schemas arrive as `serde_json`
//! values with `$ref` already expanded by the schema layer;
//! [`Schema::from_value`] converts them leniently: unknown keywords and
//! ill-typed fields are dropped rather than rejected, so the conversion
//! never fails.

use hashlink::LinkedHashMap;
use serde_json::Value;

mod parse;

#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Bool(bool),
    Object(Box<SchemaObject>),
}

impl Schema {
    /// Lenient conversion from a JSON value. Booleans map to
    /// [`Schema::Bool`]; objects have their recognized keywords read;
    /// anything else becomes the empty schema (matches everything).
    pub fn from_value(value: &Value) -> Schema {
        parse::schema_from_value(value)
    }
}

/// The `type` keyword: a single name or a list of alternatives.
///
/// Names are kept verbatim; an unrecognized name simply never matches,
/// it is not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeSpec {
    Single(String),
    Multiple(Vec<String>),
}

/// Draft-4 boolean flag on the adjacent bound, or draft-7 standalone
/// numeric bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Exclusive {
    Flag(bool),
    Bound(f64),
}

/// The `items` keyword: one schema for every element, or a tuple of
/// per-index schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    Single(Box<Schema>),
    Tuple(Vec<Schema>),
}

/// A `dependencies` entry: extra required property names, or a schema
/// the whole object must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    Required(Vec<String>),
    Schema(Schema),
}

/// Recognized schema keywords. Absent fields impose nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaObject {
    pub types: Option<TypeSpec>,
    pub enum_values: Option<Vec<Value>>,
    /// `Some(Value::Null)` is a real constraint (`const: null`).
    pub const_value: Option<Value>,
    pub error_message: Option<String>,
    pub deprecation_message: Option<String>,

    pub all_of: Option<Vec<Schema>>,
    pub any_of: Option<Vec<Schema>>,
    pub one_of: Option<Vec<Schema>>,
    pub not: Option<Box<Schema>>,
    pub if_schema: Option<Box<Schema>>,
    pub then_schema: Option<Box<Schema>>,
    pub else_schema: Option<Box<Schema>>,

    pub multiple_of: Option<f64>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<Exclusive>,
    pub exclusive_maximum: Option<Exclusive>,

    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub pattern_error_message: Option<String>,
    pub format: Option<String>,

    pub items: Option<Items>,
    pub additional_items: Option<Box<Schema>>,
    pub contains: Option<Box<Schema>>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
    pub unique_items: bool,

    pub properties: Option<LinkedHashMap<String, Schema>>,
    pub pattern_properties: Option<LinkedHashMap<String, Schema>>,
    pub additional_properties: Option<Box<Schema>>,
    pub required: Option<Vec<String>>,
    pub property_names: Option<Box<Schema>>,
    pub dependencies: Option<LinkedHashMap<String, Dependency>>,
    pub min_properties: Option<usize>,
    pub max_properties: Option<usize>,
}
