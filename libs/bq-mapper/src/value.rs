use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

// ════════════════════════════════════════════════════════════════
//  Value
// ════════════════════════════════════════════════════════════════

/// Dynamically-typed value fed to the schema and row builders.
///
/// Closed set of shapes: scalars the classifier knows, plus the containers
/// it has to recognise in order to reject or flatten them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    /// Entries in source order. Keys are not necessarily strings.
    Map(Vec<(Value, Value)>),
    Struct(StructValue),
}

impl Value {
    /// Short shape name, used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
        }
    }

    /// Zero value of the value's type.
    ///
    /// Containers are never zero. The zero timestamp is the Unix epoch
    /// (`DateTime::<Utc>::default()`), not `0001-01-01T00:00:00Z`, so a
    /// genuine `1970-01-01T00:00:00Z` in a nullable column is omitted from
    /// rows like any other zero value.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(v) => !v,
            Value::Int(v) => *v == 0,
            Value::UInt(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::String(v) => v.is_empty(),
            Value::Timestamp(v) => *v == DateTime::<Utc>::default(),
            Value::Array(_) | Value::Map(_) | Value::Struct(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Field descriptors & struct values
// ════════════════════════════════════════════════════════════════

/// Static description of one declared struct field.
///
/// `tags` holds the raw tag strings keyed by tag key, e.g.
/// `[("bigquery", "created_at,nullable")]`. They are parsed at build time so
/// the recognised key can be chosen per `Mapper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub ident: &'static str,
    pub tags: &'static [(&'static str, &'static str)],
    /// `false` for private fields. Those are never mapped.
    pub exported: bool,
}

impl FieldDescriptor {
    pub const fn new(ident: &'static str) -> Self {
        Self {
            ident,
            tags: &[],
            exported: true,
        }
    }

    pub const fn with_tags(mut self, tags: &'static [(&'static str, &'static str)]) -> Self {
        self.tags = tags;
        self
    }

    pub const fn private(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Tag string stored under `key`, or `""` when the field has none.
    pub fn tag(&self, key: &str) -> &'static str {
        self.tags
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .unwrap_or("")
    }
}

/// One field of a struct value: its descriptor and current value.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub descriptor: FieldDescriptor,
    pub value: Value,
}

/// Struct-shaped value: declared fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub type_name: &'static str,
    pub fields: Vec<StructField>,
}

impl StructValue {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, descriptor: FieldDescriptor, value: impl ToValue) -> Self {
        self.fields.push(StructField {
            descriptor,
            value: value.to_value(),
        });
        self
    }
}

/// Struct exposing its field-descriptor table.
///
/// Usually derived with `#[derive(Record)]`; hand-written impls work the same.
pub trait Record {
    fn type_name(&self) -> &'static str;

    /// Every declared field, in declaration order, private ones included.
    fn fields(&self) -> Vec<StructField>;

    fn to_struct(&self) -> StructValue {
        StructValue {
            type_name: self.type_name(),
            fields: self.fields(),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  ToValue
// ════════════════════════════════════════════════════════════════

/// Conversion of native values into [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for StructValue {
    fn to_value(&self) -> Value {
        Value::Struct(self.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! to_value_via {
    ($variant:ident($target:ty): $($t:ty),*) => {
        $(
            impl ToValue for $t {
                fn to_value(&self) -> Value {
                    Value::$variant(*self as $target)
                }
            }
        )*
    };
}

to_value_via!(Int(i64): i8, i16, i32, i64, isize);
to_value_via!(UInt(u64): u8, u16, u32, u64, usize);
to_value_via!(Float(f64): f32, f64);

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for Cow<'_, str> {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl<Tz: TimeZone> ToValue for DateTime<Tz> {
    fn to_value(&self) -> Value {
        Value::Timestamp(self.with_timezone(&Utc))
    }
}

/// Naive timestamps are taken as UTC.
impl ToValue for NaiveDateTime {
    fn to_value(&self) -> Value {
        Value::Timestamp(self.and_utc())
    }
}

impl ToValue for SystemTime {
    fn to_value(&self) -> Value {
        Value::Timestamp(DateTime::<Utc>::from(*self))
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Rc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue, const N: usize> ToValue for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<K: ToValue, V: ToValue, S> ToValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }
}

impl ToValue for serde_json::Value {
    fn to_value(&self) -> Value {
        match self {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(ToValue::to_value).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.iter()
                    .map(|(k, v)| (Value::String(k.clone()), v.to_value()))
                    .collect(),
            ),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Serialization
// ════════════════════════════════════════════════════════════════

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// JSON object keys must be strings; scalars are rendered, anything else
/// falls back to its JSON text.
fn map_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Timestamp(ts) => format_timestamp(ts),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::UInt(u) => serializer.serialize_u64(*u),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => serializer.serialize_str(&format_timestamp(ts)),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&map_key(k), v)?;
                }
                map.end()
            }
            Value::Struct(s) => s.serialize(serializer),
        }
    }
}

/// Exported fields only, keyed by field identifier.
impl Serialize for StructValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let exported: Vec<&StructField> =
            self.fields.iter().filter(|f| f.descriptor.exported).collect();
        let mut map = serializer.serialize_map(Some(exported.len()))?;
        for field in exported {
            map.serialize_entry(field.descriptor.ident, &field.value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integers_keep_signedness() {
        assert_eq!((-3i8).to_value(), Value::Int(-3));
        assert_eq!(7u16.to_value(), Value::UInt(7));
        assert_eq!(1.5f32.to_value(), Value::Float(1.5));
    }

    #[test]
    fn references_and_boxes_are_transparent() {
        let name = String::from("alice");
        let boxed: Box<&String> = Box::new(&name);
        assert_eq!(boxed.to_value(), Value::String("alice".into()));
        assert_eq!(Option::<i32>::None.to_value(), Value::Null);
    }

    #[test]
    fn zero_values() {
        assert!(Value::Int(0).is_zero());
        assert!(Value::String(String::new()).is_zero());
        assert!(Value::Bool(false).is_zero());
        assert!(Value::Timestamp(DateTime::<Utc>::default()).is_zero());
        assert!(Value::Null.is_zero());
        assert!(!Value::Float(0.25).is_zero());
        assert!(!Value::Array(Vec::new()).is_zero());
        assert!(!Value::Map(Vec::new()).is_zero());
    }

    #[test]
    fn descriptor_tag_lookup() {
        let d = FieldDescriptor::new("created").with_tags(&[("bigquery", "created_at,nullable")]);
        assert_eq!(d.tag("bigquery"), "created_at,nullable");
        assert_eq!(d.tag("json"), "");
    }

    #[test]
    fn json_numbers_pick_narrowest_variant() {
        let v = json!({"a": 1, "b": u64::MAX, "c": 0.5}).to_value();
        let Value::Map(entries) = v else {
            panic!("expected map");
        };
        let values: Vec<&Value> = entries.iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![&Value::Int(1), &Value::UInt(u64::MAX), &Value::Float(0.5)]);
    }

    #[test]
    fn serializes_struct_without_private_fields() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let value = StructValue::new("User")
            .field(FieldDescriptor::new("name"), "alice")
            .field(FieldDescriptor::new("secret").private(), "hidden")
            .field(FieldDescriptor::new("seen"), ts)
            .to_value();
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"name": "alice", "seen": "2024-03-01T12:00:00Z"})
        );
    }

    #[test]
    fn serializes_non_string_map_keys() {
        let mut m = BTreeMap::new();
        m.insert(1u8, "one");
        assert_eq!(serde_json::to_value(m.to_value()).unwrap(), json!({"1": "one"}));
    }
}
