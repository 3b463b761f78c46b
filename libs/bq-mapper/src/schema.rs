use serde::{Deserialize, Serialize};

use crate::classify::{classify, element_type};
use crate::config::{MapperConfig, SquashErrorPolicy};
use crate::error::{MapperError, Result};
use crate::tag::Directive;
use crate::value::{StructValue, Value};

// ════════════════════════════════════════════════════════════════
//  Column Type & Mode
// ════════════════════════════════════════════════════════════════

/// Column types the builder can infer. Serialized with BigQuery's names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    String,
    Timestamp,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::Float => write!(f, "FLOAT"),
            ColumnType::String => write!(f, "STRING"),
            ColumnType::Timestamp => write!(f, "TIMESTAMP"),
        }
    }
}

/// Column cardinality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    #[default]
    Required,
    Nullable,
    Repeated,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Required => write!(f, "REQUIRED"),
            Mode::Nullable => write!(f, "NULLABLE"),
            Mode::Repeated => write!(f, "REPEATED"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Column & Schema
// ════════════════════════════════════════════════════════════════

/// One column definition. Same JSON shape as BigQuery's `TableFieldSchema`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Absent for REPEATED columns unless element inference is enabled.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    pub mode: Mode,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType, mode: Mode) -> Self {
        Self {
            name: name.into(),
            column_type: Some(column_type),
            mode,
        }
    }

    /// Shortcut: required scalar column.
    pub fn required(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type, Mode::Required)
    }

    /// Shortcut: nullable scalar column.
    pub fn nullable(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type, Mode::Nullable)
    }
}

/// Ordered column list. Same JSON shape as BigQuery's `TableSchema`.
///
/// Column names are not checked for uniqueness.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Column>,
}

impl Schema {
    pub fn new(fields: Vec<Column>) -> Self {
        Self { fields }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.fields.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|c| c.name.as_str())
    }
}

// ════════════════════════════════════════════════════════════════
//  Builder
// ════════════════════════════════════════════════════════════════

pub(crate) fn build_schema(config: &MapperConfig, value: &Value) -> Result<Schema> {
    let mut fields = Vec::new();
    collect(config, value, &mut fields)?;
    Ok(Schema { fields })
}

fn collect(config: &MapperConfig, value: &Value, out: &mut Vec<Column>) -> Result<()> {
    match value {
        Value::Struct(s) => collect_struct(config, s, out),
        Value::Map(entries) => collect_map(config, entries, out),
        other => Err(MapperError::NotAStruct { field: String::new(), kind: other.kind() }),
    }
}

fn collect_map(config: &MapperConfig, entries: &[(Value, Value)], out: &mut Vec<Column>) -> Result<()> {
    for (key, value) in entries {
        let Some(name) = key.as_str() else {
            tracing::debug!(key = key.kind(), "non-string map key, skipping");
            continue;
        };
        out.push(column(config, name, value)?);
    }
    Ok(())
}

fn collect_struct(config: &MapperConfig, s: &StructValue, out: &mut Vec<Column>) -> Result<()> {
    for field in &s.fields {
        let desc = &field.descriptor;
        if !desc.exported {
            continue;
        }

        let directive = Directive::of(desc, &config.tag_key);
        if directive.skip {
            tracing::debug!(record = s.type_name, field = desc.ident, "skip tag");
            continue;
        }

        if directive.squash {
            let mut nested = Vec::new();
            match collect(config, &field.value, &mut nested) {
                Ok(()) => out.append(&mut nested),
                Err(e) => {
                    let e = e.with_context(desc.ident);
                    match config.schema_squash_errors {
                        SquashErrorPolicy::Propagate => return Err(e),
                        SquashErrorPolicy::Swallow => {
                            tracing::warn!(
                                record = s.type_name,
                                field = desc.ident,
                                error = %e,
                                "squashed field has no schema, skipping"
                            );
                        }
                    }
                }
            }
            continue;
        }

        let mut col = column(config, directive.column_name(desc), &field.value)?;
        if directive.nullable {
            col.mode = Mode::Nullable;
        }
        out.push(col);
    }
    Ok(())
}

fn column(config: &MapperConfig, name: &str, value: &Value) -> Result<Column> {
    let class = classify(value).map_err(|e| e.with_context(name))?;

    let mut column_type = class.column_type;
    if let (None, Value::Array(items)) = (column_type, value) {
        if config.infer_repeated_element_type {
            column_type = element_type(items);
        }
        if column_type.is_none() {
            tracing::warn!(column = name, "repeated column has no element type");
        }
    }

    Ok(Column {
        name: name.to_string(),
        column_type,
        mode: class.mode,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{FieldDescriptor, ToValue};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn default_build(value: impl ToValue) -> Result<Schema> {
        build_schema(&MapperConfig::default(), &value.to_value())
    }

    fn event() -> StructValue {
        StructValue::new("Event")
            .field(FieldDescriptor::new("Id"), 1u32)
            .field(FieldDescriptor::new("secret").private(), "x")
            .field(FieldDescriptor::new("Note").with_tags(&[("bigquery", "-")]), "n")
            .field(
                FieldDescriptor::new("Score").with_tags(&[("bigquery", "score,nullable")]),
                0.0,
            )
    }

    #[test]
    fn untagged_fields_use_identifier() {
        let s = StructValue::new("User")
            .field(FieldDescriptor::new("Name"), "a")
            .field(FieldDescriptor::new("Age"), 3i32)
            .field(FieldDescriptor::new("Admin"), false);
        let schema = default_build(s).unwrap();
        assert_eq!(
            schema.fields,
            vec![
                Column::required("Name", ColumnType::String),
                Column::required("Age", ColumnType::Integer),
                Column::required("Admin", ColumnType::Boolean),
            ]
        );
    }

    #[test]
    fn private_skip_and_nullable() {
        let schema = default_build(event()).unwrap();
        assert_eq!(
            schema.fields,
            vec![
                Column::required("Id", ColumnType::Integer),
                Column::nullable("score", ColumnType::Float),
            ]
        );
    }

    #[test]
    fn squash_merges_in_place() {
        let s = StructValue::new("Outer")
            .field(FieldDescriptor::new("First"), "a")
            .field(FieldDescriptor::new("Inner").with_tags(&[("bigquery", ",squash")]), event())
            .field(FieldDescriptor::new("Last"), DateTime::<Utc>::default());
        let names: Vec<String> = default_build(s).unwrap().names().map(String::from).collect();
        assert_eq!(names, vec!["First", "Id", "score", "Last"]);
    }

    #[test]
    fn squash_errors_follow_policy() {
        let broken = StructValue::new("Broken")
            .field(FieldDescriptor::new("Addr"), StructValue::new("Address"));
        let s = StructValue::new("Outer")
            .field(FieldDescriptor::new("Name"), "a")
            .field(FieldDescriptor::new("Meta").with_tags(&[("bigquery", ",squash")]), broken)
            .to_value();

        let schema = build_schema(&MapperConfig::default(), &s).unwrap();
        assert_eq!(schema.fields, vec![Column::required("Name", ColumnType::String)]);

        let strict = MapperConfig::default().with_squash_errors(SquashErrorPolicy::Propagate);
        assert_eq!(
            build_schema(&strict, &s).unwrap_err(),
            MapperError::InvalidStructType { field: "Meta.Addr".into(), type_name: "Address" }
        );
    }

    #[test]
    fn squash_accepts_map_fields() {
        let mut extra = std::collections::BTreeMap::new();
        extra.insert("region", "eu");
        let s = StructValue::new("Outer")
            .field(FieldDescriptor::new("Extra").with_tags(&[("bigquery", ",squash")]), extra);
        assert_eq!(
            default_build(s).unwrap().fields,
            vec![Column::required("region", ColumnType::String)]
        );
    }

    #[test]
    fn field_error_aborts_build() {
        let s = StructValue::new("User")
            .field(FieldDescriptor::new("Name"), "a")
            .field(FieldDescriptor::new("Home"), StructValue::new("Address"));
        assert_eq!(
            default_build(s).unwrap_err(),
            MapperError::InvalidStructType { field: "Home".into(), type_name: "Address" }
        );
    }

    #[test]
    fn map_definition_skips_non_string_keys() {
        let v = Value::Map(vec![
            (Value::String("a".into()), Value::Int(1)),
            (Value::Int(7), Value::Int(2)),
        ]);
        assert_eq!(
            build_schema(&MapperConfig::default(), &v).unwrap().fields,
            vec![Column::required("a", ColumnType::Integer)]
        );
    }

    #[test]
    fn map_values_are_classified() {
        let v = json!({"tags": ["a"], "nested": {"x": 1}}).to_value();
        assert_eq!(
            build_schema(&MapperConfig::default(), &v).unwrap_err(),
            MapperError::InvalidType { field: "nested".into(), kind: "map" }
        );
    }

    #[test]
    fn repeated_element_inference_is_opt_in() {
        let s = StructValue::new("Doc").field(FieldDescriptor::new("Tags"), vec!["a", "b"]);
        let plain = default_build(s.clone()).unwrap();
        assert_eq!(plain.fields[0].column_type, None);
        assert_eq!(plain.fields[0].mode, Mode::Repeated);

        let cfg = MapperConfig::default().with_repeated_element_inference(true);
        let inferred = build_schema(&cfg, &s.to_value()).unwrap();
        assert_eq!(
            inferred.fields[0],
            Column::new("Tags", ColumnType::String, Mode::Repeated)
        );
    }

    #[test]
    fn non_struct_definition() {
        assert_eq!(
            default_build(42).unwrap_err(),
            MapperError::NotAStruct { field: String::new(), kind: "int" }
        );
        assert_eq!(
            default_build(vec![1]).unwrap_err(),
            MapperError::NotAStruct { field: String::new(), kind: "array" }
        );
    }

    #[test]
    fn serializes_like_table_schema() {
        let schema = Schema::new(vec![
            Column::required("username", ColumnType::String),
            Column { name: "tags".into(), column_type: None, mode: Mode::Repeated },
        ]);
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"fields": [
                {"name": "username", "type": "STRING", "mode": "REQUIRED"},
                {"name": "tags", "mode": "REPEATED"},
            ]})
        );
    }
}
