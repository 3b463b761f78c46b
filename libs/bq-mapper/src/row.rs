use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::MapperConfig;
use crate::error::{MapperError, Result};
use crate::tag::Directive;
use crate::value::{StructValue, Value};

/// One record ready for streaming insert: column name → value.
///
/// Independent of any `Schema`; nothing checks the two agree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(column.into(), value)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Later entries win on name clashes.
    pub fn merge(&mut self, other: Row) {
        self.0.extend(other.0);
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ════════════════════════════════════════════════════════════════
//  Builder
// ════════════════════════════════════════════════════════════════

/// Single struct or map → one row.
pub(crate) fn build_row(config: &MapperConfig, value: &Value) -> Result<Row> {
    match value {
        Value::Struct(s) => struct_row(config, s),
        Value::Map(entries) => Ok(map_row(entries)),
        other => Err(MapperError::DataType { kind: other.kind() }),
    }
}

/// Struct, map, or a list of them → rows.
///
/// List elements that are neither struct nor map are skipped.
pub(crate) fn build_rows(config: &MapperConfig, value: &Value) -> Result<Vec<Row>> {
    match value {
        Value::Struct(_) | Value::Map(_) => Ok(vec![build_row(config, value)?]),
        Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::Struct(_) | Value::Map(_) => rows.push(build_row(config, item)?),
                    other => {
                        tracing::debug!(index, kind = other.kind(), "list element is not a record, skipping");
                    }
                }
            }
            Ok(rows)
        }
        other => Err(MapperError::DataType { kind: other.kind() }),
    }
}

/// Maps pass straight through: no tag handling.
fn map_row(entries: &[(Value, Value)]) -> Row {
    let mut row = Row::new();
    for (key, value) in entries {
        match key.as_str() {
            Some(name) => {
                row.insert(name, value.clone());
            }
            None => tracing::debug!(key = key.kind(), "non-string map key, skipping"),
        }
    }
    row
}

fn struct_row(config: &MapperConfig, s: &StructValue) -> Result<Row> {
    let mut row = Row::new();
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
            let nested = match &field.value {
                Value::Struct(inner) => {
                    struct_row(config, inner).map_err(|e| e.with_context(desc.ident))?
                }
                other => {
                    return Err(MapperError::NotAStruct {
                        field: desc.ident.to_string(),
                        kind: other.kind(),
                    });
                }
            };
            row.merge(nested);
            continue;
        }

        if directive.nullable && field.value.is_zero() {
            continue;
        }

        row.insert(directive.column_name(desc), field.value.clone());
    }
    Ok(row)
}
