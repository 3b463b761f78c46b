//! Request/response bodies of BigQuery's `tabledata.insertAll`.
//!
//! Only the payload shapes live here; sending them is up to the caller.

use serde::{Deserialize, Serialize};

use crate::error::{MapperError, Result};
use crate::row::Row;

/// Request-level insert flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertOptions {
    pub skip_invalid_rows: bool,
    pub ignore_unknown_values: bool,
    pub template_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<String>,
    pub json: Row,
}

impl From<Row> for InsertRow {
    fn from(json: Row) -> Self {
        Self { insert_id: None, json }
    }
}

/// `TableDataInsertAllRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDataInsertAllRequest {
    pub rows: Vec<InsertRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_invalid_rows: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_unknown_values: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_suffix: Option<String>,
}

impl TableDataInsertAllRequest {
    pub fn new(rows: Vec<Row>, options: &InsertOptions) -> Self {
        Self {
            rows: rows.into_iter().map(InsertRow::from).collect(),
            skip_invalid_rows: options.skip_invalid_rows.then_some(true),
            ignore_unknown_values: options.ignore_unknown_values.then_some(true),
            template_suffix: options.template_suffix.clone(),
        }
    }
}

/// One error entry reported for a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ErrorProto {
    pub reason: String,
    pub location: String,
    pub message: String,
    pub debug_info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsertError {
    /// Index of the failed row within the request.
    pub index: u32,
    pub errors: Vec<ErrorProto>,
}

/// `TableDataInsertAllResponse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableDataInsertAllResponse {
    pub kind: String,
    pub insert_errors: Vec<InsertError>,
}

impl TableDataInsertAllResponse {
    /// Fails when at least one row was rejected.
    pub fn check(&self) -> Result<()> {
        if self.insert_errors.is_empty() {
            return Ok(());
        }
        for err in &self.insert_errors {
            for detail in &err.errors {
                tracing::warn!(row = err.index, reason = %detail.reason, message = %detail.message, "row rejected");
            }
        }
        Err(MapperError::InsertPartialFailure {
            failed_rows: self.insert_errors.len(),
        })
    }
}
