use crate::error::{MapperError, Result};
use crate::schema::{ColumnType, Mode};
use crate::value::Value;

/// Column type and mode inferred from one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// `None` for arrays: element types are not inspected here.
    pub column_type: Option<ColumnType>,
    pub mode: Mode,
}

impl Classification {
    fn required(column_type: ColumnType) -> Self {
        Self {
            column_type: Some(column_type),
            mode: Mode::Required,
        }
    }
}

/// Map a value to its column type.
///
/// Errors carry an empty field path; callers attach the column name.
pub fn classify(value: &Value) -> Result<Classification> {
    match value {
        Value::Bool(_) => Ok(Classification::required(ColumnType::Boolean)),
        Value::Int(_) | Value::UInt(_) => Ok(Classification::required(ColumnType::Integer)),
        Value::Float(_) => Ok(Classification::required(ColumnType::Float)),
        Value::String(_) => Ok(Classification::required(ColumnType::String)),
        Value::Timestamp(_) => Ok(Classification::required(ColumnType::Timestamp)),
        Value::Array(_) => Ok(Classification {
            column_type: None,
            mode: Mode::Repeated,
        }),
        Value::Struct(s) => Err(MapperError::InvalidStructType {
            field: String::new(),
            type_name: s.type_name,
        }),
        Value::Null | Value::Map(_) => Err(MapperError::InvalidType {
            field: String::new(),
            kind: value.kind(),
        }),
    }
}

/// Scalar type of the first element of an array, if it has one.
pub fn element_type(items: &[Value]) -> Option<ColumnType> {
    let first = items.first()?;
    match classify(first) {
        Ok(Classification { column_type, mode: Mode::Required }) => column_type,
        _ => None,
    }
}
