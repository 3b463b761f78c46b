/// Mapping error, returned by the schema and row builders.
///
/// Field paths are filled in while the error travels up through nested
/// squashed structs, so a failure inside `meta` squashed into `Event`
/// reports `meta.created`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapperError {
    /// Definition value (or a squashed field) is neither a struct nor,
    /// for schema building, a map.
    /// `field` is empty for the top-level value.
    #[error("not a struct{}: got {kind}", at_field(.field))]
    NotAStruct { field: String, kind: &'static str },

    /// Field value has a shape no column type exists for.
    #[error("invalid type field for schema '{field}': {kind}")]
    InvalidType { field: String, kind: &'static str },

    /// Field is struct-shaped but not a timestamp.
    #[error("invalid struct for schema '{field}': {type_name} is not a timestamp")]
    InvalidStructType { field: String, type_name: &'static str },

    /// Data value for the row builder is neither struct, map, nor a list.
    #[error("error data type: got {kind}")]
    DataType { kind: &'static str },

    /// The remote insert reported row-level errors.
    #[error("insertAll reported errors for {failed_rows} row(s)")]
    InsertPartialFailure { failed_rows: usize },
}

impl MapperError {
    /// Prefix the field path with `ctx`.
    ///
    /// Only field-level variants carry a path; the rest pass through unchanged.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            MapperError::NotAStruct { field, kind } => MapperError::NotAStruct {
                field: join_path(ctx, &field),
                kind,
            },
            MapperError::InvalidType { field, kind } => MapperError::InvalidType {
                field: join_path(ctx, &field),
                kind,
            },
            MapperError::InvalidStructType { field, type_name } => {
                MapperError::InvalidStructType {
                    field: join_path(ctx, &field),
                    type_name,
                }
            }
            other => other,
        }
    }
}

fn join_path(ctx: impl std::fmt::Display, field: &str) -> String {
    if field.is_empty() {
        ctx.to_string()
    } else {
        format!("{ctx}.{field}")
    }
}

fn at_field(field: &str) -> String {
    if field.is_empty() {
        String::new()
    } else {
        format!(" at '{field}'")
    }
}

pub type Result<T, E = MapperError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builds_dotted_path() {
        let err = MapperError::InvalidType { field: String::new(), kind: "map" }
            .with_context("created")
            .with_context("meta");
        assert_eq!(
            err,
            MapperError::InvalidType { field: "meta.created".into(), kind: "map" }
        );
        assert_eq!(err.to_string(), "invalid type field for schema 'meta.created': map");
    }

    #[test]
    fn context_leaves_other_variants_alone() {
        let err = MapperError::DataType { kind: "int" }.with_context("meta");
        assert_eq!(err, MapperError::DataType { kind: "int" });
    }

    #[test]
    fn not_a_struct_names_the_field_when_known() {
        let top = MapperError::NotAStruct { field: String::new(), kind: "int" };
        assert_eq!(top.to_string(), "not a struct: got int");

        let nested = top.with_context("Extra").with_context("Meta");
        assert_eq!(
            nested,
            MapperError::NotAStruct { field: "Meta.Extra".into(), kind: "int" }
        );
        assert_eq!(nested.to_string(), "not a struct at 'Meta.Extra': got int");
    }
}
