use bq_mapper::{Mapper, TableDataInsertAllRequest};

use crate::config::{FileConfig, InputArgs};
use crate::error::CliError;

pub fn run(config: Option<&str>, args: InputArgs) -> Result<(), CliError> {
    let config = FileConfig::load(config)?;
    let data = args.read_json()?;
    let request = build(config, &data)?;
    tracing::info!(input = %args.input, rows = request.rows.len(), "built insert request");

    args.print(&request)
}

/// Rows of `data` wrapped with the `[insert]` options from `config`.
pub fn build(
    config: FileConfig,
    data: &serde_json::Value,
) -> Result<TableDataInsertAllRequest, CliError> {
    let mapper = Mapper::new(config.mapper);
    Ok(mapper.insert_request(data, &config.insert)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_section_reaches_the_request() {
        let config: FileConfig = toml::from_str(
            r#"
            [insert]
            skip_invalid_rows = true
            template_suffix = "_20240501"
            "#,
        )
        .unwrap();
        let data = json!([{"user": "alice", "hits": 3}, 7, {"user": "bob"}]);

        let request = build(config, &data).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["skipInvalidRows"], json!(true));
        assert_eq!(body["templateSuffix"], json!("_20240501"));
        assert!(body.get("ignoreUnknownValues").is_none());
        assert_eq!(body["rows"].as_array().unwrap().len(), 2);
        assert_eq!(body["rows"][0]["json"], json!({"user": "alice", "hits": 3}));
        assert_eq!(body["rows"][1]["json"], json!({"user": "bob"}));
    }

    #[test]
    fn default_config_leaves_flags_out() {
        let request = build(FileConfig::default(), &json!({"a": 1})).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, json!({"rows": [{"json": {"a": 1}}]}));
    }

    #[test]
    fn scalar_input_is_a_mapping_error() {
        let err = build(FileConfig::default(), &json!("nope")).unwrap_err();
        assert!(matches!(err, CliError::Mapping(_)));
    }
}
