use bq_mapper::{Mapper, Schema};

use crate::config::{FileConfig, InputArgs};
use crate::error::CliError;

pub fn run(config: Option<&str>, args: InputArgs) -> Result<(), CliError> {
    let config = FileConfig::load(config)?;
    let definition = args.read_json()?;
    let schema = build(config, &definition)?;
    tracing::info!(input = %args.input, columns = schema.fields.len(), "built schema");

    args.print(&schema)
}

pub fn build(config: FileConfig, definition: &serde_json::Value) -> Result<Schema, CliError> {
    Ok(Mapper::new(config.mapper).build_schema(definition)?)
}
