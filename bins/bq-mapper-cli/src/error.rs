#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("read '{path}': {source}")]
    Input { path: String, source: std::io::Error },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("mapping: {0}")]
    Mapping(#[from] bq_mapper::MapperError),
}
