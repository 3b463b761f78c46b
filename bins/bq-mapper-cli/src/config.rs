use std::io::Read;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

use bq_mapper::{InsertOptions, MapperConfig};

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "bq-mapper", about = "Build BigQuery schemas and insertAll payloads from JSON")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "BQ_MAPPER_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the table schema of a JSON object
    Schema(InputArgs),
    /// Print an insertAll request for a JSON object or array
    Rows(InputArgs),
}

#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Input JSON file, `-` for stdin
    #[arg(long, short, default_value = "-")]
    pub input: String,

    /// Pretty-print the output
    #[arg(long)]
    pub pretty: bool,
}

impl InputArgs {
    pub fn read_json(&self) -> Result<serde_json::Value, CliError> {
        let content = if self.input == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map(|_| buf)
        } else {
            std::fs::read_to_string(&self.input)
        }
        .map_err(|source| CliError::Input { path: self.input.clone(), source })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn render(&self, value: &impl serde::Serialize) -> Result<String, CliError> {
        let out = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(out)
    }

    pub fn print(&self, value: &impl serde::Serialize) -> Result<(), CliError> {
        println!("{}", self.render(value)?);
        Ok(())
    }
}

// ---- TOML Config ----

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub mapper: MapperConfig,
    pub insert: InsertOptions,
}

impl FileConfig {
    /// Defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CliError::Config { context: "parse", detail: format!("'{path}': {e}") })?;
        tracing::info!(config = %path, tag_key = %config.mapper.tag_key, "loaded config");
        Ok(config)
    }
}
