use crate::config::MapperConfig;
use crate::error::Result;
use crate::row::{self, Row};
use crate::schema::{self, Schema};
use crate::value::ToValue;
use crate::wire::{InsertOptions, TableDataInsertAllRequest};

/// Schema and row builder bound to one configuration.
///
/// Stateless between calls; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: MapperConfig,
}

impl Mapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Column schema for a definition value (struct or string-keyed map).
    pub fn build_schema<T: ToValue + ?Sized>(&self, definition: &T) -> Result<Schema> {
        schema::build_schema(&self.config, &definition.to_value())
    }

    /// One row from a single struct or map.
    pub fn build_row<T: ToValue + ?Sized>(&self, data: &T) -> Result<Row> {
        row::build_row(&self.config, &data.to_value())
    }

    /// Rows from a struct, a map, or a list of either.
    pub fn build_rows<T: ToValue + ?Sized>(&self, data: &T) -> Result<Vec<Row>> {
        row::build_rows(&self.config, &data.to_value())
    }

    /// `insertAll` request body for `data`.
    pub fn insert_request<T: ToValue + ?Sized>(
        &self,
        data: &T,
        options: &InsertOptions,
    ) -> Result<TableDataInsertAllRequest> {
        let rows = self.build_rows(data)?;
        tracing::debug!(rows = rows.len(), "built insert request");
        Ok(TableDataInsertAllRequest::new(rows, options))
    }
}

/// [`Mapper::build_schema`] with the default configuration.
pub fn build_schema<T: ToValue + ?Sized>(definition: &T) -> Result<Schema> {
    Mapper::default().build_schema(definition)
}

/// [`Mapper::build_row`] with the default configuration.
pub fn build_row<T: ToValue + ?Sized>(data: &T) -> Result<Row> {
    Mapper::default().build_row(data)
}

/// [`Mapper::build_rows`] with the default configuration.
pub fn build_rows<T: ToValue + ?Sized>(data: &T) -> Result<Vec<Row>> {
    Mapper::default().build_rows(data)
}
