//! Map Rust structs and maps to BigQuery table schemas and insertAll rows.
//!
//! Field behaviour is driven by tags collected by `#[derive(Record)]`:
//!
//! ```ignore
//! #[derive(Record)]
//! pub struct Visit {
//!     #[tag(bigquery = "username")]
//!     pub name: String,
//!     #[tag(bigquery = "created_at,nullable")]
//!     pub created: chrono::DateTime<chrono::Utc>,
//!     #[tag(bigquery = ",squash")]
//!     pub meta: Meta,
//!     #[tag(bigquery = "-")]
//!     pub cache_key: String,
//! }
//!
//! let schema = bq_mapper::build_schema(&visit)?;
//! let rows = bq_mapper::build_rows(&vec![visit])?;
//! ```

extern crate self as bq_mapper;

pub mod classify;
pub mod config;
pub mod error;
pub mod mapper;
pub mod row;
pub mod schema;
pub mod tag;
pub mod value;
pub mod wire;

pub use bq_mapper_derive::Record;

pub use config::{MapperConfig, SquashErrorPolicy};
pub use error::MapperError;
pub use mapper::{Mapper, build_row, build_rows, build_schema};
pub use row::Row;
pub use schema::{Column, ColumnType, Mode, Schema};
pub use value::{FieldDescriptor, Record, StructField, StructValue, ToValue, Value};
pub use wire::{InsertOptions, TableDataInsertAllRequest, TableDataInsertAllResponse};
