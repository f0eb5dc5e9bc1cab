// ABOUTME: Typed error kinds for dump export and statement replay
// ABOUTME: Every variant carries the table, type name, or statement needed to diagnose it

use crate::mysql::encoder::ColumnType;
use crate::utils::{format_duration, preview_statement};
use std::time::Duration;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the dump and replay engine
///
/// Every error aborts the operation in progress. Nothing at this layer retries
/// or continues past a failure.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Invalid MySQL connection target: {0}")]
    InvalidTarget(String),

    #[error("Failed to connect to MySQL target '{target}': {source}")]
    Connection {
        target: String,
        #[source]
        source: mysql_async::Error,
    },

    #[error("Catalog query failed while {context}: {source}")]
    Introspection {
        context: String,
        #[source]
        source: mysql_async::Error,
    },

    #[error("Table '{database}.{table}' does not exist")]
    TableNotFound { database: String, table: String },

    #[error("Unsupported column type '{type_name}' for column `{table}`.`{column}`")]
    UnsupportedType {
        table: String,
        column: String,
        type_name: String,
    },

    #[error("Cannot render {found} as a {column_type} literal")]
    ValueMismatch {
        column_type: ColumnType,
        found: &'static str,
    },

    #[error("Failed to encode column `{table}`.`{column}`: {source}")]
    Cell {
        table: String,
        column: String,
        #[source]
        source: Box<DumpError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input ended inside an unterminated statement: {}", preview_statement(.fragment))]
    IncompleteStatement { fragment: String },

    #[error("Cannot merge statement without a VALUES keyword: {}", preview_statement(.statement))]
    MalformedStatement { statement: String },

    #[error("No statements given to merge")]
    EmptyBatch,

    #[error("Replay exceeded the maximum connection lifetime of {}", format_duration(*.limit))]
    LifetimeExceeded { limit: Duration },

    #[error("Statement rejected by target: {}: {source}", preview_statement(.statement))]
    Execution {
        statement: String,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, DumpError>;

impl DumpError {
    pub(crate) fn introspection(context: impl Into<String>, source: mysql_async::Error) -> Self {
        DumpError::Introspection {
            context: context.into(),
            source,
        }
    }
}
