// ABOUTME: MySQL catalog introspection for the dump writer
// ABOUTME: Lists databases, tables, views, and triggers and fetches their DDL

use crate::error::{DumpError, Result};
use crate::utils::quote_identifier;
use mysql_async::{prelude::*, Conn, Row};

/// Schemas owned by the server itself, never part of an all-databases dump
const SYSTEM_SCHEMAS: [&str; 4] = ["information_schema", "mysql", "performance_schema", "sys"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Table,
    View,
    Other,
}

impl TableKind {
    fn from_catalog(table_type: &str) -> Self {
        match table_type {
            "BASE TABLE" => TableKind::Table,
            "VIEW" => TableKind::View,
            _ => TableKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub kind: TableKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerInfo {
    pub name: String,
    pub event: String,
    pub table: String,
    pub statement: String,
    pub timing: String,
}

/// List all user databases on the server
///
/// System schemas are excluded. Returns names in alphabetical order.
pub async fn list_databases(conn: &mut Conn) -> Result<Vec<String>> {
    tracing::info!("Listing databases on MySQL server");

    let databases: Vec<String> = conn
        .query("SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA ORDER BY SCHEMA_NAME")
        .await
        .map_err(|e| DumpError::introspection("listing databases", e))?;

    let databases: Vec<String> = databases
        .into_iter()
        .filter(|db| !SYSTEM_SCHEMAS.contains(&db.to_ascii_lowercase().as_str()))
        .collect();

    tracing::info!("Found {} user database(s)", databases.len());

    Ok(databases)
}

/// List tables and views of a database
///
/// Queries INFORMATION_SCHEMA for every base table and view in the database.
///
/// # Arguments
///
/// * `conn` - MySQL connection
/// * `db_name` - Database name to list tables from
///
/// # Returns
///
/// Table names with their kind, in alphabetical order
///
/// # Examples
///
/// ```no_run
/// # use seren_mysqldump::mysql::{connect_mysql, reader::list_tables};
/// # async fn example() -> seren_mysqldump::error::Result<()> {
/// let mut conn = connect_mysql("mysql://localhost:3306/mydb").await?;
/// let tables = list_tables(&mut conn, "mydb").await?;
/// println!("Found {} tables", tables.len());
/// # Ok(())
/// # }
/// ```
pub async fn list_tables(conn: &mut Conn, db_name: &str) -> Result<Vec<TableInfo>> {
    tracing::debug!("Listing tables from MySQL database '{}'", db_name);

    let query = r#"
        SELECT TABLE_NAME, TABLE_TYPE
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        ORDER BY TABLE_NAME
    "#;

    let rows: Vec<(String, String)> = conn
        .exec(query, (db_name,))
        .await
        .map_err(|e| {
            DumpError::introspection(format!("listing tables of database '{}'", db_name), e)
        })?;

    let tables: Vec<TableInfo> = rows
        .into_iter()
        .map(|(name, table_type)| TableInfo {
            name,
            kind: TableKind::from_catalog(&table_type),
        })
        .collect();

    tracing::info!("Found {} table(s) in database '{}'", tables.len(), db_name);

    Ok(tables)
}

/// Look up one named table
///
/// # Arguments
///
/// * `conn` - MySQL connection
/// * `db_name` - Database name
/// * `table_name` - Table or view name
///
/// # Returns
///
/// The table's name and kind, or `DumpError::TableNotFound` if the database
/// does not have it
pub async fn get_table_info(conn: &mut Conn, db_name: &str, table_name: &str) -> Result<TableInfo> {
    let query = r#"
        SELECT TABLE_TYPE
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_SCHEMA = ?
        AND TABLE_NAME = ?
    "#;

    let table_type: Option<String> = conn
        .exec_first(query, (db_name, table_name))
        .await
        .map_err(|e| {
            DumpError::introspection(
                format!("looking up table '{}.{}'", db_name, table_name),
                e,
            )
        })?;

    match table_type {
        Some(table_type) => Ok(TableInfo {
            name: table_name.to_string(),
            kind: TableKind::from_catalog(&table_type),
        }),
        None => Err(DumpError::TableNotFound {
            database: db_name.to_string(),
            table: table_name.to_string(),
        }),
    }
}

/// Second column of a `SHOW CREATE TABLE|VIEW` result
async fn show_create(conn: &mut Conn, object: &str, db_name: &str, name: &str) -> Result<String> {
    let statement = format!(
        "SHOW CREATE {} {}.{}",
        object,
        quote_identifier(db_name),
        quote_identifier(name)
    );

    let row: Option<Row> = conn.query_first(&statement).await.map_err(|e| {
        DumpError::introspection(
            format!("reading structure of '{}.{}'", db_name, name),
            e,
        )
    })?;

    row.and_then(|mut row| row.take_opt::<String, usize>(1))
        .and_then(|ddl| ddl.ok())
        .ok_or_else(|| DumpError::TableNotFound {
            database: db_name.to_string(),
            table: name.to_string(),
        })
}

/// DDL of a base table
///
/// # Arguments
///
/// * `conn` - MySQL connection
/// * `db_name` - Database name
/// * `table_name` - Base table name
///
/// # Returns
///
/// The `SHOW CREATE TABLE` text, rewritten to `CREATE TABLE IF NOT EXISTS`
pub async fn show_create_table(conn: &mut Conn, db_name: &str, table_name: &str) -> Result<String> {
    let ddl = show_create(conn, "TABLE", db_name, table_name).await?;
    Ok(ddl.replacen("CREATE TABLE", "CREATE TABLE IF NOT EXISTS", 1))
}

/// DDL of a view, as the server reports it
pub async fn show_create_view(conn: &mut Conn, db_name: &str, view_name: &str) -> Result<String> {
    show_create(conn, "VIEW", db_name, view_name).await
}

/// All triggers defined in a database
///
/// # Arguments
///
/// * `conn` - MySQL connection
/// * `db_name` - Database name
///
/// # Returns
///
/// Trigger definitions grouped by table, in firing order within each table
pub async fn list_triggers(conn: &mut Conn, db_name: &str) -> Result<Vec<TriggerInfo>> {
    tracing::debug!("Listing triggers of database '{}'", db_name);

    let query = r#"
        SELECT TRIGGER_NAME, EVENT_MANIPULATION, EVENT_OBJECT_TABLE, ACTION_STATEMENT, ACTION_TIMING
        FROM INFORMATION_SCHEMA.TRIGGERS
        WHERE TRIGGER_SCHEMA = ?
        ORDER BY EVENT_OBJECT_TABLE, ACTION_ORDER
    "#;

    let rows: Vec<(String, String, String, String, String)> = conn
        .exec(query, (db_name,))
        .await
        .map_err(|e| {
            DumpError::introspection(format!("listing triggers of database '{}'", db_name), e)
        })?;

    Ok(rows
        .into_iter()
        .map(|(name, event, table, statement, timing)| TriggerInfo {
            name,
            event,
            table,
            statement,
            timing,
        })
        .collect())
}
