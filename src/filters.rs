// ABOUTME: Database and table selection rules for dump runs
// ABOUTME: Handles include/exclude lists with plain or database-qualified table names

use anyhow::{bail, Result};

/// Which databases and tables a dump covers
///
/// Table entries are either `table`, matching that name in every dumped
/// database, or `database.table`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpFilter {
    include_databases: Option<Vec<String>>,
    exclude_databases: Option<Vec<String>>,
    include_tables: Option<Vec<String>>,
    exclude_tables: Option<Vec<String>>,
}

impl DumpFilter {
    /// Creates a filter from CLI or config file lists
    pub fn new(
        include_databases: Option<Vec<String>>,
        exclude_databases: Option<Vec<String>>,
        include_tables: Option<Vec<String>>,
        exclude_tables: Option<Vec<String>>,
    ) -> Result<Self> {
        if include_databases.is_some() && exclude_databases.is_some() {
            bail!("Cannot use both --databases and --exclude-databases");
        }
        if include_tables.is_some() && exclude_tables.is_some() {
            bail!("Cannot use both --tables and --exclude-tables");
        }

        for entry in include_tables.iter().chain(exclude_tables.iter()).flatten() {
            if entry.is_empty() || entry.starts_with('.') || entry.ends_with('.') {
                bail!(
                    "Table must be specified as 'table' or 'database.table', got '{}'",
                    entry
                );
            }
        }

        // Empty lists mean "no rule", not "select nothing"
        let non_empty = |list: Option<Vec<String>>| list.filter(|l| !l.is_empty());

        Ok(Self {
            include_databases: non_empty(include_databases),
            exclude_databases: non_empty(exclude_databases),
            include_tables: non_empty(include_tables),
            exclude_tables: non_empty(exclude_tables),
        })
    }

    /// Creates an empty filter (dump everything)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.include_databases.is_none()
            && self.exclude_databases.is_none()
            && self.include_tables.is_none()
            && self.exclude_tables.is_none()
    }

    /// Databases named explicitly, in the order given
    pub fn include_databases(&self) -> Option<&[String]> {
        self.include_databases.as_deref()
    }

    pub fn should_dump_database(&self, db_name: &str) -> bool {
        if let Some(ref include) = self.include_databases {
            if !include.iter().any(|db| db == db_name) {
                return false;
            }
        }

        if let Some(ref exclude) = self.exclude_databases {
            if exclude.iter().any(|db| db == db_name) {
                return false;
            }
        }

        true
    }

    pub fn should_dump_table(&self, db_name: &str, table_name: &str) -> bool {
        if let Some(ref include) = self.include_tables {
            if !include.iter().any(|entry| matches_table(entry, db_name, table_name)) {
                return false;
            }
        }

        if let Some(ref exclude) = self.exclude_tables {
            if exclude.iter().any(|entry| matches_table(entry, db_name, table_name)) {
                return false;
            }
        }

        true
    }

    /// Tables explicitly requested for `db_name`, in the order given
    ///
    /// `None` when no include list applies, meaning every table of the
    /// database is a candidate.
    pub fn requested_tables(&self, db_name: &str) -> Option<Vec<RequestedTable>> {
        let include = self.include_tables.as_ref()?;

        let tables = include
            .iter()
            .filter_map(|entry| match entry.split_once('.') {
                Some((db, table)) if db == db_name => Some(RequestedTable {
                    name: table.to_string(),
                    qualified: true,
                }),
                Some(_) => None,
                None => Some(RequestedTable {
                    name: entry.clone(),
                    qualified: false,
                }),
            })
            .collect();

        Some(tables)
    }
}

/// One `--tables` entry resolved against a database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedTable {
    pub name: String,
    /// Named as `database.table` rather than bare `table`
    pub qualified: bool,
}

fn matches_table(entry: &str, db_name: &str, table_name: &str) -> bool {
    match entry.split_once('.') {
        Some((db, table)) => db == db_name && table == table_name,
        None => entry == table_name,
    }
}
