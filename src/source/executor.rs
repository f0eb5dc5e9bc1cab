// ABOUTME: Statement execution against the replay target
// ABOUTME: Executor seam over mysql_async plus the dry-run/debug session wrapper

use crate::error::{BoxError, DumpError, Result};
use mysql_async::{prelude::*, Conn};

/// Something that can run one SQL statement to completion
#[allow(async_fn_in_trait)]
pub trait SqlExecutor {
    async fn execute(&mut self, sql: &str) -> std::result::Result<(), BoxError>;
}

impl SqlExecutor for Conn {
    async fn execute(&mut self, sql: &str) -> std::result::Result<(), BoxError> {
        self.query_drop(sql).await.map_err(BoxError::from)
    }
}

/// Executor wrapper applying the replay's dry-run and debug switches
///
/// In dry-run mode statements are traced and reported as successful without
/// reaching the executor. Debug mode logs every statement either way.
pub struct Session<'a, E> {
    executor: &'a mut E,
    dry_run: bool,
    debug: bool,
    executed: usize,
}

impl<'a, E: SqlExecutor> Session<'a, E> {
    pub fn new(executor: &'a mut E, dry_run: bool, debug: bool) -> Self {
        Self {
            executor,
            dry_run,
            debug,
            executed: 0,
        }
    }

    pub async fn exec(&mut self, sql: &str) -> Result<()> {
        if self.debug {
            tracing::info!("[query]\n{}", sql);
        }

        if self.dry_run {
            tracing::trace!("dry run, skipping: {}", sql);
            self.executed += 1;
            return Ok(());
        }

        self.executor
            .execute(sql)
            .await
            .map_err(|source| DumpError::Execution {
                statement: sql.to_string(),
                source,
            })?;
        self.executed += 1;

        Ok(())
    }

    /// Statements accepted so far, including dry-run ones
    pub fn executed(&self) -> usize {
        self.executed
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::time::Duration;

    /// In-memory executor recording every statement it receives
    #[derive(Debug, Default)]
    pub struct RecordingExecutor {
        pub statements: Vec<String>,
        pub fail_on: Option<String>,
        /// Simulated round-trip time per statement
        pub latency: Duration,
    }

    impl RecordingExecutor {
        pub fn failing_on(needle: &str) -> Self {
            Self {
                fail_on: Some(needle.to_string()),
                ..Self::default()
            }
        }

        pub fn with_latency(latency: Duration) -> Self {
            Self {
                latency,
                ..Self::default()
            }
        }
    }

    impl SqlExecutor for RecordingExecutor {
        async fn execute(&mut self, sql: &str) -> std::result::Result<(), BoxError> {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            self.statements.push(sql.to_string());
            match &self.fail_on {
                Some(needle) if sql.contains(needle.as_str()) => {
                    Err(format!("Table doesn't exist near '{}'", needle).into())
                }
                _ => Ok(()),
            }
        }
    }
}
