// ABOUTME: Renders the textual dump document onto any byte sink
// ABOUTME: Header, structure, records, trigger, view, and footer blocks

use crate::error::Result;
use crate::mysql::reader::TriggerInfo;
use crate::utils::{format_duration, quote_identifier};
use std::io::Write;
use std::time::Duration;
use time::macros::format_description;
use time::OffsetDateTime;

const RULE: &str = "-- ----------------------------";

/// Format a dump timestamp as `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    at.format(format).unwrap_or_else(|_| at.to_string())
}

/// Local wall-clock time, or UTC when the local offset cannot be determined
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Sequential writer for one dump document
pub struct DumpWriter<W: Write> {
    sink: W,
}

impl<W: Write> DumpWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    fn banner(&mut self, title: &str) -> Result<()> {
        writeln!(self.sink, "{}", RULE)?;
        writeln!(self.sink, "-- {}", title)?;
        writeln!(self.sink, "{}", RULE)?;
        Ok(())
    }

    pub fn write_header(&mut self, started: &str) -> Result<()> {
        writeln!(self.sink, "{}", RULE)?;
        writeln!(self.sink, "-- MySQL Database Dump")?;
        writeln!(
            self.sink,
            "-- seren-mysqldump version: v{}",
            env!("CARGO_PKG_VERSION")
        )?;
        writeln!(self.sink, "-- Start Time: {}", started)?;
        writeln!(self.sink, "{}", RULE)?;
        write!(self.sink, "\n\n")?;
        writeln!(
            self.sink,
            "/*!40101 SET @OLD_SQL_MODE=@@SQL_MODE, SQL_MODE='NO_AUTO_VALUE_ON_ZERO' */;"
        )?;
        Ok(())
    }

    pub fn write_use(&mut self, database: &str) -> Result<()> {
        writeln!(self.sink, "USE {};", quote_identifier(database))?;
        Ok(())
    }

    pub fn write_drop_table(&mut self, table: &str) -> Result<()> {
        writeln!(self.sink, "DROP TABLE IF EXISTS {};", quote_identifier(table))?;
        Ok(())
    }

    pub fn write_drop_view(&mut self, view: &str) -> Result<()> {
        writeln!(self.sink, "DROP VIEW IF EXISTS {};", quote_identifier(view))?;
        Ok(())
    }

    pub fn write_table_structure(&mut self, table: &str, ddl: &str) -> Result<()> {
        self.banner(&format!("Table structure for {}", table))?;
        write!(self.sink, "{};\n\n", ddl)?;
        Ok(())
    }

    pub fn write_view_structure(&mut self, view: &str, ddl: &str) -> Result<()> {
        self.banner(&format!("View structure for {}", view))?;
        write!(self.sink, "{};\n\n", ddl)?;
        Ok(())
    }

    /// Open the records block of `table`; rows are added through the returned block
    pub fn begin_records<'w>(
        &'w mut self,
        table: &str,
        insert_prefix: String,
        rows_per_insert: usize,
    ) -> Result<RecordBlock<'w, W>> {
        let quoted = quote_identifier(table);
        self.banner(&format!("Records of {}", table))?;
        writeln!(self.sink, "LOCK TABLES {} WRITE;", quoted)?;
        writeln!(self.sink, "/*!40000 ALTER TABLE {} DISABLE KEYS */;", quoted)?;

        Ok(RecordBlock {
            writer: self,
            quoted,
            insert_prefix,
            rows_per_insert: rows_per_insert.max(1),
            in_statement: 0,
            rows: 0,
        })
    }

    /// Triggers of one table, each in its own `DELIMITER ;;` section
    pub fn write_triggers(&mut self, table: &str, triggers: &[TriggerInfo]) -> Result<()> {
        if triggers.is_empty() {
            return Ok(());
        }

        self.banner(&format!("Dump table triggers of {}", table))?;
        for trigger in triggers {
            writeln!(self.sink, "DELIMITER ;;")?;
            writeln!(self.sink, "/*!50003 SET SESSION SQL_MODE=\"\" */;;")?;
            writeln!(
                self.sink,
                "/*!50003 CREATE TRIGGER {} {} {} ON {} FOR EACH ROW {} */;;",
                quote_identifier(&trigger.name),
                trigger.timing,
                trigger.event,
                quote_identifier(&trigger.table),
                trigger.statement
            )?;
            writeln!(self.sink, "DELIMITER ;")?;
            write!(self.sink, "/*!50003 SET SESSION SQL_MODE=@OLD_SQL_MODE */;\n\n")?;
        }
        Ok(())
    }

    pub fn write_footer(&mut self, elapsed: Duration) -> Result<()> {
        writeln!(self.sink, "{}", RULE)?;
        writeln!(self.sink, "-- Dumped by seren-mysqldump")?;
        writeln!(self.sink, "-- Cost Time: {}", format_duration(elapsed))?;
        writeln!(self.sink, "{}", RULE)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// An open `LOCK TABLES ... UNLOCK TABLES` section
///
/// Rows are grouped `rows_per_insert` to a statement. Closing a block that
/// received no rows writes no INSERT at all.
pub struct RecordBlock<'w, W: Write> {
    writer: &'w mut DumpWriter<W>,
    quoted: String,
    insert_prefix: String,
    rows_per_insert: usize,
    in_statement: usize,
    rows: u64,
}

impl<W: Write> RecordBlock<'_, W> {
    /// Append one encoded `(...)` row
    pub fn push_row(&mut self, row: &str) -> Result<()> {
        let sink = &mut self.writer.sink;

        if self.in_statement == self.rows_per_insert {
            writeln!(sink, ";")?;
            self.in_statement = 0;
        }

        if self.in_statement == 0 {
            write!(sink, "{}\n{}", self.insert_prefix, row)?;
        } else {
            write!(sink, ",\n{}", row)?;
        }

        self.in_statement += 1;
        self.rows += 1;
        Ok(())
    }

    /// Close the block, returning how many rows it held
    pub fn finish(self) -> Result<u64> {
        let sink = &mut self.writer.sink;

        if self.in_statement > 0 {
            writeln!(sink, ";")?;
        }
        writeln!(sink, "/*!40000 ALTER TABLE {} ENABLE KEYS */;", self.quoted)?;
        write!(sink, "UNLOCK TABLES;\n\n")?;

        Ok(self.rows)
    }
}
