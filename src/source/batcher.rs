// ABOUTME: Coalesces consecutive INSERT statements into multi-row inserts for replay
// ABOUTME: Bounded lookahead in stream order; never reorders or drops statements

use crate::error::{DumpError, Result};
use crate::source::splitter::Statement;
use std::iter::Fuse;

const VALUES_KEYWORD: &str = "VALUES";

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offset of the first standalone `VALUES` keyword outside `` `quoted` ``
/// identifiers
fn find_values_keyword(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let keyword = VALUES_KEYWORD.as_bytes();
    let mut quoted = false;

    for i in 0..bytes.len() {
        if bytes[i] == b'`' {
            // A doubled backtick toggles twice and stays inside the identifier
            quoted = !quoted;
            continue;
        }
        if quoted || !bytes[i..].starts_with(keyword) {
            continue;
        }
        let before = i.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(i + keyword.len()).copied();
        if !before.is_some_and(is_word_byte) && !after.is_some_and(is_word_byte) {
            return Some(i);
        }
    }
    None
}

fn values_offset(statement: &Statement) -> Result<usize> {
    find_values_keyword(statement.body()).ok_or_else(|| DumpError::MalformedStatement {
        statement: statement.as_str().to_string(),
    })
}

/// Merge INSERT statements into one multi-row INSERT
///
/// The first statement supplies the table and column list; every later
/// statement contributes the text after its `VALUES` keyword. The keyword is
/// matched as a whole word outside backtick-quoted identifiers. The target
/// table is not checked.
///
/// # Errors
///
/// `EmptyBatch` for no input; `MalformedStatement` if any statement lacks
/// `VALUES`, in which case nothing is merged.
///
/// # Examples
///
/// ```
/// # use seren_mysqldump::source::{batcher::merge_inserts, splitter::Statement};
/// let merged = merge_inserts(&[
///     Statement::new("INSERT INTO `test` VALUES (1, 'a');"),
///     Statement::new("INSERT INTO `test` VALUES (2, 'b');"),
/// ])
/// .unwrap();
/// assert_eq!(merged.as_str(), "INSERT INTO `test` VALUES (1, 'a'), (2, 'b');");
/// ```
pub fn merge_inserts(statements: &[Statement]) -> Result<Statement> {
    let (first, rest) = statements.split_first().ok_or(DumpError::EmptyBatch)?;

    values_offset(first)?;
    let mut merged = String::with_capacity(statements.iter().map(|s| s.as_str().len()).sum());
    merged.push_str(first.body());

    for statement in rest {
        let offset = values_offset(statement)?;
        merged.push(',');
        merged.push_str(&statement.body()[offset + VALUES_KEYWORD.len()..]);
    }
    merged.push(';');

    Ok(Statement::new(&merged))
}

/// Text before `VALUES`: the table and column list of an insert
fn insert_target(statement: &Statement) -> Option<&str> {
    find_values_keyword(statement.body()).map(|offset| statement.body()[..offset].trim_end())
}

/// Groups runs of up to `merge_size` consecutive inserts into one statement
///
/// A statement that ends a run early is held back and yielded, unmerged, by the
/// next call. With `merge_size <= 1` every statement passes through untouched.
pub struct InsertBatcher<I: Iterator> {
    inner: Fuse<I>,
    merge_size: usize,
    verify_prefix: bool,
    held: Option<Statement>,
    merged: usize,
}

impl<I> InsertBatcher<I>
where
    I: Iterator<Item = Result<Statement>>,
{
    pub fn new(inner: I, merge_size: usize) -> Self {
        Self {
            inner: inner.fuse(),
            merge_size,
            verify_prefix: false,
            held: None,
            merged: 0,
        }
    }

    /// Only merge inserts whose text before `VALUES` matches the run's first one
    pub fn verify_prefix(mut self, verify: bool) -> Self {
        self.verify_prefix = verify;
        self
    }

    /// Number of input statements folded into an earlier one so far
    pub fn merged_statements(&self) -> usize {
        self.merged
    }

    fn joins_batch(&self, head: &Statement, candidate: &Statement) -> bool {
        if !candidate.is_insert() {
            return false;
        }
        if !self.verify_prefix {
            return true;
        }
        match (insert_target(head), insert_target(candidate)) {
            (Some(a), Some(b)) => a == b,
            // Let merge_inserts report the statement without VALUES
            _ => true,
        }
    }
}

impl<I> Iterator for InsertBatcher<I>
where
    I: Iterator<Item = Result<Statement>>,
{
    type Item = Result<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.held.take() {
            Some(statement) => statement,
            None => match self.inner.next()? {
                Ok(statement) => statement,
                Err(e) => return Some(Err(e)),
            },
        };

        if self.merge_size <= 1 || !first.is_insert() {
            return Some(Ok(first));
        }

        let mut batch = vec![first];
        while batch.len() < self.merge_size {
            match self.inner.next() {
                None => break,
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(candidate)) => {
                    if self.joins_batch(&batch[0], &candidate) {
                        batch.push(candidate);
                    } else {
                        self.held = Some(candidate);
                        break;
                    }
                }
            }
        }

        if batch.len() == 1 {
            return batch.pop().map(Ok);
        }

        let folded = batch.len() - 1;
        let merged = merge_inserts(&batch);
        if merged.is_ok() {
            self.merged += folded;
        }
        Some(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(texts: &[&str]) -> Vec<Result<Statement>> {
        texts.iter().map(|t| Ok(Statement::new(t))).collect()
    }

    fn batch(texts: &[&str], size: usize) -> Vec<String> {
        InsertBatcher::new(statements(texts).into_iter(), size)
            .map(|r| r.unwrap().into_string())
            .collect()
    }

    /// Text after VALUES with the terminator removed
    fn value_list(statement: &str) -> String {
        let statement = Statement::new(statement);
        let offset = find_values_keyword(statement.body()).unwrap();
        statement.body()[offset + VALUES_KEYWORD.len()..].to_string()
    }

    #[test]
    fn test_merge_two_inserts() {
        let merged = merge_inserts(&[
            Statement::new("INSERT INTO `t` VALUES (1,'a');"),
            Statement::new("INSERT INTO `t` VALUES (2,'b');"),
        ])
        .unwrap();
        assert_eq!(merged.as_str(), "INSERT INTO `t` VALUES (1,'a'), (2,'b');");
    }

    #[test]
    fn test_merge_keeps_value_order() {
        let inputs = [
            "INSERT INTO `t` (`a`,`b`) VALUES\n(1,'x'),\n(2,'y');",
            "INSERT INTO `t` (`a`,`b`) VALUES\n(3,'z');",
            "INSERT INTO `t` (`a`,`b`) VALUES\n(4,'w'),\n(5,'v');",
        ];
        let merged = merge_inserts(&inputs.map(Statement::new)).unwrap();

        let expected = format!(
            "{},{},{}",
            value_list(inputs[0]),
            value_list(inputs[1]),
            value_list(inputs[2])
        );
        assert_eq!(value_list(merged.as_str()), expected);
        assert!(merged.as_str().starts_with("INSERT INTO `t` (`a`,`b`) VALUES\n(1,'x')"));
        assert!(merged.as_str().ends_with("(5,'v');"));
    }

    #[test]
    fn test_merge_empty_batch() {
        assert!(matches!(merge_inserts(&[]), Err(DumpError::EmptyBatch)));
    }

    #[test]
    fn test_merge_requires_values_keyword() {
        let err = merge_inserts(&[
            Statement::new("INSERT INTO `t` VALUES (1);"),
            Statement::new("INSERT INTO `t` SELECT * FROM `u`;"),
        ])
        .unwrap_err();
        match err {
            DumpError::MalformedStatement { statement } => {
                assert_eq!(statement, "INSERT INTO `t` SELECT * FROM `u`;")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_size_one_is_passthrough() {
        let texts = [
            "INSERT INTO `t` VALUES (1);",
            "INSERT INTO `t` VALUES (2);",
        ];
        assert_eq!(batch(&texts, 1), texts.to_vec());
        assert_eq!(batch(&texts, 0), texts.to_vec());
    }

    #[test]
    fn test_batches_are_bounded() {
        let texts = [
            "INSERT INTO `t` VALUES (1);",
            "INSERT INTO `t` VALUES (2);",
            "INSERT INTO `t` VALUES (3);",
        ];
        assert_eq!(
            batch(&texts, 2),
            vec!["INSERT INTO `t` VALUES (1), (2);", "INSERT INTO `t` VALUES (3);"]
        );
        assert_eq!(batch(&texts, 3), vec!["INSERT INTO `t` VALUES (1), (2), (3);"]);
    }

    #[test]
    fn test_non_insert_ends_batch_and_is_kept() {
        let texts = [
            "LOCK TABLES `t` WRITE;",
            "INSERT INTO `t` VALUES (1);",
            "INSERT INTO `t` VALUES (2);",
            "UNLOCK TABLES;",
            "INSERT INTO `t` VALUES (3);",
        ];
        assert_eq!(
            batch(&texts, 10),
            vec![
                "LOCK TABLES `t` WRITE;",
                "INSERT INTO `t` VALUES (1), (2);",
                "UNLOCK TABLES;",
                "INSERT INTO `t` VALUES (3);",
            ]
        );
    }

    #[test]
    fn test_merged_statement_count() {
        let texts = [
            "INSERT INTO `t` VALUES (1);",
            "INSERT INTO `t` VALUES (2);",
            "INSERT INTO `t` VALUES (3);",
        ];
        let mut batcher = InsertBatcher::new(statements(&texts).into_iter(), 2);
        while let Some(item) = batcher.next() {
            item.unwrap();
        }
        assert_eq!(batcher.merged_statements(), 1);
    }

    #[test]
    fn test_adjacent_tables_merge_naively_by_default() {
        let texts = ["INSERT INTO `a` VALUES (1);", "INSERT INTO `b` VALUES (2);"];
        assert_eq!(batch(&texts, 5), vec!["INSERT INTO `a` VALUES (1), (2);"]);
    }

    #[test]
    fn test_verify_prefix_keeps_tables_apart() {
        let texts = [
            "INSERT INTO `a` VALUES (1);",
            "INSERT INTO `a` VALUES (2);",
            "INSERT INTO `b` VALUES (3);",
        ];
        let out: Vec<String> = InsertBatcher::new(statements(&texts).into_iter(), 5)
            .verify_prefix(true)
            .map(|r| r.unwrap().into_string())
            .collect();
        assert_eq!(
            out,
            vec!["INSERT INTO `a` VALUES (1), (2);", "INSERT INTO `b` VALUES (3);"]
        );
    }

    #[test]
    fn test_upstream_error_is_forwarded() {
        let items = vec![
            Ok(Statement::new("INSERT INTO `t` VALUES (1);")),
            Err(DumpError::EmptyBatch),
        ];
        let mut batcher = InsertBatcher::new(items.into_iter(), 4);
        assert!(matches!(batcher.next(), Some(Err(DumpError::EmptyBatch))));
    }

    #[test]
    fn test_malformed_candidate_fails_batch() {
        let texts = ["INSERT INTO `t` VALUES (1);", "INSERT INTO `t` SET a = 2;"];
        let mut batcher = InsertBatcher::new(statements(&texts).into_iter(), 2);
        assert!(matches!(
            batcher.next(),
            Some(Err(DumpError::MalformedStatement { .. }))
        ));
    }

    #[test]
    fn test_values_inside_identifiers_is_skipped() {
        let body = "INSERT INTO `VALUES` (`id`,`OLD_VALUES`) VALUES\n(1,2)";
        assert_eq!(find_values_keyword(body), body.find(") VALUES").map(|i| i + 2));
        assert_eq!(find_values_keyword("INSERT INTO OLD_VALUES VALUES (1)"), Some(23));
        assert_eq!(find_values_keyword("INSERT INTO `t` SET a = 1"), None);
    }

    #[test]
    fn test_merge_with_values_in_column_name() {
        let merged = merge_inserts(&[
            Statement::new("INSERT INTO `t` (`id`,`OLD_VALUES`) VALUES\n(1,2);"),
            Statement::new("INSERT INTO `t` (`id`,`OLD_VALUES`) VALUES\n(3,4);"),
        ])
        .unwrap();
        assert_eq!(
            merged.as_str(),
            "INSERT INTO `t` (`id`,`OLD_VALUES`) VALUES\n(1,2),\n(3,4);"
        );
    }

    #[test]
    fn test_verify_prefix_with_values_in_column_name() {
        let texts = [
            "INSERT INTO `t` (`VALUES`) VALUES\n(1);",
            "INSERT INTO `t` (`VALUES`) VALUES\n(2);",
            "INSERT INTO `u` (`VALUES`) VALUES\n(3);",
        ];
        let out: Vec<String> = InsertBatcher::new(statements(&texts).into_iter(), 5)
            .verify_prefix(true)
            .map(|r| r.unwrap().into_string())
            .collect();
        assert_eq!(
            out,
            vec![
                "INSERT INTO `t` (`VALUES`) VALUES\n(1),\n(2);",
                "INSERT INTO `u` (`VALUES`) VALUES\n(3);",
            ]
        );
    }
}
