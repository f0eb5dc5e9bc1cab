// ABOUTME: MySQL row values to dump literal text
// ABOUTME: Column type resolution, driver value decoding, and per-type literal rendering

use crate::error::{DumpError, Result};
use crate::utils::quote_identifier;
use mysql_async::consts::{ColumnFlags, ColumnType as WireType};
use mysql_async::{Column, Value};
use std::fmt;

/// Character set id MySQL reports for binary strings and blobs
const BINARY_CHARSET: u16 = 63;

/// Literal-rendering family of a column, derived once per column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Decimal,
    Date,
    DateTime,
    Time,
    Year,
    Text,
    Binary,
    Enumerated,
    Boolean,
    Json,
}

impl ColumnType {
    /// Resolve a catalog type name such as `INT UNSIGNED` or `varchar`
    ///
    /// Returns `None` for types without a literal rendering rule.
    ///
    /// # Examples
    ///
    /// ```
    /// # use seren_mysqldump::mysql::encoder::ColumnType;
    /// assert_eq!(ColumnType::from_type_name("BIGINT UNSIGNED"), Some(ColumnType::Integer));
    /// assert_eq!(ColumnType::from_type_name("mediumblob"), Some(ColumnType::Binary));
    /// assert_eq!(ColumnType::from_type_name("GEOMETRY"), None);
    /// ```
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let normalized = type_name
            .to_ascii_uppercase()
            .replace("UNSIGNED", "")
            .replace(' ', "");

        let column_type = match normalized.as_str() {
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => {
                ColumnType::Integer
            }
            "FLOAT" | "DOUBLE" => ColumnType::Float,
            "DECIMAL" | "DEC" => ColumnType::Decimal,
            "DATE" => ColumnType::Date,
            "DATETIME" | "TIMESTAMP" => ColumnType::DateTime,
            "TIME" => ColumnType::Time,
            "YEAR" => ColumnType::Year,
            "CHAR" | "VARCHAR" | "TINYTEXT" | "TEXT" | "MEDIUMTEXT" | "LONGTEXT" => {
                ColumnType::Text
            }
            "BIT" | "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                ColumnType::Binary
            }
            "ENUM" | "SET" => ColumnType::Enumerated,
            "BOOL" | "BOOLEAN" => ColumnType::Boolean,
            "JSON" => ColumnType::Json,
            _ => return None,
        };

        Some(column_type)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "floating-point",
            ColumnType::Decimal => "decimal",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::Year => "year",
            ColumnType::Text => "text",
            ColumnType::Binary => "binary",
            ColumnType::Enumerated => "enum/set",
            ColumnType::Boolean => "boolean",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

/// Report the catalog type name of a result-set column
///
/// The wire protocol sends ENUM and SET as strings flagged accordingly, and
/// distinguishes text from binary strings only by character set.
pub fn database_type_name(column: &Column) -> String {
    let binary = column.character_set() == BINARY_CHARSET;
    let flags = column.flags();

    let name = match column.column_type() {
        WireType::MYSQL_TYPE_TINY => "TINYINT",
        WireType::MYSQL_TYPE_SHORT => "SMALLINT",
        WireType::MYSQL_TYPE_INT24 => "MEDIUMINT",
        WireType::MYSQL_TYPE_LONG => "INT",
        WireType::MYSQL_TYPE_LONGLONG => "BIGINT",
        WireType::MYSQL_TYPE_FLOAT => "FLOAT",
        WireType::MYSQL_TYPE_DOUBLE => "DOUBLE",
        WireType::MYSQL_TYPE_DECIMAL | WireType::MYSQL_TYPE_NEWDECIMAL => "DECIMAL",
        WireType::MYSQL_TYPE_DATE | WireType::MYSQL_TYPE_NEWDATE => "DATE",
        WireType::MYSQL_TYPE_DATETIME | WireType::MYSQL_TYPE_DATETIME2 => "DATETIME",
        WireType::MYSQL_TYPE_TIMESTAMP | WireType::MYSQL_TYPE_TIMESTAMP2 => "TIMESTAMP",
        WireType::MYSQL_TYPE_TIME | WireType::MYSQL_TYPE_TIME2 => "TIME",
        WireType::MYSQL_TYPE_YEAR => "YEAR",
        WireType::MYSQL_TYPE_BIT => "BIT",
        WireType::MYSQL_TYPE_JSON => "JSON",
        WireType::MYSQL_TYPE_ENUM => "ENUM",
        WireType::MYSQL_TYPE_SET => "SET",
        WireType::MYSQL_TYPE_VARCHAR | WireType::MYSQL_TYPE_VAR_STRING => {
            if binary {
                "VARBINARY"
            } else {
                "VARCHAR"
            }
        }
        WireType::MYSQL_TYPE_STRING => {
            if flags.contains(ColumnFlags::ENUM_FLAG) {
                "ENUM"
            } else if flags.contains(ColumnFlags::SET_FLAG) {
                "SET"
            } else if binary {
                "BINARY"
            } else {
                "CHAR"
            }
        }
        WireType::MYSQL_TYPE_TINY_BLOB => {
            if binary {
                "TINYBLOB"
            } else {
                "TINYTEXT"
            }
        }
        WireType::MYSQL_TYPE_BLOB => {
            if binary {
                "BLOB"
            } else {
                "TEXT"
            }
        }
        WireType::MYSQL_TYPE_MEDIUM_BLOB => {
            if binary {
                "MEDIUMBLOB"
            } else {
                "MEDIUMTEXT"
            }
        }
        WireType::MYSQL_TYPE_LONG_BLOB => {
            if binary {
                "LONGBLOB"
            } else {
                "LONGTEXT"
            }
        }
        WireType::MYSQL_TYPE_GEOMETRY => "GEOMETRY",
        WireType::MYSQL_TYPE_NULL => "NULL",
        other => return format!("{:?}", other),
    };

    name.to_string()
}

/// Calendar date and time as reported by the server
///
/// Kept as plain fields so MySQL zero dates (`0000-00-00`) survive untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CalendarTimestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub micros: u32,
}

impl CalendarTimestamp {
    pub fn date(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month,
            day,
            ..Self::default()
        }
    }

    /// Parse the text-protocol form `YYYY-MM-DD[ HH:MM:SS[.ffffff]]`
    pub fn parse(text: &str) -> Option<Self> {
        let (date, time) = match text.split_once(' ') {
            Some((date, time)) => (date, Some(time)),
            None => (text, None),
        };

        let mut date_parts = date.splitn(3, '-');
        let year = date_parts.next()?.parse().ok()?;
        let month = date_parts.next()?.parse().ok()?;
        let day = date_parts.next()?.parse().ok()?;
        let mut parsed = Self::date(year, month, day);

        if let Some(time) = time {
            let (clock, fraction) = match time.split_once('.') {
                Some((clock, fraction)) => (clock, Some(fraction)),
                None => (time, None),
            };
            let mut clock_parts = clock.splitn(3, ':');
            parsed.hour = clock_parts.next()?.parse().ok()?;
            parsed.minute = clock_parts.next()?.parse().ok()?;
            parsed.second = clock_parts.next()?.parse().ok()?;
            if let Some(fraction) = fraction {
                if fraction.is_empty() || fraction.len() > 6 {
                    return None;
                }
                let padded = format!("{:0<6}", fraction);
                parsed.micros = padded.parse().ok()?;
            }
        }

        Some(parsed)
    }

    fn date_literal(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }

    /// Date and time to whole seconds; sub-second precision is not written
    fn datetime_literal(&self) -> String {
        format!(
            "{} {:02}:{:02}:{:02}",
            self.date_literal(),
            self.hour,
            self.minute,
            self.second
        )
    }
}

/// One decoded cell of a row
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    /// Numbers whose canonical text must not be re-formatted
    Decimal(String),
    Timestamp(CalendarTimestamp),
    /// Raw bytes: strings, blobs, times, and years as the server sent them
    Bytes(Vec<u8>),
    Bool(bool),
}

impl CellValue {
    fn kind(&self) -> &'static str {
        match self {
            CellValue::Null => "NULL",
            CellValue::Int(_) => "signed integer",
            CellValue::UInt(_) => "unsigned integer",
            CellValue::Float(_) => "floating-point value",
            CellValue::Decimal(_) => "numeric text",
            CellValue::Timestamp(_) => "calendar timestamp",
            CellValue::Bytes(_) => "byte sequence",
            CellValue::Bool(_) => "boolean",
        }
    }

    /// Decode a driver value into the representation its column type expects
    ///
    /// Accepts both text-protocol values (everything arrives as bytes) and
    /// binary-protocol values (typed integers, floats, dates, and times).
    pub fn decode(value: Value, column_type: ColumnType) -> Result<Self> {
        let mismatch = |found: &'static str| DumpError::ValueMismatch { column_type, found };

        let cell = match (column_type, value) {
            (_, Value::NULL) => CellValue::Null,

            (ColumnType::Integer, Value::Int(i)) => CellValue::Int(i),
            (ColumnType::Integer, Value::UInt(u)) => CellValue::UInt(u),
            (ColumnType::Integer, Value::Bytes(b)) => {
                parse_integer(&b).ok_or_else(|| mismatch("non-numeric bytes"))?
            }

            (ColumnType::Float, Value::Double(d)) => CellValue::Float(d),
            // f32 widened to f64 would print as 0.10000000149011612
            (ColumnType::Float, Value::Float(f)) => CellValue::Decimal(f.to_string()),
            (ColumnType::Float | ColumnType::Decimal, Value::Bytes(b)) => CellValue::Decimal(
                String::from_utf8(b).map_err(|_| mismatch("non-UTF-8 bytes"))?,
            ),
            (ColumnType::Decimal, Value::Int(i)) => CellValue::Decimal(i.to_string()),
            (ColumnType::Decimal, Value::UInt(u)) => CellValue::Decimal(u.to_string()),

            (ColumnType::Date | ColumnType::DateTime, Value::Date(y, mo, d, h, mi, s, us)) => {
                CellValue::Timestamp(CalendarTimestamp {
                    year: y,
                    month: mo,
                    day: d,
                    hour: h,
                    minute: mi,
                    second: s,
                    micros: us,
                })
            }
            (ColumnType::Date | ColumnType::DateTime, Value::Bytes(b)) => {
                let text = std::str::from_utf8(&b).map_err(|_| mismatch("non-UTF-8 bytes"))?;
                CellValue::Timestamp(
                    CalendarTimestamp::parse(text).ok_or_else(|| mismatch("unparseable date"))?,
                )
            }

            (ColumnType::Time, Value::Time(negative, days, hours, minutes, seconds, micros)) => {
                CellValue::Bytes(
                    format_time(negative, days, hours, minutes, seconds, micros).into_bytes(),
                )
            }

            (ColumnType::Year, Value::Int(i)) => CellValue::Int(i),
            (ColumnType::Year, Value::UInt(u)) => CellValue::UInt(u),

            (ColumnType::Boolean, Value::Int(i)) => CellValue::Bool(i != 0),
            (ColumnType::Boolean, Value::UInt(u)) => CellValue::Bool(u != 0),
            (ColumnType::Boolean, Value::Bytes(b)) => match b.as_slice() {
                b"0" | b"false" | b"FALSE" => CellValue::Bool(false),
                b"1" | b"true" | b"TRUE" => CellValue::Bool(true),
                _ => return Err(mismatch("non-boolean bytes")),
            },

            (
                ColumnType::Time
                | ColumnType::Year
                | ColumnType::Text
                | ColumnType::Binary
                | ColumnType::Enumerated
                | ColumnType::Json,
                Value::Bytes(b),
            ) => CellValue::Bytes(b),

            (_, other) => return Err(mismatch(value_kind(&other))),
        };

        Ok(cell)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::NULL => "NULL",
        Value::Bytes(_) => "byte sequence",
        Value::Int(_) => "signed integer",
        Value::UInt(_) => "unsigned integer",
        Value::Float(_) | Value::Double(_) => "floating-point value",
        Value::Date(..) => "calendar timestamp",
        Value::Time(..) => "time interval",
    }
}

fn parse_integer(bytes: &[u8]) -> Option<CellValue> {
    let text = std::str::from_utf8(bytes).ok()?;
    if text.starts_with('-') {
        text.parse().ok().map(CellValue::Int)
    } else {
        text.parse().ok().map(CellValue::UInt)
    }
}

/// Binary-protocol TIME values carry days separately; MySQL text folds them into hours
fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let sign = if negative { "-" } else { "" };
    let total_hours = u64::from(days) * 24 + u64::from(hours);
    if micros == 0 {
        format!("{}{:02}:{:02}:{:02}", sign, total_hours, minutes, seconds)
    } else {
        format!(
            "{}{:02}:{:02}:{:02}.{:06}",
            sign, total_hours, minutes, seconds, micros
        )
    }
}

/// Escape a string for a single-quoted MySQL literal
///
/// Only newline, carriage return, single quote, and double quote are escaped.
/// Backslashes and every other character pass through unchanged.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn utf8(bytes: &[u8], column_type: ColumnType) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|_| DumpError::ValueMismatch {
        column_type,
        found: "non-UTF-8 bytes",
    })
}

/// Render one cell as literal text for an INSERT statement
///
/// # Examples
///
/// ```
/// # use seren_mysqldump::mysql::encoder::{encode_cell, CellValue, ColumnType};
/// assert_eq!(encode_cell(&CellValue::Int(-128), ColumnType::Integer).unwrap(), "-128");
/// assert_eq!(encode_cell(&CellValue::Bool(true), ColumnType::Boolean).unwrap(), "true");
/// assert_eq!(
///     encode_cell(&CellValue::Bytes(b"abc".to_vec()), ColumnType::Binary).unwrap(),
///     "0x616263"
/// );
/// ```
pub fn encode_cell(value: &CellValue, column_type: ColumnType) -> Result<String> {
    let literal = match (column_type, value) {
        (_, CellValue::Null) => "NULL".to_string(),

        (ColumnType::Integer | ColumnType::Year, CellValue::Int(i)) => i.to_string(),
        (ColumnType::Integer | ColumnType::Year, CellValue::UInt(u)) => u.to_string(),

        (ColumnType::Float, CellValue::Float(f)) => f.to_string(),
        (ColumnType::Float | ColumnType::Decimal, CellValue::Decimal(text)) => text.clone(),

        (ColumnType::Date, CellValue::Timestamp(ts)) => format!("'{}'", ts.date_literal()),
        (ColumnType::DateTime, CellValue::Timestamp(ts)) => format!("'{}'", ts.datetime_literal()),

        (ColumnType::Time, CellValue::Bytes(b)) => format!("'{}'", utf8(b, column_type)?),
        (ColumnType::Year, CellValue::Bytes(b)) => utf8(b, column_type)?.to_string(),

        (ColumnType::Text, CellValue::Bytes(b)) => {
            format!("'{}'", escape_text(utf8(b, column_type)?))
        }

        // A bare `0x` is not a literal; an empty binary string is
        (ColumnType::Binary, CellValue::Bytes(b)) if b.is_empty() => "''".to_string(),
        (ColumnType::Binary, CellValue::Bytes(b)) => format!("0x{}", hex::encode_upper(b)),

        (ColumnType::Enumerated | ColumnType::Json, CellValue::Bytes(b)) => {
            format!("'{}'", utf8(b, column_type)?)
        }

        (ColumnType::Boolean, CellValue::Bool(flag)) => flag.to_string(),

        (_, other) => {
            return Err(DumpError::ValueMismatch {
                column_type,
                found: other.kind(),
            })
        }
    };

    Ok(literal)
}

/// Name and catalog type name of one column in a table export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub type_name: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn from_column(column: &Column) -> Self {
        Self::new(column.name_str().into_owned(), database_type_name(column))
    }
}

/// Encodes rows of one table into parenthesised literal tuples
#[derive(Debug, Clone)]
pub struct RowEncoder {
    table: String,
    columns: Vec<(String, ColumnType)>,
}

impl RowEncoder {
    /// Resolve every column's literal family up front
    ///
    /// Fails on the first column whose type has no rendering rule, before any
    /// row of the table is written.
    pub fn new(table: &str, columns: &[ColumnSpec]) -> Result<Self> {
        let columns = columns
            .iter()
            .map(|spec| match ColumnType::from_type_name(&spec.type_name) {
                Some(column_type) => Ok((spec.name.clone(), column_type)),
                None => Err(DumpError::UnsupportedType {
                    table: table.to_string(),
                    column: spec.name.clone(),
                    type_name: spec.type_name.clone(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    /// ``INSERT INTO `table` (`a`,`b`) VALUES``
    pub fn insert_prefix(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|(name, _)| quote_identifier(name))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES",
            quote_identifier(&self.table),
            columns.join(",")
        )
    }

    /// Render one row as `(lit1,lit2,...)`
    pub fn encode_row(&self, values: Vec<Value>) -> Result<String> {
        debug_assert_eq!(values.len(), self.columns.len());

        let mut literals = Vec::with_capacity(values.len());
        for ((name, column_type), value) in self.columns.iter().zip(values) {
            let literal = CellValue::decode(value, *column_type)
                .and_then(|cell| encode_cell(&cell, *column_type))
                .map_err(|source| DumpError::Cell {
                    table: self.table.clone(),
                    column: name.clone(),
                    source: Box::new(source),
                })?;
            literals.push(literal);
        }

        Ok(format!("({})", literals.join(",")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [ColumnType; 12] = [
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Decimal,
        ColumnType::Date,
        ColumnType::DateTime,
        ColumnType::Time,
        ColumnType::Year,
        ColumnType::Text,
        ColumnType::Binary,
        ColumnType::Enumerated,
        ColumnType::Boolean,
        ColumnType::Json,
    ];

    /// Undo the four escapes applied by `escape_text`
    fn unescape(literal: &str) -> String {
        let inner = &literal[1..literal.len() - 1];
        let mut out = String::new();
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some(other) => out.push(other),
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_null_is_null_for_every_type() {
        for column_type in ALL_TYPES {
            assert_eq!(encode_cell(&CellValue::Null, column_type).unwrap(), "NULL");
            let decoded = CellValue::decode(Value::NULL, column_type).unwrap();
            assert_eq!(decoded, CellValue::Null);
        }
    }

    #[test]
    fn test_integer_keeps_sign() {
        assert_eq!(encode_cell(&CellValue::Int(-128), ColumnType::Integer).unwrap(), "-128");
        assert_eq!(
            encode_cell(&CellValue::UInt(u64::MAX), ColumnType::Integer).unwrap(),
            "18446744073709551615"
        );
    }

    #[test]
    fn test_integer_from_text_protocol() {
        let cell = CellValue::decode(Value::Bytes(b"-42".to_vec()), ColumnType::Integer).unwrap();
        assert_eq!(cell, CellValue::Int(-42));
        let cell = CellValue::decode(Value::Bytes(b"42".to_vec()), ColumnType::Integer).unwrap();
        assert_eq!(cell, CellValue::UInt(42));
    }

    #[test]
    fn test_float_has_no_exponent() {
        assert_eq!(encode_cell(&CellValue::Float(1e20), ColumnType::Float).unwrap(), "100000000000000000000");
        assert_eq!(encode_cell(&CellValue::Float(0.5), ColumnType::Float).unwrap(), "0.5");
    }

    #[test]
    fn test_float_text_passes_through_exponent() {
        let cell = CellValue::decode(Value::Bytes(b"1.5e-7".to_vec()), ColumnType::Float).unwrap();
        assert_eq!(encode_cell(&cell, ColumnType::Float).unwrap(), "1.5e-7");
    }

    #[test]
    fn test_single_precision_keeps_short_form() {
        let cell = CellValue::decode(Value::Float(0.1), ColumnType::Float).unwrap();
        assert_eq!(encode_cell(&cell, ColumnType::Float).unwrap(), "0.1");
    }

    #[test]
    fn test_decimal_is_verbatim() {
        let cell =
            CellValue::decode(Value::Bytes(b"12345678901234567890.000100".to_vec()), ColumnType::Decimal)
                .unwrap();
        assert_eq!(
            encode_cell(&cell, ColumnType::Decimal).unwrap(),
            "12345678901234567890.000100"
        );
    }

    #[test]
    fn test_date_literal() {
        let cell = CellValue::Timestamp(CalendarTimestamp::date(2023, 3, 17));
        assert_eq!(encode_cell(&cell, ColumnType::Date).unwrap(), "'2023-03-17'");
    }

    #[test]
    fn test_datetime_drops_fraction() {
        let cell = CellValue::decode(Value::Date(2024, 1, 15, 10, 30, 45, 123456), ColumnType::DateTime)
            .unwrap();
        assert_eq!(
            encode_cell(&cell, ColumnType::DateTime).unwrap(),
            "'2024-01-15 10:30:45'"
        );

        let cell = CellValue::decode(
            Value::Bytes(b"2024-01-15 10:30:45.5".to_vec()),
            ColumnType::DateTime,
        )
        .unwrap();
        assert_eq!(
            cell,
            CellValue::Timestamp(CalendarTimestamp {
                year: 2024,
                month: 1,
                day: 15,
                hour: 10,
                minute: 30,
                second: 45,
                micros: 500_000,
            })
        );
        assert_eq!(
            encode_cell(&cell, ColumnType::DateTime).unwrap(),
            "'2024-01-15 10:30:45'"
        );
    }

    #[test]
    fn test_zero_date_survives() {
        let cell =
            CellValue::decode(Value::Bytes(b"0000-00-00".to_vec()), ColumnType::Date).unwrap();
        assert_eq!(encode_cell(&cell, ColumnType::Date).unwrap(), "'0000-00-00'");
    }

    #[test]
    fn test_time_is_verbatim() {
        let cell = CellValue::decode(Value::Bytes(b"838:59:59".to_vec()), ColumnType::Time).unwrap();
        assert_eq!(encode_cell(&cell, ColumnType::Time).unwrap(), "'838:59:59'");

        let cell = CellValue::decode(Value::Time(true, 1, 2, 3, 4, 0), ColumnType::Time).unwrap();
        assert_eq!(encode_cell(&cell, ColumnType::Time).unwrap(), "'-26:03:04'");
    }

    #[test]
    fn test_year_is_bare() {
        let cell = CellValue::decode(Value::Bytes(b"2021".to_vec()), ColumnType::Year).unwrap();
        assert_eq!(encode_cell(&cell, ColumnType::Year).unwrap(), "2021");
        assert_eq!(encode_cell(&CellValue::UInt(1999), ColumnType::Year).unwrap(), "1999");
    }

    #[test]
    fn test_text_escapes_exactly_four_characters() {
        let cell = CellValue::Bytes(b"it's \"x\"\r\n\\t\t".to_vec());
        assert_eq!(
            encode_cell(&cell, ColumnType::Text).unwrap(),
            "'it\\'s \\\"x\\\"\\r\\n\\t\t'"
        );
    }

    #[test]
    fn test_text_escape_round_trips() {
        let samples = ["plain", "a'b", "line\nbreak", "cr\rlf\r\n", "\"quoted\"", "'\"\n\r'"];
        for sample in samples {
            let literal = encode_cell(&CellValue::Bytes(sample.as_bytes().to_vec()), ColumnType::Text)
                .unwrap();
            assert_eq!(unescape(&literal), sample, "literal {literal}");
        }
    }

    #[test]
    fn test_text_rejects_invalid_utf8() {
        let err = encode_cell(&CellValue::Bytes(vec![0xFF, 0xFE]), ColumnType::Text).unwrap_err();
        assert!(matches!(err, DumpError::ValueMismatch { .. }));
    }

    #[test]
    fn test_binary_is_upper_hex() {
        let cell = CellValue::Bytes(vec![0x61, 0x62, 0x63]);
        assert_eq!(encode_cell(&cell, ColumnType::Binary).unwrap(), "0x616263");
        let cell = CellValue::Bytes(vec![0x00, 0xAB, 0xFF]);
        assert_eq!(encode_cell(&cell, ColumnType::Binary).unwrap(), "0x00ABFF");
    }

    #[test]
    fn test_binary_hex_decodes_to_original() {
        let bytes: Vec<u8> = (0..=255).collect();
        let literal = encode_cell(&CellValue::Bytes(bytes.clone()), ColumnType::Binary).unwrap();
        let decoded = hex::decode(literal.trim_start_matches("0x")).unwrap();
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_empty_binary_is_empty_string() {
        assert_eq!(encode_cell(&CellValue::Bytes(vec![]), ColumnType::Binary).unwrap(), "''");
    }

    #[test]
    fn test_enum_and_json_are_not_escaped() {
        let cell = CellValue::Bytes(b"a'b".to_vec());
        assert_eq!(encode_cell(&cell, ColumnType::Enumerated).unwrap(), "'a'b'");
        let cell = CellValue::Bytes(br#"{"k":"v"}"#.to_vec());
        assert_eq!(encode_cell(&cell, ColumnType::Json).unwrap(), r#"'{"k":"v"}'"#);
    }

    #[test]
    fn test_boolean_literals() {
        assert_eq!(encode_cell(&CellValue::Bool(true), ColumnType::Boolean).unwrap(), "true");
        assert_eq!(encode_cell(&CellValue::Bool(false), ColumnType::Boolean).unwrap(), "false");
        let cell = CellValue::decode(Value::Bytes(b"1".to_vec()), ColumnType::Boolean).unwrap();
        assert_eq!(cell, CellValue::Bool(true));
    }

    #[test]
    fn test_mismatched_pair_is_an_error() {
        let err = encode_cell(&CellValue::Bool(true), ColumnType::Date).unwrap_err();
        assert!(err.to_string().contains("boolean"));
    }

    #[test]
    fn test_type_names_are_normalized() {
        assert_eq!(ColumnType::from_type_name("int unsigned"), Some(ColumnType::Integer));
        assert_eq!(ColumnType::from_type_name("TIMESTAMP"), Some(ColumnType::DateTime));
        assert_eq!(ColumnType::from_type_name("set"), Some(ColumnType::Enumerated));
        assert_eq!(ColumnType::from_type_name("Boolean"), Some(ColumnType::Boolean));
        assert_eq!(ColumnType::from_type_name("POINT"), None);
    }

    #[test]
    fn test_unsupported_type_names_the_type() {
        let columns = vec![
            ColumnSpec::new("id", "INT"),
            ColumnSpec::new("shape", "GEOMETRY"),
        ];
        let err = RowEncoder::new("places", &columns).unwrap_err();
        match err {
            DumpError::UnsupportedType {
                table,
                column,
                type_name,
            } => {
                assert_eq!(table, "places");
                assert_eq!(column, "shape");
                assert_eq!(type_name, "GEOMETRY");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_encode_row() {
        let columns = vec![
            ColumnSpec::new("id", "BIGINT"),
            ColumnSpec::new("name", "VARCHAR"),
            ColumnSpec::new("avatar", "BLOB"),
            ColumnSpec::new("born", "DATE"),
        ];
        let encoder = RowEncoder::new("users", &columns).unwrap();
        assert_eq!(
            encoder.insert_prefix(),
            "INSERT INTO `users` (`id`,`name`,`avatar`,`born`) VALUES"
        );

        let row = encoder
            .encode_row(vec![
                Value::Int(1),
                Value::Bytes(b"O'Neil".to_vec()),
                Value::NULL,
                Value::Bytes(b"1990-05-01".to_vec()),
            ])
            .unwrap();
        assert_eq!(row, "(1,'O\\'Neil',NULL,'1990-05-01')");
    }

    #[test]
    fn test_encode_row_reports_column() {
        let encoder = RowEncoder::new("users", &[ColumnSpec::new("age", "INT")]).unwrap();
        let err = encoder
            .encode_row(vec![Value::Bytes(b"forty".to_vec())])
            .unwrap_err();
        assert!(err.to_string().contains("`users`.`age`"));
    }
}
