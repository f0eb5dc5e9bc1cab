// ABOUTME: Small helpers shared by the dump and replay paths
// ABOUTME: Identifier quoting, log-safe previews, and duration formatting

use std::time::Duration;

const PREVIEW_CHARS: usize = 200;

/// Quote a MySQL identifier with back-ticks
///
/// Embedded back-ticks are doubled, which is the only escaping MySQL applies
/// inside a quoted identifier.
///
/// # Examples
///
/// ```
/// # use seren_mysqldump::utils::quote_identifier;
/// assert_eq!(quote_identifier("users"), "`users`");
/// assert_eq!(quote_identifier("odd`name"), "`odd``name`");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Sanitize an identifier (table name, database name) for display
///
/// Removes control characters and limits length so log lines stay on one line.
///
/// # Examples
///
/// ```
/// # use seren_mysqldump::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("normal_table"), "normal_table");
/// assert_eq!(sanitize_identifier("table\nname"), "tablename");
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}

/// Shorten statement text for error messages and log lines
///
/// Merged inserts can run to megabytes; only the head is shown, followed by
/// the total length.
pub fn preview_statement(statement: &str) -> String {
    let mut chars = statement.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        None => statement.to_string(),
        Some((cut, _)) => format!(
            "{}... ({} bytes total)",
            &statement[..cut],
            statement.len()
        ),
    }
}

/// Format an elapsed duration for the dump footer and summary logs
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// # use seren_mysqldump::utils::format_duration;
/// assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.500s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs == 0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60 {
        format!("{:.3}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{}h{}m{}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
