// ABOUTME: Source command - replays a dump file against a MySQL database
// ABOUTME: Confirms with the user before touching a live server

use crate::config::SourceConfig;
use crate::mysql::redact_url;
use anyhow::{bail, Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Replay the dump at `input` (`-` for stdin) into `target`
///
/// Asks for confirmation unless `yes` is set or the run is a dry run.
pub async fn source(target: &str, input: &Path, config: SourceConfig, yes: bool) -> Result<()> {
    let reader: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(input)
            .with_context(|| format!("Failed to open dump file {}", input.display()))?;
        Box::new(BufReader::new(file))
    };

    if !yes && !config.dry_run {
        let database = crate::mysql::resolve_database(target, config.database.as_deref())?;
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Replay {} into database '{}' on {}?",
                input.display(),
                database,
                redact_url(target)
            ))
            .default(false)
            .interact()
            .context("Failed to get confirmation")?;

        if !confirmed {
            tracing::warn!("⚠ User cancelled operation");
            bail!("Replay cancelled by user");
        }
    }

    crate::source::source(target, reader, &config)
        .await
        .with_context(|| format!("Failed to replay {}", input.display()))?;

    Ok(())
}
