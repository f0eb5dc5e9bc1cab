// ABOUTME: Dump command - exports MySQL databases to a file or stdout
// ABOUTME: Opens the output sink and reports totals

use crate::config::DumpConfig;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Dump the selected databases of `target` to `output`, or stdout when `None`
pub async fn dump(target: &str, config: DumpConfig, output: Option<&Path>) -> Result<()> {
    let sink: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create dump file {}", path.display()))?;
            tracing::info!("Writing dump to {}", path.display());
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let stats = crate::dump::dump(target, &config, sink)
        .await
        .context("Dump failed")?;

    tracing::info!(
        "✓ Dumped {} database(s): {} table(s), {} view(s), {} row(s)",
        stats.databases,
        stats.tables,
        stats.views,
        stats.rows
    );

    Ok(())
}
