//! CSV persistence for report tables.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::info;

/// Write rows as CSV with a header derived from the row type's fields.
pub fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "report written");
    Ok(())
}
