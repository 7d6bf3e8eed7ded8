//! JSON snapshots of extracted obligations
//!
//! A snapshot is a plain JSON array of obligation objects with every enum
//! and date written as its display string.

use crate::models::Obligation;
use crate::Result;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write `obligations` to `path`, creating parent directories as needed
pub fn save_snapshot(path: impl AsRef<Path>, obligations: &[Obligation]) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, obligations)?;
    writer.flush()?;

    info!(path = %path.display(), count = obligations.len(), "Snapshot written");
    Ok(())
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vec<Obligation>> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    Ok(serde_json::from_reader(reader)?)
}
