use std::fs;
use std::path::Path;

use tracing::info;

use crate::models::Data;
use crate::DbError;

/// Load a snapshot, or `None` if the file does not exist yet.
pub fn read(path: &Path) -> Result<Option<Data>, DbError> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read(path)?;
    let data: Data = serde_json::from_slice(&raw)?;

    info!(
        "Loaded snapshot from {} ({} users, {} channels, {} dms)",
        path.display(),
        data.users.len(),
        data.channels.len(),
        data.dms.len()
    );
    Ok(Some(data))
}

/// Write the snapshot next to the target and rename it over, so a crash
/// mid-write leaves the previous snapshot intact.
pub fn write(path: &Path, data: &Data) -> Result<(), DbError> {
    let json = serde_json::to_vec(data)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
