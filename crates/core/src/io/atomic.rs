//! All-or-nothing file replacement
//!
//! Outputs are encoded into a temporary file created in the destination
//! directory and renamed over the target only when encoding succeeded. A
//! failed write leaves the previous file (if any) untouched.

use crate::error::{Error, Result};
use std::fs::{self, File};
use std::path::Path;

/// Write `path` through `write`, replacing any existing file atomically.
///
/// Parent directories are created when missing.
pub fn write_atomically<P, F>(path: P, write: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut File) -> Result<()>,
{
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".biasgrid-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.csv");
        fs::write(&path, "GRIDMET_ID\n1\n").unwrap();

        let result = write_atomically(&path, |file| {
            file.write_all(b"partial")?;
            Err(Error::Other("encoder failed".into()))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "GRIDMET_ID\n1\n");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spatial").join("grid.geojson");

        write_atomically(&path, |file| Ok(file.write_all(b"{}")?)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
