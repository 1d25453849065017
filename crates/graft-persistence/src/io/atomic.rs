//! Temp-file-then-rename writes.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};

/// A fully written temp file waiting to replace its target.
///
/// Until [`StagedWrite::commit`] runs, the target is untouched. Dropping a
/// staged write without committing leaves the temp file behind.
#[derive(Debug)]
#[must_use = "a staged write does nothing until it is committed"]
pub struct StagedWrite {
    temp_path: PathBuf,
    target_path: PathBuf,
}

impl StagedWrite {
    /// Write the temp file through `write`, then flush (and optionally sync) it.
    ///
    /// The file is closed before this returns, on success and on error.
    pub fn stage<F>(target_path: &Path, temp_path: &Path, sync: bool, write: F) -> Result<Self>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<()>,
    {
        if let Some(parent) = target_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .map_err(|e| PersistenceError::io("create directory", parent, e))?;
        }

        let file = File::create(temp_path)
            .map_err(|e| PersistenceError::io("create", temp_path, e))?;
        let mut writer = BufWriter::new(file);

        write(&mut writer)?;

        let file = writer
            .into_inner()
            .map_err(|e| PersistenceError::io("write", temp_path, e.into_error()))?;
        if sync {
            file.sync_all()
                .map_err(|e| PersistenceError::io("sync", temp_path, e))?;
        }

        Ok(Self {
            temp_path: temp_path.to_path_buf(),
            target_path: target_path.to_path_buf(),
        })
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Rename the temp file over the target.
    ///
    /// The rename replaces an existing target in one step, so a reader sees
    /// either the previous file or the new one.
    pub fn commit(self) -> Result<PathBuf> {
        fs::rename(&self.temp_path, &self.target_path).map_err(|source| {
            PersistenceError::AtomicWriteFailed {
                temp_path: self.temp_path.clone(),
                target_path: self.target_path.clone(),
                source,
            }
        })?;
        Ok(self.target_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn stage_bytes(target: &Path, temp: &Path, bytes: &[u8], sync: bool) -> Result<StagedWrite> {
        StagedWrite::stage(target, temp, sync, |writer| {
            writer
                .write_all(bytes)
                .map_err(|e| PersistenceError::io("write", temp, e))
        })
    }

    #[test]
    fn test_uncommitted_write_leaves_target_untouched() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("state.xml");
        let temp = dir.path().join("state.tmp");
        fs::write(&target, "old").unwrap();

        let staged = stage_bytes(&target, &temp, b"new", false).unwrap();
        drop(staged);

        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
        assert_eq!(fs::read_to_string(&temp).unwrap(), "new");
    }

    #[test]
    fn test_commit_replaces_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("state.xml");
        let temp = dir.path().join("state.tmp");
        fs::write(&target, "old").unwrap();

        let staged = stage_bytes(&target, &temp, b"new", true).unwrap();
        assert_eq!(staged.target_path(), target);
        let written = staged.commit().unwrap();

        assert_eq!(written, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!temp.exists());
    }

    #[test]
    fn test_failed_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("state.xml");
        let temp = dir.path().join("state.tmp");
        fs::write(&target, "old").unwrap();

        let result = StagedWrite::stage(&target, &temp, false, |_| {
            Err(PersistenceError::MissingFileName)
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");
    }

    #[test]
    fn test_stage_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b").join("state.xml");
        let temp = target.with_extension("tmp");

        stage_bytes(&target, &temp, b"x", false).unwrap().commit().unwrap();
        assert!(target.exists());
    }
}
