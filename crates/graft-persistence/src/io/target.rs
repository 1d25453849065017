//! Save destination reconciliation.

use std::path::{Path, PathBuf};

use crate::error::{PersistenceError, Result};

/// Where a save writes and what it renames into place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTarget {
    /// File name the object should carry after the save.
    pub file_name: String,
    /// Final destination.
    pub path: PathBuf,
    /// Sibling written first and renamed over `path`.
    pub temp_path: PathBuf,
}

/// Combine an object's stored file name with a save destination.
///
/// - A destination with an extension names a file; only its directory is
///   kept and the stored name is reduced to its bare file name.
/// - A destination without an extension is a directory.
/// - A stored name that already exists on disk is reduced to its bare name.
///
/// The stored name always wins over the destination's own file name. An
/// empty result is [`PersistenceError::MissingFileName`].
pub fn reconcile_save_target(
    stored_name: &str,
    destination: &Path,
    temp_extension: &str,
) -> Result<SaveTarget> {
    let mut file_name = stored_name.to_string();
    let mut directory = destination.to_path_buf();

    if destination.extension().is_some() {
        file_name = bare_name(&file_name);
        directory = destination
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
    }
    if Path::new(&file_name).exists() {
        file_name = bare_name(&file_name);
    }
    if file_name.is_empty() {
        return Err(PersistenceError::MissingFileName);
    }

    let path = directory.join(&file_name);
    let mut temp_path = path.with_extension(temp_extension);
    if temp_path == path {
        temp_path = path.with_extension(format!("{temp_extension}.{temp_extension}"));
    }

    Ok(SaveTarget {
        file_name,
        path,
        temp_path,
    })
}

fn bare_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_with_extension_keeps_stored_name() {
        let target =
            reconcile_save_target("nested/settings.xml", Path::new("out/other.xml"), "tmp").unwrap();
        assert_eq!(target.file_name, "settings.xml");
        assert_eq!(target.path, Path::new("out/settings.xml"));
        assert_eq!(target.temp_path, Path::new("out/settings.tmp"));
    }

    #[test]
    fn test_destination_without_extension_is_directory() {
        let target = reconcile_save_target("cfg.xml", Path::new("out"), "tmp").unwrap();
        assert_eq!(target.path, Path::new("out/cfg.xml"));
        assert_eq!(target.temp_path, Path::new("out/cfg.tmp"));
    }

    #[test]
    fn test_bare_destination_file() {
        let target = reconcile_save_target("cfg.xml", Path::new("cfg.xml"), "tmp").unwrap();
        assert_eq!(target.path, Path::new("cfg.xml"));
        assert_eq!(target.temp_path, Path::new("cfg.tmp"));
    }

    #[test]
    fn test_existing_stored_path_reduced_to_bare_name() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("doc.xml");
        std::fs::write(&existing, "<Doc/>").unwrap();
        let out = dir.path().join("out");

        let target = reconcile_save_target(existing.to_str().unwrap(), &out, "tmp").unwrap();
        assert_eq!(target.file_name, "doc.xml");
        assert_eq!(target.path, out.join("doc.xml"));
    }

    #[test]
    fn test_missing_file_name() {
        let result = reconcile_save_target("", Path::new("out/cfg.xml"), "tmp");
        assert!(matches!(result, Err(PersistenceError::MissingFileName)));

        let result = reconcile_save_target("", Path::new("out"), "tmp");
        assert!(matches!(result, Err(PersistenceError::MissingFileName)));
    }

    #[test]
    fn test_temp_never_collides_with_target() {
        let target = reconcile_save_target("queue.tmp", Path::new("spool"), "tmp").unwrap();
        assert_eq!(target.path, Path::new("spool/queue.tmp"));
        assert_eq!(target.temp_path, Path::new("spool/queue.tmp.tmp"));
    }
}
