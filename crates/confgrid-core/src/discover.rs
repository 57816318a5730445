// ── Candidate file discovery ──

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::CoreError;

/// Extensions never treated as configuration dumps: our own workbook output
/// and its in-progress temp file.
const OUTPUT_EXTENSIONS: [&str; 2] = ["xlsx", "tmp"];

/// Files below `root` whose file name contains `filter`, sorted by path.
///
/// Matching is case-insensitive unless `case_sensitive` is set. An empty
/// filter accepts every file. Unreadable directory entries are logged and
/// skipped.
pub fn find_files(root: &Path, filter: &str, case_sensitive: bool) -> Result<Vec<PathBuf>, CoreError> {
    if !root.is_dir() {
        return Err(CoreError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let needle = if case_sensitive {
        filter.to_owned()
    } else {
        filter.to_lowercase()
    };

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| !is_output_artifact(entry.path()))
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            if case_sensitive {
                name.contains(&needle)
            } else {
                name.to_lowercase().contains(&needle)
            }
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "discovered candidate files");
    Ok(files)
}

fn is_output_artifact(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| OUTPUT_EXTENSIONS.iter().any(|o| ext.eq_ignore_ascii_case(o)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    fn names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn filters_by_file_name_recursively() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b-Config.txt");
        touch(dir.path(), "site/a-config.txt");
        touch(dir.path(), "readme.md");
        touch(dir.path(), "config-output.xlsx");
        touch(dir.path(), "config-output.xlsx.tmp");

        let found = find_files(dir.path(), "config", false).unwrap();
        assert_eq!(names(dir.path(), &found), ["b-Config.txt", "site/a-config.txt"]);
    }

    #[test]
    fn case_sensitive_matching() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "sw1-Config.txt");
        touch(dir.path(), "sw2-config.txt");

        let found = find_files(dir.path(), "config", true).unwrap();
        assert_eq!(names(dir.path(), &found), ["sw2-config.txt"]);
    }

    #[test]
    fn directory_names_do_not_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "configs/sw1.txt");
        assert!(find_files(dir.path(), "config", false).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_files(&dir.path().join("nope"), "config", false).unwrap_err();
        assert!(matches!(err, CoreError::DirectoryNotFound { .. }));
    }
}
