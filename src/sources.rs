//! Finding and reading tag files on disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::catalog::{CatalogError, LoadReport, Source, TagCatalog};

const EXTENSIONS: [&str; 2] = ["yml", "yaml"];

/// Where tags come from: a directory searched recursively plus explicit files.
/// Reloading reads the same set again.
#[derive(Clone, Debug, Default)]
pub struct SourceSet {
    pub dir: Option<PathBuf>,
    pub files: Vec<PathBuf>,
}

impl SourceSet {
    pub fn new(dir: Option<PathBuf>, files: Vec<PathBuf>) -> Self {
        Self { dir, files }
    }

    /// Reads and parses every tag file. Nothing here is fatal: unreadable
    /// directories and files end up in the report's warnings.
    pub fn load(&self) -> LoadReport {
        let mut warnings = Vec::new();
        let mut paths = Vec::new();

        if let Some(dir) = &self.dir {
            if dir.is_dir() {
                match collect(dir) {
                    Ok(found) => {
                        info!("Found {} tag files in {}", found.len(), dir.display());
                        paths.extend(found);
                    }
                    Err(err) => {
                        warn!("Failed to scan tag directory {}: {:#}", dir.display(), err);
                        warnings.push(CatalogError::Unreadable {
                            id: dir.display().to_string(),
                            message: format!("{err:#}"),
                        });
                    }
                }
            } else {
                warn!("Tag directory not found: {}", dir.display());
            }
        }
        paths.extend(self.files.iter().cloned());

        let (sources, unreadable) = read_sources(&paths);
        warnings.extend(unreadable);

        let mut report = TagCatalog::load(sources);
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        report
    }
}

/// All `*.yml` and `*.yaml` files below `dir`, sorted by path.
pub fn collect(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect_into(dir, &mut found)?;
    found.sort();
    Ok(found)
}

fn collect_into(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read entry in {}", dir.display()))?
            .path();
        if path.is_dir() {
            collect_into(&path, found)?;
        } else if is_tag_file(&path) {
            found.push(path);
        }
    }
    Ok(())
}

fn is_tag_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Reads each path into a [`Source`]; files that cannot be read are reported
/// instead.
pub fn read_sources(paths: &[PathBuf]) -> (Vec<Source>, Vec<CatalogError>) {
    let mut sources = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for path in paths {
        let id = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(content) => sources.push(Source::new(id, content)),
            Err(err) => {
                warn!("Failed to read tag file {}: {}", id, err);
                failures.push(CatalogError::Unreadable {
                    id,
                    message: err.to_string(),
                });
            }
        }
    }
    (sources, failures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, relative: &str, content: &str) -> PathBuf {
        let path = dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn collect_walks_subdirectories_and_filters_extensions() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "b.yml", "- x\n");
        write(tmp.path(), "nested/a.YAML", "- y\n");
        write(tmp.path(), "notes.txt", "ignored");

        let found = collect(tmp.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["b.yml", "a.YAML"]);
    }

    #[test]
    fn load_combines_directory_and_explicit_files() {
        let tmp = tempfile::tempdir().unwrap();
        let tags = tmp.path().join("tags");
        write(&tags, "hair.yml", "color: [red, blue]\n");
        let extra = write(tmp.path(), "extra/poses.yaml", "- sitting\n");

        let report = SourceSet::new(Some(tags), vec![extra]).load();
        assert!(report.warnings.is_empty());
        assert_eq!(report.catalog.names(), vec!["hair", "poses"]);
    }

    #[test]
    fn missing_directory_gives_empty_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        let report = SourceSet::new(Some(tmp.path().join("absent")), Vec::new()).load();
        assert!(report.catalog.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn unreadable_and_malformed_files_become_warnings() {
        let tmp = tempfile::tempdir().unwrap();
        let good = write(tmp.path(), "good.yml", "- ok\n");
        let bad = write(tmp.path(), "bad.yml", "{ nope\n");
        let missing = tmp.path().join("missing.yml");

        let report = SourceSet::new(None, vec![missing, bad, good]).load();
        assert_eq!(report.catalog.names(), vec!["good"]);
        assert_eq!(report.warnings.len(), 2);
        assert!(matches!(report.warnings[0], CatalogError::Unreadable { .. }));
        assert!(matches!(report.warnings[1], CatalogError::Parse { .. }));
    }

    #[test]
    fn reload_reflects_changes_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let set = SourceSet::new(Some(tmp.path().to_path_buf()), Vec::new());
        write(tmp.path(), "one.yml", "- a\n");
        assert_eq!(set.load().catalog.names(), vec!["one"]);

        fs::remove_file(tmp.path().join("one.yml")).unwrap();
        write(tmp.path(), "two.yml", "- b\n");
        assert_eq!(set.load().catalog.names(), vec!["two"]);
    }
}
