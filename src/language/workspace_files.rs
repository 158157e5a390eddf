//! Workspace file enumeration
//!
//! Finds the stylesheet and component files the scanner indexes at startup.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use ignore::overrides::OverrideBuilder;

use crate::language::embedded::LanguageKind;

/// Options for a workspace walk
#[derive(Debug, Clone)]
pub struct FindFilesOptions {
    /// Maximum directory depth below the root, `None` for unlimited
    pub max_depth: Option<usize>,
    /// Globs relative to the root; matching files and directories are skipped
    pub exclude: Vec<String>,
}

/// Whether a path has an extension the scanner knows how to index
pub fn is_indexable(path: &Path) -> bool {
    LanguageKind::from_path(path).is_some()
}

/// Walk the workspace root and collect every indexable file
///
/// Unreadable directory entries and invalid exclude globs are logged and skipped.
pub fn find_files(root: &Path, options: &FindFilesOptions) -> Vec<PathBuf> {
    let mut overrides = OverrideBuilder::new(root);
    for glob in &options.exclude {
        if let Err(e) = overrides.add(&format!("!{}", glob)) {
            log::warn!("Ignoring invalid exclude glob '{}': {}", glob, e);
        }
    }

    let mut walker = WalkBuilder::new(root);
    walker
        .standard_filters(false)
        .hidden(true)
        .follow_links(false)
        .max_depth(options.max_depth);

    match overrides.build() {
        Ok(overrides) => {
            walker.overrides(overrides);
        }
        Err(e) => log::warn!("Failed to build exclude globs: {}", e),
    }

    let mut files = Vec::new();
    for result in walker.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                log::debug!("Skipping unreadable entry while scanning workspace: {}", e);
                continue;
            }
        };

        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
        if is_file && is_indexable(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_find_files_filters_extensions_and_excludes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "main.scss");
        touch(root, "styles/_variables.scss");
        touch(root, "components/App.vue");
        touch(root, "components/App.ts");
        touch(root, "node_modules/lib/_index.scss");
        touch(root, "plain.css");

        let options = FindFilesOptions {
            max_depth: None,
            exclude: vec!["**/node_modules/**".to_string()],
        };
        let files: Vec<String> = find_files(root, &options)
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();

        assert_eq!(files, vec!["components/App.vue", "main.scss", "styles/_variables.scss"]);
    }

    #[test]
    fn test_find_files_respects_depth() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "a.scss");
        touch(root, "one/b.scss");
        touch(root, "one/two/c.scss");

        let options = FindFilesOptions {
            max_depth: Some(2),
            exclude: Vec::new(),
        };
        let files = find_files(root, &options);

        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| !p.ends_with("c.scss")));
    }
}
