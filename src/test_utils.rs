//! Test utilities shared across the codebase

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tower_lsp::lsp_types::{Position, Url};

use crate::scss::scanner::ScanReport;
use crate::scss::settings::ScssSettings;
use crate::scss::symbols::DocumentId;
use crate::scss::workspace::{ScssWorkspace, path_to_uri};

/// A workspace backed by a temporary directory
pub struct TestWorkspace {
    dir: TempDir,
    pub workspace: ScssWorkspace,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self::with_settings(ScssSettings::default())
    }

    pub fn with_settings(settings: ScssSettings) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let workspace = ScssWorkspace::new(Some(dir.path().to_path_buf()), settings);
        Self { dir, workspace }
    }

    /// Write a file relative to the workspace root
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Write several files and scan the whole workspace
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let mut test = Self::new();
        for (relative, content) in files {
            test.write(relative, content);
        }
        test.scan();
        test
    }

    /// Delete a file or a directory relative to the workspace root
    pub fn delete(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        if path.is_dir() {
            fs::remove_dir_all(&path).expect("Failed to delete directory");
        } else {
            fs::remove_file(&path).expect("Failed to delete file");
        }
        path
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn uri(&self, relative: &str) -> Url {
        path_to_uri(&self.path(relative)).expect("Valid file URL")
    }

    pub fn id(&self, relative: &str) -> DocumentId {
        self.workspace
            .graph
            .id(&self.uri(relative))
            .expect("Document is indexed")
    }

    pub fn scan(&mut self) -> ScanReport {
        self.workspace.scan_workspace()
    }

    /// Open a document in the "editor" and index it
    pub fn open(&mut self, relative: &str, content: &str) {
        let uri = self.uri(relative);
        self.workspace.documents.open(uri.clone(), content.to_string(), 1);
        self.workspace.update(&uri);
    }

    /// Position of the `nth` occurrence of `needle` in a known document, plus `delta` columns
    pub fn position(&self, relative: &str, needle: &str, nth: usize, delta: u32) -> Position {
        let uri = self.uri(relative);
        let document = self
            .workspace
            .documents
            .get(&uri)
            .expect("Document is known");
        let offset = document
            .content()
            .match_indices(needle)
            .nth(nth)
            .map(|(offset, _)| offset)
            .unwrap_or_else(|| panic!("'{}' not found in {}", needle, relative));
        let mut position = document.position_at(offset);
        position.character += delta;
        position
    }
}
