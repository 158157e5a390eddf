//! Workspace scanner
//!
//! Reads stylesheets and host documents, parses them and replaces their entries in the
//! symbol graph. A failing file never stops a scan: failures are collected in a
//! [`ScanReport`] and the remaining files are indexed.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use tower_lsp::lsp_types::Url;

use crate::language::workspace_files::{self, is_indexable};
use crate::scss::constants::{BUILTIN_MODULE_PREFIX, NODE_MODULES_PREFIX, STYLESHEET_EXTENSIONS};
use crate::scss::error::{ScssError, ScssResult};
use crate::scss::storage::DocumentEntry;
use crate::scss::symbols::{DocumentId, EdgeTarget, ModuleEdge, Symbol};
use crate::scss::syntax::{Severity, Stylesheet};
use crate::scss::workspace::{ScssWorkspace, normalize_path, path_to_uri, uri_to_path};

/// A file the scanner could not index, or indexed with errors
#[derive(Debug)]
pub struct ScanFailure {
    pub path: PathBuf,
    pub error: ScssError,
}

/// Outcome of a scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Files read and indexed
    pub indexed: usize,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.indexed += other.indexed;
        self.failures.extend(other.failures);
    }
}

/// Candidate files for a module link, in lookup order
///
/// `base` is the link joined to the directory it is resolved against.
pub fn link_candidates(base: &Path) -> Vec<PathBuf> {
    let Some(file_name) = base.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };
    let dir = base.parent().unwrap_or_else(|| Path::new(""));
    let bare = file_name.strip_prefix('_').unwrap_or(file_name);
    let partial = format!("_{}", bare);

    let extension = base.extension().and_then(|e| e.to_str());
    if extension.is_some_and(|e| STYLESHEET_EXTENSIONS.contains(&e)) {
        return vec![dir.join(&partial), dir.join(bare)];
    }

    let mut candidates = Vec::new();
    for extension in ["scss", "sass"] {
        candidates.push(dir.join(format!("{}.{}", partial, extension)));
        candidates.push(dir.join(format!("{}.{}", bare, extension)));
    }
    candidates.push(base.join("_index.scss"));
    candidates.push(base.join("index.scss"));
    candidates.push(dir.join(format!("{}.css", partial)));
    candidates.push(dir.join(format!("{}.css", bare)));
    candidates
}

impl ScssWorkspace {
    /// Walk the workspace root with the current settings and index everything found
    pub fn scan_workspace(&mut self) -> ScanReport {
        let Some(root) = self.root.clone() else {
            return ScanReport::default();
        };
        let options = self.settings.find_files_options();
        let paths = workspace_files::find_files(&root, &options);
        log::info!("Scanning {} files under {}", paths.len(), root.display());
        self.scan(&paths)
    }

    /// Index the given files, replacing whatever the graph knew about them
    ///
    /// With `scanImportedFiles` on, files reached through module links are indexed too.
    pub fn scan(&mut self, paths: &[PathBuf]) -> ScanReport {
        let mut report = ScanReport::default();
        let mut queue: VecDeque<PathBuf> = paths.iter().map(|p| normalize_path(p)).collect();
        let mut seen = HashSet::new();

        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }
            match self.scan_file(&path) {
                Ok(id) => {
                    report.indexed += 1;
                    if let Some(error) = self.parse_error(id) {
                        report.failures.push(ScanFailure {
                            path: path.clone(),
                            error,
                        });
                    }
                    if self.settings.scan_imported_files {
                        queue.extend(self.unindexed_targets(id));
                    }
                }
                Err(error) => {
                    log::warn!("Failed to index {}: {}", path.display(), error);
                    report.failures.push(ScanFailure { path, error });
                }
            }
        }
        report
    }

    fn scan_file(&mut self, path: &Path) -> ScssResult<DocumentId> {
        let uri = path_to_uri(path)?;
        if !self.documents.is_open(&uri) {
            let content = fs::read_to_string(path).map_err(|e| ScssError::io(path, e))?;
            self.documents.load(uri.clone(), content);
        }
        self.update(&uri).ok_or(ScssError::InvalidPath {
            path: path.to_path_buf(),
        })
    }

    /// Re-index one in-memory document
    ///
    /// Only the entry of this document changes; the graph is left untouched when the
    /// document is unknown.
    pub fn update(&mut self, uri: &Url) -> Option<DocumentId> {
        let stylesheet = self.documents.get(uri)?.indexed_stylesheet();
        let id = self.graph.intern(uri);
        let entry = match stylesheet {
            Some(stylesheet) => self.extract(id, uri, &stylesheet),
            None => DocumentEntry::default(),
        };
        self.graph.replace(id, entry);
        Some(id)
    }

    fn extract(&mut self, id: DocumentId, uri: &Url, stylesheet: &Stylesheet) -> DocumentEntry {
        let symbols = stylesheet
            .top_level_declarations()
            .map(|declaration| Symbol::from_declaration(id, declaration))
            .collect();
        let edges = stylesheet
            .module_rules
            .iter()
            .map(|rule| {
                let target = self.link_target(uri, &rule.link);
                ModuleEdge::from_rule(rule, target)
            })
            .collect();
        DocumentEntry { symbols, edges }
    }

    fn parse_error(&self, id: DocumentId) -> Option<ScssError> {
        let uri = self.graph.uri(id);
        let document = self.documents.get(uri)?;
        let stylesheet = document.stylesheet()?;
        let first = stylesheet
            .diagnostics
            .iter()
            .find(|d| d.severity == Severity::Error)?;
        Some(ScssError::Parse {
            uri: uri.clone(),
            message: first.message.clone(),
        })
    }

    fn unindexed_targets(&self, id: DocumentId) -> Vec<PathBuf> {
        self.graph
            .edges(id)
            .iter()
            .filter_map(ModuleEdge::target_document)
            .filter(|target| !self.graph.contains(*target))
            .filter_map(|target| uri_to_path(self.graph.uri(target)).ok())
            .filter(|path| is_indexable(path))
            .collect()
    }

    /// Where a module link written in `from` points
    pub fn link_target(&mut self, from: &Url, link: &str) -> EdgeTarget {
        if let Some(module) = link.strip_prefix(BUILTIN_MODULE_PREFIX) {
            return EdgeTarget::BuiltIn(module.to_string());
        }
        let target = self
            .resolve_link_path(from, link)
            .and_then(|path| path_to_uri(&path).ok());
        match target {
            Some(uri) => EdgeTarget::Document(self.graph.intern(&uri)),
            None => EdgeTarget::Unresolved,
        }
    }

    /// First existing file a module link can mean
    ///
    /// A candidate exists when the store has it or it is a file on disk.
    pub fn resolve_link_path(&self, from: &Url, link: &str) -> Option<PathBuf> {
        let base = match link.strip_prefix(NODE_MODULES_PREFIX) {
            Some(package) => self.node_modules()?.join(package),
            None => uri_to_path(from).ok()?.parent()?.join(link),
        };
        link_candidates(&normalize_path(&base))
            .into_iter()
            .find(|candidate| {
                let known = path_to_uri(candidate).is_ok_and(|uri| self.documents.contains(&uri));
                known || candidate.is_file()
            })
    }

    /// Handle deleted files and directories: drop documents, then re-link their dependents
    ///
    /// Returns the documents whose index changed.
    pub fn remove_paths(&mut self, paths: &[PathBuf]) -> Vec<Url> {
        let mut removed = Vec::new();
        for path in paths {
            let path = normalize_path(path);
            let under_path = |uri: &Url| uri_to_path(uri).is_ok_and(|p| p.starts_with(&path));
            // open documents keep living, the editor still has the text
            let uris: Vec<Url> = self
                .documents
                .uris()
                .filter(|uri| under_path(uri) && !self.documents.is_open(uri))
                .cloned()
                .collect();
            for uri in uris {
                self.documents.remove(&uri);
                removed.push(uri);
            }
        }
        self.forget(removed)
    }

    /// Hand a document closed in the editor back to the disk
    ///
    /// The document is reloaded from its file, or forgotten when the file is gone.
    /// Returns the documents whose index changed.
    pub fn close(&mut self, uri: &Url) -> Vec<Url> {
        let content = uri_to_path(uri)
            .ok()
            .and_then(|path| fs::read_to_string(path).ok());
        let reloaded = content.is_some();
        self.documents.close(uri, content);
        if reloaded {
            self.update(uri);
            return vec![uri.clone()];
        }
        self.forget(vec![uri.clone()])
    }

    /// Drop documents from the graph and re-link whatever depended on them
    fn forget(&mut self, removed: Vec<Url>) -> Vec<Url> {
        let mut touched = Vec::new();
        let mut dependents = Vec::new();
        for uri in removed {
            if let Some(id) = self.graph.id(&uri) {
                dependents.extend(self.graph.dependents(id));
                self.graph.remove(id);
                log::debug!("Removed {} from the index", uri);
            }
            touched.push(uri);
        }
        for dependent in dependents {
            let uri = self.graph.uri(dependent).clone();
            if self.update(&uri).is_some() && !touched.contains(&uri) {
                touched.push(uri);
            }
        }
        touched
    }

    /// Handle created or changed files: rescan them and re-link documents with dangling links
    pub fn rescan_paths(&mut self, paths: &[PathBuf]) -> ScanReport {
        let mut report = self.scan(paths);

        let dangling: Vec<Url> = self
            .graph
            .documents_with_dangling_edges()
            .into_iter()
            .map(|id| self.graph.uri(id).clone())
            .collect();
        let mut relinked = Vec::new();
        for uri in dangling {
            if let Some(id) = self.update(&uri) {
                relinked.push(id);
            }
        }
        if self.settings.scan_imported_files {
            let imported: Vec<PathBuf> = relinked
                .into_iter()
                .flat_map(|id| self.unindexed_targets(id))
                .collect();
            if !imported.is_empty() {
                report.merge(self.scan(&imported));
            }
        }
        report
    }

    /// Drop the whole index
    pub fn clear(&mut self) {
        self.documents.clear();
        self.graph.clear();
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod scanner_tests;
