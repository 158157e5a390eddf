//! SCSS workspace
//!
//! Bundles the document store, the symbol graph and the settings they are built with.
//! Scanning lives in [`crate::scss::scanner`], queries in the provider modules.

use std::path::{Component, Path, PathBuf};

use tower_lsp::lsp_types::{Location, Position, Url};

use crate::scss::document::ScssDocument;
use crate::scss::document_manager::DocumentStore;
use crate::scss::error::{ScssError, ScssResult};
use crate::scss::settings::ScssSettings;
use crate::scss::storage::SymbolGraph;
use crate::scss::symbols::DocumentId;
use crate::scss::syntax::{Span, Stylesheet};

#[derive(Debug, Default)]
pub struct ScssWorkspace {
    pub root: Option<PathBuf>,
    pub settings: ScssSettings,
    pub documents: DocumentStore,
    pub graph: SymbolGraph,
}

/// A document position resolved for a query
pub struct QueryContext<'a> {
    pub document: &'a ScssDocument,
    pub id: Option<DocumentId>,
    pub stylesheet: &'a Stylesheet,
    /// Text the stylesheet was parsed from
    pub text: &'a str,
    /// Byte offset of the query position
    pub offset: usize,
}

impl ScssWorkspace {
    pub fn new(root: Option<PathBuf>, settings: ScssSettings) -> Self {
        Self {
            root,
            settings,
            documents: DocumentStore::new(),
            graph: SymbolGraph::new(),
        }
    }

    /// Everything a provider needs about a position
    ///
    /// `None` when the document is unknown, has no stylesheet, or the position is
    /// outside the style region of a host document.
    pub fn query(&self, uri: &Url, position: Position) -> Option<QueryContext<'_>> {
        let document = self.documents.get(uri)?;
        let stylesheet = document.stylesheet()?;
        let text = document.stylesheet_text()?;
        let offset = document.stylesheet_offset_at(position)?;
        Some(QueryContext {
            document,
            id: self.graph.id(uri),
            stylesheet,
            text,
            offset,
        })
    }

    pub fn document_of(&self, id: DocumentId) -> Option<&ScssDocument> {
        self.documents.get(self.graph.uri(id))
    }

    /// Editor location of a span in an indexed document
    pub fn location_of(&self, id: DocumentId, span: &Span) -> Option<Location> {
        let uri = self.graph.uri(id);
        let document = self.documents.get(uri)?;
        Some(Location::new(uri.clone(), document.range_of(span)))
    }

    /// Path of the `~` link root
    pub fn node_modules(&self) -> Option<PathBuf> {
        self.root.as_ref().map(|root| root.join("node_modules"))
    }
}

pub fn path_to_uri(path: &Path) -> ScssResult<Url> {
    Url::from_file_path(path).map_err(|_| ScssError::InvalidPath {
        path: path.to_path_buf(),
    })
}

pub fn uri_to_path(uri: &Url) -> ScssResult<PathBuf> {
    uri.to_file_path()
        .map_err(|_| ScssError::InvalidUri { uri: uri.clone() })
}

/// Resolve `.` and `..` components without touching the file system
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Path of `target` relative to the directory `from`, with forward slashes
pub fn relative_path(from: &Path, target: &Path) -> String {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = target.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }
    parts.join("/")
}

/// How a document is named to the user relative to another document
pub fn display_path(from: &Url, target: &Url) -> String {
    let paths = uri_to_path(from).ok().zip(uri_to_path(target).ok());
    match paths {
        Some((from, target)) => match from.parent() {
            Some(dir) => relative_path(dir, &target),
            None => target.to_string_lossy().into_owned(),
        },
        None => target
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
    }
}
