//! SCSS Document Store
//!
//! Holds every known document, open in the editor or loaded from disk, and keeps
//! track of who owns its text.

use std::collections::HashMap;

use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, Url};

use crate::language::document::DocumentVersion;
use crate::language::embedded::LanguageKind;
use crate::scss::document::ScssDocument;
use crate::scss::parser::ScssParser;

/// Document store for stylesheet and host documents
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Url, ScssDocument>,
    parser: ScssParser,
}

impl DocumentStore {
    /// Create a new document store
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a document in the editor, taking ownership of its text away from the disk
    pub fn open(&mut self, uri: Url, content: String, client_version: i32) -> Option<&ScssDocument> {
        let kind = LanguageKind::from_uri(&uri)?;
        match self.documents.get_mut(&uri) {
            Some(document) => {
                // keep the document so its last good outline survives
                let version = document.version.next_major().with_client_version(client_version);
                document.is_open = true;
                document.set_content(content, version, &self.parser);
            }
            None => {
                let version = DocumentVersion::default()
                    .next_major()
                    .with_client_version(client_version);
                let mut document = ScssDocument::new(uri.clone(), kind, content, version);
                document.is_open = true;
                document.parse(&self.parser);
                self.documents.insert(uri.clone(), document);
            }
        }
        self.documents.get(&uri)
    }

    /// Update an open document with incremental changes
    pub fn update(
        &mut self,
        uri: &Url,
        changes: Vec<TextDocumentContentChangeEvent>,
        client_version: i32,
    ) -> Option<&ScssDocument> {
        let document = self.documents.get_mut(uri)?;
        let version = document.version.with_client_version(client_version);
        document.apply_changes(changes, version, &self.parser);
        Some(&*document)
    }

    /// Hand a document back to the disk
    ///
    /// With `disk_content` the document is reloaded from it, without it (the file
    /// is gone) the document is dropped.
    pub fn close(&mut self, uri: &Url, disk_content: Option<String>) {
        match disk_content {
            Some(content) => {
                if let Some(document) = self.documents.get_mut(uri) {
                    document.is_open = false;
                    let version = document.version.next_major();
                    document.set_content(content, version, &self.parser);
                }
            }
            None => {
                self.documents.remove(uri);
            }
        }
    }

    /// Store text read from disk
    ///
    /// Open documents are left alone, the editor has the newer text.
    /// Returns `false` when the document was not touched.
    pub fn load(&mut self, uri: Url, content: String) -> bool {
        let Some(kind) = LanguageKind::from_uri(&uri) else {
            return false;
        };
        match self.documents.get_mut(&uri) {
            Some(document) if document.is_open => false,
            Some(document) => {
                let version = document.version.next_major();
                document.set_content(content, version, &self.parser);
                true
            }
            None => {
                let version = DocumentVersion::default().next_major();
                let mut document = ScssDocument::new(uri.clone(), kind, content, version);
                document.parse(&self.parser);
                self.documents.insert(uri, document);
                true
            }
        }
    }

    /// Drop a document regardless of who owns it
    pub fn remove(&mut self, uri: &Url) -> Option<ScssDocument> {
        self.documents.remove(uri)
    }

    /// Get a document reference
    pub fn get(&self, uri: &Url) -> Option<&ScssDocument> {
        self.documents.get(uri)
    }

    pub fn contains(&self, uri: &Url) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn is_open(&self, uri: &Url) -> bool {
        self.documents.get(uri).is_some_and(|d| d.is_open)
    }

    pub fn version(&self, uri: &Url) -> Option<DocumentVersion> {
        self.documents.get(uri).map(|d| d.version)
    }

    /// Get all document URIs
    pub fn uris(&self) -> impl Iterator<Item = &Url> {
        self.documents.keys()
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{Position, Range};

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///ws/{}", name)).unwrap()
    }

    #[test]
    fn test_open_update_close() {
        let mut store = DocumentStore::new();
        let a = uri("a.scss");

        store.load(a.clone(), "$a: 1;".to_string());
        let disk_version = store.version(&a).unwrap();

        store.open(a.clone(), "$a: 2;".to_string(), 1);
        assert!(store.is_open(&a));
        let opened = store.version(&a).unwrap();
        assert!(opened > disk_version);

        let change = TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(0, 4), Position::new(0, 5))),
            range_length: None,
            text: "3".to_string(),
        };
        store.update(&a, vec![change], 2);
        assert_eq!(store.get(&a).unwrap().content(), "$a: 3;");
        assert!(store.version(&a).unwrap() > opened);

        store.close(&a, Some("$a: 1;".to_string()));
        let closed = store.get(&a).unwrap();
        assert!(!closed.is_open);
        assert_eq!(closed.content(), "$a: 1;");
        assert_eq!(closed.version.minor, 0);
    }

    #[test]
    fn test_disk_load_does_not_override_open_document() {
        let mut store = DocumentStore::new();
        let a = uri("a.scss");
        store.open(a.clone(), "$editor: 1;".to_string(), 3);

        assert!(!store.load(a.clone(), "$disk: 1;".to_string()));
        assert_eq!(store.get(&a).unwrap().content(), "$editor: 1;");
    }

    #[test]
    fn test_unknown_languages_are_ignored() {
        let mut store = DocumentStore::new();
        assert!(store.open(uri("a.less"), String::new(), 1).is_none());
        assert!(!store.load(uri("a.txt"), String::new()));
    }

    #[test]
    fn test_close_deleted_file_drops_document() {
        let mut store = DocumentStore::new();
        let a = uri("a.scss");
        store.open(a.clone(), "$a: 1;".to_string(), 1);
        store.close(&a, None);
        assert!(!store.contains(&a));
    }
}
