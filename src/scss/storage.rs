//! Symbol graph
//!
//! The workspace wide index. Documents are interned to [`DocumentId`]s once and never
//! forgotten, so edges can name a document that is not (or no longer) indexed. Such
//! edges resolve to nothing until the document gets an entry again.

use std::collections::{BTreeSet, HashMap};

use tower_lsp::lsp_types::Url;

use crate::scss::symbols::{DocumentId, EdgeTarget, ModuleEdge, Symbol};

/// Symbols and edges of one document, from one parse generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentEntry {
    pub symbols: Vec<Symbol>,
    pub edges: Vec<ModuleEdge>,
}

#[derive(Debug, Default)]
pub struct SymbolGraph {
    ids: HashMap<Url, DocumentId>,
    uris: Vec<Url>,
    entries: HashMap<DocumentId, DocumentEntry>,
    /// Target document -> documents with an edge to it
    dependents: HashMap<DocumentId, BTreeSet<DocumentId>>,
}

impl SymbolGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity of a URI, allocating one on first sight
    pub fn intern(&mut self, uri: &Url) -> DocumentId {
        if let Some(id) = self.ids.get(uri) {
            return *id;
        }
        let id = DocumentId(self.uris.len());
        self.uris.push(uri.clone());
        self.ids.insert(uri.clone(), id);
        id
    }

    pub fn id(&self, uri: &Url) -> Option<DocumentId> {
        self.ids.get(uri).copied()
    }

    pub fn uri(&self, id: DocumentId) -> &Url {
        &self.uris[id.0]
    }

    /// Replace everything known about a document in one step
    pub fn replace(&mut self, id: DocumentId, entry: DocumentEntry) {
        self.unlink(id);
        for target in entry.edges.iter().filter_map(ModuleEdge::target_document) {
            self.dependents.entry(target).or_default().insert(id);
        }
        self.entries.insert(id, entry);
    }

    /// Drop a document's symbols and outgoing edges
    pub fn remove(&mut self, id: DocumentId) -> Option<DocumentEntry> {
        self.unlink(id);
        self.entries.remove(&id)
    }

    fn unlink(&mut self, id: DocumentId) {
        let Some(old) = self.entries.get(&id) else {
            return;
        };
        for target in old.edges.iter().filter_map(ModuleEdge::target_document) {
            if let Some(consumers) = self.dependents.get_mut(&target) {
                consumers.remove(&id);
                if consumers.is_empty() {
                    self.dependents.remove(&target);
                }
            }
        }
    }

    pub fn entry(&self, id: DocumentId) -> Option<&DocumentEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: DocumentId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn symbols(&self, id: DocumentId) -> &[Symbol] {
        self.entries.get(&id).map(|e| e.symbols.as_slice()).unwrap_or(&[])
    }

    pub fn edges(&self, id: DocumentId) -> &[ModuleEdge] {
        self.entries.get(&id).map(|e| e.edges.as_slice()).unwrap_or(&[])
    }

    /// Documents with an edge pointing at `id`, in id order
    pub fn dependents(&self, id: DocumentId) -> impl Iterator<Item = DocumentId> + '_ {
        self.dependents.get(&id).into_iter().flatten().copied()
    }

    /// Indexed documents in id order
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.entries.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Every indexed symbol, documents in id order
    pub fn all_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.documents()
            .into_iter()
            .flat_map(move |id| self.symbols(id).iter())
    }

    /// Indexed documents with at least one edge that does not reach an indexed document
    pub fn documents_with_dangling_edges(&self) -> Vec<DocumentId> {
        self.documents()
            .into_iter()
            .filter(|&id| {
                self.edges(id).iter().any(|edge| match edge.target {
                    EdgeTarget::Unresolved => true,
                    EdgeTarget::Document(target) => !self.contains(target),
                    EdgeTarget::BuiltIn(_) => false,
                })
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dependents.clear();
    }
}
