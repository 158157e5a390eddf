//! Module resolution
//!
//! Finds the declarations a reference can mean by walking the symbol graph:
//!
//! - `ns.name` goes through the `@use` edge bound to `ns` and sees what the target
//!   exports: its public symbols, what it forwards (prefixed and filtered) and what it
//!   imports. A qualified reference never falls back to anything else.
//! - `name` is looked up in the document itself first, then through `@import` edges
//!   and wildcard `@use` edges in the order they are written, depth first.
//! - Placeholders are global downstream: they are also reachable through every used module.
//! - A function that matches nothing in the workspace may be a global built-in.
//!
//! The walk only refuses documents already on its current branch: module cycles end
//! the walk, while a module reached through two sibling edges is walked once per edge
//! with that edge's own prefix and filters.

use std::collections::HashSet;

use crate::scss::builtins::{self, BuiltinMember};
use crate::scss::storage::SymbolGraph;
use crate::scss::symbols::{
    DocumentId, EdgeKind, EdgeTarget, ModuleEdge, Namespace, Symbol, forward_allows, is_private_name,
};
use crate::scss::syntax::{Reference, SymbolKind};

/// Something a reference resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Symbol(&'a Symbol),
    BuiltIn(&'static BuiltinMember),
}

impl<'a> Resolved<'a> {
    pub fn kind(&self) -> SymbolKind {
        match self {
            Resolved::Symbol(symbol) => symbol.kind,
            Resolved::BuiltIn(member) => member.kind,
        }
    }

    /// Name at the declaration site
    pub fn name(&self) -> &str {
        match self {
            Resolved::Symbol(symbol) => &symbol.name,
            Resolved::BuiltIn(member) => member.name,
        }
    }

    pub fn symbol(&self) -> Option<&'a Symbol> {
        match self {
            Resolved::Symbol(symbol) => Some(symbol),
            Resolved::BuiltIn(_) => None,
        }
    }

    /// Whether both point at the same declaration
    pub fn same_target(&self, other: &Resolved<'_>) -> bool {
        match (self, other) {
            (Resolved::Symbol(a), Resolved::Symbol(b)) => {
                a.document == b.document && a.name_span == b.name_span
            }
            (Resolved::BuiltIn(a), Resolved::BuiltIn(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

/// A symbol as seen from somewhere else, under the name it is visible as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member<'a> {
    /// Visible name without sigil, forward prefixes applied
    pub name: String,
    pub item: Resolved<'a>,
}

impl<'a> Member<'a> {
    fn symbol(symbol: &'a Symbol) -> Self {
        Self {
            name: symbol.name.clone(),
            item: Resolved::Symbol(symbol),
        }
    }

    fn builtin(member: &'static BuiltinMember) -> Self {
        Self {
            name: member.name.to_string(),
            item: Resolved::BuiltIn(member),
        }
    }

    pub fn kind(&self) -> SymbolKind {
        self.item.kind()
    }

    pub fn display_name(&self) -> String {
        self.kind().display_name(&self.name)
    }
}

pub struct Resolver<'a> {
    graph: &'a SymbolGraph,
}

impl<'a> Resolver<'a> {
    pub fn new(graph: &'a SymbolGraph) -> Self {
        Self { graph }
    }

    /// Declarations `[namespace.]name` can mean in `from`, most specific first
    pub fn resolve(
        &self,
        from: DocumentId,
        kind: SymbolKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Vec<Resolved<'a>> {
        let mut walk = Walk::new(self.graph, Some(kind));
        let members = match namespace {
            Some(namespace) => walk.namespace(from, namespace, Some(name)),
            None => walk.unqualified(from, Some(name)),
        };

        let mut found: Vec<Resolved<'a>> = Vec::new();
        for member in members.into_iter().filter(|m| m.name == name) {
            if !found.iter().any(|f| f.same_target(&member.item)) {
                found.push(member.item);
            }
        }

        if found.is_empty() && namespace.is_none() {
            if let Some(member) = builtins::lookup_global(kind, name) {
                found.push(Resolved::BuiltIn(member));
            }
        }
        found
    }

    pub fn resolve_reference(&self, from: DocumentId, reference: &Reference) -> Vec<Resolved<'a>> {
        self.resolve(from, reference.kind, reference.namespace.as_deref(), &reference.name)
    }

    /// Everything reachable as `namespace.<member>` from `from`
    pub fn namespace_members(
        &self,
        from: DocumentId,
        namespace: &str,
        kind: Option<SymbolKind>,
    ) -> Vec<Member<'a>> {
        let members = Walk::new(self.graph, kind).namespace(from, namespace, None);
        dedup(members)
    }

    /// Everything reachable without a namespace from `from`, built-in globals excluded
    pub fn visible_members(&self, from: DocumentId, kind: Option<SymbolKind>) -> Vec<Member<'a>> {
        let members = Walk::new(self.graph, kind).unqualified(from, None);
        dedup(members)
    }

    /// Namespaces bound by the `@use` rules of `from`
    pub fn namespaces(&self, from: DocumentId) -> Vec<(&'a str, &'a ModuleEdge)> {
        self.graph
            .edges(from)
            .iter()
            .filter_map(|edge| match &edge.kind {
                EdgeKind::Use {
                    namespace: Namespace::Named(namespace),
                } => Some((namespace.as_str(), edge)),
                _ => None,
            })
            .collect()
    }
}

fn dedup(members: Vec<Member<'_>>) -> Vec<Member<'_>> {
    let mut unique: Vec<Member<'_>> = Vec::with_capacity(members.len());
    for member in members {
        let seen = unique
            .iter()
            .any(|u| u.name == member.name && u.item.same_target(&member.item));
        if !seen {
            unique.push(member);
        }
    }
    unique
}

/// One traversal of the graph
///
/// `wanted` names narrow the walk to one name; `None` enumerates.
/// `path` holds the documents on the current branch only, so a module reached
/// again through a sibling edge is walked again under that edge's filters.
struct Walk<'a> {
    graph: &'a SymbolGraph,
    kind: Option<SymbolKind>,
    path: HashSet<DocumentId>,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a SymbolGraph, kind: Option<SymbolKind>) -> Self {
        Self {
            graph,
            kind,
            path: HashSet::new(),
        }
    }

    fn wants(&self, kind: SymbolKind, name: &str, wanted: Option<&str>) -> bool {
        self.kind.is_none_or(|k| k == kind) && wanted.is_none_or(|w| w == name)
    }

    /// Pushes a document on the current branch; `false` on a cycle or a missing entry
    fn enter(&mut self, id: DocumentId) -> bool {
        self.graph.contains(id) && self.path.insert(id)
    }

    fn leave(&mut self, id: DocumentId) {
        self.path.remove(&id);
    }

    fn own(&self, id: DocumentId, wanted: Option<&str>, include_private: bool) -> Vec<Member<'a>> {
        let graph = self.graph;
        graph
            .symbols(id)
            .iter()
            .filter(|s| self.wants(s.kind, &s.name, wanted))
            .filter(|s| include_private || !s.is_private())
            .map(Member::symbol)
            .collect()
    }

    fn namespace(&mut self, from: DocumentId, namespace: &str, wanted: Option<&str>) -> Vec<Member<'a>> {
        let graph = self.graph;
        let edge = graph.edges(from).iter().find(|edge| {
            matches!(&edge.kind, EdgeKind::Use { namespace: bound } if bound.matches(namespace))
        });
        let Some(edge) = edge else {
            return Vec::new();
        };
        self.path.insert(from);
        self.target_exports(&edge.target, wanted)
    }

    fn unqualified(&mut self, from: DocumentId, wanted: Option<&str>) -> Vec<Member<'a>> {
        let mut members = self.own(from, wanted, true);
        if wanted.is_some() && !members.is_empty() {
            return members;
        }
        self.path.insert(from);

        let graph = self.graph;
        for edge in graph.edges(from) {
            let found = match &edge.kind {
                EdgeKind::Import => match edge.target {
                    EdgeTarget::Document(target) => self.imported(target, wanted),
                    _ => Vec::new(),
                },
                EdgeKind::Use {
                    namespace: Namespace::Wildcard,
                } => self.target_exports(&edge.target, wanted),
                EdgeKind::Use { .. } => self.placeholders(&edge.target, wanted),
                // forwarded members are not visible in the forwarding document itself
                EdgeKind::Forward { .. } => Vec::new(),
            };
            members.extend(found);
        }
        members
    }

    fn target_exports(&mut self, target: &EdgeTarget, wanted: Option<&str>) -> Vec<Member<'a>> {
        match target {
            EdgeTarget::Document(id) => self.exported(*id, wanted),
            EdgeTarget::BuiltIn(module) => builtins::module_members(module)
                .filter(|m| self.wants(m.kind, m.name, wanted))
                .map(Member::builtin)
                .collect(),
            EdgeTarget::Unresolved => Vec::new(),
        }
    }

    /// What `@use` of `id` exposes
    fn exported(&mut self, id: DocumentId, wanted: Option<&str>) -> Vec<Member<'a>> {
        if !self.enter(id) {
            return Vec::new();
        }
        let mut members = self.own(id, wanted, false);
        let graph = self.graph;
        for edge in graph.edges(id) {
            let found = match &edge.kind {
                EdgeKind::Forward { .. } => self.forwarded(edge, wanted),
                EdgeKind::Import => match edge.target {
                    EdgeTarget::Document(target) => self.exported(target, wanted),
                    _ => Vec::new(),
                },
                EdgeKind::Use { .. } => self.placeholders(&edge.target, wanted),
            };
            members.extend(found);
        }
        self.leave(id);
        members
    }

    /// What `@import` of `id` merges into the importing document
    fn imported(&mut self, id: DocumentId, wanted: Option<&str>) -> Vec<Member<'a>> {
        if !self.enter(id) {
            return Vec::new();
        }
        let mut members = self.own(id, wanted, true);
        let graph = self.graph;
        for edge in graph.edges(id) {
            let found = match &edge.kind {
                EdgeKind::Import => match edge.target {
                    EdgeTarget::Document(target) => self.imported(target, wanted),
                    _ => Vec::new(),
                },
                EdgeKind::Forward { .. } => self.forwarded(edge, wanted),
                EdgeKind::Use { .. } => self.placeholders(&edge.target, wanted),
            };
            members.extend(found);
        }
        self.leave(id);
        members
    }

    /// Members a `@forward` edge passes on, under their outward names
    fn forwarded(&mut self, edge: &ModuleEdge, wanted: Option<&str>) -> Vec<Member<'a>> {
        let EdgeKind::Forward { prefix, show, hide } = &edge.kind else {
            return Vec::new();
        };
        let prefix = prefix.as_deref().unwrap_or("");
        let inner_wanted = match wanted {
            Some(name) => match name.strip_prefix(prefix) {
                Some(inner) => Some(inner),
                None => return Vec::new(),
            },
            None => None,
        };

        self.target_exports(&edge.target, inner_wanted)
            .into_iter()
            .filter(|member| !is_private_name(&member.name))
            .filter_map(|member| {
                let outward = format!("{}{}", prefix, member.name);
                forward_allows(member.kind(), &outward, show, hide).then_some(Member {
                    name: outward,
                    item: member.item,
                })
            })
            .collect()
    }

    /// Placeholders of a used module
    fn placeholders(&mut self, target: &EdgeTarget, wanted: Option<&str>) -> Vec<Member<'a>> {
        if self.kind.is_some_and(|k| k != SymbolKind::Placeholder) {
            return Vec::new();
        }
        let EdgeTarget::Document(id) = target else {
            return Vec::new();
        };
        let mut walk = Walk {
            graph: self.graph,
            kind: Some(SymbolKind::Placeholder),
            path: self.path.clone(),
        };
        walk.exported(*id, wanted)
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod resolver_tests;
