//! SCSS Completion Provider
//!
//! Completion is driven by the text in front of the cursor on the current line:
//! - `@annotation` names in `///` SassDoc comments
//! - module paths in `@use`, `@forward` and `@import` strings
//! - mixins after `@include`, placeholders after `@extend`
//! - members of a namespace after `ns.`
//! - variables after `$`, variables and functions in values

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Documentation, MarkupContent, MarkupKind,
    Position, TextEdit, Url,
};

use crate::language::regex_cache::cached_regex;
use crate::scss::builtins::{self, BuiltinMember};
use crate::scss::constants::{NODE_MODULES_PREFIX, STYLESHEET_EXTENSIONS};
use crate::scss::hover::{builtin_markdown, declaration_markdown};
use crate::scss::resolver::{Member, Resolved, Resolver};
use crate::scss::settings::ScssSettings;
use crate::scss::syntax::{ModuleRuleKind, SymbolKind};
use crate::scss::workspace::{QueryContext, ScssWorkspace, display_path, uri_to_path};

/// What is being completed, with the byte offset the completed word starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum CompletionType {
    SassDoc { start: usize },
    ModulePath {
        rule: ModuleRuleKind,
        partial: String,
        start: usize,
    },
    Include {
        namespace: Option<String>,
        start: usize,
    },
    Extend { start: usize },
    NamespaceMember {
        namespace: String,
        variables_only: bool,
        start: usize,
    },
    Variable { start: usize },
    Value { start: usize },
}

fn annotation_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&REGEX, r"@[\w-]*$")
}

fn module_path_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&REGEX, r#"@(use|forward|import)\s+(?:["'][^"']*["']\s*,\s*)*["']([^"']*)$"#)
}

fn include_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&REGEX, r"@include\s+(?:([\w-]+)\.)?([\w-]*)$")
}

fn extend_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&REGEX, r"@extend\s+(%?[\w-]*)$")
}

fn member_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&REGEX, r"(?:^|[^\w$.-])([\w-]+)\.(\$?[\w-]*)$")
}

fn variable_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&REGEX, r"\$[\w-]*$")
}

fn value_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &REGEX,
        r"(?:(?:^|[{;])\s*[\w-]+\s*:|\$[\w-]+\s*:|@(?:return|if|else if|while|each)\b)[^;{}]*?([\w-]*)$",
    )
}

/// SCSS completion provider
pub struct ScssCompletionProvider;

impl ScssCompletionProvider {
    pub fn new() -> Self {
        Self
    }

    /// Provide completion items for the given position
    pub fn complete(&self, workspace: &ScssWorkspace, uri: &Url, position: Position) -> Vec<CompletionItem> {
        let Some(context) = workspace.query(uri, position) else {
            return Vec::new();
        };
        let Some(completion_type) = completion_type(workspace, &context) else {
            log::debug!("No completion context at {:?}", position);
            return Vec::new();
        };
        log::debug!("Completion context: {:?}", completion_type);

        let settings = &workspace.settings;
        let resolver = Resolver::new(&workspace.graph);
        let builder = ItemBuilder {
            workspace,
            context: &context,
            uri,
        };

        match completion_type {
            CompletionType::SassDoc { start } => builtins::annotations()
                .iter()
                .map(|annotation| {
                    let label = format!("@{}", annotation.name);
                    CompletionItem {
                        kind: Some(CompletionItemKind::KEYWORD),
                        documentation: Some(markdown(format!(
                            "{}\n\n[SassDoc reference]({})",
                            annotation.description,
                            annotation.link()
                        ))),
                        text_edit: Some(builder.edit(start, &label)),
                        label,
                        ..Default::default()
                    }
                })
                .collect(),
            CompletionType::ModulePath { rule, partial, start } => {
                builder.module_paths(rule, &partial, start)
            }
            CompletionType::Include { namespace, start } => {
                if !settings.suggest_mixins {
                    return Vec::new();
                }
                let Some(id) = context.id else {
                    return Vec::new();
                };
                let members = match namespace {
                    Some(namespace) => resolver.namespace_members(id, &namespace, Some(SymbolKind::Mixin)),
                    None => resolver.visible_members(id, Some(SymbolKind::Mixin)),
                };
                members.iter().map(|m| builder.member(m, start)).collect()
            }
            CompletionType::Extend { start } => {
                let Some(id) = context.id else {
                    return Vec::new();
                };
                resolver
                    .visible_members(id, Some(SymbolKind::Placeholder))
                    .iter()
                    .map(|m| builder.member(m, start))
                    .collect()
            }
            CompletionType::NamespaceMember {
                namespace,
                variables_only,
                start,
            } => {
                let Some(id) = context.id else {
                    return Vec::new();
                };
                resolver
                    .namespace_members(id, &namespace, None)
                    .iter()
                    .filter(|m| match m.kind() {
                        SymbolKind::Variable => true,
                        SymbolKind::Function => !variables_only,
                        SymbolKind::Mixin | SymbolKind::Placeholder => false,
                    })
                    .filter(|m| suggests(settings, m.kind()))
                    .map(|m| builder.member(m, start))
                    .collect()
            }
            CompletionType::Variable { start } => {
                if !settings.suggest_variables {
                    return Vec::new();
                }
                let mut items = builder.locals(start);
                if let Some(id) = context.id {
                    items.extend(
                        resolver
                            .visible_members(id, Some(SymbolKind::Variable))
                            .iter()
                            .map(|m| builder.member(m, start)),
                    );
                }
                dedup_labels(items)
            }
            CompletionType::Value { start } => {
                let mut items = Vec::new();
                if settings.suggest_variables {
                    items.extend(builder.locals(start));
                }
                if let Some(id) = context.id {
                    items.extend(
                        resolver
                            .visible_members(id, None)
                            .iter()
                            .filter(|m| matches!(m.kind(), SymbolKind::Variable | SymbolKind::Function))
                            .filter(|m| suggests(settings, m.kind()))
                            .map(|m| builder.member(m, start)),
                    );
                    items.extend(resolver.namespaces(id).into_iter().map(|(namespace, _)| CompletionItem {
                        label: namespace.to_string(),
                        kind: Some(CompletionItemKind::MODULE),
                        text_edit: Some(builder.edit(start, namespace)),
                        ..Default::default()
                    }));
                }
                if settings.suggest_functions {
                    items.extend(
                        builtins::global_members()
                            .filter(|m| m.kind == SymbolKind::Function)
                            .map(|m| builder.global_builtin(m, start)),
                    );
                }
                dedup_labels(items)
            }
        }
    }
}

impl Default for ScssCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn suggests(settings: &ScssSettings, kind: SymbolKind) -> bool {
    match kind {
        SymbolKind::Variable => settings.suggest_variables,
        SymbolKind::Mixin => settings.suggest_mixins,
        SymbolKind::Function => settings.suggest_functions,
        SymbolKind::Placeholder => true,
    }
}

fn dedup_labels(items: Vec<CompletionItem>) -> Vec<CompletionItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.label.clone()))
        .collect()
}

fn markdown(value: String) -> Documentation {
    Documentation::MarkupContent(MarkupContent {
        kind: MarkupKind::Markdown,
        value,
    })
}

pub fn completion_item_kind(kind: SymbolKind) -> CompletionItemKind {
    match kind {
        SymbolKind::Variable => CompletionItemKind::VARIABLE,
        SymbolKind::Mixin => CompletionItemKind::METHOD,
        SymbolKind::Function => CompletionItemKind::FUNCTION,
        SymbolKind::Placeholder => CompletionItemKind::CLASS,
    }
}

/// Work out what is being completed from the text in front of the cursor
pub(super) fn completion_type(workspace: &ScssWorkspace, context: &QueryContext<'_>) -> Option<CompletionType> {
    let before = &context.text[..context.offset];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = &before[line_start..];

    if context.stylesheet.doc_comment_at(context.offset).is_some() {
        let found = annotation_regex()?.find(line)?;
        return Some(CompletionType::SassDoc {
            start: line_start + found.start(),
        });
    }

    if let Some(captures) = module_path_regex()?.captures(line) {
        let rule = match &captures[1] {
            "use" => ModuleRuleKind::Use,
            "forward" => ModuleRuleKind::Forward,
            _ => ModuleRuleKind::Import,
        };
        let partial = captures.get(2)?;
        let segment = match partial.as_str().rfind('/') {
            Some(i) => i + 1,
            None if partial.as_str().starts_with(NODE_MODULES_PREFIX) => NODE_MODULES_PREFIX.len(),
            None => 0,
        };
        return Some(CompletionType::ModulePath {
            rule,
            partial: partial.as_str().to_string(),
            start: line_start + partial.start() + segment,
        });
    }

    if let Some(captures) = include_regex()?.captures(line) {
        return Some(CompletionType::Include {
            namespace: captures.get(1).map(|m| m.as_str().to_string()),
            start: line_start + captures.get(2)?.start(),
        });
    }

    if let Some(captures) = extend_regex()?.captures(line) {
        return Some(CompletionType::Extend {
            start: line_start + captures.get(1)?.start(),
        });
    }

    if let Some(captures) = member_regex()?.captures(line) {
        let namespace = &captures[1];
        let is_namespace = context.id.is_some_and(|id| {
            Resolver::new(&workspace.graph)
                .namespaces(id)
                .iter()
                .any(|(bound, _)| *bound == namespace)
        });
        if is_namespace {
            let member = captures.get(2)?;
            return Some(CompletionType::NamespaceMember {
                namespace: namespace.to_string(),
                variables_only: member.as_str().starts_with('$'),
                start: line_start + member.start(),
            });
        }
    }

    if let Some(found) = variable_regex()?.find(line) {
        return Some(CompletionType::Variable {
            start: line_start + found.start(),
        });
    }

    if let Some(captures) = value_regex()?.captures(line) {
        return Some(CompletionType::Value {
            start: line_start + captures.get(1)?.start(),
        });
    }

    None
}

struct ItemBuilder<'a> {
    workspace: &'a ScssWorkspace,
    context: &'a QueryContext<'a>,
    uri: &'a Url,
}

impl<'a> ItemBuilder<'a> {
    /// Edit replacing the text between `start` and the cursor
    fn edit(&self, start: usize, new_text: &str) -> CompletionTextEdit {
        let range = self.context.document.range_of(&(start..self.context.offset));
        CompletionTextEdit::Edit(TextEdit::new(range, new_text.to_string()))
    }

    fn member(&self, member: &Member<'_>, start: usize) -> CompletionItem {
        let label = member.display_name();
        let (detail, documentation) = match member.item {
            Resolved::Symbol(symbol) => {
                let declared_in = display_path(self.uri, self.workspace.graph.uri(symbol.document));
                (
                    symbol.raw.clone(),
                    declaration_markdown(&symbol.raw, symbol.kind, symbol.doc.as_deref(), &declared_in),
                )
            }
            Resolved::BuiltIn(builtin) => (builtin.label(), builtin_markdown(builtin)),
        };
        CompletionItem {
            kind: Some(completion_item_kind(member.kind())),
            detail: Some(detail),
            documentation: Some(markdown(documentation)),
            text_edit: Some(self.edit(start, &label)),
            label,
            ..Default::default()
        }
    }

    fn global_builtin(&self, member: &'static BuiltinMember, start: usize) -> CompletionItem {
        let label = member.global.unwrap_or(member.name).to_string();
        CompletionItem {
            kind: Some(completion_item_kind(member.kind)),
            detail: Some(format!("{}{}", label, member.signature)),
            documentation: Some(markdown(builtin_markdown(member))),
            text_edit: Some(self.edit(start, &label)),
            label,
            ..Default::default()
        }
    }

    /// Local variables and parameters visible at the cursor, innermost first
    fn locals(&self, start: usize) -> Vec<CompletionItem> {
        let offset = self.context.offset;
        let mut locals: Vec<_> = self
            .context
            .stylesheet
            .declarations
            .iter()
            .filter(|d| d.kind == SymbolKind::Variable && d.name_span.end <= start)
            .filter(|d| d.scope.as_ref().is_some_and(|s| s.start <= offset && offset <= s.end))
            .collect();
        locals.reverse();
        locals
            .into_iter()
            .map(|declaration| {
                let label = declaration.kind.display_name(&declaration.name);
                CompletionItem {
                    kind: Some(CompletionItemKind::VARIABLE),
                    detail: Some(declaration.raw.clone()),
                    text_edit: Some(self.edit(start, &label)),
                    label,
                    ..Default::default()
                }
            })
            .collect()
    }

    fn module_paths(&self, rule: ModuleRuleKind, partial: &str, start: usize) -> Vec<CompletionItem> {
        let mut items = Vec::new();

        if rule != ModuleRuleKind::Import && !partial.contains('/') {
            for module in builtins::MODULES {
                let link = builtins::module_link(module);
                if link.starts_with(partial) {
                    items.push(CompletionItem {
                        kind: Some(CompletionItemKind::MODULE),
                        detail: Some("Sass module".to_string()),
                        text_edit: Some(self.edit(start, &link)),
                        label: link,
                        ..Default::default()
                    });
                }
            }
        }

        let Some(directory) = self.link_directory(partial) else {
            return items;
        };
        let document_path = uri_to_path(self.uri).ok();
        let strip_partials = rule != ModuleRuleKind::Import;
        for entry in list_directory_entries(&directory) {
            if document_path.as_deref() == Some(entry.path.as_path()) {
                continue;
            }
            let (label, kind, insert) = if entry.is_directory {
                (entry.name.clone(), CompletionItemKind::FOLDER, format!("{}/", entry.name))
            } else {
                let name = if strip_partials {
                    link_name(&entry.name)
                } else {
                    entry.name.clone()
                };
                (name.clone(), CompletionItemKind::FILE, name)
            };
            items.push(CompletionItem {
                label,
                kind: Some(kind),
                text_edit: Some(self.edit(start, &insert)),
                ..Default::default()
            });
        }
        dedup_labels(items)
    }

    /// Directory a partial link points into
    fn link_directory(&self, partial: &str) -> Option<PathBuf> {
        let directory_part = partial.rfind('/').map_or("", |i| &partial[..i]);
        let base = match directory_part.strip_prefix(NODE_MODULES_PREFIX) {
            Some(package) => self.workspace.node_modules()?.join(package),
            None if partial.starts_with(NODE_MODULES_PREFIX) => self.workspace.node_modules()?,
            None => uri_to_path(self.uri).ok()?.parent()?.join(directory_part),
        };
        Some(base)
    }
}

/// Name used in `@use` for a stylesheet file: no partial underscore, no extension
fn link_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    stem.strip_prefix('_').unwrap_or(stem).to_string()
}

#[derive(Debug, Clone)]
struct DirectoryEntry {
    name: String,
    path: PathBuf,
    is_directory: bool,
}

/// Directories and stylesheets in a directory, directories first, both alphabetically
fn list_directory_entries(directory: &Path) -> Vec<DirectoryEntry> {
    let read = match fs::read_dir(directory) {
        Ok(read) => read,
        Err(e) => {
            log::debug!("Failed to read directory {}: {}", directory.display(), e);
            return Vec::new();
        }
    };

    let mut entries: Vec<DirectoryEntry> = read
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                return None;
            }
            let path = entry.path();
            let is_directory = path.is_dir();
            let is_stylesheet = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| STYLESHEET_EXTENSIONS.contains(&e));
            (is_directory || is_stylesheet).then_some(DirectoryEntry {
                name,
                path,
                is_directory,
            })
        })
        .collect();

    entries.sort_by(|a, b| match (a.is_directory, b.is_directory) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });
    entries
}

#[cfg(test)]
#[path = "completion_tests.rs"]
mod completion_tests;
