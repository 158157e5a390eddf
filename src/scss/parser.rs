//! SCSS outline parser
//!
//! Builds the [`Stylesheet`] outline from the syntax tree. Nodes give the structure
//! and the spans; names, links and parameter lists are read from the source text
//! inside those spans.

use crate::scss::syntax::{Declaration, ModuleRule, ModuleRuleKind, Reference, Span, Stylesheet, SymbolKind};
use crate::scss::syntax_tree::{SyntaxNode, SyntaxTree};

/// SCSS parser producing a [`Stylesheet`] outline
#[derive(Debug, Default, Clone)]
pub struct ScssParser {}

impl ScssParser {
    /// Create a new SCSS parser
    pub fn new() -> Self {
        Self {}
    }

    /// Parse SCSS content into an outline
    ///
    /// The outline is always produced, use [`Stylesheet::has_errors`] to find out
    /// whether the text had syntax errors.
    pub fn parse(&self, content: &str) -> Stylesheet {
        let result = SyntaxTree::parse(content);
        let mut builder = OutlineBuilder {
            source: content,
            blocks: Vec::new(),
            pending_locals: Vec::new(),
            out: Stylesheet {
                doc_comments: doc_comment_lines(content),
                diagnostics: result.diagnostics,
                ..Default::default()
            },
        };
        if let Some(tree) = &result.tree {
            builder.statements(tree.root());
        }
        builder.out
    }
}

/// Whether an `@import` link is plain CSS and left to the browser
fn is_plain_css_import(link: &str) -> bool {
    link.ends_with(".css")
        || link.starts_with("http://")
        || link.starts_with("https://")
        || link.starts_with("//")
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Byte length of the name `text` starts with
fn name_len(text: &str) -> usize {
    text.find(|c: char| !is_name_char(c)).unwrap_or(text.len())
}

fn leading_space(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

/// Offset of `word` standing on its own in `text`
fn word_offset(text: &str, word: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = text[from..].find(word) {
        let at = from + found;
        let end = at + word.len();
        let before = text[..at].chars().next_back();
        let after = text[end..].chars().next();
        if before.is_none_or(char::is_whitespace) && after.is_none_or(|c| c.is_whitespace() || c == '(') {
            return Some(at);
        }
        from = end;
    }
    None
}

/// Quoted strings in `source[range]`: their text and span, quotes excluded
fn quoted_strings(source: &str, range: Span) -> Vec<(String, Span)> {
    let mut strings = Vec::new();
    let mut offset = range.start;
    while offset < range.end {
        let text = &source[offset..range.end];
        let Some(open) = text.find(['"', '\'']) else {
            break;
        };
        let start = offset + open + 1;
        let quote = &text[open..open + 1];
        let end = source[start..range.end]
            .find(quote)
            .map_or(range.end, |close| start + close);
        strings.push((source[start..end].to_string(), start..end));
        offset = end + 1;
    }
    strings
}

/// `///` lines, the carriage return excluded
fn doc_comment_lines(source: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let indent = leading_space(body);
        if body[indent..].starts_with("///") {
            spans.push(offset + indent..offset + body.len());
        }
        offset += line.len();
    }
    spans
}

struct Block {
    /// Offset of the opening brace
    open: usize,
    /// Mixin or function whose body this block is
    owner: Option<usize>,
    /// Declarations scoped to this block
    locals: Vec<usize>,
}

/// An at-rule split into its parts
struct AtRule<'t> {
    node: SyntaxNode<'t>,
    span: Span,
    /// Text between the keyword and the block
    head: Span,
    block: Option<SyntaxNode<'t>>,
}

struct OutlineBuilder<'a> {
    source: &'a str,
    blocks: Vec<Block>,
    /// Parameters and loop variables waiting for the block they belong to
    pending_locals: Vec<usize>,
    out: Stylesheet,
}

impl<'a> OutlineBuilder<'a> {
    fn statements(&mut self, parent: SyntaxNode<'_>) {
        for node in parent.children() {
            self.statement(node);
        }
    }

    fn statement(&mut self, node: SyntaxNode<'_>) {
        match node.kind().as_str() {
            "sassvariabledeclaration" => self.variable_declaration(node),
            "atrule" => self.at_rule(node),
            "qualifiedrule" => self.qualified_rule(node),
            _ => self.expression(node),
        }
    }

    /// Record the references below a node, walking the blocks met on the way
    fn expression(&mut self, node: SyntaxNode<'_>) {
        match node.kind().as_str() {
            "sassvariable" => self.variable_reference(node.span()),
            "sassqualifiedname" => self.qualified_reference(node.span()),
            "function" => self.function_call(node),
            "simpleblock" => self.block(node, None),
            "sassvariabledeclaration" | "atrule" | "qualifiedrule" => self.statement(node),
            _ => {
                for child in node.children() {
                    self.expression(child);
                }
            }
        }
    }

    /// [`Self::expression`] for what ends after `offset`, blocks left out
    fn expression_from(&mut self, node: SyntaxNode<'_>, offset: usize) {
        for child in node.children() {
            let span = child.span();
            if child.is("simpleblock") || span.end <= offset {
                continue;
            }
            if span.start >= offset {
                self.expression(child);
            } else {
                self.expression_from(child, offset);
            }
        }
    }

    // Blocks and scopes

    fn block(&mut self, node: SyntaxNode<'_>, owner: Option<usize>) {
        let span = node.span();
        let locals = std::mem::take(&mut self.pending_locals);
        for &index in &locals {
            self.out.declarations[index].scope = Some(span.start..span.start);
        }
        self.blocks.push(Block {
            open: span.start,
            owner,
            locals,
        });

        self.statements(node);

        if let Some(block) = self.blocks.pop() {
            for index in block.locals {
                self.out.declarations[index].scope = Some(block.open..span.end);
            }
            if let Some(owner) = block.owner {
                self.out.declarations[owner].span.end = span.end;
            }
        }
    }

    /// Walk the block of a rule, or scope its pending locals to the rule itself
    fn finish(&mut self, rule: &AtRule<'_>, owner: Option<usize>) {
        match rule.block {
            Some(block) => self.block(block, owner),
            None => {
                let end = self.statement_end(rule.span.end);
                for index in std::mem::take(&mut self.pending_locals) {
                    self.out.declarations[index].scope = Some(rule.span.start..end);
                }
                if let Some(owner) = owner {
                    self.out.declarations[owner].span.end = end;
                }
            }
        }
    }

    fn current_scope(&self) -> Option<Span> {
        self.blocks.last().map(|b| b.open..b.open)
    }

    /// Innermost local declaration visible under the name
    fn lookup_local(&self, kind: SymbolKind, name: &str) -> Option<usize> {
        self.blocks.iter().rev().find_map(|block| {
            block.locals.iter().rev().copied().find(|&index| {
                let declaration = &self.out.declarations[index];
                declaration.kind == kind && declaration.name == name
            })
        })
    }

    fn push_declaration(&mut self, declaration: Declaration) -> usize {
        let index = self.out.declarations.len();
        let nested = declaration.scope.is_some();
        self.out.declarations.push(declaration);
        if nested {
            if let Some(block) = self.blocks.last_mut() {
                block.locals.push(index);
            }
        }
        index
    }

    /// Declare a parameter or loop variable for the block that follows
    fn push_pending_local(&mut self, span: Span) {
        let text = &self.source[span.clone()];
        self.out.declarations.push(Declaration {
            kind: SymbolKind::Variable,
            name: text.trim_start_matches('$').to_string(),
            name_span: span.clone(),
            span: span.clone(),
            raw: format!("{};", text),
            parameters: None,
            doc: None,
            scope: Some(span.start..span.start),
        });
        self.pending_locals.push(self.out.declarations.len() - 1);
    }

    // Text helpers

    /// End of a statement ending at `end`, a directly following `;` included
    fn statement_end(&self, end: usize) -> usize {
        let rest = &self.source[end..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        if trimmed.starts_with(';') {
            end + (rest.len() - trimmed.len()) + 1
        } else {
            end
        }
    }

    /// Widen a name span to take in its sigil
    fn with_sigil(&self, span: Span, sigil: char) -> Span {
        let before = &self.source[..span.start];
        if !self.source[span.clone()].starts_with(sigil) && before.ends_with(sigil) {
            span.start - sigil.len_utf8()..span.end
        } else {
            span
        }
    }

    /// `ns` written directly in front of `start` as `ns.`
    fn namespace_before(&self, start: usize) -> Option<Span> {
        let before = self.source[..start].strip_suffix('.')?;
        let name = before.len() - before.trim_end_matches(is_name_char).len();
        (name > 0).then(|| before.len() - name..before.len())
    }

    /// SassDoc lines directly above an offset, `///` markers stripped
    fn doc_before(&self, start: usize) -> Option<String> {
        let mut cursor = start;
        let mut lines = Vec::new();
        for span in self.out.doc_comments.iter().rev() {
            if span.end > cursor {
                continue;
            }
            if !self.source[span.end..cursor].trim().is_empty() {
                break;
            }
            let line = &self.source[span.start + 3..span.end];
            lines.push(line.strip_prefix(' ').unwrap_or(line).trim_end());
            cursor = span.start;
        }
        if lines.is_empty() {
            return None;
        }
        lines.reverse();
        Some(lines.join("\n"))
    }

    // References

    fn push_reference(&mut self, kind: SymbolKind, namespace: Option<Span>, name_span: Span) {
        let source = self.source;
        let text = &source[name_span.clone()];
        let name = text.strip_prefix(kind.sigil()).unwrap_or(text).to_string();
        let span = namespace
            .as_ref()
            .map_or(name_span.clone(), |ns| ns.start..name_span.end);
        let namespace = namespace.map(|ns| source[ns].to_string());
        let local = match namespace {
            Some(_) => None,
            None => self.lookup_local(kind, &name),
        };
        self.out.references.push(Reference {
            kind,
            namespace,
            name,
            span,
            name_span,
            local,
        });
    }

    fn variable_reference(&mut self, span: Span) {
        let span = self.with_sigil(span, '$');
        // keyword argument names and configuration keys
        if self.source[span.end..].trim_start().starts_with(':') {
            return;
        }
        let namespace = self.namespace_before(span.start);
        self.push_reference(SymbolKind::Variable, namespace, span);
    }

    /// `ns.$name`; namespaced calls are taken care of by [`Self::function_call`]
    fn qualified_reference(&mut self, span: Span) {
        if let Some(dot) = self.source[span.clone()].find(".$") {
            self.variable_reference(span.start + dot + 1..span.end);
        }
    }

    fn function_call(&mut self, node: SyntaxNode<'_>) {
        let source = self.source;
        let span = node.span();
        if let Some(open) = source[span.clone()].find('(') {
            let callee = span.start..span.start + open;
            let name_start = source[callee.clone()]
                .rfind('.')
                .map_or(callee.start, |dot| callee.start + dot + 1);
            let name = &source[name_start..callee.end];
            let plain = !name.is_empty() && name.chars().all(is_name_char);
            if plain && !name.eq_ignore_ascii_case("url") {
                let namespace = (name_start > callee.start).then(|| callee.start..name_start - 1);
                self.push_reference(SymbolKind::Function, namespace, name_start..callee.end);
            }
        }
        // arguments; the callee node starts where the call does
        for child in node.children() {
            if child.span().start > span.start {
                self.expression(child);
            }
        }
    }

    // Statements

    fn variable_declaration(&mut self, node: SyntaxNode<'_>) {
        let source = self.source;
        let span = node.span();
        let children = node.children();
        let Some(name) = children.iter().find(|c| c.is("sassvariable")).copied() else {
            self.expression_from(node, 0);
            return;
        };

        let name_start = name.span().start;
        for child in &children {
            if child.span().start != name_start {
                self.expression(*child);
            }
        }

        let name_span = self.with_sigil(name.span(), '$');
        let name_text = &source[name_span.clone()];
        let value = source[name_span.end..span.end.max(name_span.end)]
            .trim_start()
            .trim_start_matches(':')
            .trim()
            .trim_end_matches(';')
            .trim_end();

        if !self.blocks.is_empty() && value.contains("!global") {
            self.push_reference(SymbolKind::Variable, None, name_span);
            return;
        }
        let declaration = Declaration {
            kind: SymbolKind::Variable,
            name: name_text.trim_start_matches('$').to_string(),
            name_span: name_span.clone(),
            span: name_span.start..self.statement_end(span.end),
            raw: format!("{}: {};", name_text, value),
            parameters: None,
            doc: self.doc_before(name_span.start),
            scope: self.current_scope(),
        };
        self.push_declaration(declaration);
    }

    fn qualified_rule(&mut self, node: SyntaxNode<'_>) {
        if self.blocks.is_empty() {
            let doc = self.doc_before(node.span().start);
            for placeholder in node.find_all("sassplaceholderselector") {
                let span = self.with_sigil(placeholder.span(), '%');
                let raw = self.source[span.clone()].to_string();
                self.push_declaration(Declaration {
                    kind: SymbolKind::Placeholder,
                    name: raw.trim_start_matches('%').to_string(),
                    name_span: span.clone(),
                    span,
                    raw,
                    parameters: None,
                    doc: doc.clone(),
                    scope: None,
                });
            }
        }
        // interpolation in selectors
        self.expression_from(node, 0);
        if let Some(block) = node.block() {
            self.block(block, None);
        }
    }

    fn at_rule(&mut self, node: SyntaxNode<'_>) {
        let source = self.source;
        let span = node.span();
        let at = source[span.clone()].find('@').map_or(span.start, |i| span.start + i);
        let keyword_end = at + 1 + name_len(&source[(at + 1).min(span.end)..span.end]);
        let keyword = source[(at + 1).min(keyword_end)..keyword_end].to_ascii_lowercase();
        let block = node.block();
        let rule = AtRule {
            node,
            head: keyword_end..block.map_or(span.end, |b| b.span().start).max(keyword_end),
            span,
            block,
        };

        match keyword.as_str() {
            "mixin" => self.callable_declaration(rule, SymbolKind::Mixin),
            "function" => self.callable_declaration(rule, SymbolKind::Function),
            "use" => self.module_rule(rule, ModuleRuleKind::Use),
            "forward" => self.module_rule(rule, ModuleRuleKind::Forward),
            "import" => self.import_rule(rule),
            "include" => self.include_rule(rule),
            "extend" => self.extend_rule(rule),
            "each" | "for" => self.loop_rule(rule),
            _ => self.generic_rule(rule),
        }
    }

    fn generic_rule(&mut self, rule: AtRule<'_>) {
        self.expression_from(rule.node, rule.head.start);
        self.finish(&rule, None);
    }

    fn callable_declaration(&mut self, rule: AtRule<'_>, kind: SymbolKind) {
        let source = self.source;
        let name_start = rule.head.start + leading_space(&source[rule.head.clone()]);
        let name_end = name_start + name_len(&source[name_start..rule.head.end]);
        if name_end == name_start {
            return self.generic_rule(rule);
        }

        // `(` .. matching `)`, or the end of the head when unbalanced
        let after_name = &source[name_end..rule.head.end];
        let parameter_list = after_name.trim_start().starts_with('(').then(|| {
            let open = name_end + leading_space(after_name);
            let mut depth = 0usize;
            let mut close = rule.head.end;
            for (i, c) in source[open..rule.head.end].char_indices() {
                match c {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            close = open + i;
                            break;
                        }
                    }
                    _ => {}
                }
            }
            open + 1..close
        });
        let parameters = parameter_list
            .as_ref()
            .map(|list| source[list.clone()].split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        // top level `$name` entries of the list are parameters, the rest are defaults
        let parameter_spans: Vec<Span> = match &parameter_list {
            Some(list) => rule
                .node
                .find_all("sassvariable")
                .iter()
                .map(|v| self.with_sigil(v.span(), '$'))
                .filter(|s| list.start <= s.start && s.end <= list.end)
                .filter(|s| {
                    let before = &source[list.start - 1..s.start];
                    let depth = before.matches('(').count().saturating_sub(before.matches(')').count());
                    let previous = before.trim_end().chars().next_back();
                    depth == 1 && matches!(previous, Some('(') | Some(','))
                })
                .collect(),
            None => Vec::new(),
        };

        let reference_count = self.out.references.len();
        self.expression_from(rule.node, name_end);
        let mut index = reference_count;
        while index < self.out.references.len() {
            if parameter_spans.contains(&self.out.references[index].name_span) {
                self.out.references.remove(index);
            } else {
                index += 1;
            }
        }

        let name = source[name_start..name_end].to_string();
        let keyword = source[rule.span.start..rule.head.start].trim_start().trim_start_matches('@');
        let declaration = Declaration {
            kind,
            raw: format!("@{} {}({})", keyword, name, parameters),
            name,
            name_span: name_start..name_end,
            span: rule.span.start..self.statement_end(rule.span.end),
            parameters: Some(parameters),
            doc: self.doc_before(rule.span.start),
            scope: self.current_scope(),
        };
        let owner = self.push_declaration(declaration);

        for span in parameter_spans {
            self.push_pending_local(span);
        }
        self.finish(&rule, Some(owner));
    }

    fn module_rule(&mut self, rule: AtRule<'_>, kind: ModuleRuleKind) {
        let source = self.source;
        let Some((link, link_span)) = quoted_strings(source, rule.head.clone()).into_iter().next() else {
            return self.generic_rule(rule);
        };

        let rest_start = (link_span.end + 1).min(rule.head.end);
        let with = word_offset(&source[rest_start..rule.head.end], "with").map(|i| rest_start + i);
        let words: Vec<&str> = source[rest_start..with.unwrap_or(rule.head.end)]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|word| !word.is_empty())
            .collect();

        let mut module_rule = ModuleRule {
            kind,
            link,
            link_span,
            span: rule.span.start..self.statement_end(rule.span.end),
            namespace: None,
            prefix: None,
            show: Vec::new(),
            hide: Vec::new(),
        };
        let mut index = 0;
        while index < words.len() {
            let word = words[index].to_ascii_lowercase();
            match word.as_str() {
                "as" => {
                    if let Some(alias) = words.get(index + 1) {
                        match alias.strip_suffix('*') {
                            Some(prefix) if !prefix.is_empty() => module_rule.prefix = Some(prefix.to_string()),
                            _ => module_rule.namespace = Some(alias.to_string()),
                        }
                    }
                    index += 2;
                }
                "show" | "hide" => {
                    let names = words[index + 1..].iter().map(|w| w.to_string()).collect();
                    if word == "show" {
                        module_rule.show = names;
                    } else {
                        module_rule.hide = names;
                    }
                    break;
                }
                _ => index += 1,
            }
        }

        // module configuration values may use variables
        if let Some(with) = with {
            self.expression_from(rule.node, with);
        }
        if self.blocks.is_empty() {
            self.out.module_rules.push(module_rule);
        }
        self.finish(&rule, None);
    }

    fn import_rule(&mut self, rule: AtRule<'_>) {
        let span = rule.span.start..self.statement_end(rule.span.end);
        for (link, link_span) in quoted_strings(self.source, rule.head.clone()) {
            if is_plain_css_import(&link) || !self.blocks.is_empty() {
                continue;
            }
            self.out.module_rules.push(ModuleRule {
                kind: ModuleRuleKind::Import,
                link,
                link_span,
                span: span.clone(),
                namespace: None,
                prefix: None,
                show: Vec::new(),
                hide: Vec::new(),
            });
        }
        self.finish(&rule, None);
    }

    fn include_rule(&mut self, rule: AtRule<'_>) {
        let source = self.source;
        let start = rule.head.start + leading_space(&source[rule.head.clone()]);
        let mut name = start..start + name_len(&source[start..rule.head.end]);
        if name.is_empty() {
            return self.generic_rule(rule);
        }

        let mut namespace = None;
        if source[name.end..rule.head.end].starts_with('.') {
            let member = name.end + 1;
            let member_len = name_len(&source[member..rule.head.end]);
            if member_len > 0 {
                namespace = Some(name.clone());
                name = member..member + member_len;
            }
        }
        let name_end = name.end;
        self.push_reference(SymbolKind::Mixin, namespace, name);
        self.expression_from(rule.node, name_end);
        self.finish(&rule, None);
    }

    fn extend_rule(&mut self, rule: AtRule<'_>) {
        for placeholder in rule.node.find_all("sassplaceholderselector") {
            let span = self.with_sigil(placeholder.span(), '%');
            self.push_reference(SymbolKind::Placeholder, None, span);
        }
        self.finish(&rule, None);
    }

    /// `@each $key, $value in ...` and `@for $i from ...`
    fn loop_rule(&mut self, rule: AtRule<'_>) {
        let head = &self.source[rule.head.clone()];
        let bindings_end = word_offset(head, "in")
            .or_else(|| word_offset(head, "from"))
            .map_or(rule.head.end, |i| rule.head.start + i);

        for variable in rule.node.find_all("sassvariable") {
            let span = self.with_sigil(variable.span(), '$');
            if span.start >= rule.head.start && span.end <= bindings_end {
                self.push_pending_local(span);
            }
        }
        self.expression_from(rule.node, bindings_end);
        self.finish(&rule, None);
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod parser_tests;
