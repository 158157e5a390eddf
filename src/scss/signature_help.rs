//! SCSS Signature Help Provider
//!
//! Shows the parameters of the mixin or function whose argument list the cursor is in.

use tower_lsp::lsp_types::{
    Documentation, ParameterInformation, ParameterLabel, Position, SignatureHelp,
    SignatureInformation, Url,
};

use crate::scss::resolver::{Resolved, Resolver};
use crate::scss::syntax::SymbolKind;
use crate::scss::workspace::ScssWorkspace;

/// The call whose argument list contains the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallContext {
    pub kind: SymbolKind,
    pub namespace: Option<String>,
    pub name: String,
    /// Index of the argument the cursor is in
    pub active_parameter: u32,
}

pub struct ScssSignatureHelpProvider;

impl ScssSignatureHelpProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn signature_help(&self, workspace: &ScssWorkspace, uri: &Url, position: Position) -> Option<SignatureHelp> {
        let context = workspace.query(uri, position)?;
        let call = call_context(&context.text[..context.offset])?;
        let resolver = Resolver::new(&workspace.graph);
        let resolved = resolver.resolve(context.id?, call.kind, call.namespace.as_deref(), &call.name);

        let (label, parameters, documentation) = match resolved.first()? {
            Resolved::Symbol(symbol) => {
                let parameters = symbol.parameters.as_deref().unwrap_or_default();
                (
                    format!("{}({})", call.name, parameters),
                    split_parameters(parameters),
                    symbol.doc.clone(),
                )
            }
            Resolved::BuiltIn(member) => {
                let parameters = member.parameters().unwrap_or_default();
                (
                    format!("{}({})", call.name, parameters),
                    split_parameters(parameters),
                    Some(member.description.to_string()),
                )
            }
        };

        let signature = SignatureInformation {
            label,
            documentation: documentation.map(Documentation::String),
            parameters: Some(
                parameters
                    .into_iter()
                    .map(|p| ParameterInformation {
                        label: ParameterLabel::Simple(p),
                        documentation: None,
                    })
                    .collect(),
            ),
            active_parameter: None,
        };
        Some(SignatureHelp {
            signatures: vec![signature],
            active_signature: Some(0),
            active_parameter: Some(call.active_parameter),
        })
    }
}

impl Default for ScssSignatureHelpProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Find the innermost unclosed call in the text before the cursor
pub(crate) fn call_context(before: &str) -> Option<CallContext> {
    let mut depth = 0usize;
    let mut commas = 0u32;
    let mut open = None;
    for (index, c) in before.char_indices().rev() {
        match c {
            ')' | ']' => depth += 1,
            '[' => depth = depth.saturating_sub(1),
            '(' if depth == 0 => {
                open = Some(index);
                break;
            }
            '(' => depth -= 1,
            ',' if depth == 0 => commas += 1,
            '{' | '}' | ';' if depth == 0 => return None,
            _ => {}
        }
    }
    let head = &before[..open?];

    let name_start = head
        .char_indices()
        .rev()
        .take_while(|(_, c)| is_name_char(*c))
        .last()
        .map(|(i, _)| i)?;
    let name = &head[name_start..];
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let mut rest = &head[..name_start];
    let mut namespace = None;
    if let Some(before_dot) = rest.strip_suffix('.') {
        let namespace_start = before_dot
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_name_char(*c))
            .last()
            .map(|(i, _)| i)?;
        namespace = Some(before_dot[namespace_start..].to_string());
        rest = &before_dot[..namespace_start];
    }

    let kind = if rest.trim_end().ends_with("@include") {
        SymbolKind::Mixin
    } else {
        SymbolKind::Function
    };
    Some(CallContext {
        kind,
        namespace,
        name: name.to_string(),
        active_parameter: commas,
    })
}

/// Parameters of a raw parameter list, split on top level commas
pub fn split_parameters(parameters: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in parameters.chars() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                result.push(current.trim().to_string());
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if !current.trim().is_empty() {
        result.push(current.trim().to_string());
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestWorkspace;

    #[test]
    fn test_call_context() {
        assert_eq!(
            call_context("  @include ns.button($a, "),
            Some(CallContext {
                kind: SymbolKind::Mixin,
                namespace: Some("ns".to_string()),
                name: "button".to_string(),
                active_parameter: 1,
            })
        );
        let call = call_context("width: double(fn(1, 2), ").unwrap();
        assert_eq!(call.kind, SymbolKind::Function);
        assert_eq!(call.name, "double");
        assert_eq!(call.active_parameter, 1);

        assert_eq!(call_context("width: double(1);"), None);
        assert_eq!(call_context(".a { color: red"), None);
    }

    #[test]
    fn test_split_parameters() {
        assert_eq!(split_parameters("$a, $b: (1, 2), $rest..."), vec!["$a", "$b: (1, 2)", "$rest..."]);
        assert!(split_parameters("").is_empty());
    }

    #[test]
    fn test_signature_for_workspace_mixin() {
        let test = TestWorkspace::with_files(&[
            ("_mixins.scss", "/// Draws a button\n@mixin button($color, $size: 1px) {}"),
            ("main.scss", "@use 'mixins';\n.a { @include mixins.button(red, 2px); }"),
        ]);
        let position = test.position("main.scss", "2px", 0, 0);
        let help = ScssSignatureHelpProvider::new()
            .signature_help(&test.workspace, &test.uri("main.scss"), position)
            .unwrap();

        assert_eq!(help.active_parameter, Some(1));
        let signature = &help.signatures[0];
        assert_eq!(signature.label, "button($color, $size: 1px)");
        assert_eq!(signature.parameters.as_ref().map(Vec::len), Some(2));
        assert_eq!(signature.documentation, Some(Documentation::String("Draws a button".to_string())));
    }

    #[test]
    fn test_signature_for_builtin() {
        let test = TestWorkspace::with_files(&[("main.scss", "@use 'sass:math';\n.a { width: math.div(10px, 2); }")]);
        let position = test.position("main.scss", "10px", 0, 0);
        let help = ScssSignatureHelpProvider::new()
            .signature_help(&test.workspace, &test.uri("main.scss"), position)
            .unwrap();

        assert_eq!(help.active_parameter, Some(0));
        assert_eq!(help.signatures[0].label, "div($number1, $number2)");
    }

    #[test]
    fn test_no_signature_outside_calls() {
        let test = TestWorkspace::with_files(&[("main.scss", ".a { width: 1px; }")]);
        let position = test.position("main.scss", "1px", 0, 0);
        assert!(
            ScssSignatureHelpProvider::new()
                .signature_help(&test.workspace, &test.uri("main.scss"), position)
                .is_none()
        );
    }
}
