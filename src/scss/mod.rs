//! SCSS language support
//!
//! Outline parsing, the workspace index and the language features built on it.

pub mod builtins;
pub mod completion;
pub mod constants;
pub mod definition;
pub mod diagnostics;
pub mod document;
pub mod document_manager;
pub mod error;
pub mod hover;
pub mod parser;
pub mod references;
pub mod resolver;
pub mod scanner;
pub mod server;
pub mod settings;
pub mod signature_help;
pub mod storage;
pub mod symbols;
pub mod syntax;
pub mod syntax_tree;
pub mod workspace;
pub mod workspace_symbol;
