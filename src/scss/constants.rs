//! SCSS constants
//!
//! Names and defaults shared across the SCSS language support.

/// Configuration section the client sends settings under
pub const SETTINGS_SECTION: &str = "scss";

/// Default maximum directory depth of the initial scan
pub const DEFAULT_SCANNER_DEPTH: usize = 30;

/// Default scan excludes
pub const DEFAULT_EXCLUDES: &[&str] = &["**/.git/**", "**/node_modules/**", "**/bower_components/**"];

/// Link prefix of built-in modules, as in `sass:math`
pub const BUILTIN_MODULE_PREFIX: &str = "sass:";

/// Link prefix resolved against `<root>/node_modules`
pub const NODE_MODULES_PREFIX: &str = "~";

/// Extensions a module link may point at
pub const STYLESHEET_EXTENSIONS: &[&str] = &["scss", "sass", "css"];

/// Base URL of the built-in module documentation
pub const SASS_REFERENCE_URL: &str = "https://sass-lang.com/documentation/modules";

/// Base URL of the SassDoc annotation documentation
pub const SASSDOC_REFERENCE_URL: &str = "http://sassdoc.com/annotations/#";

/// Separator line between a declaration and its location in hovers
pub const HOVER_SEPARATOR: &str = "____";

/// Completion trigger characters
pub const COMPLETION_TRIGGERS: &[&str] = &["@", "/", "\"", "'", "$", ".", " "];

/// Signature help trigger characters
pub const SIGNATURE_TRIGGERS: &[&str] = &["(", ","];

/// Diagnostic source shown in the editor
pub const DIAGNOSTIC_SOURCE: &str = "scss";

/// How long an edit must stay the latest before its diagnostics are published
pub const DIAGNOSTICS_DELAY_MS: u64 = 150;

/// Failed statements blanked out before a stylesheet is given up on
pub const MAX_SYNTAX_RECOVERIES: usize = 64;
