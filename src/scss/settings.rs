//! Server settings
//!
//! Settings arrive in `initializationOptions` and in `workspace/didChangeConfiguration`
//! under the `scss` section. Every field is optional on the wire.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::language::workspace_files::FindFilesOptions;
use crate::scss::constants::{DEFAULT_EXCLUDES, DEFAULT_SCANNER_DEPTH, SETTINGS_SECTION};
use crate::scss::error::ScssResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScssSettings {
    /// Maximum directory depth of the initial workspace scan
    pub scanner_depth: usize,
    /// Globs excluded from the initial workspace scan
    pub scanner_exclude: Vec<String>,
    /// Also index files only reached through module links
    pub scan_imported_files: bool,
    /// Show scan failures to the user
    pub show_errors: bool,
    pub suggest_variables: bool,
    pub suggest_mixins: bool,
    pub suggest_functions: bool,
}

impl Default for ScssSettings {
    fn default() -> Self {
        Self {
            scanner_depth: DEFAULT_SCANNER_DEPTH,
            scanner_exclude: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            scan_imported_files: true,
            show_errors: false,
            suggest_variables: true,
            suggest_mixins: true,
            suggest_functions: true,
        }
    }
}

impl ScssSettings {
    /// Read settings from a configuration payload
    ///
    /// Accepts both `{ "scss": { ... } }` and the bare settings object.
    pub fn from_value(value: &Value) -> ScssResult<Self> {
        let section = value.get(SETTINGS_SECTION).unwrap_or(value);
        if section.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(section.clone())?)
    }

    pub fn find_files_options(&self) -> FindFilesOptions {
        FindFilesOptions {
            max_depth: Some(self.scanner_depth),
            exclude: self.scanner_exclude.clone(),
        }
    }
}

/// Options the client passes in `initializationOptions`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializationOptions {
    /// Overrides the workspace root of the initialize request
    pub workspace: Option<PathBuf>,
    pub settings: Option<Value>,
}

impl InitializationOptions {
    pub fn from_value(value: Option<&Value>) -> ScssResult<Self> {
        match value {
            Some(value) if !value.is_null() => Ok(serde_json::from_value(value.clone())?),
            _ => Ok(Self::default()),
        }
    }

    /// Workspace root, preferring the override
    pub fn root(&self, fallback: Option<&Path>) -> Option<PathBuf> {
        self.workspace
            .clone()
            .or_else(|| fallback.map(Path::to_path_buf))
    }
}
