//! Lazily compiled regexes shared by the text scanners

use std::sync::OnceLock;

use log::error;
use regex::Regex;

/// Compile `pattern` once into `cell`
///
/// A pattern that fails to compile is logged and cached as `None`, so callers
/// skip the feature it drives instead of failing on every request.
pub fn cached_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            error!("Failed to compile regex {:?}: {}", pattern, e);
            None
        }
    })
    .as_ref()
}
