//! Embedded stylesheet regions
//!
//! Component files (Vue, Svelte, Astro) can carry one `<style lang="scss">` block.
//! Instead of extracting that block into a separate text with its own coordinates,
//! we project the host text: everything outside the block is blanked out byte by byte,
//! keeping line breaks. The projected text has the same length and the same line
//! structure as the host, so offsets and positions never need translating.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::language::regex_cache::cached_regex;

/// The language a document is written in, decided by its file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageKind {
    /// A plain `.scss` stylesheet
    Scss,
    Vue,
    Svelte,
    Astro,
}

impl LanguageKind {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "scss" => Some(Self::Scss),
            "vue" => Some(Self::Vue),
            "svelte" => Some(Self::Svelte),
            "astro" => Some(Self::Astro),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_uri(uri: &Url) -> Option<Self> {
        let path = uri.path();
        let extension = path.rsplit_once('.').map(|(_, ext)| ext)?;
        Self::from_extension(extension)
    }

    /// Whether the stylesheet lives inside a larger host document
    pub fn is_host(self) -> bool {
        !matches!(self, Self::Scss)
    }
}

/// Byte span of the stylesheet inside a host document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedRegion {
    pub start: usize,
    pub end: usize,
}

impl EmbeddedRegion {
    /// Whether the offset is inside the region, the end of the region included
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Map an offset of the projected document back to the host document
    ///
    /// The mapping is the identity; offsets outside the region have no stylesheet
    /// counterpart and map to `None`.
    pub fn to_host_offset(&self, offset: usize) -> Option<usize> {
        self.contains(offset).then_some(offset)
    }
}

/// A host document projected down to its stylesheet region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedDocument {
    pub text: String,
    pub region: EmbeddedRegion,
}

fn style_open_tag() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"(?i)<style\b([^>]*)>")
}

fn style_close_tag() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"(?i)</style\s*>")
}

fn scss_lang_attribute() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r#"(?i)\blang\s*=\s*(?:"scss"|'scss'|scss\b)"#)
}

/// Locate the first `<style>` element declaring `lang="scss"`
///
/// Unterminated style elements extend to the end of the host text.
pub fn find_style_region(host_text: &str) -> Option<EmbeddedRegion> {
    let (open_tag, close_tag, lang) = (style_open_tag()?, style_close_tag()?, scss_lang_attribute()?);
    let mut search_from = 0;
    while let Some(open) = open_tag.captures_at(host_text, search_from) {
        let tag = open.get(0)?;
        let attributes = open.get(1).map(|m| m.as_str()).unwrap_or("");
        let content_start = tag.end();

        let content_end = close_tag
            .find_at(host_text, content_start)
            .map(|m| m.start())
            .unwrap_or(host_text.len());

        if lang.is_match(attributes) {
            return Some(EmbeddedRegion {
                start: content_start,
                end: content_end,
            });
        }
        // a non-scss tag may be a literal inside a script, so only skip the tag itself
        search_from = content_start;
    }
    None
}

/// Produce the virtual stylesheet document for a host document
///
/// Returns `None` when the host has no scss style region.
pub fn project(host_text: &str) -> Option<ProjectedDocument> {
    let region = find_style_region(host_text)?;
    Some(ProjectedDocument {
        text: blank_outside(host_text, region),
        region,
    })
}

/// Replace every byte outside the region with a space, keeping line breaks
fn blank_outside(host_text: &str, region: EmbeddedRegion) -> String {
    let mut projected = String::with_capacity(host_text.len());
    for (offset, ch) in host_text.char_indices() {
        if offset >= region.start && offset < region.end {
            projected.push(ch);
        } else if ch == '\n' || ch == '\r' {
            projected.push(ch);
        } else {
            // keep byte offsets identical for multi-byte characters
            for _ in 0..ch.len_utf8() {
                projected.push(' ');
            }
        }
    }
    projected
}
