//! This module includes common things we can reuse across different languages

pub mod document;
pub mod embedded;
pub mod position;
pub mod regex_cache;
pub mod workspace_files;
