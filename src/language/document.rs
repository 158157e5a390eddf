/// A general document version, that always increments overall like version of a software
///
/// This is a simple way to know if the content of a document might have changed.
/// Different versions doesn't mean that the content is actually changed, it could stil be the same.
///
/// Note when we say document, if the document is open in client, it is the content in editor not filesystem.
/// But when file is closed, it is the content on the filesystem.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default, Hash)]
pub struct DocumentVersion {
    /// Incremented every time the source of truth for the text changes hands:
    /// opened in the client, closed back to the filesystem, or rescanned from disk.
    pub major: i32,
    /// Minor version
    ///
    /// When file is open in client, then this version is the version of the document content of the client, as reported by the client, not on the file system
    ///
    /// When file is not open in client, this is always 0.
    pub minor: i32,
}

impl DocumentVersion {
    pub fn new(major: i32, minor: i32) -> Self {
        Self { major, minor }
    }

    /// Version after the client reported a new edit
    pub fn with_client_version(self, client_version: i32) -> Self {
        Self {
            major: self.major,
            minor: client_version,
        }
    }

    /// Version after the text was replaced from a different source (open, close, disk rescan)
    pub fn next_major(self) -> Self {
        Self {
            major: self.major + 1,
            minor: 0,
        }
    }
}

impl std::fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
