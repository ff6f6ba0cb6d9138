//! Document identity and line-ending types.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{FILE_SCHEME, UNTITLED_SCHEME};

/// Stable URI-like identity of an open document.
///
/// Existing files use `file://<path>`; paths that do not exist on disk yet
/// open as `untitled:<path>` and are closed rather than saved when their
/// review is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Identity of a document backed by an existing file.
    pub fn file(path: &Path) -> Self {
        Self(format!("{FILE_SCHEME}{}", path.display()))
    }

    /// Identity of a document that has no file on disk yet.
    pub fn untitled(path: &Path) -> Self {
        Self(format!("{UNTITLED_SCHEME}{}", path.display()))
    }

    /// Wrap an arbitrary URI string supplied by a host.
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_untitled(&self) -> bool {
        self.0.starts_with(UNTITLED_SCHEME)
    }

    /// Filesystem path encoded in the URI (scheme stripped).
    pub fn path(&self) -> PathBuf {
        let raw = self
            .0
            .strip_prefix(FILE_SCHEME)
            .or_else(|| self.0.strip_prefix(UNTITLED_SCHEME))
            .unwrap_or(&self.0);
        PathBuf::from(raw)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line separator used when joining lines back into document text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Eol {
    #[default]
    Lf,
    CrLf,
}

impl Eol {
    /// `\r\n` if the text contains one anywhere, otherwise `\n`.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Eol::CrLf
        } else {
            Eol::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Eol::Lf => "\n",
            Eol::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for Eol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eol::Lf => write!(f, "lf"),
            Eol::CrLf => write!(f, "crlf"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_and_untitled_ids_round_trip_path() {
        let path = Path::new("/work/src/lib.rs");
        let file = DocumentId::file(path);
        let untitled = DocumentId::untitled(path);

        assert_eq!(file.as_str(), "file:///work/src/lib.rs");
        assert!(!file.is_untitled());
        assert!(untitled.is_untitled());
        assert_eq!(file.path(), path);
        assert_eq!(untitled.path(), path);
    }

    #[test]
    fn detect_eol() {
        assert_eq!(Eol::detect("a\nb"), Eol::Lf);
        assert_eq!(Eol::detect("a\r\nb\n"), Eol::CrLf);
        assert_eq!(Eol::detect(""), Eol::Lf);
    }
}
