//! Server configuration error types.

use super::SectionKind;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal outcomes of reading a server configuration document.
#[derive(Debug, Error)]
pub enum ServerConfError {
    #[error("server configuration is unreadable")]
    DocumentUnreadable(#[from] DocumentFault),

    #[error("section `{0}` is missing from the server configuration")]
    SectionMissing(SectionKind),
}

/// Why a document could not be read.
#[derive(Debug, Error)]
pub enum DocumentFault {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("document is neither UTF-8 nor UTF-16 with a byte order mark")]
    Encoding,

    #[error("XML parse error at position {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("document has no root element")]
    NoRoot,

    #[error("document has more than one root element")]
    MultipleRoots,

    #[error("text outside of the root element")]
    TextOutsideRoot,

    #[error("unknown entity reference `&{0};`")]
    UnknownEntity(String),

    #[error("element `{0}` is never closed")]
    Unclosed(String),

    #[error("property `{property}` of `{section}` could not be re-read")]
    PropertyVanished {
        section: SectionKind,
        property: String,
    },
}
