//! Collaborator boundaries for producing [`ChatData`]
//!
//! The query engine never touches archives or platform-specific chat-log
//! syntax itself; it consumes a normalized [`ChatData`] value produced once by
//! external collaborators behind these traits.
//!
//! ## Design Principles
//!
//! 1. **One-shot ingestion**: a `ChatData` value is produced once and handed
//!    to the analyzer; the engine never re-parses or re-extracts
//! 2. **Typed failures**: extraction errors map onto the crate error taxonomy
//!    instead of surfacing collaborator-internal error types
//! 3. **Extensible**: supporting a new chat platform only requires
//!    implementing [`MessageExtractor`]

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::ChatData;

/// Unpacks an exported chat archive and locates the chat file inside it.
///
/// Implementations fail with
/// [`Error::ChatFileNoAccess`](crate::Error::ChatFileNoAccess) when the
/// archive cannot be opened,
/// [`Error::CreateDirectoryFailed`](crate::Error::CreateDirectoryFailed) when
/// the destination cannot be prepared,
/// [`Error::UnzipFailed`](crate::Error::UnzipFailed) when extraction fails,
/// and [`Error::InvalidChatFile`](crate::Error::InvalidChatFile) when the
/// archive holds no recognizable chat file.
pub trait ArchiveExtractor: Send + Sync {
    /// Extract `archive` into `destination` and return the chat file path.
    fn extract(&self, archive: &Path, destination: &Path) -> Result<PathBuf>;
}

/// Parses platform-specific chat-log text into normalized [`ChatData`].
///
/// Implementations compute [`ChatMetadata`](crate::types::ChatMetadata) as
/// part of extraction; the engine treats it as read-only afterwards. Parse
/// failures map onto
/// [`Error::ExtractDataFailed`](crate::Error::ExtractDataFailed).
pub trait MessageExtractor: Send + Sync {
    /// Produce chat data from the extracted chat-log text.
    fn extract(&self, chat_text: &str) -> Result<ChatData>;
}
