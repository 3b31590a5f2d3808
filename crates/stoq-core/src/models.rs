//! Domain models shared across stoq components.

use serde::{Deserialize, Serialize};

/// A candidate inventory file selected for upload.
///
/// Ephemeral: lives only in memory for the duration of one pipeline attempt
/// and is replaced whenever a new file is selected. Never persisted.
#[derive(Clone, Serialize, Deserialize)]
pub struct SelectedFile {
    /// Display name, e.g. "inventory.tsv".
    pub file_name: String,
    /// Declared media type, e.g. "text/tab-separated-values".
    pub content_type: String,
    /// Raw binary content.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Byte size of the file content.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Manual Debug so multi-megabyte payloads never end up in logs.
impl std::fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}
