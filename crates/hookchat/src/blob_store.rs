use std::fs;
use std::path::Path;

use tempfile::TempDir;
use url::Url;

use crate::errors::{ChatError, ChatResult};
use crate::models::attachment::Attachment;

/// Session scoped storage for attachments the user sent
///
/// Every stored attachment gets a `file://` reference that stays valid until the store
/// is dropped. References are never revoked one by one.
pub struct BlobStore {
    dir: TempDir,
}

impl BlobStore {
    pub fn new() -> ChatResult<Self> {
        let dir = tempfile::Builder::new().prefix("hookchat-").tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write the attachment bytes and return a locator for them
    pub fn store(&self, id: &str, attachment: &Attachment) -> ChatResult<String> {
        let path = self
            .dir
            .path()
            .join(format!("{}-{}", id, sanitize(&attachment.name)));
        fs::write(&path, &attachment.bytes)?;

        Url::from_file_path(&path)
            .map(String::from)
            .map_err(|_| ChatError::Io(format!("cannot reference {}", path.display())))
    }
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    match cleaned.trim_matches('.') {
        "" => "attachment".to_string(),
        trimmed => trimmed.to_string(),
    }
}
