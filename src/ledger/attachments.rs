// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Files attached to transactions. Bytes live on disk under
//! `{root}/{transaction_id}-{file_name}`; the transaction row only keeps the
//! name and that storage reference.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{LedgerError, LedgerResult};
use crate::models::Attachment;

#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl PendingAttachment {
    pub fn from_path(path: &Path) -> LedgerResult<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                LedgerError::Validation(format!("'{}' is not a file path", path.display()))
            })?;
        Ok(Self {
            name,
            bytes: fs::read(path)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

fn checked_file_name(name: &str) -> LedgerResult<&str> {
    let trimmed = name.trim();
    let plain = Path::new(trimmed)
        .file_name()
        .map(|n| n == trimmed)
        .unwrap_or(false);
    if trimmed.is_empty() || !plain || trimmed.contains('\\') {
        return Err(LedgerError::Validation(format!(
            "attachment name '{}' must be a plain file name",
            name
        )));
    }
    Ok(trimmed)
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, attachment: &Attachment) -> PathBuf {
        self.root.join(&attachment.storage_ref)
    }

    pub fn save(&self, transaction_id: &str, file: &PendingAttachment) -> LedgerResult<Attachment> {
        let name = checked_file_name(&file.name)?;
        fs::create_dir_all(&self.root)?;
        let storage_ref = format!("{}-{}", transaction_id, name);
        fs::write(self.root.join(&storage_ref), &file.bytes)?;
        tracing::debug!(transaction_id, file = name, bytes = file.bytes.len(), "attachment stored");
        Ok(Attachment {
            name: name.to_string(),
            storage_ref,
        })
    }

    /// Removing a file that is already gone is not an error.
    pub fn remove(&self, attachment: &Attachment) -> LedgerResult<()> {
        match fs::remove_file(self.path_for(attachment)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort cleanup; failures are logged, not returned.
    pub(crate) fn discard(&self, attachments: &[Attachment]) {
        for a in attachments {
            if let Err(e) = self.remove(a) {
                tracing::warn!(file = %a.storage_ref, error = %e, "could not remove attachment");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_under_transaction_prefixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path().join("attachments"));
        let file = PendingAttachment {
            name: "receipt.pdf".into(),
            bytes: b"%PDF".to_vec(),
        };
        let saved = store.save("tx-1", &file).unwrap();
        assert_eq!(saved.storage_ref, "tx-1-receipt.pdf");
        assert_eq!(fs::read(store.path_for(&saved)).unwrap(), b"%PDF");

        store.remove(&saved).unwrap();
        assert!(!store.path_for(&saved).exists());
        store.remove(&saved).unwrap();
    }

    #[test]
    fn rejects_path_components() {
        let dir = tempfile::tempdir().unwrap();
        let store = AttachmentStore::new(dir.path());
        for bad in ["../etc/passwd", "a/b.txt", "", "..", "c:\\x.txt"] {
            let file = PendingAttachment {
                name: bad.into(),
                bytes: vec![],
            };
            assert!(store.save("tx", &file).unwrap_err().is_validation(), "{bad}");
        }
    }
}
