//! In-memory Pin Store
//!
//! Content-addressed by SHA-256 of the bytes. Test double for the
//! pinning provider.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use platform::crypto::sha256;

use crate::domain::entities::PinContent;
use crate::domain::repository::PinningService;
use crate::error::{UploadError, UploadResult};

/// Identifier prefix, so local identifiers are never mistaken for IPFS CIDs
pub const LOCAL_CID_PREFIX: &str = "sha256-";

#[derive(Debug, Clone, Default)]
pub struct MemoryPinStore {
    files: Arc<RwLock<HashMap<String, PinContent>>>,
}

impl MemoryPinStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_id(bytes: &[u8]) -> String {
        format!("{}{}", LOCAL_CID_PREFIX, hex::encode(sha256(bytes)))
    }

    /// Stored bytes for `cid`
    pub fn get(&self, cid: &str) -> Option<Vec<u8>> {
        let files = self.files.read().ok()?;
        files.get(cid).map(|c| c.bytes.clone())
    }

    pub fn len(&self) -> usize {
        self.files.read().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PinningService for MemoryPinStore {
    async fn pin(&self, content: PinContent) -> UploadResult<String> {
        let cid = Self::content_id(&content.bytes);
        let mut files = self
            .files
            .write()
            .map_err(|_| UploadError::Provider("Pin store unavailable".to_string()))?;
        files.entry(cid.clone()).or_insert(content);
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(bytes: &[u8]) -> PinContent {
        PinContent {
            file_name: "a.bin".into(),
            content_type: None,
            bytes: bytes.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_pin_is_content_addressed() {
        let store = MemoryPinStore::new();
        let a = store.pin(content(b"hello")).await.unwrap();
        let b = store.pin(content(b"hello")).await.unwrap();
        let c = store.pin(content(b"world")).await.unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(
            a,
            "sha256-2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&a).unwrap(), b"hello");
        assert!(store.get("sha256-missing").is_none());
    }
}
