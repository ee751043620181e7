//! Key-value stores: one JSON file per record on disk, or a map in memory.
//!
//! File layout: `<dir>/<namespace>/<doc_id>/<key>.json`.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::StoreError;
use crate::host::KvStore;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(
        &self,
        namespace: &str,
        doc_id: &str,
        key: &str,
    ) -> Result<PathBuf, StoreError> {
        for part in [namespace, doc_id, key] {
            validate_segment(part)?;
        }
        Ok(self
            .dir
            .join(namespace)
            .join(doc_id)
            .join(format!("{key}.json")))
    }
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    let invalid = segment.is_empty()
        || segment == "."
        || segment == ".."
        || segment.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidKey(segment.to_string()));
    }
    Ok(())
}

impl KvStore for FileStore {
    fn get(
        &self,
        namespace: &str,
        doc_id: &str,
        key: &str,
        _token: Option<&str>,
    ) -> BoxFuture<'static, Result<Option<serde_json::Value>, StoreError>> {
        let path = self.record_path(namespace, doc_id, key);
        async move {
            let path = path?;
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            log::trace!("read {}", path.display());
            Ok(Some(serde_json::from_slice(&bytes)?))
        }
        .boxed()
    }

    fn put(
        &self,
        namespace: &str,
        doc_id: &str,
        key: &str,
        value: serde_json::Value,
        _token: Option<&str>,
    ) -> BoxFuture<'static, Result<(), StoreError>> {
        let path = self.record_path(namespace, doc_id, key);
        async move {
            let path = path?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let json = serde_json::to_vec_pretty(&value)?;
            tokio::fs::write(&path, json).await?;
            log::trace!("wrote {}", path.display());
            Ok(())
        }
        .boxed()
    }
}

/// In-process store, for hosts without persistence and for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<(String, String, String), serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn record_key(namespace: &str, doc_id: &str, key: &str) -> (String, String, String) {
    (namespace.to_string(), doc_id.to_string(), key.to_string())
}

impl KvStore for MemoryStore {
    fn get(
        &self,
        namespace: &str,
        doc_id: &str,
        key: &str,
        _token: Option<&str>,
    ) -> BoxFuture<'static, Result<Option<serde_json::Value>, StoreError>> {
        let value = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&record_key(namespace, doc_id, key))
            .cloned();
        futures::future::ready(Ok(value)).boxed()
    }

    fn put(
        &self,
        namespace: &str,
        doc_id: &str,
        key: &str,
        value: serde_json::Value,
        _token: Option<&str>,
    ) -> BoxFuture<'static, Result<(), StoreError>> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record_key(namespace, doc_id, key), value);
        futures::future::ready(Ok(())).boxed()
    }
}
