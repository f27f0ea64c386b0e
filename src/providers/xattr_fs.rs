//! Filesystem metadata provider backed by extended attributes
//!
//! Every regular file in the root directory is a document; its identifier is
//! the file name. Attributes live in the unprivileged `user.` xattr namespace
//! and are exposed without that prefix (`user.sensitivity` -> `sensitivity`).

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::ProviderError;
use crate::providers::MetadataProvider;
use crate::types::Attributes;

/// Namespace prefix for unprivileged extended attributes
pub const USER_NAMESPACE: &str = "user.";

const PROBE_FILE: &str = ".scoperag_xattr_probe";
const PROBE_KEY: &str = "user.scoperag.probe";
const PROBE_VALUE: &[u8] = b"probe";

/// Reads documents and `user.*` attributes from a directory
#[derive(Debug, Clone)]
pub struct XattrProvider {
    root: PathBuf,
}

impl XattrProvider {
    /// Serve documents from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory documents are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, ProviderError> {
        let relative = Path::new(id);
        if relative.components().count() != 1 || relative.is_absolute() {
            return Err(ProviderError::NotFound(id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    /// Verify the filesystem under `dir` can set, read and remove user xattrs
    pub fn check_support(dir: impl AsRef<Path>) -> Result<(), ProviderError> {
        if !::xattr::SUPPORTED_PLATFORM {
            return Err(ProviderError::Unsupported(
                "extended attributes are not supported on this platform".to_string(),
            ));
        }

        let probe = dir.as_ref().join(PROBE_FILE);
        std::fs::write(&probe, b"probe").map_err(|e| {
            ProviderError::Unsupported(format!("could not create probe file: {}", e))
        })?;

        let outcome = probe_xattr(&probe);
        let _ = std::fs::remove_file(&probe);
        outcome
    }

    /// [`check_support`](Self::check_support) on the blocking thread pool
    pub async fn verify_support(dir: impl Into<PathBuf>) -> Result<(), ProviderError> {
        let dir = dir.into();
        tokio::task::spawn_blocking(move || Self::check_support(dir))
            .await
            .map_err(|e| ProviderError::Unsupported(format!("xattr probe task failed: {}", e)))?
    }

    /// Write a document file and set its attributes under the `user.` namespace
    pub async fn write_document(
        &self,
        id: &str,
        content: &str,
        attributes: &Attributes,
    ) -> Result<(), ProviderError> {
        let path = self.path_for(id)?;
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ProviderError::Content {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        let attributes = attributes.clone();
        let owned_id = id.to_string();
        run_blocking(id, move || {
            for (key, value) in &attributes {
                let name = namespaced(key);
                ::xattr::set(&path, &name, value.as_bytes()).map_err(|e| {
                    ProviderError::Attributes {
                        id: owned_id.clone(),
                        reason: format!("failed to set {}: {}", name, e),
                    }
                })?;
            }
            Ok(())
        })
        .await
    }
}

fn probe_xattr(probe: &Path) -> Result<(), ProviderError> {
    ::xattr::set(probe, PROBE_KEY, PROBE_VALUE).map_err(|e| {
        ProviderError::Unsupported(format!("filesystem rejected user xattr: {}", e))
    })?;

    match ::xattr::get(probe, PROBE_KEY) {
        Ok(Some(value)) if value == PROBE_VALUE => {}
        Ok(_) => {
            return Err(ProviderError::Unsupported(
                "xattr was set but read back a different value".to_string(),
            ))
        }
        Err(e) => {
            return Err(ProviderError::Unsupported(format!(
                "xattr was set but could not be read: {}",
                e
            )))
        }
    }

    if let Err(e) = ::xattr::remove(probe, PROBE_KEY) {
        warn!(error = %e, "could not remove probe xattr");
    }
    Ok(())
}

/// Prefix a bare key with the `user.` namespace
pub fn namespaced(key: &str) -> String {
    if key.starts_with(USER_NAMESPACE) {
        key.to_string()
    } else {
        format!("{}{}", USER_NAMESPACE, key)
    }
}

async fn run_blocking<T, F>(id: &str, f: F) -> Result<T, ProviderError>
where
    F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ProviderError::Attributes {
            id: id.to_string(),
            reason: format!("xattr task failed: {}", e),
        })?
}

fn read_user_attributes(id: &str, path: &Path) -> Result<Attributes, ProviderError> {
    let names = ::xattr::list(path).map_err(|e| ProviderError::Attributes {
        id: id.to_string(),
        reason: e.to_string(),
    })?;

    let mut attributes = Attributes::new();
    for name in names {
        let name = name.to_string_lossy().into_owned();
        let Some(key) = name.strip_prefix(USER_NAMESPACE) else {
            continue;
        };
        match ::xattr::get(path, &name) {
            Ok(Some(value)) => {
                attributes.insert(key.to_string(), String::from_utf8_lossy(&value).into_owned());
            }
            Ok(None) => {}
            Err(e) => {
                // A single unreadable attribute does not invalidate the rest
                warn!(doc_id = %id, attribute = %name, error = %e, "failed to read xattr");
            }
        }
    }
    Ok(attributes)
}

#[async_trait]
impl MetadataProvider for XattrProvider {
    async fn list_documents(&self) -> Result<Vec<String>, ProviderError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| ProviderError::Content {
                id: self.root.display().to_string(),
                reason: e.to_string(),
            })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ProviderError::Content {
                id: self.root.display().to_string(),
                reason: e.to_string(),
            })?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_file && !name.starts_with('.') {
                ids.push(name);
            }
        }
        ids.sort();
        debug!(root = %self.root.display(), documents = ids.len(), "listed corpus directory");
        Ok(ids)
    }

    async fn read_content(&self, id: &str) -> Result<String, ProviderError> {
        let path = self.path_for(id)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ProviderError::NotFound(id.to_string()),
                _ => ProviderError::Content {
                    id: id.to_string(),
                    reason: e.to_string(),
                },
            })
    }

    async fn list_attributes(&self, id: &str) -> Result<Attributes, ProviderError> {
        let path = self.path_for(id)?;
        let owned_id = id.to_string();
        run_blocking(id, move || read_user_attributes(&owned_id, &path)).await
    }
}
