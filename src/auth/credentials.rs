// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token persistence.
//!
//! The store holds a single opaque token under a fixed key. Storage failures
//! never surface to callers: `get` degrades to `None`, `set` and `clear`
//! degrade to a logged no-op. Callers must not assume a write persisted.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::warn;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "admin_token";

/// Durable holder of the admin bearer token.
pub trait CredentialStore: Send + Sync {
    /// Stored token, or `None` when absent or storage is unavailable.
    fn get(&self) -> Option<String>;
    /// Persist `token`, replacing any previous value.
    fn set(&self, token: &str);
    /// Remove the stored token.
    fn clear(&self);
}

/// File-backed store: one file named [`TOKEN_KEY`] inside `dir`.
///
/// Survives process restarts, mirroring browser local storage.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(TOKEN_KEY),
        }
    }

    /// Store under `CREDENTIALS_DIR`.
    pub fn from_env() -> Self {
        Self::new(crate::config::credentials_dir_from_env())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Credential store unreadable");
                None
            }
        }
    }

    fn set(&self, token: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "Credential store directory unavailable");
                return;
            }
        }
        if let Err(e) = fs::write(&self.path, token) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist admin token");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to clear admin token");
            }
        }
    }
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .filter(|t| !t.is_empty())
    }

    fn set(&self, token: &str) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.to_string());
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}
