//! Reference URLs handed to media elements.
//!
//! A [`MediaLease`] is the native counterpart of an object URL: a `file://`
//! URI that grants one media element access to one file. Every lease comes
//! from a [`LeaseRegistry`] so the number of live leases can be observed,
//! and every lease must be given back with [`MediaLease::release`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gstreamer::glib;

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: AtomicU64,
    minted: AtomicU64,
    released: AtomicU64,
}

/// Process-wide bookkeeping for leases. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct LeaseRegistry {
    inner: Arc<RegistryInner>,
}

impl LeaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, path: &Path) -> MediaLease {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.inner.minted.fetch_add(1, Ordering::AcqRel);
        let path = absolute(path);
        let uri = uri_from_path(&path);
        tracing::trace!(lease = id, %uri, "minted lease");
        MediaLease {
            id,
            uri,
            path,
            registry: self.inner.clone(),
            released: false,
        }
    }

    pub fn minted(&self) -> u64 {
        self.inner.minted.load(Ordering::Acquire)
    }

    pub fn released(&self) -> u64 {
        self.inner.released.load(Ordering::Acquire)
    }

    pub fn live(&self) -> u64 {
        self.minted().saturating_sub(self.released())
    }
}

pub struct MediaLease {
    id: u64,
    uri: String,
    path: PathBuf,
    registry: Arc<RegistryInner>,
    released: bool,
}

impl MediaLease {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) {
        self.give_back();
    }

    fn give_back(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.registry.released.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(lease = self.id, "released lease");
    }
}

impl fmt::Debug for MediaLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaLease")
            .field("id", &self.id)
            .field("uri", &self.uri)
            .field("released", &self.released)
            .finish()
    }
}

impl Drop for MediaLease {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(lease = self.id, uri = %self.uri, "lease dropped without release");
            self.give_back();
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

fn uri_from_path(path: &Path) -> String {
    match glib::filename_to_uri(path, None) {
        Ok(uri) => uri.to_string(),
        Err(_) => format!("file://{}", path.display()),
    }
}
