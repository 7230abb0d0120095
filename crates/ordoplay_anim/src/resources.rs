// SPDX-License-Identifier: MIT OR Apache-2.0
//! Remote resource contract.
//!
//! Loading is cooperative: a host owns a [`ResourceManager`] and pumps every
//! loader with the time elapsed since the last frame until it settles.

use crate::host::HostId;
use std::path::PathBuf;

/// Progress of one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Still loading
    Pending,
    /// Loaded and usable
    Ready,
    /// Gave up, with the reason
    Failed(String),
}

impl LoadState {
    /// Is the load finished either way
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }
}

/// A load in progress
pub trait ResourceLoader {
    /// Advance by `elapsed_ms` and report the state
    fn poll(&mut self, elapsed_ms: f64) -> LoadState;
}

/// Builds a loader when a url is not known yet
pub type LoaderFactory<'a> = &'a dyn Fn() -> Box<dyn ResourceLoader>;

/// Fetch-or-reuse store keyed by url per owning host
pub trait ResourceManager {
    /// Start loading `url` for `owner` unless it is already known
    fn load_or_get(&mut self, owner: HostId, url: &str, factory: LoaderFactory<'_>);
}

/// Loader for `file://` urls and plain paths
#[derive(Debug, Clone)]
pub struct FileLoader {
    url: String,
}

impl FileLoader {
    /// Create a loader for a url
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn path(&self) -> Option<PathBuf> {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            return None;
        }
        let path = self.url.strip_prefix("file://").unwrap_or(&self.url);
        Some(PathBuf::from(path))
    }
}

impl ResourceLoader for FileLoader {
    fn poll(&mut self, _elapsed_ms: f64) -> LoadState {
        match self.path() {
            None => LoadState::Failed(format!("no network fetcher for {}", self.url)),
            Some(path) if path.exists() => LoadState::Ready,
            Some(path) => LoadState::Failed(format!("{} does not exist", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_loader() {
        let manifest = concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml");
        assert_eq!(FileLoader::new(format!("file://{manifest}")).poll(0.0), LoadState::Ready);
        assert!(matches!(
            FileLoader::new("/definitely/not/here.png").poll(0.0),
            LoadState::Failed(_)
        ));
        assert!(matches!(
            FileLoader::new("https://example.com/a.png").poll(0.0),
            LoadState::Failed(_)
        ));
    }
}
