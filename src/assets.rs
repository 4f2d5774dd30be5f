//! Visual preload tracking
//!
//! Hosts preload every visual a level can spawn before starting a session.
//! A failed visual is not fatal: entities using it still spawn and score,
//! and draws carry `resolved = false` so the host can use a placeholder.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load result for one visual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    Resolved,
    Failed,
}

/// Summary of a preload pass
#[derive(Debug, Clone, Default)]
pub struct PreloadReport {
    pub resolved: usize,
    /// (visual id, error message)
    pub failed: Vec<(String, String)>,
}

impl PreloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Known visuals and their load status
#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    status: BTreeMap<String, AssetStatus>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `loader` over every id not loaded yet
    pub fn preload<I, S, F, E>(&mut self, ids: I, mut loader: F) -> PreloadReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&str) -> Result<(), E>,
        E: Display,
    {
        let mut report = PreloadReport::default();
        for id in ids {
            let id = id.as_ref();
            if self.is_resolved(id) {
                report.resolved += 1;
                continue;
            }
            match loader(id) {
                Ok(()) => {
                    self.status.insert(id.to_owned(), AssetStatus::Resolved);
                    report.resolved += 1;
                }
                Err(e) => {
                    log::warn!("Failed to load visual {}: {}", id, e);
                    self.status.insert(id.to_owned(), AssetStatus::Failed);
                    report.failed.push((id.to_owned(), e.to_string()));
                }
            }
        }
        log::info!(
            "Preloaded {} visuals ({} failed)",
            report.resolved,
            report.failed.len()
        );
        report
    }

    pub fn status(&self, id: &str) -> Option<AssetStatus> {
        self.status.get(id).copied()
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.status(id) == Some(AssetStatus::Resolved)
    }
}

/// Loader that checks visuals exist under a directory (native hosts)
pub fn file_loader(root: impl Into<PathBuf>) -> impl FnMut(&str) -> std::io::Result<()> {
    let root = root.into();
    move |id: &str| {
        let path = root.join(id.trim_start_matches('/'));
        let meta = std::fs::metadata(&path)?;
        if meta.is_file() {
            Ok(())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a file", path.display()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preload_records_failures() {
        let mut assets = AssetRegistry::new();
        let report = assets.preload(["/m/H.png", "/m/missing.png"], |id| {
            if id.contains("missing") { Err("404") } else { Ok(()) }
        });
        assert_eq!(report.resolved, 1);
        assert!(!report.is_complete());
        assert!(assets.is_resolved("/m/H.png"));
        assert_eq!(assets.status("/m/missing.png"), Some(AssetStatus::Failed));
        assert_eq!(assets.status("/m/other.png"), None);
    }

    #[test]
    fn test_resolved_visuals_not_reloaded() {
        let mut assets = AssetRegistry::new();
        let mut calls = 0;
        for _ in 0..2 {
            assets.preload(["/m/H.png"], |_| {
                calls += 1;
                Ok::<(), String>(())
            });
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_file_loader_missing_file() {
        let mut load = file_loader("/nonexistent-root");
        assert!(load("/minerals/H.png").is_err());
    }
}
