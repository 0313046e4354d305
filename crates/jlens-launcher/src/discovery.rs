//! Local artifact discovery.
//!
//! Discovery is an ordered chain of probes. Each probe inspects one location
//! and returns at most one path; the first hit wins and later probes are not
//! consulted. Remote retrieval is not a probe: it has side effects and lives
//! in [`crate::fetch`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::artifact::{JAR_EXTENSION, JAR_NAME_PREFIX, cached_artifact_path, is_primary_artifact};
use crate::model::{ArtifactLocation, SearchTier};

/// One discovery strategy.
pub trait ArtifactProbe {
    fn tier(&self) -> SearchTier;
    /// Human-readable description of the location, used in diagnostics.
    fn describe(&self) -> String;
    fn locate(&self) -> Option<PathBuf>;
}

/// Scan a directory for a primary artifact.
pub struct DirectoryProbe {
    tier: SearchTier,
    dir: PathBuf,
}

impl DirectoryProbe {
    pub fn new(tier: SearchTier, dir: impl Into<PathBuf>) -> Self {
        Self {
            tier,
            dir: dir.into(),
        }
    }
}

impl ArtifactProbe for DirectoryProbe {
    fn tier(&self) -> SearchTier {
        self.tier
    }

    fn describe(&self) -> String {
        self.dir
            .join(format!("{JAR_NAME_PREFIX}*{JAR_EXTENSION}"))
            .display()
            .to_string()
    }

    fn locate(&self) -> Option<PathBuf> {
        find_jar_in_dir(&self.dir)
    }
}

/// Check for the pinned version in the cache directory.
pub struct CacheProbe {
    path: PathBuf,
}

impl CacheProbe {
    pub fn new(cache_dir: &Path, version: &str) -> Self {
        Self {
            path: cached_artifact_path(cache_dir, version),
        }
    }
}

impl ArtifactProbe for CacheProbe {
    fn tier(&self) -> SearchTier {
        SearchTier::Cache
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn locate(&self) -> Option<PathBuf> {
        self.path.is_file().then(|| self.path.clone())
    }
}

/// Ordered probe chain.
pub struct Discovery {
    probes: Vec<Box<dyn ArtifactProbe>>,
}

impl Discovery {
    pub fn new(probes: Vec<Box<dyn ArtifactProbe>>) -> Self {
        Self { probes }
    }

    /// Launcher directory, then `<launcher>/../target`, then the cache.
    pub fn standard(launcher_dir: &Path, cache_dir: &Path, version: &str) -> Self {
        Self::new(vec![
            Box::new(DirectoryProbe::new(SearchTier::Colocated, launcher_dir)),
            Box::new(DirectoryProbe::new(
                SearchTier::DevelopmentBuild,
                launcher_dir.join("..").join("target"),
            )),
            Box::new(CacheProbe::new(cache_dir, version)),
        ])
    }

    pub fn locate(&self) -> Option<ArtifactLocation> {
        self.probes.iter().find_map(|probe| {
            let found = probe.locate();
            tracing::debug!(
                "probe {} at {}: {}",
                probe.tier(),
                probe.describe(),
                if found.is_some() { "hit" } else { "miss" }
            );
            found.map(|path| ArtifactLocation {
                path,
                tier: probe.tier(),
            })
        })
    }

    /// Locations checked, in order.
    pub fn searched(&self) -> Vec<String> {
        self.probes.iter().map(|p| p.describe()).collect()
    }
}

/// First primary artifact in `dir` by file name order, if any.
pub fn find_jar_in_dir(dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::trace!("cannot read {}: {}", dir.display(), e);
            return None;
        }
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| is_primary_artifact(name))
        .collect();
    names.sort();
    names.into_iter().next().map(|name| dir.join(name))
}
