//! Artifact locations and the tier that produced them.

use std::fmt;
use std::path::PathBuf;

/// Discovery tiers in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SearchTier {
    /// `--jar-path` or config `jar_path`.
    Override,
    /// Directory holding the launcher executable.
    Colocated,
    /// `../target` relative to the launcher.
    DevelopmentBuild,
    /// Previously downloaded copy in the cache directory.
    Cache,
    /// Freshly downloaded into the cache directory.
    Remote,
}

impl fmt::Display for SearchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchTier::Override => "override",
            SearchTier::Colocated => "launcher directory",
            SearchTier::DevelopmentBuild => "development build",
            SearchTier::Cache => "cache",
            SearchTier::Remote => "remote download",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    pub path: PathBuf,
    pub tier: SearchTier,
}
