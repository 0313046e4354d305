//! Artifact naming and release location.

use std::path::{Path, PathBuf};

/// File name prefix shared by every build of the server JAR.
pub const JAR_NAME_PREFIX: &str = "jlens-mcp-server-";
pub const JAR_EXTENSION: &str = ".jar";

/// Substrings marking non-primary build outputs (shade leftovers, source and
/// javadoc bundles).
pub const EXCLUDED_MARKERS: [&str; 3] = ["original", "sources", "javadoc"];

/// Artifact version this launcher is pinned to.
pub const ARTIFACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// GitHub repository publishing the release assets.
pub const RELEASE_REPOSITORY: &str = "bhxch/jlens-mcp-server";

pub fn default_download_base_url() -> String {
    format!("https://github.com/{RELEASE_REPOSITORY}/releases/download")
}

/// `jlens-mcp-server-<version>.jar`
pub fn artifact_file_name(version: &str) -> String {
    format!("{JAR_NAME_PREFIX}{version}{JAR_EXTENSION}")
}

/// Release asset URL: `<base>/v<version>/<artifact file name>`.
pub fn download_url(base_url: &str, version: &str) -> String {
    format!(
        "{}/v{}/{}",
        base_url.trim_end_matches('/'),
        version,
        artifact_file_name(version)
    )
}

pub fn cached_artifact_path(cache_dir: &Path, version: &str) -> PathBuf {
    cache_dir.join(artifact_file_name(version))
}

/// True for primary server JAR file names.
pub fn is_primary_artifact(file_name: &str) -> bool {
    file_name.starts_with(JAR_NAME_PREFIX)
        && file_name.ends_with(JAR_EXTENSION)
        && !EXCLUDED_MARKERS.iter().any(|m| file_name.contains(m))
}
