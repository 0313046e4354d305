//! Fully resolved launch configuration.

use std::ffi::OsString;
use std::path::PathBuf;

use super::location::ArtifactLocation;

/// Everything needed to start the runtime for one invocation.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub runtime_path: PathBuf,
    pub artifact: ArtifactLocation,
    /// Passed through verbatim after the artifact.
    pub forwarded_args: Vec<String>,
    /// Inserted before `-jar`.
    pub extra_runtime_args: Vec<String>,
}

impl LaunchConfig {
    /// Runtime argument vector: `[...extra, "-jar", artifact, ...forwarded]`.
    pub fn command_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(
            self.extra_runtime_args.len() + 2 + self.forwarded_args.len(),
        );
        args.extend(self.extra_runtime_args.iter().map(OsString::from));
        args.push(OsString::from("-jar"));
        args.push(self.artifact.path.clone().into_os_string());
        args.extend(self.forwarded_args.iter().map(OsString::from));
        args
    }
}
