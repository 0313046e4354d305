//! Runtime probe and dispatch.
//!
//! This module provides a small abstraction (`RuntimeLauncher`) over starting
//! the Java runtime, plus the default process-backed implementation
//! (`ProcessLauncher`). The child inherits the launcher's stdio untouched so
//! the MCP JSON-RPC stream flows directly between host and server.

use std::ffi::OsString;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::LaunchError;

/// How the dispatched child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildExit {
    Code(i32),
    /// Terminated by a signal (Unix).
    Signal(i32),
    /// No exit code and no signal information.
    Unknown,
}

impl ChildExit {
    pub fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ChildExit::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ChildExit::Signal(signal);
            }
        }
        ChildExit::Unknown
    }

    /// Exit code to mirror, or the termination anomaly.
    pub fn into_exit_code(self) -> Result<i32, LaunchError> {
        match self {
            ChildExit::Code(code) => Ok(code),
            ChildExit::Signal(signal) => Err(LaunchError::ChildTerminated {
                signal: Some(signal),
            }),
            ChildExit::Unknown => Err(LaunchError::ChildTerminated { signal: None }),
        }
    }
}

#[async_trait]
pub trait RuntimeLauncher: Send + Sync {
    /// Check that `runtime` can be started at all. The probe's own exit
    /// status is not inspected.
    async fn probe(&self, runtime: &Path) -> Result<(), LaunchError>;

    /// Run `runtime` with `args`, inheriting stdio, and wait for it to end.
    async fn dispatch(&self, runtime: &Path, args: &[OsString]) -> Result<ChildExit, LaunchError>;
}

/// Default launcher backed by `tokio::process`.
pub struct ProcessLauncher;

#[async_trait]
impl RuntimeLauncher for ProcessLauncher {
    async fn probe(&self, runtime: &Path) -> Result<(), LaunchError> {
        let mut child = Command::new(runtime)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::RuntimeNotFound {
                path: runtime.to_path_buf(),
                source,
            })?;
        match child.wait().await {
            Ok(status) => tracing::debug!("java -version exited with {}", status),
            Err(e) => tracing::debug!("waiting for java -version failed: {}", e),
        }
        Ok(())
    }

    async fn dispatch(&self, runtime: &Path, args: &[OsString]) -> Result<ChildExit, LaunchError> {
        tracing::info!(
            "exec {} {}",
            runtime.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let dispatch_err = |source| LaunchError::Dispatch {
            path: runtime.to_path_buf(),
            source,
        };
        let mut child = Command::new(runtime)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(dispatch_err)?;
        let status = child.wait().await.map_err(dispatch_err)?;
        tracing::info!("java exited with {}", status);
        Ok(ChildExit::from_status(status))
    }
}
