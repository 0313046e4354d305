//! Error taxonomy for the launcher.
//!
//! Every variant is terminal: the binary prints the diagnostic to stderr and
//! exits with [`LaunchError::exit_code`].

use std::path::PathBuf;

use thiserror::Error;

/// Failures while retrieving the artifact from the release location.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid download url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("download failed with HTTP status {status} ({url})")]
    Status { status: u16, url: String },
    #[error("redirect response {status} from {url} has no usable Location header")]
    MissingLocation { status: u16, url: String },
    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level launcher failure.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(
        "could not find the jlens-mcp-server JAR file.\nChecked:\n{}\nDownload failed: {source}",
        format_searched(.searched)
    )]
    Resolution {
        searched: Vec<String>,
        #[source]
        source: FetchError,
    },
    #[error("Java not found at \"{}\". Please ensure Java 25+ is installed.", .path.display())]
    RuntimeNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run \"{}\": {source}", .path.display())]
    Dispatch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value '{value}' for {name}: {source}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("{}", describe_termination(.signal))]
    ChildTerminated { signal: Option<i32> },
}

impl LaunchError {
    /// Process exit status the launcher should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::ChildTerminated {
                signal: Some(signal),
            } => 128 + signal,
            _ => 1,
        }
    }
}

fn format_searched(searched: &[String]) -> String {
    searched
        .iter()
        .map(|s| format!("  - {s}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_termination(signal: &Option<i32>) -> String {
    match signal {
        Some(sig) => format!("java process was terminated by signal {sig}"),
        None => "java process exited without an exit code".to_string(),
    }
}
