//! Launch settings resolved from the command line, environment and config.
//!
//! Precedence for every knob is command line, then environment, then
//! `<JLENS_HOME>/config.toml`, then the built-in default. The environment is
//! captured once into [`LaunchEnv`] so resolution stays a pure function.

use std::path::{Path, PathBuf};

use env_flags::env_flags;

use crate::args::CliArgs;
use crate::error::LaunchError;
use crate::artifact::{ARTIFACT_VERSION, default_download_base_url};
use crate::config::{LauncherCfg, expand_home};
use crate::fetch::{DEFAULT_MAX_REDIRECTS, FetchSettings};
use crate::runtime::{RuntimeChoice, resolve_runtime, resolve_runtime_args};

/// Snapshot of the environment variables the launcher reads. Empty values
/// count as unset.
#[derive(Debug, Clone, Default)]
pub struct LaunchEnv {
    pub jlens_java_home: Option<String>,
    pub java_home: Option<String>,
    pub jlens_args: Option<String>,
    pub jlens_home: Option<String>,
    pub cache_dir: Option<String>,
    pub download_base_url: Option<String>,
    pub max_redirects: Option<usize>,
}

impl LaunchEnv {
    pub fn from_process() -> Result<Self, LaunchError> {
        env_flags! {
            /// Java home for the launcher only; checked before JAVA_HOME.
            JLENS_JAVA_HOME: &str = "";
            /// Generic Java home.
            JAVA_HOME: &str = "";
            /// Extra JVM arguments, whitespace separated (no quoting).
            JLENS_ARGS: &str = "";
            /// Launcher home (absolute). Defaults to $HOME/.jlens
            JLENS_HOME: &str = "";
            /// Artifact cache directory. Defaults to <JLENS_HOME>/cache
            JLENS_CACHE_DIR: &str = "";
            /// Release download base URL.
            JLENS_DOWNLOAD_BASE_URL: &str = "";
            /// Maximum redirect hops while downloading.
            JLENS_MAX_REDIRECTS: &str = "";
        }

        let non_empty = |v: &str| (!v.is_empty()).then(|| v.to_string());

        Ok(Self {
            jlens_java_home: non_empty(*JLENS_JAVA_HOME),
            java_home: non_empty(*JAVA_HOME),
            jlens_args: non_empty(*JLENS_ARGS),
            jlens_home: non_empty(*JLENS_HOME),
            cache_dir: non_empty(*JLENS_CACHE_DIR),
            download_base_url: non_empty(*JLENS_DOWNLOAD_BASE_URL),
            max_redirects: parse_max_redirects(*JLENS_MAX_REDIRECTS)?,
        })
    }

    /// `JLENS_HOME`, else `~/.jlens`, else `./.jlens`.
    pub fn jlens_home(&self) -> PathBuf {
        if let Some(home) = self.jlens_home.as_deref() {
            return expand_home(home);
        }
        match dirs::home_dir() {
            Some(home) => home.join(".jlens"),
            None => std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".jlens"),
        }
    }
}

/// Parse `JLENS_MAX_REDIRECTS`; blank means unset.
pub fn parse_max_redirects(raw: &str) -> Result<Option<usize>, LaunchError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|source| LaunchError::InvalidSetting {
            name: "JLENS_MAX_REDIRECTS",
            value: raw.to_string(),
            source,
        })
}

/// Where local discovery looks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub launcher_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub version: String,
}

/// Everything resolved before artifact discovery.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub runtime: RuntimeChoice,
    pub artifact_override: Option<PathBuf>,
    pub forwarded_args: Vec<String>,
    pub extra_runtime_args: Vec<String>,
    pub search: SearchSettings,
    pub fetch: FetchSettings,
}

impl LaunchSettings {
    pub fn resolve(
        cli: CliArgs,
        env: &LaunchEnv,
        cfg: Option<&LauncherCfg>,
        launcher_dir: PathBuf,
    ) -> Self {
        let runtime = resolve_runtime(
            cli.java_path
                .as_deref()
                .filter(|p| !p.as_os_str().is_empty()),
            env,
            cfg,
        );
        let extra_runtime_args = resolve_runtime_args(env, cfg);

        // An empty override counts as unset and leaves discovery in charge.
        let artifact_override = cli
            .jar_path
            .filter(|p| !p.as_os_str().is_empty())
            .or_else(|| {
                cfg.and_then(|c| c.jar_path.as_deref())
                    .filter(|p| !p.is_empty())
                    .map(expand_home)
            });

        let cache_dir = env
            .cache_dir
            .as_deref()
            .or_else(|| cfg.and_then(|c| c.cache_dir.as_deref()))
            .map(expand_home)
            .unwrap_or_else(|| env.jlens_home().join("cache"));

        let base_url = env
            .download_base_url
            .clone()
            .or_else(|| cfg.and_then(|c| c.download_base_url.clone()))
            .unwrap_or_else(default_download_base_url);
        let max_redirects = env
            .max_redirects
            .or_else(|| cfg.and_then(|c| c.max_redirects))
            .unwrap_or(DEFAULT_MAX_REDIRECTS);

        Self {
            runtime,
            artifact_override,
            forwarded_args: cli.forwarded,
            extra_runtime_args,
            search: SearchSettings {
                launcher_dir,
                cache_dir,
                version: ARTIFACT_VERSION.to_string(),
            },
            fetch: FetchSettings {
                base_url,
                max_redirects,
            },
        }
    }
}

/// Directory containing the running executable.
pub fn launcher_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        Err(e) => {
            tracing::warn!("cannot determine launcher location: {}", e);
            PathBuf::from(".")
        }
    }
}
