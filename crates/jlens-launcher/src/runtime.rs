//! Java runtime resolution.

use std::path::{Path, PathBuf};

use crate::config::{LauncherCfg, expand_home};
use crate::settings::LaunchEnv;

/// Command used when no Java home yields an executable.
pub const DEFAULT_RUNTIME: &str = "java";

/// Where the resolved runtime path came from, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeSource {
    /// `--java-path` on the command line.
    CommandLine,
    /// `JLENS_JAVA_HOME`.
    LauncherJavaHome,
    /// `launcher.java_home` in the user config file.
    ConfigJavaHome,
    /// `JAVA_HOME`.
    JavaHome,
    /// Bare `java`, resolved through `PATH` at spawn time.
    SearchPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeChoice {
    pub path: PathBuf,
    pub source: RuntimeSource,
}

/// Platform file name of the Java launcher inside `<home>/bin`.
pub fn runtime_executable_name() -> &'static str {
    if cfg!(windows) { "java.exe" } else { "java" }
}

/// Resolve the runtime path.
///
/// Precedence: command line, `JLENS_JAVA_HOME`, config `java_home`,
/// `JAVA_HOME`, then bare `java`. Only the highest-ranked home that is set is
/// probed; if it lacks `bin/<exe>` the result is bare `java`.
pub fn resolve_runtime(
    cli_java_path: Option<&Path>,
    env: &LaunchEnv,
    cfg: Option<&LauncherCfg>,
) -> RuntimeChoice {
    if let Some(path) = cli_java_path {
        return RuntimeChoice {
            path: path.to_path_buf(),
            source: RuntimeSource::CommandLine,
        };
    }

    let config_home = cfg.and_then(|c| c.java_home.as_deref()).map(expand_home);
    let homes = [
        (
            RuntimeSource::LauncherJavaHome,
            env.jlens_java_home.as_ref().map(PathBuf::from),
        ),
        (RuntimeSource::ConfigJavaHome, config_home),
        (
            RuntimeSource::JavaHome,
            env.java_home.as_ref().map(PathBuf::from),
        ),
    ];

    if let Some((source, home)) = homes
        .into_iter()
        .find_map(|(source, home)| home.map(|h| (source, h)))
    {
        let candidate = home.join("bin").join(runtime_executable_name());
        if candidate.is_file() {
            return RuntimeChoice {
                path: candidate,
                source,
            };
        }
        tracing::debug!(
            "no java executable at {} ({:?}); falling back to PATH",
            candidate.display(),
            source
        );
    }

    RuntimeChoice {
        path: PathBuf::from(DEFAULT_RUNTIME),
        source: RuntimeSource::SearchPath,
    }
}

/// Split an extra-arguments value on runs of whitespace. Quoting is not
/// interpreted.
pub fn split_runtime_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Extra JVM arguments: `JLENS_ARGS` when it holds any token, otherwise the
/// config file's `java_args` list.
pub fn resolve_runtime_args(env: &LaunchEnv, cfg: Option<&LauncherCfg>) -> Vec<String> {
    let from_env = env
        .jlens_args
        .as_deref()
        .map(split_runtime_args)
        .unwrap_or_default();
    if !from_env.is_empty() {
        return from_env;
    }
    cfg.and_then(|c| c.java_args.clone()).unwrap_or_default()
}
