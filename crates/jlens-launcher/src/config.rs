use serde::Deserialize;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

/// Contents of `<JLENS_HOME>/config.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub launcher: Option<LauncherCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LauncherCfg {
    /// Java home consulted after `JLENS_JAVA_HOME` and before `JAVA_HOME`.
    pub java_home: Option<String>,
    /// Extra JVM arguments, used when `JLENS_ARGS` is empty.
    pub java_args: Option<Vec<String>>,
    /// Artifact override, below `--jar-path`.
    pub jar_path: Option<String>,
    pub cache_dir: Option<String>, // absolute paths preferred
    pub download_base_url: Option<String>,
    pub max_redirects: Option<usize>,
}

pub fn load_user_config(jlens_home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = jlens_home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: UserConfig =
        toml::from_str(&s).with_context(|| format!("invalid TOML in {}", path.display()))?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_user_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn parses_logging_and_launcher_tables() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            r#"
[logging]
level = "debug"
json = true

[launcher]
java_home = "/opt/jdk-25"
java_args = ["-Xmx1g", "-Dfile.encoding=UTF-8"]
max_redirects = 3
"#,
        )
        .unwrap();

        let cfg = load_user_config(dir.path()).unwrap().expect("config present");
        let logging = cfg.logging.expect("logging table");
        assert_eq!(logging.level.as_deref(), Some("debug"));
        assert_eq!(logging.json, Some(true));
        let launcher = cfg.launcher.expect("launcher table");
        assert_eq!(launcher.java_home.as_deref(), Some("/opt/jdk-25"));
        assert_eq!(
            launcher.java_args,
            Some(vec!["-Xmx1g".to_string(), "-Dfile.encoding=UTF-8".to_string()])
        );
        assert_eq!(launcher.max_redirects, Some(3));
        assert!(launcher.jar_path.is_none());
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[launcher\n").unwrap();
        let err = load_user_config(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn expand_home_leaves_other_paths_alone() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("rel/path"), PathBuf::from("rel/path"));
    }
}
