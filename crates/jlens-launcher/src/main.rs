use std::path::{Path, PathBuf};

use env_flags::env_flags;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Layer, Registry, layer::SubscriberExt, prelude::*};

use jlens_launcher::args::parse_args;
use jlens_launcher::config::{LoggingCfg, load_user_config};
use jlens_launcher::launcher::launch;
use jlens_launcher::settings::{LaunchEnv, LaunchSettings, launcher_dir};
use jlens_launcher::supervisor::ProcessLauncher;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Clone, Copy)]
enum LogFormat {
    Json,
    Compact,
    Pretty,
    Full,
}

fn fmt_layer<W>(writer: W, ansi: bool, format: LogFormat) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let base = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer);
    match format {
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Full => base.boxed(),
    }
}

/// Install the global subscriber. The returned guard flushes the file writer
/// when dropped.
fn init_tracing(jlens_home: &Path, cfg: Option<&LoggingCfg>) -> Option<WorkerGuard> {
    env_flags! {
        /// Tracing filter, e.g. "info", "debug", or targets format.
        RUST_LOG: &str = "warn";
        /// Preferred filter env (alias). If set, overrides RUST_LOG.
        TRACING_FILTER: &str = "";
        /// Pretty formatting for logs (ignored if TRACING_JSON=true).
        TRACING_PRETTY: bool = false;
        /// Compact single-line formatting for logs (ignored if TRACING_JSON=true)
        TRACING_COMPACT: bool = true;
        /// JSON formatting for logs
        TRACING_JSON: bool = false;
        /// If true, also log to file under <JLENS_HOME>/logs or LOG_DIR
        LOG_TO_FILE: bool = false;
        /// Optional explicit log directory (absolute). Defaults to <JLENS_HOME>/logs
        LOG_DIR: &str = "";
    }

    let env_set = |k: &str| std::env::var_os(k).is_some();

    // TRACING_FILTER first, then RUST_LOG, then user config.
    let mut rust_log = if !(*TRACING_FILTER).is_empty() {
        (*TRACING_FILTER).to_string()
    } else {
        (*RUST_LOG).to_string()
    };
    let mut tracing_json = *TRACING_JSON;
    let mut tracing_compact = *TRACING_COMPACT;
    let mut tracing_pretty = *TRACING_PRETTY;
    let mut log_to_file = *LOG_TO_FILE;
    let mut log_dir: Option<PathBuf> = if !(*LOG_DIR).is_empty() {
        Some(PathBuf::from((*LOG_DIR).to_string()))
    } else {
        None
    };

    if let Some(cfg) = cfg {
        if !(env_set("TRACING_FILTER") || env_set("RUST_LOG"))
            && let Some(level) = cfg.level.as_ref()
        {
            rust_log = level.clone();
        }
        if !env_set("TRACING_JSON")
            && let Some(v) = cfg.json
        {
            tracing_json = v;
        }
        if !env_set("TRACING_COMPACT")
            && let Some(v) = cfg.compact
        {
            tracing_compact = v;
        }
        if !env_set("TRACING_PRETTY")
            && let Some(v) = cfg.pretty
        {
            tracing_pretty = v;
        }
        if !env_set("LOG_TO_FILE")
            && let Some(v) = cfg.to_file
        {
            log_to_file = v;
        }
        if !env_set("LOG_DIR")
            && let Some(dir) = cfg.dir.as_ref()
        {
            log_dir = Some(jlens_launcher::config::expand_home(dir));
        }
    }

    let filter = EnvFilter::try_new(rust_log).unwrap_or_else(|_| EnvFilter::new("warn"));
    let format = if tracing_json {
        LogFormat::Json
    } else if tracing_compact {
        LogFormat::Compact
    } else if tracing_pretty {
        LogFormat::Pretty
    } else {
        LogFormat::Full
    };

    // stdout belongs to the server's JSON-RPC stream; logs go to stderr only.
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(std::io::stderr, true, format)];

    let mut file_guard = None;
    let mut dir_error = None;
    if log_to_file {
        let dir = log_dir.unwrap_or_else(|| jlens_home.join("logs"));
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(&dir, "jlens-launcher.log");
                let (nb, guard) = tracing_appender::non_blocking(appender);
                file_guard = Some(guard);
                layers.push(fmt_layer(nb, false, format));
            }
            Err(e) => dir_error = Some((dir, e)),
        }
    }

    if let Err(e) = tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
    {
        tracing::debug!("tracing already set: {:?}", e);
    }
    if let Some((dir, e)) = dir_error {
        tracing::warn!("failed to create log dir {}: {}", dir.display(), e);
    }
    file_guard
}

#[tokio::main]
async fn main() {
    let env = match LaunchEnv::from_process() {
        Ok(env) => env,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    };
    let jlens_home = env.jlens_home();

    let (user_cfg, cfg_error) = match load_user_config(&jlens_home) {
        Ok(cfg) => (cfg, None),
        Err(e) => (None, Some(e)),
    };
    let log_guard = init_tracing(
        &jlens_home,
        user_cfg.as_ref().and_then(|c| c.logging.as_ref()),
    );
    if let Some(e) = cfg_error {
        tracing::warn!("ignoring user config: {:#}", e);
    }
    tracing::debug!("jlens_home={}", jlens_home.display());

    let cli = parse_args(
        std::env::args_os()
            .skip(1)
            .map(|a| a.to_string_lossy().into_owned()),
    );
    let settings = LaunchSettings::resolve(
        cli,
        &env,
        user_cfg.as_ref().and_then(|c| c.launcher.as_ref()),
        launcher_dir(),
    );

    let code = match launch(settings, &ProcessLauncher).await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!("launch failed: {:?}", e);
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };
    // process::exit skips destructors; flush the file writer first.
    drop(log_guard);
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logging_is_flushed_when_guard_drops() {
        let home = tempfile::tempdir().unwrap();
        let cfg = LoggingCfg {
            to_file: Some(true),
            ..Default::default()
        };
        let guard = init_tracing(home.path(), Some(&cfg));
        assert!(guard.is_some());

        tracing::error!("last line before exit");
        drop(guard);

        let logs = home.path().join("logs");
        let written: String = std::fs::read_dir(&logs)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("jlens-launcher.log"))
            .map(|e| std::fs::read_to_string(e.path()).unwrap())
            .collect();
        assert!(written.contains("last line before exit"));
    }
}
