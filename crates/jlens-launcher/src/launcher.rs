//! End-to-end launch: discovery, runtime probe, fetch, dispatch.
//!
//! Local tiers are side-effect free, so they run first. The runtime probe runs
//! before the remote tier so a missing Java never writes to the cache.

use crate::discovery::Discovery;
use crate::error::LaunchError;
use crate::fetch::Fetcher;
use crate::model::{ArtifactLocation, LaunchConfig, SearchTier};
use crate::settings::LaunchSettings;
use crate::supervisor::RuntimeLauncher;

/// Run one launch and return the exit code to mirror.
pub async fn launch<R>(settings: LaunchSettings, runner: &R) -> Result<i32, LaunchError>
where
    R: RuntimeLauncher + ?Sized,
{
    tracing::debug!(
        "runtime {} ({:?})",
        settings.runtime.path.display(),
        settings.runtime.source
    );

    let local = match settings
        .artifact_override
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
    {
        Some(path) => Some(ArtifactLocation {
            path,
            tier: SearchTier::Override,
        }),
        None => Discovery::standard(
            &settings.search.launcher_dir,
            &settings.search.cache_dir,
            &settings.search.version,
        )
        .locate(),
    };

    runner.probe(&settings.runtime.path).await?;

    let artifact = match local {
        Some(found) => found,
        None => fetch_remote(&settings).await?,
    };
    tracing::info!("using {} ({})", artifact.path.display(), artifact.tier);

    let config = LaunchConfig {
        runtime_path: settings.runtime.path,
        artifact,
        forwarded_args: settings.forwarded_args,
        extra_runtime_args: settings.extra_runtime_args,
    };
    let exit = runner
        .dispatch(&config.runtime_path, &config.command_args())
        .await?;
    exit.into_exit_code()
}

async fn fetch_remote(settings: &LaunchSettings) -> Result<ArtifactLocation, LaunchError> {
    let discovery = Discovery::standard(
        &settings.search.launcher_dir,
        &settings.search.cache_dir,
        &settings.search.version,
    );
    let into_resolution = |source| LaunchError::Resolution {
        searched: discovery.searched(),
        source,
    };

    let fetcher = Fetcher::new(settings.fetch.clone()).map_err(into_resolution)?;
    let path = fetcher
        .fetch_artifact(&settings.search.version, &settings.search.cache_dir)
        .await
        .map_err(into_resolution)?;
    Ok(ArtifactLocation {
        path,
        tier: SearchTier::Remote,
    })
}
