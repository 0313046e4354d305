//! Download of the pinned artifact into the cache directory.
//!
//! Redirects are followed by hand so the hop count is explicit and every hop
//! is logged. The body is streamed into a uniquely named partial file that is
//! renamed onto the destination only after the stream completes.

use std::path::{Path, PathBuf};

use reqwest::header::LOCATION;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::artifact::{cached_artifact_path, download_url};
use crate::error::FetchError;

/// Default cap on redirect hops.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub base_url: String,
    pub max_redirects: usize,
}

pub struct Fetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl Fetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("jlens-launcher/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, settings })
    }

    /// Download `version` into `cache_dir` and return the cached file path.
    pub async fn fetch_artifact(
        &self,
        version: &str,
        cache_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let raw = download_url(&self.settings.base_url, version);
        let url = Url::parse(&raw).map_err(|source| FetchError::InvalidUrl {
            url: raw.clone(),
            source,
        })?;

        tokio::fs::create_dir_all(cache_dir)
            .await
            .map_err(|source| FetchError::Io {
                path: cache_dir.to_path_buf(),
                source,
            })?;
        let dest = cached_artifact_path(cache_dir, version);

        tracing::info!("downloading {} to {}", url, dest.display());
        let response = self.follow_redirects(url).await?;
        stream_to_file(response, &dest).await?;
        tracing::info!("downloaded {}", dest.display());
        Ok(dest)
    }

    /// GET `url`, following 3xx responses until a terminal status.
    async fn follow_redirects(&self, mut url: Url) -> Result<reqwest::Response, FetchError> {
        let mut hops = 0usize;
        loop {
            let response = self.client.get(url.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let next = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|loc| url.join(loc).ok())
                    .ok_or_else(|| FetchError::MissingLocation {
                        status: status.as_u16(),
                        url: url.to_string(),
                    })?;
                if hops >= self.settings.max_redirects {
                    return Err(FetchError::TooManyRedirects {
                        limit: self.settings.max_redirects,
                    });
                }
                hops += 1;
                tracing::debug!("redirect {} ({}) -> {}", hops, status.as_u16(), next);
                url = next;
                continue;
            }

            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            return Ok(response);
        }
    }
}

async fn stream_to_file(mut response: reqwest::Response, dest: &Path) -> Result<(), FetchError> {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let partial = dest.with_file_name(format!("{}.{}.part", file_name, uuid::Uuid::new_v4()));

    let result = async {
        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(|source| FetchError::Io {
                path: partial.clone(),
                source,
            })?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk)
                .await
                .map_err(|source| FetchError::Io {
                    path: partial.clone(),
                    source,
                })?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|source| FetchError::Io {
            path: partial.clone(),
            source,
        })?;
        drop(file);
        tokio::fs::rename(&partial, dest)
            .await
            .map_err(|source| FetchError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        tracing::debug!("wrote {} bytes", written);
        Ok::<(), FetchError>(())
    }
    .await;

    if result.is_err()
        && let Err(e) = tokio::fs::remove_file(&partial).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("failed to remove partial download {}: {}", partial.display(), e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ASSET: &str = "/v1.1.1/jlens-mcp-server-1.1.1.jar";

    fn fetcher(server: &MockServer, max_redirects: usize) -> Fetcher {
        Fetcher::new(FetchSettings {
            base_url: server.uri(),
            max_redirects,
        })
        .unwrap()
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        match std::fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    #[tokio::test]
    async fn downloads_into_cache_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jar-bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("nested").join("cache");
        let dest = fetcher(&server, DEFAULT_MAX_REDIRECTS)
            .fetch_artifact("1.1.1", &cache)
            .await
            .unwrap();

        assert_eq!(dest, cache.join("jlens-mcp-server-1.1.1.jar"));
        assert_eq!(std::fs::read(&dest).unwrap(), b"jar-bytes");
        assert_eq!(leftovers(&cache), vec!["jlens-mcp-server-1.1.1.jar"]);
    }

    #[tokio::test]
    async fn follows_redirect_to_final_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/objects/b.jar", server.uri())),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/objects/b.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"payload-from-b".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let dest = fetcher(&server, DEFAULT_MAX_REDIRECTS)
            .fetch_artifact("1.1.1", tmp.path())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload-from-b");
    }

    #[tokio::test]
    async fn relative_location_is_resolved_against_current_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET))
            .respond_with(ResponseTemplate::new(301).insert_header("Location", "/mirror/a.jar"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/mirror/a.jar"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mirrored".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let dest = fetcher(&server, DEFAULT_MAX_REDIRECTS)
            .fetch_artifact("1.1.1", tmp.path())
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"mirrored");
    }

    #[tokio::test]
    async fn not_found_is_a_fetch_failure_and_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let err = fetcher(&server, DEFAULT_MAX_REDIRECTS)
            .fetch_artifact("1.1.1", tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!tmp.path().join("jlens-mcp-server-1.1.1.jar").exists());
        assert!(leftovers(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn redirect_status_after_hop_decides_outcome() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/gone.jar", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone.jar"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let err = fetcher(&server, DEFAULT_MAX_REDIRECTS)
            .fetch_artifact("1.1.1", tmp.path())
            .await
            .unwrap_err();
        match err {
            FetchError::Status { status, url } => {
                assert_eq!(status, 500);
                assert!(url.ends_with("/gone.jar"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn redirect_loop_stops_at_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", ASSET))
            .expect(4)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let err = fetcher(&server, 3)
            .fetch_artifact("1.1.1", tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::TooManyRedirects { limit: 3 }));
        assert!(leftovers(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn redirect_without_location_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSET))
            .respond_with(ResponseTemplate::new(302))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let err = fetcher(&server, DEFAULT_MAX_REDIRECTS)
            .fetch_artifact("1.1.1", tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingLocation { status: 302, .. }));
    }

    #[tokio::test]
    async fn invalid_base_url_is_reported() {
        let fetcher = Fetcher::new(FetchSettings {
            base_url: "not a url".to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
        .unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let err = fetcher.fetch_artifact("1.1.1", tmp.path()).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn truncated_body_removes_partial_file() {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nPK\x03\x04abc")
                .unwrap();
            stream.flush().unwrap();
        });

        let fetcher = Fetcher::new(FetchSettings {
            base_url: format!("http://{addr}"),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
        .unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let cache = tmp.path().join("cache");
        let err = fetcher.fetch_artifact("1.1.1", &cache).await.unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, FetchError::Http(_)), "unexpected error: {err}");
        assert!(leftovers(&cache).is_empty());
    }
}
