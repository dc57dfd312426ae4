//! Download engine.
//!
//! Idempotent single-file fetches (an existing destination short-circuits
//! without any network call), zip fetch-and-extract with an explicit
//! extraction marker, and a bounded pool for multi-file variants. All
//! requests go through a [`Transport`] and share one retry policy and one
//! cancellation token.

mod archive;
mod pool;
mod single;

pub use pool::{FetchRequest, FetchStream};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::TexfetchConfig;
use crate::control::CancelToken;
use crate::error::{Error, Result};
use crate::http::{CurlTransport, Transport};
use crate::retry::RetryPolicy;

/// State shared by the calling thread and pool workers.
#[derive(Clone)]
pub(crate) struct Engine {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    cancel: CancelToken,
}

#[derive(Clone)]
pub struct Downloader {
    engine: Engine,
    max_workers: usize,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("retry", &self.engine.retry)
            .field("max_workers", &self.max_workers)
            .field("cancelled", &self.engine.cancel.is_cancelled())
            .finish()
    }
}

impl Downloader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            engine: Engine {
                transport,
                retry: RetryPolicy::default(),
                cancel: CancelToken::new(),
            },
            max_workers: TexfetchConfig::default().worker_count(),
        }
    }

    /// Curl transport, retry policy and pool size from the config.
    pub fn from_config(cfg: &TexfetchConfig) -> Self {
        Self::new(Arc::new(CurlTransport::from_config(cfg)))
            .with_retry(cfg.retry_policy())
            .with_max_workers(cfg.worker_count())
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.engine.retry = retry;
        self
    }

    pub fn with_max_workers(mut self, n: usize) -> Self {
        self.max_workers = n.max(1);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.engine.cancel = token;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.engine.cancel
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Download `url` to `dest` unless `dest` already exists and
    /// `force_refresh` is false. The body is written to `dest.part` and
    /// renamed into place on success.
    pub fn fetch_to_file(&self, url: &str, dest: &Path, force_refresh: bool) -> Result<PathBuf> {
        self.engine.fetch_to_file(url, dest, force_refresh)
    }

    /// Fetch several files concurrently, at most `max_workers` at a time.
    /// Results come back in completion order.
    pub fn fetch_many_to_files<K: Send + 'static>(
        &self,
        requests: Vec<FetchRequest<K>>,
        force_refresh: bool,
    ) -> FetchStream<K> {
        pool::spawn_pool(&self.engine, requests, self.max_workers, force_refresh)
    }

    pub fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.engine.fetch_bytes(url)
    }

    /// GET and parse a JSON document. A body that is not JSON is an API shape error.
    pub fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        let body = self.fetch_bytes(url)?;
        serde_json::from_slice(&body).map_err(|e| Error::api_shape(url, format!("invalid JSON: {}", e)))
    }

    /// For APIs that indirect through a redirect instead of answering directly.
    pub fn get_redirection(&self, url: &str) -> Result<Option<String>> {
        self.engine.get_redirection(url)
    }
}
