//! Single-stream HTTP GET into the cache, or into memory for API responses.

use std::fs;
use std::path::{Path, PathBuf};

use super::Engine;
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::retry::{run_with_retry, FetchError};
use crate::storage::StorageWriter;
use crate::url_model::normalize_url;

impl Engine {
    /// Cache-aware download of `url` to `dest`. An existing non-empty `dest`
    /// is returned untouched unless `force_refresh` is set; no request is
    /// issued then. An empty body is an error and never reaches `dest`.
    pub(super) fn fetch_to_file(&self, url: &str, dest: &Path, force_refresh: bool) -> Result<PathBuf> {
        if !force_refresh && is_nonempty_file(dest) {
            tracing::debug!("using cached {}", dest.display());
            return Ok(dest.to_path_buf());
        }
        self.cancel.check()?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let url = normalize_url(url);
        tracing::info!("downloading {} -> {}", url, dest.display());
        let request = HttpRequest::download(url.as_str());
        let written = run_with_retry(&self.retry, &self.cancel, || self.download_once(&request, dest))
            .map_err(|e| into_error(e, &url, dest))?;
        tracing::debug!("wrote {} bytes to {}", written, dest.display());
        Ok(dest.to_path_buf())
    }

    fn download_once(&self, request: &HttpRequest, dest: &Path) -> std::result::Result<u64, FetchError> {
        let mut writer = StorageWriter::create(dest).map_err(FetchError::Storage)?;
        let cancel = &self.cancel;
        let outcome = self.transport.get(request, &mut |data: &[u8]| {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            writer.write(data).map_err(FetchError::Storage)
        });
        match outcome {
            Ok(response) if response.status == 200 && writer.written() == 0 => {
                writer.discard();
                Err(FetchError::EmptyBody)
            }
            Ok(response) if response.status == 200 => writer.finalize().map_err(FetchError::Storage),
            Ok(response) => {
                writer.discard();
                Err(FetchError::Http(response.status))
            }
            Err(e) => {
                writer.discard();
                Err(e)
            }
        }
    }

    /// GET `url` into memory. Non-200 is an error.
    pub(super) fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.cancel.check()?;
        let url = normalize_url(url);
        let request = HttpRequest::get(url.as_str());
        let (_, body) = run_with_retry(&self.retry, &self.cancel, || {
            let (response, body) = self.get_buffered(&request)?;
            if response.status != 200 {
                return Err(FetchError::Http(response.status));
            }
            Ok((response, body))
        })
        .map_err(|e| into_error(e, &url, Path::new("")))?;
        Ok(body)
    }

    /// GET without following redirects; `Location` of a 302, else `None`.
    pub(super) fn get_redirection(&self, url: &str) -> Result<Option<String>> {
        self.cancel.check()?;
        let url = normalize_url(url);
        let request = HttpRequest::get(url.as_str()).without_redirects();
        let (response, _) = run_with_retry(&self.retry, &self.cancel, || self.get_buffered(&request))
            .map_err(|e| into_error(e, &url, Path::new("")))?;
        if response.status == 302 {
            Ok(response.location)
        } else {
            tracing::debug!("{} answered {} instead of a redirect", url, response.status);
            Ok(None)
        }
    }

    fn get_buffered(&self, request: &HttpRequest) -> std::result::Result<(HttpResponse, Vec<u8>), FetchError> {
        let mut body = Vec::new();
        let cancel = &self.cancel;
        let response = self.transport.get(request, &mut |data: &[u8]| {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            body.extend_from_slice(data);
            Ok(())
        })?;
        Ok((response, body))
    }
}

fn is_nonempty_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

fn into_error(e: FetchError, url: &str, dest: &Path) -> Error {
    match e {
        FetchError::Cancelled => Error::Cancelled,
        FetchError::Storage(io) => Error::io(dest, io),
        other => Error::network(url, other.to_string()),
    }
}
