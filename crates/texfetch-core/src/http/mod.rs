//! HTTP transport seam.
//!
//! The download engine only talks to [`Transport`]; production code uses
//! [`CurlTransport`] (libcurl easy handle), tests plug in stubs that count
//! requests or inject delays and failures.

mod curl_transport;
mod parse;

pub use curl_transport::CurlTransport;
pub(crate) use parse::parse_headers;

use crate::retry::FetchError;

/// How long a request may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// API document or redirect lookup: small body, short wall-clock limit.
    Api,
    /// Payload file (zip, EXR, ...): only a stalled transfer is cut off.
    Download,
}

/// One GET request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Absolute URL (already normalised to carry a scheme).
    pub url: String,
    /// Follow 3xx responses transparently. Off when a provider's API
    /// indirects through a redirect we want to read ourselves.
    pub follow_redirects: bool,
    pub kind: RequestKind,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            follow_redirects: true,
            kind: RequestKind::Api,
        }
    }

    /// GET of a payload file that may be hundreds of megabytes.
    pub fn download(url: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Download,
            ..Self::get(url)
        }
    }

    pub fn without_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }
}

/// Status and the few headers the engine cares about. The body went to the sink.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    /// `Location` of the final response, if any.
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Callback receiving response body chunks in order. Returning an error
/// aborts the transfer and that error is returned from [`Transport::get`].
pub type BodySink<'a> = dyn FnMut(&[u8]) -> Result<(), FetchError> + 'a;

/// Blocking HTTP GET with a streaming body sink.
///
/// Implementations must be shareable across the worker pool.
pub trait Transport: Send + Sync {
    fn get(&self, request: &HttpRequest, sink: &mut BodySink<'_>) -> Result<HttpResponse, FetchError>;
}
