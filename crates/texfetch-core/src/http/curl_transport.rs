//! libcurl-backed transport.

use std::str;
use std::time::Duration;

use super::{parse_headers, BodySink, HttpRequest, HttpResponse, RequestKind, Transport};
use crate::config::TexfetchConfig;
use crate::retry::FetchError;

/// Below this rate (bytes/s) for `stall_timeout`, a download is abandoned.
const LOW_SPEED_LIMIT: u32 = 1024;

/// Hard cap on a single payload download.
const MAX_DOWNLOAD_TIME: Duration = Duration::from_secs(3600);

/// `Transport` over a fresh curl easy handle per request.
///
/// API requests are bounded by `timeout`; downloads only by the stall
/// detector and `MAX_DOWNLOAD_TIME`.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    user_agent: String,
    connect_timeout: Duration,
    timeout: Duration,
    stall_timeout: Duration,
}

impl CurlTransport {
    pub fn new(user_agent: impl Into<String>, connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            connect_timeout,
            timeout,
            stall_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_stall_timeout(mut self, stall_timeout: Duration) -> Self {
        self.stall_timeout = stall_timeout;
        self
    }

    pub fn from_config(cfg: &TexfetchConfig) -> Self {
        Self::new(
            cfg.user_agent.clone(),
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.request_timeout_secs),
        )
        .with_stall_timeout(Duration::from_secs(cfg.stall_timeout_secs))
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::from_config(&TexfetchConfig::default())
    }
}

impl Transport for CurlTransport {
    fn get(&self, request: &HttpRequest, sink: &mut BodySink<'_>) -> Result<HttpResponse, FetchError> {
        let mut header_lines: Vec<String> = Vec::new();
        let mut sink_error: Option<FetchError> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        easy.useragent(&self.user_agent)?;
        easy.follow_location(request.follow_redirects)?;
        if request.follow_redirects {
            easy.max_redirections(10)?;
        }
        // Empty string enables every encoding libcurl was built with.
        easy.accept_encoding("")?;
        easy.connect_timeout(self.connect_timeout)?;
        match request.kind {
            RequestKind::Api => easy.timeout(self.timeout)?,
            RequestKind::Download => {
                easy.low_speed_limit(LOW_SPEED_LIMIT)?;
                easy.low_speed_time(self.stall_timeout)?;
                easy.timeout(MAX_DOWNLOAD_TIME)?;
            }
        }

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| match sink(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    sink_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if let Some(err) = sink_error.take() {
                return Err(err);
            }
            return Err(FetchError::from(e));
        }

        let status = easy.response_code()?;
        let mut response = parse_headers(&header_lines);
        response.status = status;
        Ok(response)
    }
}
