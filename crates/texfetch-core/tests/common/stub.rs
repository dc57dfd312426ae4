//! In-memory transport: canned responses per URL, hit counting, latency
//! (global and per route), and a record of peak concurrency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use texfetch_core::http::{BodySink, HttpRequest, HttpResponse, Transport};
use texfetch_core::retry::{FetchError, RetryPolicy};

#[derive(Debug, Clone)]
struct Route {
    status: u32,
    body: Vec<u8>,
    location: Option<String>,
    delay: Duration,
}

#[derive(Default)]
pub struct StubTransport {
    routes: Mutex<HashMap<String, Route>>,
    hits: Mutex<HashMap<String, usize>>,
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// Three quick attempts so retry paths run without slowing the suite.
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn insert(&self, url: &str, route: Route) {
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }

    pub fn route(&self, url: &str, body: impl Into<Vec<u8>>) {
        self.insert(
            url,
            Route {
                status: 200,
                body: body.into(),
                location: None,
                delay: Duration::ZERO,
            },
        );
    }

    /// Like `route`, but this URL answers only after `delay`.
    pub fn route_delayed(&self, url: &str, body: impl Into<Vec<u8>>, delay: Duration) {
        self.insert(
            url,
            Route {
                status: 200,
                body: body.into(),
                location: None,
                delay,
            },
        );
    }

    pub fn route_json(&self, url: &str, value: &Value) {
        self.route(url, serde_json::to_vec(value).unwrap());
    }

    pub fn route_status(&self, url: &str, status: u32) {
        self.insert(
            url,
            Route {
                status,
                body: Vec::new(),
                location: None,
                delay: Duration::ZERO,
            },
        );
    }

    pub fn route_redirect(&self, url: &str, location: &str) {
        self.insert(
            url,
            Route {
                status: 302,
                body: Vec::new(),
                location: Some(location.to_string()),
                delay: Duration::ZERO,
            },
        );
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Transport for StubTransport {
    fn get(
        &self,
        request: &HttpRequest,
        sink: &mut BodySink<'_>,
    ) -> Result<HttpResponse, FetchError> {
        *self
            .hits
            .lock()
            .unwrap()
            .entry(request.url.clone())
            .or_insert(0) += 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or(Route {
                status: 404,
                body: Vec::new(),
                location: None,
                delay: Duration::ZERO,
            });
        let delay = self.delay + route.delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        let result = route
            .body
            .chunks(4096)
            .try_for_each(|chunk| sink(chunk))
            .map(|()| HttpResponse {
                status: route.status,
                location: route.location.clone(),
                content_type: None,
                content_length: Some(route.body.len() as u64),
            });
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
