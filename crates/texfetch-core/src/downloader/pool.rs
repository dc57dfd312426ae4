//! Bounded worker pool for fetching several files at once.
//!
//! Workers pull requests from a shared queue and report `(key, result)` over
//! a channel as each finishes, so results arrive in completion order. Callers
//! correlate by key, never by position.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use super::Engine;
use crate::error::{Error, Result};

/// One file to fetch; `key` travels with the result.
#[derive(Debug, Clone)]
pub struct FetchRequest<K> {
    pub key: K,
    pub url: String,
    pub dest: PathBuf,
}

impl<K> FetchRequest<K> {
    pub fn new(key: K, url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            key,
            url: url.into(),
            dest: dest.into(),
        }
    }
}

/// Lazy, finite stream of fetch results in completion order. Yields exactly
/// one item per submitted request. Dropping it early stops workers from
/// taking further requests; transfers already running finish in the background.
pub struct FetchStream<K> {
    rx: mpsc::Receiver<(K, Result<PathBuf>)>,
    remaining: usize,
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl<K> FetchStream<K> {
    /// Results not yet yielded.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn join_workers(&mut self) {
        for h in self.handles.drain(..) {
            if let Err(e) = h.join() {
                tracing::warn!("fetch worker panicked: {:?}", e);
            }
        }
    }
}

impl<K> Iterator for FetchStream<K> {
    type Item = (K, Result<PathBuf>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            self.join_workers();
            return None;
        }
        match self.rx.recv() {
            Ok(item) => {
                self.remaining -= 1;
                Some(item)
            }
            Err(_) => {
                tracing::warn!(
                    "fetch worker channel closed with {} results outstanding",
                    self.remaining
                );
                self.remaining = 0;
                self.join_workers();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<K> Drop for FetchStream<K> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

pub(super) fn spawn_pool<K: Send + 'static>(
    engine: &Engine,
    requests: Vec<FetchRequest<K>>,
    max_workers: usize,
    force_refresh: bool,
) -> FetchStream<K> {
    let count = requests.len();
    let work: Arc<Mutex<VecDeque<FetchRequest<K>>>> =
        Arc::new(Mutex::new(requests.into_iter().collect()));
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let num_workers = max_workers.max(1).min(count);
    let mut handles = Vec::with_capacity(num_workers);
    for _ in 0..num_workers {
        let work = Arc::clone(&work);
        let tx = tx.clone();
        let stop = Arc::clone(&stop);
        let engine = engine.clone();
        handles.push(std::thread::spawn(move || loop {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            let next = work.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
            let Some(request) = next else {
                break;
            };
            let res = if engine.cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                engine.fetch_to_file(&request.url, &request.dest, force_refresh)
            };
            if tx.send((request.key, res)).is_err() {
                break;
            }
        }));
    }
    drop(tx);

    FetchStream {
        rx,
        remaining: count,
        stop,
        handles,
    }
}
