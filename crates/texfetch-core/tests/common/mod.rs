//! Shared helpers for integration tests.
#![allow(dead_code)]

pub mod http_server;
pub mod provider;
pub mod stub;

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;

use texfetch_core::{CacheDir, Downloader, ScraperEnv};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// In-memory zip archive holding `files`.
pub fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Downloader over `transport` with fast retries and a fresh environment
/// rooted at `cache_root`.
pub fn env(transport: &Arc<stub::StubTransport>, cache_root: &Path) -> ScraperEnv {
    ScraperEnv::new(downloader(transport), CacheDir::new(cache_root))
}

pub fn downloader(transport: &Arc<stub::StubTransport>) -> Downloader {
    Downloader::new(transport.clone()).with_retry(stub::fast_retry())
}
