//! Minimal HTTP/1.1 server for exercising the curl transport end to end.
//!
//! Serves fixed bodies by request path; unknown paths get 404. Each
//! connection handles one request and is closed afterwards. A page can be
//! trickled out in chunks to simulate a slow but steady transfer.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Page {
    pub status: u32,
    pub body: Vec<u8>,
    pub location: Option<String>,
    /// Send the body in this many chunks with a pause after each.
    pub pace: Option<(usize, Duration)>,
}

impl Page {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            location: None,
            pace: None,
        }
    }

    pub fn trickle(body: impl Into<Vec<u8>>, chunks: usize, pause: Duration) -> Self {
        Self {
            pace: Some((chunks.max(1), pause)),
            ..Self::ok(body)
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            body: Vec::new(),
            location: Some(location.to_string()),
            pace: None,
        }
    }
}

/// Start serving `pages` (path to page) on a background thread. Returns the
/// base URL without trailing slash, e.g. `http://127.0.0.1:12345`.
pub fn start(pages: Vec<(&str, Page)>) -> String {
    let pages: HashMap<String, Page> = pages
        .into_iter()
        .map(|(path, page)| (path.to_string(), page))
        .collect();
    let pages = Arc::new(pages);
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let pages = Arc::clone(&pages);
            thread::spawn(move || handle(stream, &pages));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

fn reason(status: u32) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        _ => "Status",
    }
}

fn handle(mut stream: TcpStream, pages: &HashMap<String, Page>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    let missing = Page {
        status: 404,
        body: b"not found".to_vec(),
        location: None,
        pace: None,
    };
    let page = pages.get(&path).unwrap_or(&missing);
    let location = page
        .location
        .as_ref()
        .map(|l| format!("Location: {}\r\n", l))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        page.status,
        reason(page.status),
        page.body.len(),
        location
    );
    let _ = stream.write_all(head.as_bytes());
    match page.pace {
        None => {
            let _ = stream.write_all(&page.body);
        }
        Some((chunks, pause)) => {
            let size = page.body.len().div_ceil(chunks).max(1);
            for chunk in page.body.chunks(size) {
                if stream.write_all(chunk).and_then(|()| stream.flush()).is_err() {
                    return;
                }
                thread::sleep(pause);
            }
        }
    }
    let _ = stream.flush();
}
