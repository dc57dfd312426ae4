//! Parse HTTP response header lines into an `HttpResponse`.

use super::HttpResponse;

/// Parse collected header lines. When redirects were followed, libcurl hands
/// us every response's headers in sequence; only the last block counts.
/// The status is filled in by the caller from the handle.
pub(crate) fn parse_headers(lines: &[String]) -> HttpResponse {
    let mut response = HttpResponse::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            response = HttpResponse::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    response.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("location") {
                response.location = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-type") {
                response.content_type = Some(value.to_string());
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_location_of_redirect() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Location: https://cdn.example.com/file.zip",
            "Content-Length: 0",
        ]));
        assert_eq!(r.location.as_deref(), Some("https://cdn.example.com/file.zip"));
        assert_eq!(r.content_length, Some(0));
    }

    #[test]
    fn last_block_wins_after_followed_redirect() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Location: https://cdn.example.com/file.zip",
            "",
            "HTTP/1.1 200 OK",
            "Content-Type: application/zip",
            "Content-Length: 1234",
        ]));
        assert!(r.location.is_none());
        assert_eq!(r.content_type.as_deref(), Some("application/zip"));
        assert_eq!(r.content_length, Some(1234));
    }

    #[test]
    fn header_names_case_insensitive() {
        let r = parse_headers(&lines(&["content-type: application/json"]));
        assert_eq!(r.content_type.as_deref(), Some("application/json"));
    }
}
