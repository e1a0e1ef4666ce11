//! Parse HTTP response header lines collected during a GET.

/// Headers of the final response that matter for a full-body fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResponseHeaders {
    /// Announced body size, if `Content-Length` is present.
    pub content_length: Option<u64>,
    /// `Content-Type` value if present.
    pub content_type: Option<String>,
}

/// Parse header lines into ResponseHeaders.
///
/// With redirects curl reports every hop; a status line (`HTTP/...`) starts a
/// new response, so only the last response's headers survive.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHeaders {
    let mut out = ResponseHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            out = ResponseHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    out.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-type") {
                out.content_type = Some(value.to_string());
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn content_length_and_type() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 200 OK",
            "Content-Length: 12345",
            "Content-Type: application/pdf",
        ]));
        assert_eq!(r.content_length, Some(12345));
        assert_eq!(r.content_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn redirect_hops_are_discarded() {
        let r = parse_headers(&lines(&[
            "HTTP/1.1 302 Found",
            "Location: /real.pdf",
            "Content-Length: 0",
            "",
            "HTTP/1.1 200 OK",
            "Content-Type: application/pdf",
        ]));
        assert_eq!(r.content_length, None);
        assert_eq!(r.content_type.as_deref(), Some("application/pdf"));
    }

    #[test]
    fn unparseable_length_is_ignored() {
        let r = parse_headers(&lines(&["HTTP/1.1 200 OK", "content-length: lots"]));
        assert_eq!(r.content_length, None);
    }
}
