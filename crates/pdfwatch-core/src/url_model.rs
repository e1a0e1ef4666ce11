//! Attachment naming: derive a safe filename from the document URL.

use url::Url;

/// Used when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "document.pdf";

const NAME_MAX: usize = 255;

/// Filename for the mailed/archived copy of the document at `url`.
///
/// Takes the last non-empty path segment, percent-decodes it and sanitizes
/// it for Linux. Falls back to [`DEFAULT_FILENAME`].
///
/// - `https://example.com/files/june%20map.pdf` → `"june_map.pdf"`
/// - `https://example.com/` → `"document.pdf"`
pub fn attachment_filename(url: &Url) -> String {
    let Some(segment) = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
    else {
        return DEFAULT_FILENAME.to_string();
    };

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let sanitized = sanitize_filename(&decoded);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// MIME type for an attachment, keyed off its extension.
pub fn content_type_for(filename: &str) -> &'static str {
    if filename.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

/// Replace `/`, `\`, NUL, whitespace and control characters with a single
/// `_`, trim leading/trailing dots and underscores, cap at 255 bytes.
fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let unsafe_char = c == '/' || c == '\\' || c.is_control() || c.is_whitespace();
        if unsafe_char || c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
