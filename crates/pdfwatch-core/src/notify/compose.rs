//! Subject and HTML body of the change notification.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

pub const FULL_DATE_FORMAT: &str = "%b %-d %Y, %H:%M:%S";

/// Values shown in the stats table of the mail body.
pub struct BodyStats<'a, Tz: TimeZone> {
    pub page_url: &'a str,
    pub document_url: &'a str,
    pub last_checked: DateTime<Tz>,
    pub last_fingerprint: Option<&'a str>,
    pub this_fingerprint: &'a str,
    pub size: u64,
}

/// `"<label> download from (<Mon D, YYYY>)"`.
pub fn subject<Tz: TimeZone>(label: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!("{} download from ({})", label, now.format("%b %-d, %Y"))
}

pub fn body<Tz: TimeZone>(label: &str, stats: &BodyStats<'_, Tz>) -> String
where
    Tz::Offset: Display,
{
    let row = |name: &str, value: &str| {
        format!(
            "  <tr>\n    <th>{}</th>\n    <td>{}</td>\n  </tr>\n",
            name,
            escape_html(value)
        )
    };

    let mut table = String::new();
    table.push_str(&row("document:", stats.document_url));
    table.push_str(&row(
        "lastDownloadTime:",
        &stats.last_checked.format(FULL_DATE_FORMAT).to_string(),
    ));
    table.push_str(&row(
        "lastDownloadHash:",
        stats.last_fingerprint.unwrap_or("none"),
    ));
    table.push_str(&row("thisDownloadHash:", stats.this_fingerprint));
    table.push_str(&row("size (bytes):", &stats.size.to_string()));

    format!(
        "<html>\n<h1>Hello</h1>\n<br>\n\
<p>I am your friendly neighborhood {label} downloader. I watch the document linked from \
<a href=\"{page}\">{page}</a>. It changed since I last looked, so I've included the new copy.</p>\n\
<p>Here are some stats about me. I hope you find these interesting.</p>\n\
<table>\n{table}</table>\n</html>\n",
        label = escape_html(label),
        page = escape_html(stats.page_url),
        table = table,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
