//! Minimal HTML pages for the non-JavaScript download flow

use crate::catalog::VideoMetadata;
use crate::validator::ValidUrl;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt::Write;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Percent-encode a query parameter value
fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n<main>\n{}</main>\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Error page rendered instead of a download
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let body = format!("<div role=\"alert\">{}</div>\n", escape_html(message));
    (status, Html(page("Download error", &body))).into_response()
}

/// Catalog rendered as plain download links
pub fn format_list_page(url: &ValidUrl, meta: &VideoMetadata) -> Response {
    let encoded_url = encode_query_value(url.as_str());
    let mut body = String::new();

    let _ = writeln!(body, "<h1>{}</h1>", escape_html(&meta.title));
    if !meta.thumbnail_url.is_empty() {
        let _ = writeln!(
            body,
            "<img src=\"{}\" alt=\"{}\">",
            escape_html(&meta.thumbnail_url),
            escape_html(&meta.title)
        );
    }
    let _ = writeln!(body, "<p>Duration: {}</p>", escape_html(&meta.duration_label));

    if meta.formats.is_empty() {
        body.push_str("<p>No downloadable formats found.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for entry in &meta.formats {
            let _ = writeln!(
                body,
                "<li><a href=\"/download?url={}&amp;format_id={}\">{}</a> ({}, {})</li>",
                encoded_url,
                encode_query_value(&entry.id),
                escape_html(&entry.label),
                escape_html(&entry.resolution_or_bitrate_label),
                escape_html(&entry.approx_size_label),
            );
        }
        body.push_str("</ul>\n");
    }

    (StatusCode::OK, Html(page(&meta.title, &body))).into_response()
}
