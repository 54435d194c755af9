//! Conditional / range negotiation
//!
//! Consumes a resource descriptor plus the client's validator and range
//! headers and produces the response plan: status, byte window, and the
//! ordered header set. Pure function of its inputs; no shared state.

use crate::http::cache;
use crate::http::mime::ContentKind;
use crate::http::range::{resolve_range, RangeWindow};
use crate::serve::descriptor::ResourceDescriptor;

/// Terminal response states. Each produces a distinct, non-overlapping
/// header/body contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Ok,
    PartialContent,
    NotModified,
    RangeNotSatisfiable,
    NotFound,
}

impl PlanStatus {
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::PartialContent => 206,
            Self::NotModified => 304,
            Self::RangeNotSatisfiable => 416,
            Self::NotFound => 404,
        }
    }
}

/// Finished response plan, consumed exactly once by the transport.
#[derive(Debug, Clone)]
pub struct ResponsePlan {
    pub status: PlanStatus,
    /// Inclusive byte bounds; present for `PartialContent` and for the
    /// full-file `Ok` case, where it spans the whole file.
    pub range: Option<(u64, u64)>,
    pub total_bytes: u64,
    /// Emission-ordered header set
    pub headers: Vec<(&'static str, String)>,
}

impl ResponsePlan {
    /// A status-only plan: no body, no headers.
    fn bodyless(status: PlanStatus) -> Self {
        Self {
            status,
            range: None,
            total_bytes: 0,
            headers: Vec::new(),
        }
    }

    pub fn not_found() -> Self {
        Self::bodyless(PlanStatus::NotFound)
    }
}

/// The client request facts the negotiator consumes.
#[derive(Debug, Clone, Default)]
pub struct ClientConditions {
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range: Option<String>,
    pub accept_encoding: Option<String>,
}

impl ClientConditions {
    /// Extract the relevant headers from a request. Hyper stores names
    /// lowercased, so lookups here are case-insensitive by construction.
    pub fn from_headers(headers: &hyper::HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };
        Self {
            if_none_match: get("if-none-match"),
            if_modified_since: get("if-modified-since"),
            range: get("range"),
            accept_encoding: get("accept-encoding"),
        }
    }
}

/// Per-file settings the negotiator needs, resolved once at construction.
#[derive(Debug, Clone)]
pub struct ServeSettings {
    /// Resolved media type essence (no parameters)
    pub mime: String,
    /// Name offered to the client when serving as an attachment
    pub download_name: String,
    pub attachment: bool,
    /// Client cache lifetime in seconds; 0 means always revalidate
    pub max_age: u64,
    /// Resolved allow-origin: explicit override, or `*` for fonts
    pub allow_origin: Option<String>,
    /// Files at or below this size are served whole, no range support
    pub chunk_threshold: u64,
    /// Whether text bodies are compressed on the way out
    pub output_compression: bool,
}

/// Decide the response for one request.
///
/// Step order, first match wins: cache validation, range eligibility and
/// parsing, plan assembly, header emission.
pub fn negotiate(
    desc: &ResourceDescriptor,
    cond: &ClientConditions,
    settings: &ServeSettings,
) -> ResponsePlan {
    // A matching validator short-circuits everything else: the 304 carries
    // no recomputed headers and range evaluation never happens. A present
    // If-None-Match suppresses If-Modified-Since even when it mismatches.
    if let Some(inm) = cond.if_none_match.as_deref() {
        if cache::none_match(inm, &desc.identity_tag) {
            return ResponsePlan::bodyless(PlanStatus::NotModified);
        }
    } else if let Some(ims) = cond.if_modified_since.as_deref() {
        if cache::not_modified_since(ims, desc.modified_at) {
            return ResponsePlan::bodyless(PlanStatus::NotModified);
        }
    }

    // Range support is only offered for binary content past the chunk
    // threshold; text bodies may be rewritten after negotiation, so their
    // stat size cannot be promised.
    let rangeable =
        desc.content_kind == ContentKind::Binary && desc.size_bytes > settings.chunk_threshold;

    let window = if rangeable {
        resolve_range(cond.range.as_deref(), desc.size_bytes)
    } else {
        RangeWindow::Full
    };

    let (status, range, total_bytes) = match window {
        RangeWindow::Bad => (PlanStatus::RangeNotSatisfiable, None, 0),
        RangeWindow::Partial { start, end } => (
            PlanStatus::PartialContent,
            Some((start, end)),
            end - start + 1,
        ),
        RangeWindow::Full if desc.size_bytes == 0 => (PlanStatus::Ok, None, 0),
        RangeWindow::Full => (
            PlanStatus::Ok,
            Some((0, desc.size_bytes - 1)),
            desc.size_bytes,
        ),
    };

    let mut headers: Vec<(&'static str, String)> = Vec::new();

    if status == PlanStatus::RangeNotSatisfiable {
        headers.push(("Content-Range", format!("bytes */{}", desc.size_bytes)));
        return ResponsePlan {
            status,
            range: None,
            total_bytes: 0,
            headers,
        };
    }

    if settings.attachment {
        headers.push(("Content-Description", "File Transfer".to_string()));
        headers.push((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", settings.download_name),
        ));
    }

    if settings.max_age == 0 {
        headers.push(("Cache-Control", "must-revalidate".to_string()));
    } else {
        headers.push(("Cache-Control", format!("max-age={}", settings.max_age)));
    }
    headers.push(("Last-Modified", desc.last_modified.clone()));
    headers.push(("ETag", format!("\"{}\"", desc.identity_tag)));

    match desc.content_kind {
        ContentKind::Binary => {
            headers.push((
                "Accept-Ranges",
                if rangeable { "bytes" } else { "none" }.to_string(),
            ));
            if let (PlanStatus::PartialContent, Some((start, end))) = (status, range) {
                headers.push(("Content-Length", total_bytes.to_string()));
                headers.push((
                    "Content-Range",
                    format!("bytes {start}-{end}/{}", desc.size_bytes),
                ));
            } else {
                headers.push(("Content-Length", desc.size_bytes.to_string()));
            }
            if let Some(origin) = &settings.allow_origin {
                headers.push(("access-control-allow-origin", origin.clone()));
            }
            headers.push(("Content-Type", settings.mime.clone()));
        }
        ContentKind::Text => {
            // No Content-Length and no Accept-Ranges: the text filters may
            // still rewrite the body, so the stat size is not a promise.
            let mut vary: Vec<&str> = Vec::new();
            if settings.output_compression {
                vary.push("Accept-Encoding");
            }
            if settings.allow_origin.as_deref().is_some_and(|o| o != "*") {
                vary.push("Origin");
            }
            if !vary.is_empty() {
                headers.push(("Vary", vary.join(", ")));
            }
            if let Some(origin) = &settings.allow_origin {
                headers.push(("access-control-allow-origin", origin.clone()));
            }
            let content_type = if settings.mime.contains("charset=") {
                settings.mime.clone()
            } else {
                format!("{}; charset=UTF-8", settings.mime)
            };
            headers.push(("Content-Type", content_type));
        }
    }

    ResponsePlan {
        status,
        range,
        total_bytes,
        headers,
    }
}
