//! Application-level static file serving with HTTP conditional-request and
//! byte-range negotiation.
//!
//! Letting application code serve a file instead of the web server makes
//! sense when the file lives outside the document root, or when checks
//! (age verification, entitlements) must run before any byte goes out.
//! The serving core decides, from client headers and file metadata,
//! whether to answer 200, 206, 304, 404 or 416, and emits the exact
//! framing headers for that decision: `ETag`, `Last-Modified`,
//! `Content-Range`, `Accept-Ranges`, `Cache-Control`.
//!
//! The negotiation itself is a pure function of file facts and request
//! headers:
//!
//! ```
//! use servefile::http::mime::ContentKind;
//! use servefile::serve::{
//!     negotiate, ClientConditions, PlanStatus, ResourceDescriptor, ServeSettings,
//! };
//!
//! let desc = ResourceDescriptor {
//!     size_bytes: 4096,
//!     modified_at: 784_111_777,
//!     last_modified: "Sun, 06 Nov 1994 08:49:37 GMT".to_string(),
//!     identity_tag: "1a2b-1000-2ebde121-f4a24ef".to_string(),
//!     content_kind: ContentKind::Binary,
//!     default_origin: None,
//! };
//! let settings = ServeSettings {
//!     mime: "application/pdf".to_string(),
//!     download_name: "report.pdf".to_string(),
//!     attachment: false,
//!     max_age: 3600,
//!     allow_origin: None,
//!     chunk_threshold: 1024,
//!     output_compression: false,
//! };
//! let cond = ClientConditions {
//!     range: Some("bytes=0-1023".to_string()),
//!     ..ClientConditions::default()
//! };
//!
//! let plan = negotiate(&desc, &cond, &settings);
//! assert_eq!(plan.status, PlanStatus::PartialContent);
//! assert_eq!(plan.range, Some((0, 1023)));
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod serve;
pub mod server;
