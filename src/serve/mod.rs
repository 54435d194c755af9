//! File serving core
//!
//! `ServedFile` wires the pieces together: validated per-route options, the
//! per-request descriptor, the negotiated plan, and body assembly. Serving
//! a file from application code instead of the web server makes sense when
//! the file lives outside the document root or when checks must run before
//! any byte goes out; this module is that path.

mod descriptor;
mod negotiate;
mod transform;

pub use descriptor::ResourceDescriptor;
pub use negotiate::{negotiate, ClientConditions, PlanStatus, ResponsePlan, ServeSettings};
pub use transform::{BodyTransform, TextFilters};

use std::path::{Path, PathBuf};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::config::{maxage, FileRoute, FilesConfig};
use crate::error::ConfigError;
use crate::http::mime::{ContentKind, MediaType};
use crate::http::response;
use crate::logger;

/// One file, validated and ready to answer requests.
///
/// Construction resolves everything that does not depend on the request:
/// media type, download name, cache lifetime, allow-origin. Per-request
/// facts (size, mtime, identity tag) are re-derived on every call, so a
/// file replaced on disk is picked up immediately.
pub struct ServedFile {
    path: PathBuf,
    media: MediaType,
    settings: ServeSettings,
    files: FilesConfig,
    transform: Option<Box<dyn BodyTransform>>,
}

impl ServedFile {
    /// Validate a configured route. Invalid options (a max-age expression
    /// that does not parse, or resolves negative) fail here, at
    /// construction, never mid-request.
    ///
    /// Path existence is deliberately not checked: the file may appear or
    /// vanish between requests, and each request re-stats it.
    pub fn new(route: &FileRoute, files: &FilesConfig) -> Result<Self, ConfigError> {
        Self::for_path(Path::new(&route.path), route, files)
    }

    /// Same as [`Self::new`] but serving `path` instead of `route.path`;
    /// used by directory routes where the target varies per request.
    pub(crate) fn for_path(
        path: &Path,
        route: &FileRoute,
        files: &FilesConfig,
    ) -> Result<Self, ConfigError> {
        let media = MediaType::resolve(route.mime.as_deref(), path);

        // The offered name is always a bare basename, whatever was configured
        let download_name = match &route.download_name {
            Some(name) if !name.trim().is_empty() => Path::new(name.trim())
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("download")
                .to_string(),
            _ => path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("download")
                .to_string(),
        };

        // Downloads always revalidate; max-age only applies to inline serving
        let max_age = if route.attachment {
            0
        } else {
            match &route.max_age {
                Some(expr) => maxage::parse_max_age(expr)?,
                None => files.max_age,
            }
        };

        let allow_origin = route
            .allow_origin
            .clone()
            .or_else(|| media.is_font.then(|| "*".to_string()));

        let settings = ServeSettings {
            mime: media.essence.clone(),
            download_name,
            attachment: route.attachment,
            max_age,
            allow_origin,
            chunk_threshold: files.chunk_size,
            output_compression: files.output_compression,
        };

        let transform: Option<Box<dyn BodyTransform>> = if media.kind == ContentKind::Text
            && (files.normalize_text || files.minify)
        {
            Some(Box::new(TextFilters {
                normalize: files.normalize_text,
                minify: files.minify,
            }))
        } else {
            None
        };

        Ok(Self {
            path: path.to_path_buf(),
            media,
            settings,
            files: files.clone(),
            transform,
        })
    }

    /// Override the allow-origin header after construction.
    pub fn set_allow_origin(&mut self, origin: &str) {
        self.settings.allow_origin = Some(origin.trim().to_string());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serve the file for one request: 404, 304, 416, 200 or 206.
    pub async fn respond(
        &self,
        cond: &ClientConditions,
        is_head: bool,
    ) -> Response<Full<Bytes>> {
        if !self.path.is_file() {
            return response::build_404_response();
        }

        let desc = match ResourceDescriptor::build(
            &self.path,
            &self.media,
            cond.accept_encoding.as_deref(),
            &self.files,
        ) {
            Ok(d) => d,
            Err(e) => {
                // The file exists but could not be described: a bug or a
                // filesystem fault, not a client problem.
                logger::log_error(&format!(
                    "failed to stat '{}': {e}",
                    self.path.display()
                ));
                return response::build_500_response();
            }
        };

        let plan = negotiate(&desc, cond, &self.settings);

        let body = if is_head || plan.total_bytes == 0 {
            Bytes::new()
        } else {
            match self.read_body(&plan).await {
                Ok(b) => b,
                Err(e) => {
                    logger::log_error(&format!(
                        "failed to read '{}': {e}",
                        self.path.display()
                    ));
                    return response::build_500_response();
                }
            }
        };

        response::from_plan(&plan, body)
    }

    /// Read the plan's byte window, applying the text filters when set.
    async fn read_body(&self, plan: &ResponsePlan) -> std::io::Result<Bytes> {
        let content = fs::read(&self.path).await?;

        let sliced = match plan.range {
            Some((start, end)) if plan.status == PlanStatus::PartialContent => {
                // The file may have shrunk between stat and read; clamp
                // rather than panic on a stale window.
                let lo = usize::try_from(start).unwrap_or(usize::MAX).min(content.len());
                let hi = usize::try_from(end.saturating_add(1))
                    .unwrap_or(usize::MAX)
                    .min(content.len());
                content.get(lo..hi).unwrap_or(&[]).to_vec()
            }
            _ => content,
        };

        let body = match &self.transform {
            Some(t) => t.transform(sliced, &self.media.essence),
            None => sliced,
        };
        Ok(Bytes::from(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn files_config() -> FilesConfig {
        FilesConfig {
            chunk_size: 64,
            max_age: 3600,
            output_compression: false,
            minify: false,
            normalize_text: false,
        }
    }

    fn write_temp(content: &[u8], suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("create temp file");
        file.write_all(content).expect("write temp file");
        file.flush().expect("flush temp file");
        file
    }

    fn bare_route(path: &Path) -> FileRoute {
        FileRoute {
            path: path.display().to_string(),
            mime: None,
            download_name: None,
            attachment: false,
            max_age: None,
            allow_origin: None,
        }
    }

    fn header<'a>(
        resp: &'a Response<Full<Bytes>>,
        name: &str,
    ) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn serves_full_file_with_framing_headers() {
        let data = vec![7u8; 500];
        let file = write_temp(&data, ".bin");
        let mut route = bare_route(file.path());
        route.mime = Some("application/pdf".to_string());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "Content-Length"), Some("500"));
        assert_eq!(header(&resp, "Accept-Ranges"), Some("bytes"));
        assert_eq!(header(&resp, "Content-Type"), Some("application/pdf"));
        assert!(header(&resp, "ETag").is_some());
    }

    #[tokio::test]
    async fn partial_body_matches_window() {
        let data: Vec<u8> = (0..400u16).map(|b| u8::try_from(b % 250).unwrap()).collect();
        let file = write_temp(&data, ".bin");
        let mut route = bare_route(file.path());
        route.mime = Some("application/pdf".to_string());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let cond = ClientConditions {
            range: Some("bytes=100-199".to_string()),
            ..ClientConditions::default()
        };
        let resp = served.respond(&cond, false).await;
        assert_eq!(resp.status(), 206);
        assert_eq!(header(&resp, "Content-Range"), Some("bytes 100-199/400"));
        assert_eq!(header(&resp, "Content-Length"), Some("100"));
    }

    #[tokio::test]
    async fn head_omits_body_keeps_headers() {
        let file = write_temp(&vec![1u8; 300], ".bin");
        let mut route = bare_route(file.path());
        route.mime = Some("image/png".to_string());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let resp = served.respond(&ClientConditions::default(), true).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(header(&resp, "Content-Length"), Some("300"));
    }

    #[tokio::test]
    async fn missing_file_is_404() {
        let route = FileRoute {
            path: "/nonexistent/path/to/file.bin".to_string(),
            mime: None,
            download_name: None,
            attachment: false,
            max_age: None,
            allow_origin: None,
        };
        let served = ServedFile::new(&route, &files_config()).unwrap();
        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(resp.status(), 404);
    }

    #[tokio::test]
    async fn etag_round_trip_revalidates() {
        let file = write_temp(&vec![9u8; 200], ".bin");
        let mut route = bare_route(file.path());
        route.mime = Some("image/png".to_string());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let first = served.respond(&ClientConditions::default(), false).await;
        let etag = header(&first, "ETag").unwrap().to_string();

        let cond = ClientConditions {
            if_none_match: Some(etag),
            ..ClientConditions::default()
        };
        let second = served.respond(&cond, false).await;
        assert_eq!(second.status(), 304);
        assert!(header(&second, "Content-Length").is_none());
    }

    #[tokio::test]
    async fn font_route_gets_wildcard_origin() {
        let file = write_temp(b"fontdata", ".woff2");
        let route = bare_route(file.path());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(header(&resp, "access-control-allow-origin"), Some("*"));
    }

    #[tokio::test]
    async fn explicit_origin_overrides_font_default() {
        let file = write_temp(b"fontdata", ".woff2");
        let mut route = bare_route(file.path());
        route.allow_origin = Some("https://cdn.example.net".to_string());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(
            header(&resp, "access-control-allow-origin"),
            Some("https://cdn.example.net")
        );
    }

    #[tokio::test]
    async fn attachment_names_download() {
        let file = write_temp(&vec![3u8; 100], ".mka");
        let mut route = bare_route(file.path());
        route.mime = Some("audio/x-matroska".to_string());
        route.attachment = true;
        route.download_name = Some("teaseme.mka".to_string());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(
            header(&resp, "Content-Disposition"),
            Some("attachment; filename=\"teaseme.mka\"")
        );
        assert_eq!(header(&resp, "Content-Description"), Some("File Transfer"));
    }

    #[tokio::test]
    async fn attachment_forces_revalidation() {
        let file = write_temp(&vec![3u8; 100], ".bin");
        let mut route = bare_route(file.path());
        route.mime = Some("application/pdf".to_string());
        route.attachment = true;
        route.max_age = Some("2 weeks".to_string());
        let served = ServedFile::new(&route, &files_config()).unwrap();

        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(header(&resp, "Cache-Control"), Some("must-revalidate"));
    }

    #[tokio::test]
    async fn allow_origin_can_be_set_after_construction() {
        let file = write_temp(&vec![5u8; 100], ".bin");
        let mut route = bare_route(file.path());
        route.mime = Some("image/png".to_string());
        let mut served = ServedFile::new(&route, &files_config()).unwrap();
        served.set_allow_origin("https://gallery.example.net");

        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(
            header(&resp, "access-control-allow-origin"),
            Some("https://gallery.example.net")
        );
    }

    #[test]
    fn bad_max_age_fails_construction() {
        let route = FileRoute {
            path: "/tmp/whatever.bin".to_string(),
            mime: None,
            download_name: None,
            attachment: false,
            max_age: Some("-1 day".to_string()),
            allow_origin: None,
        };
        assert!(ServedFile::new(&route, &files_config()).is_err());
    }

    #[tokio::test]
    async fn minified_css_served_shorter() {
        let css = b"/* comment */\nbody {\n  color: red;\n}\n";
        let file = write_temp(css, ".css");
        let mut route = bare_route(file.path());
        route.mime = Some("text/css".to_string());
        let mut cfg = files_config();
        cfg.minify = true;
        let served = ServedFile::new(&route, &cfg).unwrap();

        let resp = served.respond(&ClientConditions::default(), false).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(
            header(&resp, "Content-Type"),
            Some("text/css; charset=UTF-8")
        );
        // Text responses never advertise a length; the body was rewritten.
        assert!(header(&resp, "Content-Length").is_none());
    }
}
