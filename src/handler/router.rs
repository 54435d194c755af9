//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, and hand-off to the serving core.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};

use crate::config::{Config, FileRoute, FilesConfig, RouteConfig};
use crate::error::ConfigError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::serve::{ClientConditions, ServedFile};

/// Shared application state: configuration plus the routes built from it.
pub struct AppState {
    pub config: Config,
    pub files: FilesConfig,
    /// Sorted longest-path-first so prefix matching picks the most specific
    routes: Vec<(String, RouteEntry)>,
}

enum RouteEntry {
    File(ServedFile),
    Dir {
        root: String,
        index_files: Vec<String>,
    },
}

impl AppState {
    /// Build the route table. Every file route is validated here, so a bad
    /// max-age or empty path fails at startup instead of mid-request.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let files = config.resolve_files()?;

        let mut routes = Vec::with_capacity(config.routes.len());
        for (route_path, route) in &config.routes {
            let entry = match route {
                RouteConfig::File(file_route) => {
                    RouteEntry::File(ServedFile::new(file_route, &files)?)
                }
                RouteConfig::Dir { path, index_files } => RouteEntry::Dir {
                    root: path.clone(),
                    index_files: index_files.clone(),
                },
            };
            routes.push((route_path.clone(), entry));
        }
        routes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Ok(Self {
            config,
            files,
            routes,
        })
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let http_version = version_label(req.version());
    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let is_head = method == Method::HEAD;

    let response = match method {
        Method::GET | Method::HEAD => {
            let cond = ClientConditions::from_headers(req.headers());
            route_request(&state, &path, &cond, is_head).await
        }
        Method::OPTIONS => http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            http::build_405_response()
        }
    };

    if state.config.logging.access_log {
        let mut entry =
            AccessLogEntry::new(peer_addr.ip().to_string(), method.to_string(), path);
        entry.query = query;
        entry.http_version = http_version.to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(
            response.body().size_hint().exact().unwrap_or(0),
        )
        .unwrap_or(usize::MAX);
        entry.user_agent = user_agent;
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn version_label(version: Version) -> &'static str {
    if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
}

/// Route request based on path and configuration
async fn route_request(
    state: &Arc<AppState>,
    path: &str,
    cond: &ClientConditions,
    is_head: bool,
) -> Response<Full<Bytes>> {
    for (route_path, entry) in &state.routes {
        match entry {
            RouteEntry::File(served) => {
                if path == route_path {
                    return served.respond(cond, is_head).await;
                }
            }
            RouteEntry::Dir { root, index_files } => {
                if path.starts_with(route_path.as_str()) {
                    return serve_directory(
                        state, root, route_path, index_files, path, cond, is_head,
                    )
                    .await;
                }
            }
        }
    }
    http::build_404_response()
}

/// Serve a file resolved under a directory route.
async fn serve_directory(
    state: &Arc<AppState>,
    root: &str,
    route_prefix: &str,
    index_files: &[String],
    req_path: &str,
    cond: &ClientConditions,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let Some(target) = resolve_dir_target(root, req_path, route_prefix, index_files) else {
        return http::build_404_response();
    };

    let route = FileRoute::bare(target.display().to_string());
    match ServedFile::for_path(&target, &route, &state.files) {
        Ok(served) => served.respond(cond, is_head).await,
        Err(e) => {
            logger::log_error(&format!(
                "failed to build serving options for '{}': {e}",
                target.display()
            ));
            http::build_500_response()
        }
    }
}

/// Map a request path into a directory, refusing anything that escapes it.
fn resolve_dir_target(
    static_dir: &str,
    path: &str,
    route_prefix: &str,
    index_files: &[String],
) -> Option<PathBuf> {
    // Remove leading slash and prevent directory traversal
    let clean_path = path.trim_start_matches('/').replace("..", "");

    // Remove route prefix from path
    let prefix_clean = route_prefix.trim_matches('/');
    let relative_path = if prefix_clean.is_empty() {
        clean_path.as_str()
    } else if clean_path == prefix_clean {
        ""
    } else {
        clean_path
            .strip_prefix(&format!("{prefix_clean}/"))
            .unwrap_or(&clean_path)
    };

    let mut file_path = Path::new(static_dir).join(relative_path);

    // Security: ensure the resolved path stays within static_dir
    let static_dir_canonical = match Path::new(static_dir).canonicalize() {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{static_dir}': {e}"
            ));
            return None;
        }
    };

    // Directory requests try the configured index files
    if file_path.is_dir() || relative_path.is_empty() || relative_path.ends_with('/') {
        for index_file in index_files {
            let index_path = file_path.join(index_file);
            if index_path.is_file() {
                file_path = index_path;
                break;
            }
        }
    }

    // File not found is a plain 404, not worth a warning
    let file_path_canonical = file_path.canonicalize().ok()?;
    if !file_path_canonical.starts_with(&static_dir_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {path} -> {}",
            file_path_canonical.display()
        ));
        return None;
    }

    Some(file_path_canonical)
}
