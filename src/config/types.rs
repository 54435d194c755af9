// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub files: FilesSection,
    #[serde(default)]
    pub routes: HashMap<String, RouteConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Global file-serving tunables, raw form as deserialized.
/// `max_age` stays a string here; it is resolved by [`Config::resolve_files`].
#[derive(Debug, Deserialize, Clone)]
pub struct FilesSection {
    /// Files at or below this size are served whole with no range support
    pub chunk_size: u64,
    /// Default client cache lifetime, seconds or a duration expression
    pub max_age: String,
    /// Whether text bodies are compressed on the way out
    pub output_compression: bool,
    /// Minify stylesheets, word-wrap over-long plain text
    pub minify: bool,
    /// Unify line endings and strip BOMs in text bodies
    pub normalize_text: bool,
}

/// Resolved file-serving tunables handed to the serving core.
#[derive(Debug, Clone)]
pub struct FilesConfig {
    pub chunk_size: u64,
    /// Default cache lifetime in seconds
    pub max_age: u64,
    pub output_compression: bool,
    pub minify: bool,
    pub normalize_text: bool,
}

/// Route kinds
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteConfig {
    /// Map the remaining request path under a directory
    Dir {
        path: String,
        #[serde(default = "default_index_files")]
        index_files: Vec<String>,
    },
    /// Serve one configured file
    File(FileRoute),
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

/// Per-file serving options
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FileRoute {
    /// Full filesystem path to the file being served
    pub path: String,
    /// Declared media type; resolved/sniffed when absent
    #[serde(default)]
    pub mime: Option<String>,
    /// Name the client sees on download; basename of `path` when absent
    #[serde(default)]
    pub download_name: Option<String>,
    /// Prompt the client to save instead of display
    #[serde(default)]
    pub attachment: bool,
    /// Override of the global max-age, seconds or a duration expression
    #[serde(default)]
    pub max_age: Option<String>,
    /// Explicit allow-origin; fonts default to `*` without it
    #[serde(default)]
    pub allow_origin: Option<String>,
}

impl FileRoute {
    /// A route with nothing but a path; used for files resolved under
    /// directory routes.
    pub fn bare(path: String) -> Self {
        Self {
            path,
            mime: None,
            download_name: None,
            attachment: false,
            max_age: None,
            allow_origin: None,
        }
    }
}
