// Configuration module entry point
// Loads and validates the application configuration

pub mod maxage;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use types::{
    Config, FileRoute, FilesConfig, FilesSection, LoggingConfig, RouteConfig, ServerConfig,
};

use crate::error::ConfigError;

impl Config {
    /// Load configuration from the specified file path (without extension).
    /// Missing file is fine; defaults and `SERVEFILE_*` environment
    /// variables still apply.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVEFILE"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("files.chunk_size", 1024)?
            .set_default("files.max_age", "1w")?
            .set_default("files.output_compression", false)?
            .set_default("files.minify", false)?
            .set_default("files.normalize_text", false)?
            .build()?;

        let cfg: Self = settings.try_deserialize().map_err(ConfigError::Load)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject bad values at load time so nothing fails mid-request.
    fn validate(&self) -> Result<(), ConfigError> {
        maxage::parse_max_age(&self.files.max_age)?;
        for (route_path, route) in &self.routes {
            let target = match route {
                RouteConfig::Dir { path, .. } => path,
                RouteConfig::File(file) => {
                    if let Some(expr) = &file.max_age {
                        maxage::parse_max_age(expr)?;
                    }
                    &file.path
                }
            };
            if target.trim().is_empty() {
                return Err(ConfigError::BadRoute {
                    route: route_path.clone(),
                    reason: "empty target path".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The resolved file-serving tunables. `validate` has already run, so
    /// the max-age expression is known good.
    pub fn resolve_files(&self) -> Result<FilesConfig, ConfigError> {
        Ok(FilesConfig {
            chunk_size: self.files.chunk_size,
            max_age: maxage::parse_max_age(&self.files.max_age)?,
            output_compression: self.files.output_compression,
            minify: self.files.minify,
            normalize_text: self.files.normalize_text,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ConfigError::BadAddress(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_a_file() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.files.chunk_size, 1024);
        assert!(cfg.routes.is_empty());

        let files = cfg.resolve_files().unwrap();
        assert_eq!(files.max_age, 604_800);
        assert!(!files.output_compression);
    }

    #[test]
    fn socket_addr_parses() {
        let cfg = Config::load_from("no-such-config-file").unwrap();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8080);
    }
}
