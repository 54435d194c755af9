//! Resource descriptor
//!
//! Immutable per-request facts about the file being served: size, mtime,
//! identity tag, content classification. Rebuilt on every request so a
//! changed file is never served with a stale tag; the cost is one stat.

use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::config::FilesConfig;
use crate::http::date;
use crate::http::mime::{ContentKind, MediaType};

/// Facts the negotiator works from. Built once per request, immutable.
#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub size_bytes: u64,
    /// Modification time, unix seconds (second resolution)
    pub modified_at: i64,
    /// `modified_at` pre-rendered as an RFC 1123 date
    pub last_modified: String,
    /// Opaque tag, unique per (file identity, size, mtime, served variant)
    pub identity_tag: String,
    pub content_kind: ContentKind,
    /// `Some("*")` for font content, `None` otherwise
    pub default_origin: Option<&'static str>,
}

impl ResourceDescriptor {
    /// Stat the file and derive its identity facts.
    ///
    /// The caller has already established that the file exists; any failure
    /// here is an internal fault, not a 404.
    pub fn build(
        path: &Path,
        media: &MediaType,
        accept_encoding: Option<&str>,
        files: &FilesConfig,
    ) -> io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let size_bytes = meta.len();
        let modified_at = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX));

        let file_id = file_id_of(&meta);
        let variant = variant_suffix(media.kind, accept_encoding, files);
        let identity_tag = format!("{file_id:x}-{size_bytes:x}-{modified_at:x}-{variant}");

        Ok(Self {
            size_bytes,
            modified_at,
            last_modified: date::format_http_date(modified_at),
            identity_tag,
            content_kind: media.kind,
            default_origin: media.is_font.then_some("*"),
        })
    }
}

#[cfg(unix)]
fn file_id_of(meta: &std::fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    meta.ino()
}

#[cfg(not(unix))]
fn file_id_of(_meta: &std::fs::Metadata) -> u64 {
    // No stable file id off unix; (size, mtime) still vary the tag.
    0
}

/// Short suffix naming the byte stream actually produced.
///
/// Intermediary caches key on the tag, so differently-encoded or
/// differently-minified renditions of the same file must carry different
/// tags or a client can receive a body it cannot decode. Only text bodies
/// are ever compressed or minified on the way out.
fn variant_suffix(
    kind: ContentKind,
    accept_encoding: Option<&str>,
    files: &FilesConfig,
) -> String {
    if kind != ContentKind::Text || !files.output_compression {
        return "f4a24ef".to_string();
    }
    let mut suffix = String::from(if files.minify { "3d" } else { "4c" });
    suffix.push_str(match preferred_encoding(accept_encoding) {
        Encoding::Gzip => "7aa23",
        Encoding::Deflate => "98db4",
        Encoding::Identity => "c41ca",
    });
    suffix
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Gzip,
    Deflate,
    Identity,
}

/// The client's preferred content encoding: gzip over deflate over
/// identity, case-insensitive substring match.
fn preferred_encoding(accept_encoding: Option<&str>) -> Encoding {
    let Some(header) = accept_encoding else {
        return Encoding::Identity;
    };
    let header = header.to_ascii_lowercase();
    if header.contains("gzip") {
        Encoding::Gzip
    } else if header.contains("deflate") {
        Encoding::Deflate
    } else {
        Encoding::Identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn files_config(output_compression: bool, minify: bool) -> FilesConfig {
        FilesConfig {
            chunk_size: 1024,
            max_age: 604_800,
            output_compression,
            minify,
            normalize_text: false,
        }
    }

    fn temp_file(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        file.write_all(content).expect("write temp file");
        file.flush().expect("flush temp file");
        file
    }

    #[test]
    fn same_file_same_tag() {
        let file = temp_file(b"hello descriptor");
        let media = MediaType::resolve(Some("image/png"), file.path());
        let cfg = files_config(false, false);

        let a = ResourceDescriptor::build(file.path(), &media, None, &cfg).unwrap();
        let b = ResourceDescriptor::build(file.path(), &media, None, &cfg).unwrap();
        assert_eq!(a.identity_tag, b.identity_tag);
        assert_eq!(a.size_bytes, 16);
    }

    #[test]
    fn changed_content_changes_tag() {
        let mut file = temp_file(b"first version");
        let media = MediaType::resolve(Some("image/png"), file.path());
        let cfg = files_config(false, false);

        let before = ResourceDescriptor::build(file.path(), &media, None, &cfg).unwrap();
        file.write_all(b" plus more bytes").unwrap();
        file.flush().unwrap();
        let after = ResourceDescriptor::build(file.path(), &media, None, &cfg).unwrap();
        assert_ne!(before.identity_tag, after.identity_tag);
    }

    #[test]
    fn binary_variant_ignores_accept_encoding() {
        let file = temp_file(b"binary bytes");
        let media = MediaType::resolve(Some("image/png"), file.path());
        let cfg = files_config(true, true);

        let plain = ResourceDescriptor::build(file.path(), &media, None, &cfg).unwrap();
        let gz = ResourceDescriptor::build(file.path(), &media, Some("gzip"), &cfg).unwrap();
        assert_eq!(plain.identity_tag, gz.identity_tag);
        assert!(plain.identity_tag.ends_with("-f4a24ef"));
    }

    #[test]
    fn text_variant_tracks_encoding_and_minify() {
        let file = temp_file(b"body { color: red }");
        let media = MediaType::resolve(Some("text/css"), file.path());

        let compressed = files_config(true, false);
        let identity =
            ResourceDescriptor::build(file.path(), &media, None, &compressed).unwrap();
        let gzip =
            ResourceDescriptor::build(file.path(), &media, Some("GZip, br"), &compressed)
                .unwrap();
        let deflate =
            ResourceDescriptor::build(file.path(), &media, Some("deflate"), &compressed)
                .unwrap();
        assert!(identity.identity_tag.ends_with("-4cc41ca"));
        assert!(gzip.identity_tag.ends_with("-4c7aa23"));
        assert!(deflate.identity_tag.ends_with("-4c98db4"));

        let minified = files_config(true, true);
        let gzip_min =
            ResourceDescriptor::build(file.path(), &media, Some("gzip"), &minified).unwrap();
        assert!(gzip_min.identity_tag.ends_with("-3d7aa23"));

        // gzip wins over deflate when both are offered
        let both =
            ResourceDescriptor::build(file.path(), &media, Some("deflate, gzip"), &compressed)
                .unwrap();
        assert_eq!(both.identity_tag, gzip.identity_tag);
    }

    #[test]
    fn text_without_compression_uses_default_variant() {
        let file = temp_file(b"plain text");
        let media = MediaType::resolve(Some("text/plain"), file.path());
        let cfg = files_config(false, false);

        let desc = ResourceDescriptor::build(file.path(), &media, Some("gzip"), &cfg).unwrap();
        assert!(desc.identity_tag.ends_with("-f4a24ef"));
    }

    #[test]
    fn fonts_carry_wildcard_origin() {
        let file = temp_file(b"not really a font");
        let media = MediaType::resolve(Some("font/woff2"), file.path());
        let cfg = files_config(false, false);

        let desc = ResourceDescriptor::build(file.path(), &media, None, &cfg).unwrap();
        assert_eq!(desc.default_origin, Some("*"));
        assert_eq!(desc.content_kind, ContentKind::Binary);
    }
}
