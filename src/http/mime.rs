//! MIME resolution
//!
//! Validates a declared media type, corrects common typos, sniffs from the
//! file extension when the declaration is unusable, and classifies the
//! result (text vs. binary, font vs. other).

use std::path::Path;

/// Types the resolver trusts as-is once typo-corrected. Anything else still
/// gets served, this list just skips the shape checks.
const KNOWN_TYPES: &[&str] = &[
    "application/x-bzip",
    "application/x-bzip2",
    "application/java-archive",
    "application/javascript",
    "application/json",
    "application/json-p",
    "application/xml",
    "application/msword",
    "application/ogg",
    "application/pdf",
    "application/vnd.ms-fontobject",
    "application/zip",
    "application/x-7z-compressed",
    "application/x-rar-compressed",
    "application/x-tar",
    "audio/3gpp",
    "audio/3gpp2",
    "audio/aiff",
    "audio/flac",
    "audio/mp4",
    "audio/mpeg",
    "audio/ogg",
    "audio/x-wav",
    "audio/webm",
    "audio/x-matroska",
    "font/otf",
    "font/sfnt",
    "font/ttf",
    "font/woff",
    "font/woff2",
    "image/bmp",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/svg+xml",
    "image/tiff",
    "image/webp",
    "text/css",
    "text/plain",
    "text/vtt",
    "video/3gpp",
    "video/3gpp2",
    "video/mp4",
    "video/ogg",
    "video/x-matroska",
    "video/webm",
];

/// Text-like types that neither start with `text/` nor end with `+xml`.
const TEXT_TYPES: &[&str] = &[
    "application/javascript",
    "application/json",
    "application/json-p",
    "application/xml",
];

const TOP_LEVEL_FAMILIES: &[&str] = &[
    "application",
    "audio",
    "font",
    "image",
    "multipart",
    "text",
    "video",
];

/// Content classification governing range support and charset handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Binary,
    Text,
}

/// Resolved media facts for one file.
#[derive(Debug, Clone)]
pub struct MediaType {
    /// The `family/subtype` string the response will carry
    pub essence: String,
    pub kind: ContentKind,
    /// Fonts get a wildcard allow-origin by default
    pub is_font: bool,
}

impl MediaType {
    /// Resolve the declared type (if any) for the file at `path`.
    pub fn resolve(declared: Option<&str>, path: &Path) -> Self {
        let essence = resolve_essence(declared, path);
        let kind = if text_like(&essence) {
            ContentKind::Text
        } else {
            ContentKind::Binary
        };
        let is_font = font_like(&essence);
        Self { essence, kind, is_font }
    }
}

fn resolve_essence(declared: Option<&str>, path: &Path) -> String {
    let declared = declared.unwrap_or("").trim().to_ascii_lowercase();
    let fixed = fix_typos(&declared, path);
    if KNOWN_TYPES.contains(&fixed.as_str()) {
        return fixed;
    }

    // A declared octet-stream is a non-statement; treat it as absent so the
    // extension gets a chance to say something more specific.
    let candidate = if fixed == "application/octet-stream" {
        String::new()
    } else {
        fixed
    };

    if !well_formed(&candidate) {
        if let Some(sniffed) = sniff_extension(path) {
            return fix_typos(sniffed, path);
        }
    }

    if candidate.is_empty() {
        "application/octet-stream".to_string()
    } else {
        candidate
    }
}

/// Shaped like `family/subtype` with a recognized top-level family.
fn well_formed(mime: &str) -> bool {
    match mime.split_once('/') {
        Some((family, _)) => TOP_LEVEL_FAMILIES.contains(&family),
        None => false,
    }
}

/// Correct declarations that are common typos or imprecise sniffer output.
/// Some rewrites depend on the file extension (Matroska containers carry
/// audio or video under the same declared type).
fn fix_typos(mime: &str, path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let fixed = match mime {
        "application/font-woff" => "font/woff",
        "audio/m4a" | "audio/x-m4a" => "audio/mp4",
        "audio/matroska" => "audio/x-matroska",
        "audio/mp3" => "audio/mpeg",
        "audio/x-aiff" => "audio/aiff",
        "audio/wav" => "audio/x-wav",
        "audio/x-matroska" if ext == "weba" => "audio/webm",
        "image/jpg" => "image/jpeg",
        "image/tif" => "image/tiff",
        "video/matroska" => "video/x-matroska",
        "video/x-matroska" => match ext.as_str() {
            "mka" => "audio/x-matroska",
            "weba" => "audio/webm",
            "webm" | "webm2" => "video/webm",
            _ => mime,
        },
        "application/octet-stream" if ext == "opus" => "audio/ogg",
        "text/plain" => match ext.as_str() {
            "js" => "application/javascript",
            "css" => "text/css",
            "vtt" => "text/vtt",
            _ => mime,
        },
        _ => mime,
    };
    fixed.to_string()
}

/// Media type guessed from the file extension.
fn sniff_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        // Text
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "txt" | "md" => "text/plain",
        "vtt" => "text/vtt",
        "xml" => "application/xml",

        // JavaScript/WASM
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mkv" => "video/x-matroska",

        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/x-wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        "ogg" | "opus" => "audio/ogg",
        "mka" => "audio/x-matroska",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",

        // Documents and archives
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "7z" => "application/x-7z-compressed",

        _ => return None,
    };
    Some(mime)
}

/// Starts with `text/`, ends with `+xml`, or is in the text-like set.
fn text_like(mime: &str) -> bool {
    mime.starts_with("text/") || mime.ends_with("+xml") || TEXT_TYPES.contains(&mime)
}

/// Starts with `font/` or is the legacy OpenType embedding type.
fn font_like(mime: &str) -> bool {
    mime.starts_with("font/") || mime == "application/vnd.ms-fontobject"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(declared: Option<&str>, file: &str) -> MediaType {
        MediaType::resolve(declared, Path::new(file))
    }

    #[test]
    fn declared_known_type_used_as_is() {
        let media = resolve(Some("video/mp4"), "talk.mp4");
        assert_eq!(media.essence, "video/mp4");
        assert_eq!(media.kind, ContentKind::Binary);
        assert!(!media.is_font);
    }

    #[test]
    fn typos_corrected() {
        assert_eq!(resolve(Some("audio/mp3"), "a.mp3").essence, "audio/mpeg");
        assert_eq!(resolve(Some("image/jpg"), "a.jpg").essence, "image/jpeg");
        assert_eq!(
            resolve(Some("application/font-woff"), "a.woff").essence,
            "font/woff"
        );
    }

    #[test]
    fn extension_sensitive_rewrites() {
        assert_eq!(
            resolve(Some("video/x-matroska"), "a.mka").essence,
            "audio/x-matroska"
        );
        assert_eq!(
            resolve(Some("video/x-matroska"), "a.webm").essence,
            "video/webm"
        );
        assert_eq!(
            resolve(Some("text/plain"), "app.css").essence,
            "text/css"
        );
        assert_eq!(
            resolve(Some("text/plain"), "app.js").essence,
            "application/javascript"
        );
        assert_eq!(
            resolve(Some("application/octet-stream"), "a.opus").essence,
            "audio/ogg"
        );
    }

    #[test]
    fn octet_stream_defers_to_extension() {
        assert_eq!(
            resolve(Some("application/octet-stream"), "logo.png").essence,
            "image/png"
        );
    }

    #[test]
    fn malformed_declaration_sniffed() {
        assert_eq!(resolve(Some("not a mime"), "index.html").essence, "text/html");
        assert_eq!(resolve(None, "data.json").essence, "application/json");
    }

    #[test]
    fn unknown_everything_is_octet_stream() {
        assert_eq!(
            resolve(None, "blob.xyz").essence,
            "application/octet-stream"
        );
    }

    #[test]
    fn unlisted_but_plausible_declaration_kept() {
        assert_eq!(resolve(Some("video/avi"), "clip.avi").essence, "video/avi");
    }

    #[test]
    fn text_classification() {
        assert_eq!(resolve(Some("text/css"), "a.css").kind, ContentKind::Text);
        assert_eq!(
            resolve(Some("application/json"), "a.json").kind,
            ContentKind::Text
        );
        // +xml suffix counts as text even under an image family
        assert_eq!(
            resolve(Some("image/svg+xml"), "a.svg").kind,
            ContentKind::Text
        );
        assert_eq!(resolve(Some("video/mp4"), "a.mp4").kind, ContentKind::Binary);
    }

    #[test]
    fn font_detection() {
        assert!(resolve(Some("font/woff2"), "a.woff2").is_font);
        assert!(resolve(Some("application/vnd.ms-fontobject"), "a.eot").is_font);
        assert!(!resolve(Some("image/png"), "a.png").is_font);
    }
}
