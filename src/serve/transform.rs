//! Text body filters
//!
//! Optional post-processing applied after negotiation has decided a text
//! body will be sent. Filters never participate in the negotiation itself;
//! they only rewrite the decided bytes.

/// Capability hook: rewrite a decided body before it is framed.
pub trait BodyTransform: Send + Sync {
    fn transform(&self, body: Vec<u8>, mime: &str) -> Vec<u8>;
}

/// Built-in text filters, dispatched by media type. Both stages are off by
/// default and enabled through configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFilters {
    /// Unify line endings and strip a UTF-8 BOM
    pub normalize: bool,
    /// Minify stylesheets, word-wrap over-long plain text
    pub minify: bool,
}

impl BodyTransform for TextFilters {
    fn transform(&self, body: Vec<u8>, mime: &str) -> Vec<u8> {
        // Bodies that are not UTF-8 pass through untouched rather than be
        // corrupted by lossy re-encoding.
        let mut text = match String::from_utf8(body) {
            Ok(t) => t,
            Err(e) => return e.into_bytes(),
        };

        if self.normalize {
            text = normalize_newlines(&text);
        }
        if self.minify {
            text = match mime {
                "text/css" => minify_css(&text),
                // TODO: wire a real JS minifier; stripping whitespace
                // without a parser corrupts template literals, so scripts
                // pass through for now.
                "application/javascript" => text,
                _ => word_wrap(&text),
            };
        }
        text.into_bytes()
    }
}

/// CRLF and lone CR become LF; a leading UTF-8 BOM is dropped.
fn normalize_newlines(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    match unified.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => unified,
    }
}

/// Stylesheet minifier: strips comments, then collapses the whitespace
/// around punctuation. Deliberately conservative; it never touches string
/// contents because CSS strings cannot span the patterns replaced here.
fn minify_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(open) = rest.find("/*") {
        out.push_str(&rest[..open]);
        match rest[open + 2..].find("*/") {
            Some(close) => rest = &rest[open + 2 + close + 2..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);

    let mut s = out.replace(": ", ":");
    for needle in ["\r\n", "\r", "\n", "\t"] {
        s = s.replace(needle, "");
    }
    while s.contains("  ") {
        s = s.replace("  ", " ");
    }
    for (from, to) in [
        ("} ", "}"),
        ("{ ", "{"),
        ("; ", ";"),
        (", ", ","),
        (" }", "}"),
        (" {", "{"),
        (" ;", ";"),
        (" ,", ","),
    ] {
        s = s.replace(from, to);
    }
    s
}

/// Wrap every line at 80 columns, but only when the file actually needs it
/// (some line exceeds 120 columns). Short files pass through untouched.
fn word_wrap(text: &str) -> String {
    let widest = text.split('\n').map(|l| l.chars().count()).max().unwrap_or(0);
    if widest <= 120 {
        return text.to_string();
    }
    let wrapped: Vec<String> = text.split('\n').map(|l| wrap_line(l, 80)).collect();
    wrapped.join("\n")
}

/// Greedy word wrap; words longer than the width are hard-cut.
fn wrap_line(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.trim_end().to_string();
    }
    let mut out = String::new();
    let mut current = String::new();
    for word in line.split(' ') {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            out.push_str(current.trim_end());
            out.push('\n');
            current = word.to_string();
        }
        while current.chars().count() > width {
            let cut: String = current.chars().take(width).collect();
            out.push_str(&cut);
            out.push('\n');
            current = current.chars().skip(width).collect();
        }
    }
    out.push_str(current.trim_end());
    out
}
