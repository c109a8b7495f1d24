//! Content-based type and MIME detection.
//!
//! The type label comes from magic-byte signatures via the `infer` crate.
//! The MIME label follows the WHATWG sniffing order: byte order marks, then
//! markup, then binary signatures, then a text-vs-binary byte scan.

/// Bytes examined for the MIME decision.
pub const SNIFF_LEN: usize = 512;

/// Bytes read from the head of a file for detection. Some `infer` matchers
/// look further in than the MIME sniffer does.
pub const HEADER_LEN: usize = 8192;

pub const UNKNOWN_TYPE: &str = "unknown";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Extension of the matched signature, or `"unknown"`.
pub fn detect_type(header: &[u8]) -> String {
    infer::get(header)
        .map(|kind| kind.extension().to_string())
        .unwrap_or_else(|| UNKNOWN_TYPE.to_string())
}

pub fn sniff_mime(header: &[u8]) -> String {
    let data = &header[..header.len().min(SNIFF_LEN)];

    if data.starts_with(&[0xFE, 0xFF]) {
        return "text/plain; charset=utf-16be".to_string();
    }
    if data.starts_with(&[0xFF, 0xFE]) {
        return "text/plain; charset=utf-16le".to_string();
    }
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return TEXT_PLAIN.to_string();
    }

    let trimmed = skip_whitespace(data);
    if HTML_TAGS.iter().any(|tag| matches_tag(trimmed, tag)) {
        return "text/html; charset=utf-8".to_string();
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8".to_string();
    }

    if let Some(kind) = infer::get(header) {
        return kind.mime_type().to_string();
    }

    if data.iter().any(|b| is_binary_byte(*b)) {
        OCTET_STREAM.to_string()
    } else {
        TEXT_PLAIN.to_string()
    }
}

fn skip_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' '))
        .unwrap_or(data.len());
    &data[start..]
}

/// Case-insensitive prefix match that also requires a tag-terminating byte.
fn matches_tag(data: &[u8], tag: &[u8]) -> bool {
    if data.len() < tag.len() + 1 {
        return false;
    }
    let prefix_matches = data
        .iter()
        .zip(tag.iter())
        .all(|(d, t)| d.to_ascii_uppercase() == *t);
    prefix_matches && matches!(data[tag.len()], b' ' | b'>')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
