use std::path::Path;

use tokio::io::AsyncReadExt;

/// Bytes read from the head of a file for sniffing.
const SNIFF_LEN: usize = 512;

/// Content-based MIME type detection for a file on disk.
#[async_trait::async_trait]
pub trait MimeClassifier {
    async fn classify(&self, path: &Path) -> std::io::Result<String>;
}

/// Magic-number sniffer. Falls back to the file extension, then to
/// `application/octet-stream`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicClassifier;

#[async_trait::async_trait]
impl MimeClassifier for MagicClassifier {
    async fn classify(&self, path: &Path) -> std::io::Result<String> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut file).take(SNIFF_LEN as u64).read_to_end(&mut head).await?;

        Ok(classify_bytes(&head, path))
    }
}

pub fn classify_bytes(head: &[u8], path: &Path) -> String {
    if head.is_empty() {
        return "application/x-empty".to_string();
    }

    if let Some(mime) = sniff(head) {
        return mime.to_string();
    }

    let guess = mime_guess::from_path(path).first_raw();
    if looks_like_text(head) {
        return match guess {
            Some(g) if g.starts_with("text/") => g.to_string(),
            _ => "text/plain".to_string(),
        };
    }

    "application/octet-stream".to_string()
}

/// Matches well-known signatures at the start of the buffer.
pub fn sniff(data: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xFF\xD8\xFF", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"II*\x00", "image/tiff"),
        (b"MM\x00*", "image/tiff"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1F\x8B", "application/gzip"),
        (b"BZh", "application/x-bzip2"),
        (b"7z\xBC\xAF\x27\x1C", "application/x-7z-compressed"),
        (b"\xFD7zXZ\x00", "application/x-xz"),
        (b"\x7FELF", "application/x-executable"),
        (b"ID3", "audio/mpeg"),
        (b"fLaC", "audio/flac"),
        (b"OggS", "audio/ogg"),
        (b"\x1A\x45\xDF\xA3", "video/webm"),
        (b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1", "application/x-ole-storage"),
    ];

    if let Some((_, mime)) = SIGNATURES.iter().find(|(magic, _)| data.starts_with(magic)) {
        return Some(*mime);
    }

    // RIFF containers carry the real format at offset 8.
    if data.len() >= 12 && data.starts_with(b"RIFF") {
        return match &data[8..12] {
            b"WEBP" => Some("image/webp"),
            b"WAVE" => Some("audio/x-wav"),
            b"AVI " => Some("video/x-msvideo"),
            _ => None,
        };
    }

    // ISO base media: box size, then `ftyp`.
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return match &data[8..12] {
            b"qt  " => Some("video/quicktime"),
            b"M4A " => Some("audio/x-m4a"),
            _ => Some("video/mp4"),
        };
    }

    let trimmed = trim_leading_whitespace(data);
    if trimmed.starts_with(b"<?xml") {
        return Some("text/xml");
    }
    if starts_with_ignore_case(trimmed, b"<!doctype html") || starts_with_ignore_case(trimmed, b"<html")
    {
        return Some("text/html");
    }

    None
}

fn looks_like_text(data: &[u8]) -> bool {
    let valid_utf8 = match std::str::from_utf8(data) {
        Ok(_) => true,
        // The sniff window may cut a multi-byte character in half.
        Err(e) => e.error_len().is_none(),
    };
    valid_utf8
        && data.iter().all(|&b| b >= 0x20 || matches!(b, b'\t' | b'\n' | b'\r' | 0x0C | 0x1B))
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(data.len());
    &data[start..]
}

fn starts_with_ignore_case(data: &[u8], prefix: &[u8]) -> bool {
    data.len() >= prefix.len() && data[..prefix.len()].eq_ignore_ascii_case(prefix)
}
