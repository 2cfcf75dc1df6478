use actix_multipart::Field;
use futures_util::TryStreamExt;

use crate::api::error;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reads a multipart field into memory, stopping once more than `limit` bytes arrived.
/// Returns the bytes read so far; callers compare the length against `limit`.
pub async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, error::Error> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| error::Error::bad_request(format!("Malformed multipart body: {e}")))?
    {
        bytes.extend_from_slice(&chunk);
        if bytes.len() > limit {
            break;
        }
    }
    Ok(bytes)
}
