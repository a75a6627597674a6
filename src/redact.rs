// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redaction helpers applied to anything that might end up in a log line or
//! an error payload.

const REDACTED: &str = "<redacted>";

/// Replace the credential following every `Bearer ` marker with `<redacted>`.
///
/// The marker is matched case-insensitively; the credential runs until the
/// next whitespace, quote or comma.
pub fn redact_bearer(input: &str) -> String {
    const MARKER: &str = "bearer ";

    let lower = input.to_ascii_lowercase();
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0;

    while let Some(found) = lower[cursor..].find(MARKER) {
        let token_start = cursor + found + MARKER.len();
        out.push_str(&input[cursor..token_start]);

        let token_len = input[token_start..]
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
            .unwrap_or(input.len() - token_start);
        if token_len > 0 {
            out.push_str(REDACTED);
        }
        cursor = token_start + token_len;
    }

    out.push_str(&input[cursor..]);
    out
}

/// Truncate `text` to at most `max_chars` characters, on a char boundary.
pub fn snippet(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
