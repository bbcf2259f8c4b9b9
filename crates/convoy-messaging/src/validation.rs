// SPDX-FileCopyrightText: 2026 Convoy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message content and page-size normalization.

use convoy_core::ConvoyError;

/// Trim `raw` and check it against `max_chars`. Returns the text to store.
pub fn normalize_content(raw: &str, max_chars: usize) -> Result<String, ConvoyError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConvoyError::EmptyContent);
    }
    let length = trimmed.chars().count();
    if length > max_chars {
        return Err(ConvoyError::ContentTooLong {
            length,
            max: max_chars,
        });
    }
    Ok(trimmed.to_string())
}

/// Requested page size, defaulted and clamped to `1..=max`.
pub fn page_limit(requested: Option<u32>, default: u32, max: u32) -> u32 {
    requested.unwrap_or(default).clamp(1, max.max(1))
}
