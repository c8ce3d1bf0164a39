//! Captions in Telegram's MarkdownV2 dialect.

use crate::staging::StagedFile;

const MARKDOWN_V2_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escape free text for MarkdownV2.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape text placed inside an inline code entity, where only `` ` `` and
/// `\` are special.
pub fn escape_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '`' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `` `42` \.mp4 `` for `42_media_7.mp4`.
pub fn caption_for(file: &StagedFile) -> String {
    let prefix = format!("`{}`", escape_code(&file.prefix));
    if file.extension.is_empty() {
        prefix
    } else {
        format!(
            "{} {}",
            prefix,
            escape_markdown_v2(&format!(".{}", file.extension))
        )
    }
}
