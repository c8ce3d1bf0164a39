//! Maps declared media metadata to the extension of the staged file.
//!
//! The table trusts the kind and mime type reported by the source message;
//! the payload bytes are never inspected.

use super::types::MediaKind;

pub fn classify(kind: MediaKind, mime_type: Option<&str>) -> &'static str {
    match kind {
        MediaKind::Photo => ".jpg",
        MediaKind::Document => classify_document(mime_type.unwrap_or_default()),
        MediaKind::Sticker => match mime_type {
            Some(mime) if mime.contains("webm") => ".webm",
            Some(_) => ".webp",
            None => ".webm",
        },
        MediaKind::Unknown => ".mp4",
    }
}

// Order matters: "video/webm" must resolve to .mp4 and "image/gif" to .jpg.
fn classify_document(mime: &str) -> &'static str {
    if mime.contains("video") {
        ".mp4"
    } else if mime.contains("image") {
        ".jpg"
    } else if mime.contains("audio") {
        ".mp3"
    } else if mime.contains("gif") {
        ".gif"
    } else if mime.contains("webp") {
        ".webp"
    } else if mime.contains("webm") {
        ".webm"
    } else {
        ".mp4"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_is_always_jpg() {
        assert_eq!(classify(MediaKind::Photo, None), ".jpg");
        assert_eq!(classify(MediaKind::Photo, Some("image/png")), ".jpg");
    }

    #[test]
    fn document_table() {
        let cases = [
            ("video/mp4", ".mp4"),
            ("video/quicktime", ".mp4"),
            ("video/webm", ".mp4"),
            ("image/png", ".jpg"),
            ("image/gif", ".jpg"),
            ("image/webp", ".jpg"),
            ("audio/mpeg", ".mp3"),
            ("audio/ogg", ".mp3"),
            ("application/gif", ".gif"),
            ("application/webp", ".webp"),
            ("application/webm", ".webm"),
            ("application/pdf", ".mp4"),
            ("application/zip", ".mp4"),
            ("", ".mp4"),
        ];
        for (mime, expected) in cases {
            assert_eq!(
                classify(MediaKind::Document, Some(mime)),
                expected,
                "mime type {mime}"
            );
        }
    }

    #[test]
    fn document_without_mime_falls_back_to_mp4() {
        assert_eq!(classify(MediaKind::Document, None), ".mp4");
    }

    #[test]
    fn sticker_table() {
        assert_eq!(classify(MediaKind::Sticker, Some("video/webm")), ".webm");
        assert_eq!(classify(MediaKind::Sticker, Some("image/webp")), ".webp");
        assert_eq!(
            classify(MediaKind::Sticker, Some("application/x-tgsticker")),
            ".webp"
        );
        assert_eq!(classify(MediaKind::Sticker, None), ".webm");
    }

    #[test]
    fn unknown_kind_is_mp4() {
        assert_eq!(classify(MediaKind::Unknown, None), ".mp4");
        assert_eq!(classify(MediaKind::Unknown, Some("image/jpeg")), ".mp4");
    }
}
