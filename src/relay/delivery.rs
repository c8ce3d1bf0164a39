/// Which Bot API send primitive a staged file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    Image,
    Video,
    Audio,
    /// Anything else is sent as a document.
    Generic,
}

/// Case-insensitive; accepts the extension with or without its leading dot.
pub fn delivery_method(extension: &str) -> DeliveryMethod {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" => DeliveryMethod::Image,
        "mp4" | "mkv" | "mov" | "avi" | "webm" => DeliveryMethod::Video,
        "mp3" | "wav" | "ogg" => DeliveryMethod::Audio,
        _ => DeliveryMethod::Generic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_table() {
        for ext in ["jpg", "jpeg", "png", "gif", "webp"] {
            assert_eq!(delivery_method(ext), DeliveryMethod::Image, "{ext}");
        }
        for ext in ["mp4", "mkv", "mov", "avi", "webm"] {
            assert_eq!(delivery_method(ext), DeliveryMethod::Video, "{ext}");
        }
        for ext in ["mp3", "wav", "ogg"] {
            assert_eq!(delivery_method(ext), DeliveryMethod::Audio, "{ext}");
        }
        for ext in ["pdf", "tgs", "zip", "", "jpgx"] {
            assert_eq!(delivery_method(ext), DeliveryMethod::Generic, "{ext}");
        }
    }

    #[test]
    fn ignores_case_and_dot() {
        assert_eq!(delivery_method("JPG"), DeliveryMethod::Image);
        assert_eq!(delivery_method(".Mp4"), DeliveryMethod::Video);
        assert_eq!(delivery_method(".OGG"), DeliveryMethod::Audio);
    }
}
