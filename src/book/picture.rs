use std::path::Path;

/// Binary image content referenced by chapters or used as the cover.
#[derive(Clone, PartialEq, Eq)]
pub struct Picture {
    /// Logical name, unique within a book
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Picture {
    pub fn new<S1: ToString, S2: ToString>(name: S1, mime_type: S2, data: Vec<u8>) -> Picture {
        Picture {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            data,
        }
    }

    /// File extension matching the MIME type, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" => "jpg",
            "image/gif" => "gif",
            "image/svg+xml" => "svg",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

impl std::fmt::Debug for Picture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Picture")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Determine MIME type from file extension.
pub fn mime_from_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn can_guess_mime_types() {
        assert_eq!(mime_from_path(Path::new("a/cover.PNG")), "image/png");
        assert_eq!(mime_from_path(Path::new("skull.jpeg")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("LICENSE")), "application/octet-stream");
    }

    #[test]
    fn can_name_extensions_from_mime_types() {
        let jpeg = Picture::new("Yorick skull.JPEG", mime_from_path(Path::new("x.JPEG")), vec![]);
        assert_eq!(jpeg.extension(), "jpg");
        let unknown = Picture::new("blob", "application/octet-stream", vec![]);
        assert_eq!(unknown.extension(), "bin");
    }
}
