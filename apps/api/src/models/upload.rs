use bytes::Bytes;

/// Media types accepted as PDF uploads.
const PDF_MEDIA_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

/// One file part of a multipart upload, owned by a single processing task.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Empty when the client sent the part without a filename.
    pub filename: String,
    /// Declared content type of the part; empty when absent.
    pub media_type: String,
    /// `None` when the part body could not be read off the request stream.
    pub content: Option<Bytes>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            content: Some(content),
        }
    }

    pub fn unreadable(filename: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            content: None,
        }
    }

    /// True for `application/pdf`-like media types. Parameters such as
    /// `; charset=...` are ignored and the comparison is case-insensitive.
    pub fn is_pdf(&self) -> bool {
        let essence = self
            .media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        PDF_MEDIA_TYPES
            .iter()
            .any(|pdf| essence.eq_ignore_ascii_case(pdf))
    }
}

/// The job requirement text, shared read-only by every file in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub text: String,
}

impl Requirement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_type(media_type: &str) -> UploadedFile {
        UploadedFile::new("cv.pdf", media_type, Bytes::from_static(b"%PDF"))
    }

    #[test]
    fn test_pdf_media_types_are_recognised() {
        assert!(with_type("application/pdf").is_pdf());
        assert!(with_type("application/x-pdf").is_pdf());
        assert!(with_type("Application/PDF").is_pdf());
        assert!(with_type("application/pdf; name=cv.pdf").is_pdf());
    }

    #[test]
    fn test_non_pdf_media_types_are_rejected() {
        assert!(!with_type("text/plain").is_pdf());
        assert!(!with_type("application/octet-stream").is_pdf());
        assert!(!with_type("").is_pdf());
    }
}
