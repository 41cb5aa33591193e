//! Minimal multipart/form-data encoder for media submissions.
//!
//! The HTTP capability ships opaque byte bodies, so the form framing is
//! assembled here: a uuid-derived boundary, CRLF part separators and a
//! closing terminator, per RFC 7578.

use uuid::Uuid;

const CRLF: &str = "\r\n";

#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: format!("form-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    /// Appends a plain text field.
    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"",
            sanitize_token(name)
        ));
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(CRLF.as_bytes());
        self
    }

    /// Appends a binary file field with a filename and content type.
    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"{CRLF}Content-Type: {}",
            sanitize_token(name),
            sanitize_token(file_name),
            sanitize_token(content_type)
        ));
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(CRLF.as_bytes());
        self
    }

    /// The value for the request's `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Closes the form and returns `(content_type, body)`.
    #[must_use]
    pub fn finish(mut self) -> (String, Vec<u8>) {
        let content_type = self.content_type();
        self.body
            .extend_from_slice(format!("--{}--{CRLF}", self.boundary).as_bytes());
        (content_type, self.body)
    }

    fn open_part(&mut self, headers: &str) {
        self.body
            .extend_from_slice(format!("--{}{CRLF}{headers}{CRLF}{CRLF}", self.boundary).as_bytes());
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Header values embedded in the framing must not be able to break out of
/// their quoted strings or inject header lines.
fn sanitize_token(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | '\r' | '\n'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn body_is_framed_by_the_boundary() {
        let form = MultipartForm::new();
        let boundary = form.content_type();
        let boundary = boundary.rsplit('=').next().unwrap().to_string();

        let (content_type, body) = form.text("lat", "24.7136").finish();
        let text = as_text(&body);

        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert!(text.starts_with(&format!("--{boundary}\r\n")));
        assert!(text.ends_with(&format!("--{boundary}--\r\n")));
        assert!(text.contains("Content-Disposition: form-data; name=\"lat\"\r\n\r\n24.7136\r\n"));
    }

    #[test]
    fn file_part_carries_filename_and_content_type() {
        let (_, body) = MultipartForm::new()
            .file("file", "frame.jpg", "image/jpeg", &[0xFF, 0xD8, 0xFF, 0xE0])
            .finish();
        let text = as_text(&body);
        assert!(text.contains("name=\"file\"; filename=\"frame.jpg\""));
        assert!(text.contains("Content-Type: image/jpeg\r\n"));
        assert!(body.windows(4).any(|w| w == [0xFF, 0xD8, 0xFF, 0xE0]));
    }

    #[test]
    fn fields_keep_their_order() {
        let (_, body) = MultipartForm::new()
            .file("file", "clip.png", "image/png", &[1, 2, 3])
            .text("lat", "1.0")
            .text("lon", "2.0")
            .finish();
        let text = as_text(&body);
        let file_at = text.find("name=\"file\"").unwrap();
        let lat_at = text.find("name=\"lat\"").unwrap();
        let lon_at = text.find("name=\"lon\"").unwrap();
        assert!(file_at < lat_at && lat_at < lon_at);
    }

    #[test]
    fn quotes_and_line_breaks_cannot_escape_the_framing() {
        let (_, body) = MultipartForm::new()
            .file("file", "a\"b\r\nc.jpg", "image/jpeg", &[1])
            .finish();
        let text = as_text(&body);
        assert!(text.contains("filename=\"abc.jpg\""));
    }

    #[test]
    fn boundaries_are_unique_per_form() {
        assert_ne!(
            MultipartForm::new().content_type(),
            MultipartForm::new().content_type()
        );
    }
}
