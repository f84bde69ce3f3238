//! External collaborators: prompt generation, image generation and uploads.
//!
//! The editor only knows these traits. Calls are synchronous from the
//! editor's point of view; a host with async backends blocks or drives them
//! to completion before returning.

use crate::error::{CollabError, EditorError, Result};
use pc_core::FrameId;

/// Brand data handed to the prompt service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandContext {
    pub name: String,
    pub description: Option<String>,
    pub tone: Option<String>,
    pub colors: Vec<String>,
}

impl BrandContext {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

pub trait PromptService {
    /// Turn a short idea into an image-generation prompt.
    fn generate(&self, idea: &str, brand: Option<&BrandContext>) -> Result<String, CollabError>;
}

pub trait ImageService {
    /// Generate an image for `frame` at `width × height`. Returns its URL.
    fn generate(
        &self,
        prompt: &str,
        frame: FrameId,
        width: u32,
        height: u32,
    ) -> Result<String, CollabError>;
}

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub file_name: String,
    /// MIME type as reported by the host.
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl RawImage {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    /// File extension, `jpg` when there is none.
    pub fn extension(&self) -> &str {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext,
            _ => "jpg",
        }
    }
}

pub trait UploadService {
    /// Store the image and return a durable URL for it.
    fn upload(&self, image: &RawImage) -> Result<String, CollabError>;
}

/// Accept an empty link (no link), an `http(s)` URL with a host, a
/// `mailto:` address or a site-relative path.
pub fn validate_cta_link(link: &str) -> Result<()> {
    let link = link.trim();
    if link.is_empty() {
        return Ok(());
    }
    let invalid = || EditorError::InvalidLink(link.to_string());
    if link.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if let Some(rest) = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
    {
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let host = host.rsplit_once('@').map_or(host, |(_, h)| h);
        return if host.is_empty() || host.starts_with(':') {
            Err(invalid())
        } else {
            Ok(())
        };
    }
    if let Some(address) = link.strip_prefix("mailto:") {
        return if address.contains('@') {
            Ok(())
        } else {
            Err(invalid())
        };
    }
    if link.starts_with('/') && !link.starts_with("//") {
        return Ok(());
    }
    Err(invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links() {
        for ok in [
            "",
            "https://example.com",
            "http://shop.example.com/sale?x=1",
            "mailto:hi@example.com",
            "/pricing",
        ] {
            assert!(validate_cta_link(ok).is_ok(), "{ok}");
        }
        for bad in ["example.com", "https://", "http:///path", "javascript:alert(1)", "//cdn", "https://a b"] {
            assert!(validate_cta_link(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn upload_kind_and_extension() {
        let img = RawImage {
            file_name: "logo.final.png".into(),
            mime: "image/png".into(),
            bytes: vec![],
        };
        assert!(img.is_image());
        assert_eq!(img.extension(), "png");
        let doc = RawImage {
            file_name: "notes".into(),
            mime: "text/plain".into(),
            bytes: vec![],
        };
        assert!(!doc.is_image());
        assert_eq!(doc.extension(), "jpg");
    }
}
