// SPDX-License-Identifier: MPL-2.0

//! Image attachments embedded as data URLs.
//!
//! Posts and drafts never reference an external file; the image bytes travel
//! inside the record as a base64 `data:` URL.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use std::path::Path;
use thiserror::Error;
use url::Url;

/// Largest image accepted for embedding (5MB)
const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("image is {size} bytes, limit is {max}")]
    TooLarge { size: u64, max: u64 },
}

/// An image ready to be stored with a post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub name: String,
    pub data_url: String,
}

impl ImageAttachment {
    /// Read an image file and embed it
    pub fn from_path(path: &Path) -> Result<Self, MediaError> {
        let size = std::fs::metadata(path)?.len();
        if size > MAX_IMAGE_BYTES {
            return Err(MediaError::TooLarge {
                size,
                max: MAX_IMAGE_BYTES,
            });
        }

        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::from_bytes(name, &bytes)
    }

    pub fn from_bytes(name: String, bytes: &[u8]) -> Result<Self, MediaError> {
        let format = image::guess_format(bytes).map_err(|_| MediaError::UnsupportedFormat)?;
        let mime = mime_type(format).ok_or(MediaError::UnsupportedFormat)?;

        Ok(Self {
            name,
            data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
        })
    }
}

fn mime_type(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Whether `value` is an embedded base64 image rather than a reference
pub fn is_self_contained(value: &str) -> bool {
    let Ok(url) = Url::parse(value) else {
        return false;
    };
    if url.scheme() != "data" {
        return false;
    }

    let Some((meta, payload)) = url.path().split_once(',') else {
        return false;
    };
    let Some(mime) = meta.strip_suffix(";base64") else {
        return false;
    };

    mime.starts_with("image/") && STANDARD.decode(payload).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Smallest valid PNG header plus IHDR start; enough for format sniffing
    const PNG_BYTES: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];

    #[test]
    fn test_png_becomes_data_url() {
        let attachment = ImageAttachment::from_bytes("pic.png".to_string(), PNG_BYTES).unwrap();
        assert!(attachment.data_url.starts_with("data:image/png;base64,"));
        assert!(is_self_contained(&attachment.data_url));
    }

    #[test]
    fn test_non_image_rejected() {
        let err = ImageAttachment::from_bytes("notes.txt".to_string(), b"hello world").unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedFormat));
    }

    #[test]
    fn test_from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("banner.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(PNG_BYTES)
            .unwrap();

        let attachment = ImageAttachment::from_path(&path).unwrap();
        assert_eq!(attachment.name, "banner.png");
    }

    #[test]
    fn test_external_references_are_not_self_contained() {
        assert!(!is_self_contained("https://example.com/cat.png"));
        assert!(!is_self_contained("data:text/plain;base64,aGVsbG8="));
        assert!(!is_self_contained("data:image/png,rawbytes"));
        assert!(!is_self_contained("not a url"));
        assert!(is_self_contained("data:image/gif;base64,R0lGODlh"));
    }
}
