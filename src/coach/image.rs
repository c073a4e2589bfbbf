//! Opaque handle to the student's code screenshot

use super::error::ImageError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Validated image bytes. Cloning shares the buffer; the image is replaced
/// wholesale on upload and never edited in place.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeImage {
    bytes: Arc<[u8]>,
    media_type: &'static str,
}

impl CodeImage {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, ImageError> {
        let bytes: Vec<u8> = bytes.into();
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        let media_type = sniff_media_type(&bytes).ok_or(ImageError::UnsupportedFormat)?;
        Ok(Self {
            bytes: bytes.into(),
            media_type,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    pub fn media_type(&self) -> &'static str {
        self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:` URL suitable for an `image_url` message part
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for CodeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeImage")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(PNG_MAGIC) {
        Some("image/png")
    } else if bytes.starts_with(JPEG_MAGIC) {
        Some("image/jpeg")
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) fn sample_png() -> CodeImage {
    let mut bytes = PNG_MAGIC.to_vec();
    bytes.extend_from_slice(b"block-code");
    CodeImage::from_bytes(bytes).unwrap()
}
