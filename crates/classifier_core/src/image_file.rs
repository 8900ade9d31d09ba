//! Selected image blobs and their display previews.

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Longest edge of the decoded preview thumbnail.
pub const PREVIEW_SIZE: u32 = 512;

/// An in-memory file chosen by the user, with its declared media type.
///
/// Cloning is cheap: the bytes are shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
}

impl ImageFile {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, declaring its media type from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .with_context(|| format!("cannot read image file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, media_type_for(path), bytes))
    }

    /// Like [`ImageFile::from_path`], but skips reading anything whose
    /// extension does not declare an image and returns `Ok(None)` for it.
    pub fn open_image(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let media_type = media_type_for(path);
        if !is_image_media_type(&media_type) {
            tracing::debug!("Not reading {} ({media_type})", path.display());
            return Ok(None);
        }
        Self::from_path(path).map(Some)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// True when the declared media type is `image/*`.
    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }
}

fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Media type guessed from the file extension, `application/octet-stream` when unknown.
pub fn media_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Decoded RGBA pixels ready to upload as a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Display form of the selected image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// `data:<media type>;base64,<payload>`
    pub data_url: String,
    /// `None` when the bytes could not be decoded; the UI shows a placeholder.
    pub image: Option<PreviewImage>,
}

impl Preview {
    pub fn generate(file: &ImageFile) -> Self {
        let data_url = format!(
            "data:{};base64,{}",
            file.media_type(),
            STANDARD.encode(file.bytes())
        );
        let image = match decode_preview_image(file.bytes()) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!("Failed to decode preview for {}: {e}", file.name());
                None
            }
        };
        Self { data_url, image }
    }
}

fn decode_preview_image(bytes: &[u8]) -> Result<PreviewImage> {
    let dynamic = image::load_from_memory(bytes).context("unsupported image data")?;
    let thumb = dynamic.thumbnail(PREVIEW_SIZE, PREVIEW_SIZE).to_rgba8();
    let (w, h) = thumb.dimensions();
    Ok(PreviewImage {
        width: w as usize,
        height: h as usize,
        rgba: thumb.into_raw(),
    })
}
