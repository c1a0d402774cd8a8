use crate::error::Result;
use crate::models::InlineData;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

pub const PNG_MIME_TYPE: &str = "image/png";

/// An image returned by the vendor, re-encoded as PNG.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Media type the vendor declared for the original payload.
    pub source_mime_type: Option<String>,
}

impl GeneratedImage {
    pub fn from_inline_data(inline: &InlineData) -> Result<Self> {
        let bytes = STANDARD.decode(inline.data.as_bytes())?;
        let mime_type = Some(inline.mime_type.clone()).filter(|m| !m.is_empty());
        Self::from_bytes(&bytes, mime_type)
    }

    /// Decodes any format the `image` crate recognises and re-encodes it as PNG.
    pub fn from_bytes(bytes: &[u8], source_mime_type: Option<String>) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)?;
        let mut png = Vec::new();
        decoded.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        Ok(Self {
            png,
            width: decoded.width(),
            height: decoded.height(),
            source_mime_type,
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", PNG_MIME_TYPE, self.to_base64())
    }

    /// Writes the PNG to `path`, replacing whatever is there. Concurrent
    /// writers to the same path are not coordinated.
    pub async fn persist(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, &self.png).await?;
        log::debug!("Saved {} byte image to {}", self.png.len(), path.display());
        Ok(())
    }
}
