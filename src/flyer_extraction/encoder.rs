//! Image encoding for transport

use super::types::{EncodedFlyer, FlyerSource};
use base64::Engine;
use std::path::Path;

/// Largest image the collaborator accepts (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Media types the collaborator understands
pub const SUPPORTED_MEDIA_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Encoding failure
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("image is empty")]
    Empty,

    #[error("image is {size} bytes, over the 5 MiB limit")]
    TooLarge { size: usize },

    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("cannot read image: {0}")]
    Io(#[from] std::io::Error),
}

/// Media type from a file extension
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read (if needed) and base64-encode a flyer
pub async fn encode(source: FlyerSource) -> Result<EncodedFlyer, EncodeError> {
    let (data, media_type) = match source {
        FlyerSource::Bytes { data, media_type } => (data, media_type.to_ascii_lowercase()),
        FlyerSource::File(path) => {
            let media_type = media_type_for_path(&path).ok_or_else(|| {
                EncodeError::UnsupportedMediaType(path.display().to_string())
            })?;
            let data = tokio::fs::read(&path).await?;
            (data, media_type.to_string())
        }
    };

    if !SUPPORTED_MEDIA_TYPES.contains(&media_type.as_str()) {
        return Err(EncodeError::UnsupportedMediaType(media_type));
    }
    if data.is_empty() {
        return Err(EncodeError::Empty);
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(EncodeError::TooLarge { size: data.len() });
    }

    let encoded = base64::engine::general_purpose::STANDARD.encode(&data);
    tracing::debug!(
        media_type = %media_type,
        raw_size = data.len(),
        encoded_size = encoded.len(),
        "Flyer encoded"
    );

    Ok(EncodedFlyer {
        media_type,
        data: encoded,
    })
}
