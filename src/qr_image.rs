//! Saving pairing QR codes to disk.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum QrImageError {
    #[error("QR code is not a base64 data URI")]
    NotDataUri,

    #[error("QR image is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to write QR image: {0}")]
    Io(#[from] std::io::Error),
}

/// Decodes `data:<mime>;base64,<payload>` into raw image bytes.
pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>, QrImageError> {
    let rest = data_uri
        .trim()
        .strip_prefix("data:")
        .ok_or(QrImageError::NotDataUri)?;
    let (meta, payload) = rest.split_once(',').ok_or(QrImageError::NotDataUri)?;
    if !meta.ends_with(";base64") {
        return Err(QrImageError::NotDataUri);
    }
    Ok(STANDARD.decode(payload.trim())?)
}

/// `whatsapp-qr-<millis>.png` in the current directory.
pub fn default_file_name() -> PathBuf {
    PathBuf::from(format!(
        "whatsapp-qr-{}.png",
        chrono::Utc::now().timestamp_millis()
    ))
}

/// Writes the decoded image to `path` and returns the number of bytes written.
pub fn save(data_uri: &str, path: &Path) -> Result<usize, QrImageError> {
    let bytes = decode_data_uri(data_uri)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &bytes)?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_HEADER_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn decodes_png_data_uri() {
        let bytes = decode_data_uri(PNG_HEADER_URI).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn rejects_non_data_uris() {
        assert!(matches!(
            decode_data_uri("https://example.com/qr.png"),
            Err(QrImageError::NotDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:image/png,rawbytes"),
            Err(QrImageError::NotDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:image/png;base64,@@@"),
            Err(QrImageError::Base64(_))
        ));
    }

    #[test]
    fn saves_into_new_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("qr").join("pairing.png");
        assert_eq!(save(PNG_HEADER_URI, &path).unwrap(), 8);
        assert!(path.exists());
    }

    #[test]
    fn default_name_is_timestamped_png() {
        let name = default_file_name();
        let name = name.to_str().unwrap();
        assert!(name.starts_with("whatsapp-qr-"));
        assert!(name.ends_with(".png"));
    }
}
