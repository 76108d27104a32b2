//! 画像ファイル ⇔ Data URI 変換
//!
//! サイズ制限は行わない（UI上の案内のみ）。

use crate::error::{Result, StrainDexError};
use image::ImageFormat;
use std::path::Path;
use strain_dex_common::InlineImage;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// ファイルを読み込みData URIにする
pub async fn encode_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StrainDexError::FileNotFound(path.display().to_string())
        } else {
            StrainDexError::Io(e)
        }
    })?;

    let mime_type = detect_mime_type(path, &bytes);
    tracing::debug!(path = %path.display(), mime_type, bytes = bytes.len(), "image encoded");

    Ok(InlineImage::from_bytes(mime_type, &bytes).to_data_uri())
}

/// 内容から判定し、だめなら拡張子から判定
pub fn detect_mime_type(path: &Path, bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok())
        .map(|format| format.to_mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// Data URIの画像をファイルに書き出す
pub async fn write_decoded(data_uri: &str, path: &Path) -> Result<usize> {
    let bytes = InlineImage::parse(data_uri)?.decode()?;
    tokio::fs::write(path, &bytes).await?;
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_detect_mime_from_content() {
        // 拡張子より中身を優先
        assert_eq!(detect_mime_type(Path::new("label.jpg"), PNG_MAGIC), "image/png");
        assert_eq!(detect_mime_type(Path::new("label"), JPEG_MAGIC), "image/jpeg");
    }

    #[test]
    fn test_detect_mime_from_extension() {
        assert_eq!(detect_mime_type(Path::new("label.webp"), b"????"), "image/webp");
    }

    #[test]
    fn test_detect_mime_fallback() {
        assert_eq!(detect_mime_type(Path::new("notes.txt"), b"hello"), FALLBACK_MIME_TYPE);
    }

    #[tokio::test]
    async fn test_encode_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, PNG_MAGIC).unwrap();

        let data_uri = encode_file(&path).await.unwrap();
        assert!(data_uri.starts_with("data:image/png;base64,"));

        let image = InlineImage::parse(&data_uri).unwrap();
        assert_eq!(image.decode().unwrap(), PNG_MAGIC.to_vec());
    }

    #[tokio::test]
    async fn test_encode_missing_file() {
        let result = encode_file(Path::new("/nonexistent/label.png")).await;
        assert!(matches!(result, Err(StrainDexError::FileNotFound(_))));
    }

    #[tokio::test]
    async fn test_write_decoded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let data_uri = InlineImage::from_bytes("image/jpeg", JPEG_MAGIC).to_data_uri();

        let written = write_decoded(&data_uri, &path).await.unwrap();
        assert_eq!(written, JPEG_MAGIC.len());
        assert_eq!(std::fs::read(&path).unwrap(), JPEG_MAGIC.to_vec());
    }
}
