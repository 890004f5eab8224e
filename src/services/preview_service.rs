use crate::error::AppError;
use crate::models::analysis_types::ImageInput;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

const PREVIEW_MAX_EDGE: u32 = 512;
const PREVIEW_QUALITY: u8 = 80;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Best-effort mime type from the file extension. The backend does its own
/// content inspection; this only labels the upload.
pub fn mime_for_path(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("tiff") | Some("tif") => "image/tiff",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// Build the preview data URL for a selection. Large decodable images are
/// downscaled and re-encoded as JPEG to keep the webview payload small;
/// anything the decoder rejects is passed through untouched, since pixel
/// validation belongs to the backend.
pub fn build_preview(bytes: &[u8], mime_type: &str) -> String {
    if let Ok(img) = image::load_from_memory(bytes) {
        if img.width().max(img.height()) > PREVIEW_MAX_EDGE {
            let thumb = img.thumbnail(PREVIEW_MAX_EDGE, PREVIEW_MAX_EDGE);
            // JPEG has no alpha channel
            let rgb = image::DynamicImage::ImageRgb8(thumb.to_rgb8());
            let mut buffer = Cursor::new(Vec::new());
            let encoder = JpegEncoder::new_with_quality(&mut buffer, PREVIEW_QUALITY);
            if rgb.write_with_encoder(encoder).is_ok() {
                return format!(
                    "data:image/jpeg;base64,{}",
                    base64::engine::general_purpose::STANDARD.encode(buffer.into_inner())
                );
            }
        }
    }
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Read a selected file into an `ImageInput` with its preview attached.
pub async fn load_image_input(path: &str) -> Result<ImageInput, AppError> {
    let file_path = Path::new(path);
    if !is_image_file(file_path) {
        return Err(AppError::validation(format!("Not an image file: {}", path)));
    }

    let bytes = tokio::fs::read(file_path)
        .await
        .map_err(|e| AppError::validation(format!("Failed to read {}: {}", path, e)))?;
    if bytes.is_empty() {
        return Err(AppError::validation(format!("Empty image file: {}", path)));
    }

    let mime_type = mime_for_path(file_path);
    let preview = build_preview(&bytes, &mime_type);
    let file_name = file_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    Ok(ImageInput {
        file_name,
        mime_type,
        bytes: Arc::new(bytes),
        preview,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn recognizes_image_extensions_case_insensitively() {
        assert!(is_image_file(Path::new("scan.JPG")));
        assert!(is_image_file(Path::new("scan.png")));
        assert!(!is_image_file(Path::new("report.pdf")));
        assert!(!is_image_file(Path::new("noextension")));
    }

    #[test]
    fn mime_is_derived_from_the_extension() {
        assert_eq!(mime_for_path(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("a.PNG")), "image/png");
        assert_eq!(mime_for_path(Path::new("a.bin")), "application/octet-stream");
    }

    #[test]
    fn small_image_passes_through_with_its_own_mime() {
        let bytes = png_bytes(16, 16);
        let preview = build_preview(&bytes, "image/png");
        assert!(preview.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn large_image_is_downscaled_to_a_jpeg_preview() {
        let bytes = png_bytes(1024, 768);
        let preview = build_preview(&bytes, "image/png");
        assert!(preview.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn undecodable_bytes_still_get_a_preview() {
        let preview = build_preview(&[0xDE, 0xAD, 0xBE, 0xEF], "image/jpeg");
        assert!(preview.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn loads_a_selection_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chest.png");
        std::fs::write(&path, png_bytes(32, 32)).unwrap();

        let input = load_image_input(path.to_str().unwrap()).await.unwrap();
        assert_eq!(input.file_name, "chest.png");
        assert_eq!(input.mime_type, "image/png");
        assert!(!input.bytes.is_empty());
        assert!(input.preview.starts_with("data:"));
    }

    #[tokio::test]
    async fn non_image_selection_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = load_image_input(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn empty_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        let err = load_image_input(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
