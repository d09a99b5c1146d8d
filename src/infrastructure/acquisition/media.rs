//! Mime detection and quality re-encoding for picked files

use std::io::Cursor;
use std::path::Path;

use image::ImageFormat;
use image::codecs::jpeg::JpegEncoder;

/// Mime type from the file's magic bytes
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let format = image::guess_format(bytes).ok()?;
    Some(match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        other => other.to_mime_type(),
    })
}

/// Mime type inferred from the file extension
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}

/// Re-encode an image as JPEG at `quality` (0.0 to 1.0)
///
/// Returns `None` when the bytes cannot be decoded.
pub fn compress_jpeg(bytes: &[u8], quality: f32) -> Option<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).ok()?;
    let rgb = image::DynamicImage::ImageRgb8(decoded.to_rgb8());

    let quality = (quality.clamp(0.01, 1.0) * 100.0).round() as u8;
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    if let Err(e) = rgb.write_with_encoder(encoder) {
        tracing::warn!(error = %e, "JPEG re-encoding failed, keeping original bytes");
        return None;
    }

    Some(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([10, 200, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_sniff_png() {
        assert_eq!(sniff_mime(&png_bytes()), Some("image/png"));
        assert_eq!(sniff_mime(b"not an image"), None);
    }

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("a/b/photo.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("photo.webp")), "image/webp");
        assert_eq!(mime_from_extension(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(mime_from_extension(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_compress_png_to_jpeg() {
        let jpeg = compress_jpeg(&png_bytes(), 0.8).unwrap();
        assert_eq!(sniff_mime(&jpeg), Some("image/jpeg"));
    }

    #[test]
    fn test_compress_rejects_garbage() {
        assert!(compress_jpeg(b"garbage", 0.8).is_none());
    }
}
