use image::RgbaImage;
use sparkify_core::error::AssetError;
use sparkify_core::id::AssetId;
use sparkify_core::model::ImageHandle;

/// Decode an encoded image (PNG, JPEG, WebP) into RGBA pixels plus a
/// handle describing it.
pub fn decode_image(bytes: &[u8], source: &str) -> Result<(ImageHandle, RgbaImage), AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::Read {
            source_name: source.to_string(),
            reason: "file is empty".to_string(),
        });
    }
    let decoded = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
        source_name: source.to_string(),
        reason: e.to_string(),
    })?;
    let pixels = decoded.to_rgba8();
    let handle = ImageHandle {
        asset: AssetId::next(),
        source: source.to_string(),
        width: pixels.width(),
        height: pixels.height(),
    };
    log::debug!("decoded {source} ({}x{})", handle.width, handle.height);
    Ok((handle, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    #[test]
    fn decodes_png() {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();

        let (handle, pixels) = decode_image(&bytes, "tiny.png").unwrap();
        assert_eq!((handle.width, handle.height), (3, 2));
        assert_eq!(handle.source, "tiny.png");
        assert_eq!(pixels.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn garbage_is_decode_error() {
        let err = decode_image(b"not an image", "junk.bin").unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn empty_is_read_error() {
        let err = decode_image(&[], "empty.png").unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
    }
}
