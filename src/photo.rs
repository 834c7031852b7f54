//! Preparing an uploaded photo for storage on an entry.
//!
//! Extended journals keep the picture inline as a PNG data URI; basic
//! journals only remember the uploaded file name. Either way the bytes are
//! decoded first so an unreadable upload is reported before the entry is
//! saved.

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use base64::Engine as _;

use crate::storage::Variant;

/// Largest upload accepted by `POST /api/images`.
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024; // 10 MiB

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug)]
pub enum ImageError {
    UnsupportedType(String),
    Empty,
    TooLarge { size: usize, limit: usize },
    Decode(image::ImageError),
    Encode(image::ImageError),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::UnsupportedType(name) => write!(
                f,
                "unsupported image type for {name:?} (accepted: {})",
                ACCEPTED_EXTENSIONS.join(", ")
            ),
            ImageError::Empty => write!(f, "image upload is empty"),
            ImageError::TooLarge { size, limit } => {
                write!(f, "image is {size} bytes, limit is {limit} bytes")
            }
            ImageError::Decode(e) => write!(f, "could not read image: {e}"),
            ImageError::Encode(e) => write!(f, "could not convert image: {e}"),
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageError::Decode(e) | ImageError::Encode(e) => Some(e),
            _ => None,
        }
    }
}

pub fn has_accepted_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
        .unwrap_or(false)
}

pub fn is_data_uri(value: &str) -> bool {
    value.starts_with("data:image")
}

/// Decode `bytes` and re-encode them as a PNG data URI.
pub fn to_png_data_uri(bytes: &[u8]) -> Result<String, ImageError> {
    let decoded = image::load_from_memory(bytes).map_err(ImageError::Decode)?;
    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, image::ImageFormat::Png)
        .map_err(ImageError::Encode)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(png.into_inner());
    Ok(format!("{PNG_DATA_URI_PREFIX}{encoded}"))
}

/// Turn an upload into the value stored in `MoodEntry::image` for `variant`.
pub fn prepare_image(variant: Variant, filename: &str, bytes: &[u8]) -> Result<String, ImageError> {
    if !has_accepted_extension(filename) {
        return Err(ImageError::UnsupportedType(filename.to_string()));
    }
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(ImageError::TooLarge {
            size: bytes.len(),
            limit: MAX_IMAGE_SIZE,
        });
    }

    match variant {
        Variant::Extended => to_png_data_uri(bytes),
        Variant::Basic => {
            image::load_from_memory(bytes).map_err(ImageError::Decode)?;
            let name = Path::new(filename)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(filename);
            Ok(name.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(format: image::ImageFormat) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([91, 143, 249]));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, format)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn test_png_becomes_data_uri() {
        let uri = prepare_image(Variant::Extended, "sky.png", &sample(image::ImageFormat::Png)).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(is_data_uri(&uri));

        let payload = uri.trim_start_matches(PNG_DATA_URI_PREFIX);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn test_jpeg_is_converted_to_png() {
        let uri = prepare_image(
            Variant::Extended,
            "Holiday.JPG",
            &sample(image::ImageFormat::Jpeg),
        )
        .unwrap();
        assert!(uri.starts_with(PNG_DATA_URI_PREFIX));
    }

    #[test]
    fn test_basic_variant_keeps_file_name_only() {
        let name = prepare_image(
            Variant::Basic,
            "uploads/cat.jpeg",
            &sample(image::ImageFormat::Jpeg),
        )
        .unwrap();
        assert_eq!(name, "cat.jpeg");
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            prepare_image(Variant::Extended, "anim.gif", b"GIF89a"),
            Err(ImageError::UnsupportedType(_))
        ));
        assert!(matches!(
            prepare_image(Variant::Extended, "noext", b"abc"),
            Err(ImageError::UnsupportedType(_))
        ));
        assert!(matches!(
            prepare_image(Variant::Extended, "a.png", b""),
            Err(ImageError::Empty)
        ));
        assert!(matches!(
            prepare_image(Variant::Extended, "a.png", b"definitely not a png"),
            Err(ImageError::Decode(_))
        ));
        assert!(matches!(
            prepare_image(Variant::Basic, "a.png", b"definitely not a png"),
            Err(ImageError::Decode(_))
        ));
        let too_big = vec![0u8; MAX_IMAGE_SIZE + 1];
        assert!(matches!(
            prepare_image(Variant::Extended, "a.png", &too_big),
            Err(ImageError::TooLarge { .. })
        ));
    }
}
