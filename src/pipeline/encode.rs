//! Image preparation: raw slide bytes → [`DecodedImage`] with a JPEG body.
//!
//! The PDF writer embeds images as DCT (JPEG) streams, so every page image
//! has to end up as a JPEG. Slides served as baseline RGB or grayscale JPEG
//! (the common case) are embedded byte-for-byte after a full decode confirms
//! they are intact; anything else the decoder understands is re-encoded.

use crate::output::DecodedImage;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, ImageError, ImageFormat};
use tracing::debug;

/// Quality used when a slide has to be re-encoded.
pub const JPEG_QUALITY: u8 = 90;

/// Decode `bytes`, read the dimensions and produce an embeddable JPEG.
///
/// CPU-bound; callers on the async runtime should run it in
/// `spawn_blocking`.
pub fn prepare_slide(bytes: Vec<u8>) -> Result<DecodedImage, ImageError> {
    let format = image::guess_format(&bytes)?;
    let img = image::load_from_memory_with_format(&bytes, format)?;
    let (width, height) = (img.width(), img.height());

    if width == 0 || height == 0 {
        return Err(ImageError::Decoding(image::error::DecodingError::new(
            format.into(),
            "image has a zero dimension",
        )));
    }

    let jpeg = match (format, img.color()) {
        (ImageFormat::Jpeg, ColorType::Rgb8 | ColorType::L8) => bytes,
        _ => {
            debug!("Re-encoding {:?} {:?} slide as JPEG", format, img.color());
            encode_jpeg(&img)?
        }
    };

    Ok(DecodedImage {
        width,
        height,
        jpeg,
    })
}

/// Encode as an 8-bit RGB baseline JPEG. Alpha is dropped.
fn encode_jpeg(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&rgb)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transport::testing::{jpeg, png};

    #[test]
    fn jpeg_is_passed_through() {
        let bytes = jpeg(64, 48);
        let img = prepare_slide(bytes.clone()).expect("decodes");
        assert_eq!((img.width, img.height), (64, 48));
        assert_eq!(img.jpeg, bytes);
    }

    #[test]
    fn png_is_reencoded_as_jpeg() {
        let img = prepare_slide(png(30, 20)).expect("decodes");
        assert_eq!((img.width, img.height), (30, 20));
        assert_eq!(&img.jpeg[..2], &[0xFF, 0xD8], "JPEG SOI marker");
        assert_eq!(
            image::guess_format(&img.jpeg).unwrap(),
            ImageFormat::Jpeg
        );
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(prepare_slide(b"<html>not found</html>".to_vec()).is_err());
        assert!(prepare_slide(Vec::new()).is_err());
    }

    #[test]
    fn truncated_jpeg_is_rejected() {
        let mut bytes = jpeg(64, 48);
        bytes.truncate(40);
        assert!(prepare_slide(bytes).is_err());
    }
}
