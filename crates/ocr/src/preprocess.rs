use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Load an image file, normalize it, and return PNG bytes ready for OCR.
pub fn prepare_for_ocr(path: &Path) -> Result<Vec<u8>, PreprocessError> {
    let img = image::open(path)?;
    encode_as_png(preprocess(&img))
}

/// Process raw image bytes (JPEG / PNG / …) and return normalized PNG bytes.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(preprocess(&img))
}

/// RGB → grayscale → global histogram equalization. Dimensions are preserved.
pub fn preprocess(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    let gray: GrayImage = ImageBuffer::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        Luma([luma_bt601(r, g, b)])
    });
    equalize_histogram(&gray)
}

// 0.299 R + 0.587 G + 0.114 B in 14-bit fixed point.
fn luma_bt601(r: u8, g: u8, b: u8) -> u8 {
    const SHIFT: u32 = 14;
    let y = r as u32 * 4899 + g as u32 * 9617 + b as u32 * 1868 + (1 << (SHIFT - 1));
    (y >> SHIFT).min(255) as u8
}

fn equalize_histogram(gray: &GrayImage) -> GrayImage {
    let mut hist = [0u64; 256];
    for p in gray.pixels() {
        hist[p[0] as usize] += 1;
    }

    let total: u64 = hist.iter().sum();
    let Some(first) = hist.iter().position(|&n| n > 0) else {
        // Zero-sized image.
        return gray.clone();
    };
    let cdf_min = hist[first];
    if cdf_min == total {
        // Single gray level — nothing to spread.
        return gray.clone();
    }

    let scale = 255.0 / (total - cdf_min) as f64;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u64;
    for level in first + 1..256 {
        cumulative += hist[level];
        lut[level] = (cumulative as f64 * scale).round().min(255.0) as u8;
    }

    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([lut[gray.get_pixel(x, y)[0] as usize]])
    })
}

fn encode_as_png(img: GrayImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid_rgb(width: u32, height: u32, px: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(px)))
    }

    fn two_tone(width: u32, height: u32, dark: u8, light: u8) -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(width, height, |x, _| {
            Luma([if x < width / 2 { dark } else { light }])
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn output_keeps_dimensions() {
        let result = preprocess(&two_tone(37, 11, 40, 90));
        assert_eq!(result.dimensions(), (37, 11));
    }

    #[test]
    fn grayscale_uses_bt601_weights() {
        // Single level images pass through equalization untouched.
        assert_eq!(preprocess(&solid_rgb(3, 3, [255, 0, 0])).get_pixel(0, 0)[0], 76);
        assert_eq!(preprocess(&solid_rgb(3, 3, [0, 255, 0])).get_pixel(0, 0)[0], 150);
        assert_eq!(preprocess(&solid_rgb(3, 3, [0, 0, 255])).get_pixel(0, 0)[0], 29);
        assert_eq!(preprocess(&solid_rgb(3, 3, [255, 255, 255])).get_pixel(0, 0)[0], 255);
    }

    #[test]
    fn two_levels_spread_to_full_range() {
        let result = preprocess(&two_tone(10, 4, 100, 140));
        assert_eq!(result.get_pixel(0, 0)[0], 0);
        assert_eq!(result.get_pixel(9, 0)[0], 255);
    }

    #[test]
    fn equalization_follows_cumulative_histogram() {
        // Levels 10, 20, 30 with counts 1, 1, 2: cdf_min = 1, N = 4.
        let mut img = GrayImage::new(4, 1);
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(1, 0, Luma([20]));
        img.put_pixel(2, 0, Luma([30]));
        img.put_pixel(3, 0, Luma([30]));
        let eq = equalize_histogram(&img);
        assert_eq!(eq.get_pixel(0, 0)[0], 0);
        assert_eq!(eq.get_pixel(1, 0)[0], 85);
        assert_eq!(eq.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn uniform_image_is_unchanged() {
        let result = preprocess(&two_tone(8, 8, 128, 128));
        assert!(result.pixels().all(|p| p[0] == 128));
    }

    #[test]
    fn prepare_from_bytes_produces_png_header() {
        let img = solid_rgb(4, 4, [10, 20, 30]);
        let mut jpeg_bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut jpeg_bytes), image::ImageFormat::Jpeg)
            .unwrap();
        let result = prepare_for_ocr_from_bytes(&jpeg_bytes).unwrap();
        assert_eq!(&result[..4], b"\x89PNG");
        let decoded = image::load_from_memory(&result).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = prepare_for_ocr_from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = prepare_for_ocr(&dir.path().join("card.png")).unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));
    }
}
