use image::imageops::FilterType;
use image::RgbaImage;

/// Decode `data` and scale it to exactly `width` × `height` for the preview pane.
/// The aspect ratio is not preserved.
pub fn load_preview(data: &[u8], width: u32, height: u32) -> Result<RgbaImage, image::ImageError> {
    let img = image::load_from_memory(data)?;
    Ok(img.resize_exact(width, height, FilterType::CatmullRom).to_rgba8())
}
