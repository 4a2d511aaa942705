use eframe::egui::ColorImage;
use image::ImageFormat;
use std::path::Path;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    PNG,
    JPEG,
    TIFF,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the composed raster is empty")]
    Empty,
    #[error("raster of {width}x{height} does not match its pixel buffer")]
    Buffer { width: usize, height: usize },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl ExportFormat {
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::PNG => "PNG",
            ExportFormat::JPEG => "JPEG",
            ExportFormat::TIFF => "TIFF",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::PNG => "png",
            ExportFormat::JPEG => "jpg",
            ExportFormat::TIFF => "tiff",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            ExportFormat::PNG => ImageFormat::Png,
            ExportFormat::JPEG => ImageFormat::Jpeg,
            ExportFormat::TIFF => ImageFormat::Tiff,
        }
    }

    /// Guess the format from a file extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => ExportFormat::JPEG,
            Some("tif") | Some("tiff") => ExportFormat::TIFF,
            _ => ExportFormat::PNG,
        }
    }
}

/// Convert a composed (premultiplied) raster into a straight-alpha RGBA image.
pub fn to_rgba_image(img: &ColorImage) -> Result<image::RgbaImage, ExportError> {
    let [width, height] = img.size;
    if width == 0 || height == 0 {
        return Err(ExportError::Empty);
    }

    let mut bytes = Vec::with_capacity(width * height * 4);
    for px in &img.pixels {
        let [r, g, b, a] = px.to_srgba_unmultiplied();
        bytes.extend_from_slice(&[r, g, b, a]);
    }

    image::RgbaImage::from_raw(width as u32, height as u32, bytes)
        .ok_or(ExportError::Buffer { width, height })
}

/// Save a composed raster to disk.
pub fn save_color_image(
    img: &ColorImage,
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let rgba = to_rgba_image(img)?;
    match format {
        // JPEG has no alpha channel.
        ExportFormat::JPEG => image::DynamicImage::ImageRgba8(rgba)
            .to_rgb8()
            .save_with_format(path, format.image_format())?,
        _ => rgba.save_with_format(path, format.image_format())?,
    }
    log::info!("exported {}x{} raster to {}", img.size[0], img.size[1], path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;

    #[test]
    fn empty_raster_is_rejected() {
        let img = ColorImage::new([0, 0], Color32::TRANSPARENT);
        assert!(matches!(to_rgba_image(&img), Err(ExportError::Empty)));
    }

    #[test]
    fn converts_to_straight_alpha() {
        let img = ColorImage::new([2, 1], Color32::from_rgb(10, 20, 30));
        let rgba = to_rgba_image(&img).unwrap();
        assert_eq!(rgba.get_pixel(1, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a.JPG")), ExportFormat::JPEG);
        assert_eq!(ExportFormat::from_path(Path::new("a.tif")), ExportFormat::TIFF);
        assert_eq!(ExportFormat::from_path(Path::new("a")), ExportFormat::PNG);
    }
}
