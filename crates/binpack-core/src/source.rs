use crate::error::Result;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};

/// Producer of the pixels that end up in an atlas.
///
/// `size` is the intrinsic size of the source; `render` produces RGBA pixels at
/// an arbitrary target size (the pipeline asks for `size * scale`).
pub trait ImageSource {
    fn key(&self) -> &str;
    fn size(&self) -> Result<(u32, u32)>;
    fn render(&self, width: u32, height: u32) -> Result<RgbaImage>;
}

/// In-memory raster image (key + decoded image).
pub struct BitmapSource {
    pub key: String,
    pub image: DynamicImage,
}

impl BitmapSource {
    pub fn new(key: impl Into<String>, image: DynamicImage) -> Self {
        Self {
            key: key.into(),
            image,
        }
    }
}

impl ImageSource for BitmapSource {
    fn key(&self) -> &str {
        &self.key
    }

    fn size(&self) -> Result<(u32, u32)> {
        Ok((self.image.width(), self.image.height()))
    }

    fn render(&self, width: u32, height: u32) -> Result<RgbaImage> {
        let rgba = self.image.to_rgba8();
        if rgba.dimensions() == (width, height) {
            return Ok(rgba);
        }
        Ok(imageops::resize(&rgba, width, height, FilterType::Lanczos3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_scales_to_requested_size() {
        let src = BitmapSource::new("a", DynamicImage::ImageRgba8(RgbaImage::new(4, 3)));
        assert_eq!(src.size().unwrap(), (4, 3));
        assert_eq!(src.render(4, 3).unwrap().dimensions(), (4, 3));
        assert_eq!(src.render(8, 6).unwrap().dimensions(), (8, 6));
    }
}
