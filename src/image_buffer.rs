use std::io::Write;
use std::path::Path;

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, ImageEncoder as _, ImageError, RgbImage};

use crate::geometry::{ScreenPoint, ScreenSize};
use crate::util::{Color, color_to_image};

/// Rendered image, filled pixel by pixel and saved as binary PPM.
#[derive(Clone, Debug)]
pub struct ImageBuffer {
    image: RgbImage,
}

impl ImageBuffer {
    /// Creates a black image.
    pub fn new(size: ScreenSize) -> ImageBuffer {
        ImageBuffer {
            image: RgbImage::new(size.x, size.y),
        }
    }

    /// Stores a color, clamped and quantized to 8 bits per channel.
    /// Writes outside of the image are logged and ignored.
    pub fn set_pixel(&mut self, point: &ScreenPoint, color: Color) {
        match self.image.get_pixel_mut_checked(point.x, point.y) {
            Some(pixel) => *pixel = color_to_image(color),
            None => log::warn!(
                "Ignoring write to pixel {}, {} outside of the {}x{} image",
                point.x,
                point.y,
                self.image.width(),
                self.image.height()
            ),
        }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Writes the image as binary (P6) PPM.
    pub fn write_ppm(&self, writer: impl Write) -> Result<(), ImageError> {
        PnmEncoder::new(writer)
            .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                ExtendedColorType::Rgb8,
            )
    }

    pub fn save_ppm(&self, path: &Path) -> Result<(), ImageError> {
        let file = std::fs::File::create(path)?;
        self.write_ppm(std::io::BufWriter::new(file))?;
        log::debug!("Saved {}", path.display());
        Ok(())
    }
}
