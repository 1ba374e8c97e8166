use std::path::Path;

use image::RgbImage;
use thiserror::Error;

use crate::geometry::{FloatType, TexturePoint};
use crate::util::{BLACK, Color, image_to_color};

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {0} has no pixels")]
    Empty(String),
}

/// Decoded 8bit RGB texture.
#[derive(Clone, Debug)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn new(image: RgbImage) -> Texture {
        Texture { image }
    }

    /// Loads a texture from any format supported by the image crate (PPM included).
    pub fn load(path: &Path) -> Result<Texture, TextureError> {
        let image = image::open(path)
            .map_err(|source| TextureError::Decode {
                path: path.display().to_string(),
                source,
            })?
            .into_rgb8();

        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::Empty(path.display().to_string()));
        }

        log::debug!(
            "Loaded texture {}, {}x{}",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Texture { image })
    }

    /// Loads a texture, logging and returning `None` on failure.
    /// The primitive then renders with its base color.
    pub fn load_or_disable(path: &Path) -> Option<Texture> {
        match Texture::load(path) {
            Ok(texture) => Some(texture),
            Err(e) => {
                log::warn!("{e}; texturing disabled");
                None
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Looks up the texel at the given texture coordinates, scaled to the texture size.
    /// Coordinates that fall outside of the image give black.
    pub fn texel(&self, uv: &TexturePoint) -> Color {
        let x = (uv.x * self.width() as FloatType).floor();
        let y = (uv.y * self.height() as FloatType).floor();

        // Also rejects NaN
        if !(x >= 0.0 && y >= 0.0) {
            return BLACK;
        }

        self.image
            .get_pixel_checked(x as u32, y as u32)
            .map_or(BLACK, |pixel| image_to_color(*pixel))
    }
}
