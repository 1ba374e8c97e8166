use bon::bon;
use nalgebra::Unit;
use thiserror::Error;

use crate::geometry::{
    FloatType, GeometryError, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector, unit_vector,
};

#[derive(Copy, Clone, Debug, Error, PartialEq)]
pub enum CameraError {
    #[error("resolution {0}x{1} has no pixels")]
    EmptyResolution(u32, u32),
    #[error("field of view {0} degrees is outside of (0, 180)")]
    FieldOfView(FloatType),
    #[error("image plane distance {0} must be positive")]
    Distance(FloatType),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Pinhole camera shooting one ray through the center of each pixel.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    center: WorldPoint,

    resolution: ScreenSize,

    right: Unit<WorldVector>,
    up: Unit<WorldVector>,
    /// Vector from the center to the middle of the top left pixel
    film_origin_offset: WorldVector,

    /// Distances between pixel centers on the image plane
    pixel_width: FloatType,
    pixel_height: FloatType,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        center: WorldPoint,
        forward: WorldVector,
        /// Hint only, gets orthogonalized against `forward`
        up: WorldVector,
        resolution: ScreenSize,
        /// Distance of the image plane from the center
        #[builder(default = 1.0)]
        distance: FloatType,
        /// Horizontal field of view in degrees
        #[builder(default = 90.0)]
        fov_horizontal: FloatType,
        /// Vertical field of view in degrees
        #[builder(default = 90.0)]
        fov_vertical: FloatType,
    ) -> Result<Self, CameraError> {
        if resolution.x == 0 || resolution.y == 0 {
            return Err(CameraError::EmptyResolution(resolution.x, resolution.y));
        }
        for fov in [fov_horizontal, fov_vertical] {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(CameraError::FieldOfView(fov));
            }
        }
        if !(distance > 0.0) {
            return Err(CameraError::Distance(distance));
        }

        let forward = unit_vector(forward)?;
        let right = unit_vector(forward.cross(&up))
            .map_err(|_| GeometryError::LinearlyDependent(*forward, up))?;
        let up = unit_vector(right.cross(&forward))?;

        let pixel_width =
            2.0 * (fov_horizontal.to_radians() / 2.0).tan() * distance / resolution.x as FloatType;
        let pixel_height =
            2.0 * (fov_vertical.to_radians() / 2.0).tan() * distance / resolution.y as FloatType;

        let half_film = resolution.cast::<FloatType>() / 2.0;
        let film_origin_offset = forward.as_ref() * distance
            - right.as_ref() * ((half_film.x - 0.5) * pixel_width)
            + up.as_ref() * ((half_film.y - 0.5) * pixel_height);

        Ok(Camera {
            center,
            resolution,
            right,
            up,
            film_origin_offset,
            pixel_width,
            pixel_height,
        })
    }
}

impl Camera {
    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    /// Height of a pixel on the image plane.
    /// Used as the unit of the depth of field jitter.
    pub fn pixel_height(&self) -> FloatType {
        self.pixel_height
    }

    /// Ray from the camera center through the middle of a pixel.
    /// `point.x` is the column, `point.y` the row counted from the top.
    pub fn primary_ray(&self, point: &ScreenPoint) -> Result<Ray, GeometryError> {
        let direction = self.film_origin_offset
            + self.right.as_ref() * (self.pixel_width * point.x as FloatType)
            - self.up.as_ref() * (self.pixel_height * point.y as FloatType);
        Ray::new(self.center, direction)
    }
}

/// Faces of a cube map around the camera center.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Front,
    Right,
    Left,
    Back,
    Top,
    Bottom,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Front,
        CubeFace::Right,
        CubeFace::Left,
        CubeFace::Back,
        CubeFace::Top,
        CubeFace::Bottom,
    ];

    pub fn from_index(index: usize) -> Option<CubeFace> {
        CubeFace::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn forward(self) -> WorldVector {
        match self {
            CubeFace::Front => WorldVector::new(0.0, 0.0, -1.0),
            CubeFace::Right => WorldVector::new(1.0, 0.0, 0.0),
            CubeFace::Left => WorldVector::new(-1.0, 0.0, 0.0),
            CubeFace::Back => WorldVector::new(0.0, 0.0, 1.0),
            CubeFace::Top => WorldVector::new(0.0, 1.0, 0.0),
            CubeFace::Bottom => WorldVector::new(0.0, -1.0, 0.0),
        }
    }

    pub fn up(self) -> WorldVector {
        match self {
            CubeFace::Top => WorldVector::new(0.0, 0.0, 1.0),
            CubeFace::Bottom => WorldVector::new(0.0, 0.0, -1.0),
            _ => WorldVector::new(0.0, 1.0, 0.0),
        }
    }

    /// Square 90 degree camera looking through this face.
    pub fn camera(self, center: WorldPoint, size: u32) -> Result<Camera, CameraError> {
        Camera::builder()
            .center(center)
            .forward(self.forward())
            .up(self.up())
            .resolution(ScreenSize::new(size, size))
            .build()
    }
}
