use nalgebra::{Point2, Point3, Unit, Vector3};
use thiserror::Error;

pub type FloatType = f64;

pub type ScreenPoint = Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;

pub type WorldPoint = Point3<FloatType>;
pub type WorldVector = Vector3<FloatType>;
pub type TexturePoint = Point2<FloatType>;

pub const EPSILON: FloatType = 1e-9;

#[derive(Copy, Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("ray direction {0:?} is zero-length or not finite")]
    DegenerateDirection(WorldVector),
    #[error("vectors {0:?} and {1:?} do not span a plane")]
    LinearlyDependent(WorldVector, WorldVector),
}

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: Unit<WorldVector>,
}

impl Ray {
    /// Creates a ray, normalizing the direction.
    /// Zero-length, NaN and infinite directions are rejected.
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Result<Ray, GeometryError> {
        Ok(Ray {
            origin,
            direction: unit_vector(direction)?,
        })
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction.as_ref() * distance
    }

    /// Tests whether `point` lies in front of the ray origin.
    ///
    /// The vector from the point back to the origin must point against the ray direction.
    /// Differs from checking the sign of the ray parameter only for non-finite inputs.
    pub fn faces_forward(&self, point: &WorldPoint) -> bool {
        (self.origin - point).dot(&self.direction) < 0.0
    }
}

/// Geometric part of a ray-surface hit, before it is attributed to a scene primitive.
#[derive(Copy, Clone, Debug)]
pub struct HitRecord {
    /// Squared distance from the ray origin
    pub distance_squared: FloatType,
    pub point: WorldPoint,
    pub normal: Unit<WorldVector>,
}

/// Normalizes a vector, failing for vectors that have no usable direction.
pub fn unit_vector(v: WorldVector) -> Result<Unit<WorldVector>, GeometryError> {
    if !v.iter().all(|x| x.is_finite()) {
        return Err(GeometryError::DegenerateDirection(v));
    }
    Unit::try_new(v, EPSILON).ok_or(GeometryError::DegenerateDirection(v))
}

/// Mirror reflection of `incoming` around `normal`.
pub fn reflect(incoming: &WorldVector, normal: &Unit<WorldVector>) -> WorldVector {
    incoming - normal.as_ref() * (2.0 * incoming.dot(normal))
}
