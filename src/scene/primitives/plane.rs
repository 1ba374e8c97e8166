use arrayvec::ArrayVec;
use bon::bon;
use nalgebra::Unit;

use crate::geometry::{
    FloatType, GeometryError, HitRecord, Ray, TexturePoint, WorldPoint, WorldVector, unit_vector,
};

use super::Shape;

/// Rays closer to parallel with the plane than this are treated as missing it.
const PARALLEL_THRESHOLD: FloatType = 1e-6;

/// Finite rectangular patch of a plane.
///
/// The patch extends `length / 2` along `headup` and `width / 2` along
/// `normal × headup` in both directions from its center.
#[derive(Clone, Debug)]
pub struct Plane {
    center: WorldPoint,
    width: FloatType,
    length: FloatType,
    normal: Unit<WorldVector>,
    headup: Unit<WorldVector>,
    right: Unit<WorldVector>,
}

#[bon]
impl Plane {
    /// Builds the patch. `headup` only needs to be linearly independent of `normal`,
    /// its component along the normal is removed.
    #[builder]
    pub fn new(
        center: WorldPoint,
        width: FloatType,
        length: FloatType,
        normal: WorldVector,
        headup: WorldVector,
    ) -> Result<Self, GeometryError> {
        let normal = unit_vector(normal)?;
        let right = unit_vector(normal.cross(&headup))
            .map_err(|_| GeometryError::LinearlyDependent(normal.into_inner(), headup))?;
        let headup = Unit::new_normalize(right.cross(&normal));

        Ok(Plane {
            center,
            width,
            length,
            normal,
            headup,
            right,
        })
    }
}

impl Plane {
    pub fn normal(&self) -> Unit<WorldVector> {
        self.normal
    }

    /// Coordinates of a point relative to the patch center, along `right` and `headup`.
    fn local_coordinates(&self, point: &WorldPoint) -> (FloatType, FloatType) {
        let offset = point - self.center;
        (offset.dot(&self.right), offset.dot(&self.headup))
    }
}

impl Shape for Plane {
    fn intersect(&self, ray: &Ray) -> ArrayVec<HitRecord, 2> {
        let mut hits = ArrayVec::new();

        let denom = self.normal.dot(&ray.direction);
        if denom.abs() < PARALLEL_THRESHOLD {
            return hits;
        }

        let t = (self.center - ray.origin).dot(&self.normal) / denom;
        let point = ray.point_at(t);

        let (right, up) = self.local_coordinates(&point);
        let inside = right.abs() <= self.width / 2.0 && up.abs() <= self.length / 2.0;

        if inside && ray.faces_forward(&point) {
            hits.push(HitRecord {
                distance_squared: (point - ray.origin).norm_squared(),
                point,
                normal: self.normal,
            });
        }

        hits
    }

    fn texture_coordinates(&self, point: &WorldPoint, _normal: &Unit<WorldVector>) -> TexturePoint {
        let (right, up) = self.local_coordinates(point);
        TexturePoint::new(right / self.width + 0.5, up / self.length + 0.5)
    }
}
