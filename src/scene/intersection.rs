use nalgebra::Unit;
use ordered_float::OrderedFloat;

use crate::geometry::{FloatType, HitRecord, WorldPoint, WorldVector};
use crate::scene::PrimitiveId;

/// A single ray-primitive hit.
#[derive(Copy, Clone, Debug)]
pub struct Intersection {
    pub primitive: PrimitiveId,
    /// Squared distance from the ray origin. Only ever compared, so no square root is needed.
    pub distance_squared: FloatType,
    pub point: WorldPoint,
    pub normal: Unit<WorldVector>,
}

impl Intersection {
    pub fn new(primitive: PrimitiveId, hit: HitRecord) -> Intersection {
        Intersection {
            primitive,
            distance_squared: hit.distance_squared,
            point: hit.point,
            normal: hit.normal,
        }
    }
}

/// Selects the candidate closest to the ray origin.
/// Exact ties go to the candidate that comes first.
pub fn nearest(candidates: &[Intersection]) -> Option<&Intersection> {
    candidates
        .iter()
        .min_by_key(|candidate| OrderedFloat(candidate.distance_squared))
}
