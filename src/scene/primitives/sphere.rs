use std::f64::consts::PI;

use arrayvec::ArrayVec;
use nalgebra::Unit;

use crate::geometry::{FloatType, HitRecord, Ray, TexturePoint, WorldPoint, WorldVector};

use super::Shape;

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
}

impl Shape for Sphere {
    fn intersect(&self, ray: &Ray) -> ArrayVec<HitRecord, 2> {
        let mut hits = ArrayVec::new();

        let oc = ray.origin - self.center;
        let a = ray.direction.norm_squared();
        let b = 2.0 * ray.direction.dot(&oc);
        let c = oc.norm_squared() - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return hits;
        }

        let sqrt_disc = discriminant.sqrt();
        let near = (-b - sqrt_disc) / (2.0 * a);
        let far = (-b + sqrt_disc) / (2.0 * a);
        let roots = [near, far];
        let root_count = if near == far { 1 } else { 2 };

        for &t in &roots[..root_count] {
            let point = ray.point_at(t);
            if !ray.faces_forward(&point) {
                continue;
            }

            hits.push(HitRecord {
                distance_squared: (point - ray.origin).norm_squared(),
                point,
                normal: Unit::new_normalize(point - self.center),
            });
        }

        hits
    }

    /// Longitude from the normal's angle in the XZ plane, latitude from its Y component.
    fn texture_coordinates(&self, _point: &WorldPoint, normal: &Unit<WorldVector>) -> TexturePoint {
        let u = normal.z.atan2(normal.x) / (2.0 * PI) + 0.5;
        let v = 0.5 - normal.y.clamp(-1.0, 1.0).asin() / PI;
        TexturePoint::new(u, v)
    }
}
