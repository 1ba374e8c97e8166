mod plane;
mod sphere;

pub use plane::Plane;
pub use sphere::Sphere;

use arrayvec::ArrayVec;
use nalgebra::Unit;

use crate::geometry::{FloatType, HitRecord, Ray, TexturePoint, WorldPoint, WorldVector};
use crate::scene::{
    PrimitiveId,
    intersection::{Intersection, nearest},
    texture::Texture,
};
use crate::util::Color;

/// Geometry of a renderable object.
pub trait Shape: std::fmt::Debug {
    /// Returns all forward facing intersections of the ray with the shape, at most two.
    fn intersect(&self, ray: &Ray) -> ArrayVec<HitRecord, 2>;

    /// Maps a surface point to texture coordinates, nominally in the 0-1 range.
    fn texture_coordinates(&self, point: &WorldPoint, normal: &Unit<WorldVector>) -> TexturePoint;
}

/// Surface appearance shared by all primitive kinds.
#[derive(Clone, Debug)]
pub struct Material {
    pub color: Color,
    /// Fraction of the mirror reflected light, between 0 and 1
    pub reflectivity: FloatType,
    pub texture: Option<Texture>,
}

impl Material {
    pub fn new(color: Color, reflectivity: FloatType) -> Material {
        let clamped = reflectivity.clamp(0.0, 1.0);
        if clamped != reflectivity {
            log::warn!("Reflectivity {reflectivity} is outside of 0-1, using {clamped}");
        }
        Material {
            color,
            reflectivity: clamped,
            texture: None,
        }
    }

    pub fn with_texture(self, texture: Option<Texture>) -> Material {
        Material { texture, ..self }
    }
}

/// A shape placed in the scene, with its material and identity.
#[derive(Debug)]
pub struct Primitive {
    id: PrimitiveId,
    shape: Box<dyn Shape + Send + Sync>,
    material: Material,
}

impl Primitive {
    pub(crate) fn new(
        id: PrimitiveId,
        shape: Box<dyn Shape + Send + Sync>,
        material: Material,
    ) -> Primitive {
        Primitive {
            id,
            shape,
            material,
        }
    }

    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn reflectivity(&self) -> FloatType {
        self.material.reflectivity
    }

    pub fn intersect(&self, ray: &Ray) -> ArrayVec<Intersection, 2> {
        self.shape
            .intersect(ray)
            .into_iter()
            .map(|hit| Intersection::new(self.id, hit))
            .collect()
    }

    pub fn nearest_intersection(&self, ray: &Ray) -> Option<Intersection> {
        nearest(&self.intersect(ray)).copied()
    }

    /// Color of the surface at the hit point.
    /// Textured primitives return the texel, others their base color.
    pub fn texel_at(&self, hit: &Intersection) -> Color {
        match &self.material.texture {
            Some(texture) => {
                texture.texel(&self.shape.texture_coordinates(&hit.point, &hit.normal))
            }
            None => self.material.color,
        }
    }
}
