pub mod description;
pub mod intersection;
pub mod primitives;
pub mod texture;

use index_vec::IndexVec;

use crate::geometry::{FloatType, Ray, WorldPoint};
use crate::util::Color;

pub use description::{SceneDescription, SceneError};
pub use intersection::{Intersection, nearest};
pub use primitives::{Material, Plane, Primitive, Shape, Sphere};
pub use texture::Texture;

index_vec::define_index_type! {
    /// Stable identity of a primitive within its scene.
    pub struct PrimitiveId = u32;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LightSource {
    pub position: WorldPoint,
    pub color: Color,
}

/// Outcome of a scene-wide nearest hit query.
#[derive(Copy, Clone, Debug)]
pub enum SceneHit {
    Miss,
    Hit(Intersection),
    /// Several different primitives share the minimal distance. Treated as a miss.
    Ambiguous { distance_squared: FloatType },
}

/// All primitives and lights of a render. Built up front, read only while tracing.
#[derive(Debug)]
pub struct Scene {
    primitives: IndexVec<PrimitiveId, Primitive>,
    lights: Vec<LightSource>,
    background: Color,
}

impl Scene {
    pub fn new(background: Color) -> Scene {
        Scene {
            primitives: IndexVec::new(),
            lights: Vec::new(),
            background,
        }
    }

    /// Adds a primitive and returns its identity.
    pub fn add_primitive<S>(&mut self, shape: S, material: Material) -> PrimitiveId
    where
        S: Shape + Send + Sync + 'static,
    {
        let id = self.primitives.next_idx();
        self.primitives.push(Primitive::new(id, Box::new(shape), material))
    }

    pub fn add_light(&mut self, light: LightSource) {
        self.lights.push(light);
    }

    pub fn primitive(&self, id: PrimitiveId) -> &Primitive {
        &self.primitives[id]
    }

    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }

    pub fn lights(&self) -> &[LightSource] {
        &self.lights
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Intersects the ray with every primitive and selects the nearest hit.
    ///
    /// `candidates` is scratch space, reused between queries to avoid allocation.
    pub fn find_nearest_intersection(
        &self,
        ray: &Ray,
        candidates: &mut Vec<Intersection>,
    ) -> SceneHit {
        candidates.clear();
        for primitive in &self.primitives {
            candidates.extend(primitive.intersect(ray));
        }

        let Some(nearest) = nearest(candidates.as_slice()) else {
            return SceneHit::Miss;
        };

        let ambiguous = candidates.iter().any(|candidate| {
            candidate.primitive != nearest.primitive
                && candidate.distance_squared == nearest.distance_squared
        });

        if ambiguous {
            log::debug!(
                "Ray from {:?} hits several primitives at squared distance {}",
                ray.origin,
                nearest.distance_squared
            );
            SceneHit::Ambiguous {
                distance_squared: nearest.distance_squared,
            }
        } else {
            SceneHit::Hit(*nearest)
        }
    }

    /// Checks whether the light at `light_position` is visible from `point`.
    ///
    /// The primitive `self_id` (the one `point` lies on) never occludes.
    pub fn visible(
        &self,
        point: &WorldPoint,
        light_position: &WorldPoint,
        self_id: PrimitiveId,
    ) -> bool {
        let to_light = light_position - point;
        let light_distance_squared = to_light.norm_squared();

        let Ok(ray) = Ray::new(*point, to_light) else {
            // The point coincides with the light
            return true;
        };

        !self
            .primitives
            .iter()
            .filter(|primitive| primitive.id() != self_id)
            .filter_map(|primitive| primitive.nearest_intersection(&ray))
            .any(|hit| hit.distance_squared < light_distance_squared)
    }
}
