//! Local illumination terms of the Phong-like shading model.

use nalgebra::Unit;

use crate::geometry::{FloatType, WorldPoint, WorldVector, unit_vector};
use crate::scene::LightSource;
use crate::util::{Color, modulate};

pub const AMBIENT_COEFFICIENT: FloatType = 0.2;
pub const SPECULAR_EXPONENT: i32 = 32;

pub fn ambient(base_color: Color) -> Color {
    base_color * AMBIENT_COEFFICIENT
}

/// Lambertian term of a single light.
pub fn diffuse(
    base_color: Color,
    light: &LightSource,
    point: &WorldPoint,
    normal: &Unit<WorldVector>,
) -> Color {
    let to_light = light.position - point;
    modulate(base_color, light.color) * cosine(normal, to_light)
}

/// Highlight of a single light, using the half vector between the eye and the light.
/// The light vector enters the half vector unnormalized.
pub fn specular(
    light: &LightSource,
    point: &WorldPoint,
    normal: &Unit<WorldVector>,
    incoming: &Unit<WorldVector>,
) -> Color {
    let to_light = light.position - point;
    let half = to_light - incoming.as_ref();
    light.color * cosine(normal, half).powi(SPECULAR_EXPONENT)
}

/// Cosine between the normal and a direction, zero when facing away or degenerate.
fn cosine(normal: &Unit<WorldVector>, direction: WorldVector) -> FloatType {
    unit_vector(direction).map_or(0.0, |direction| normal.dot(&direction).max(0.0))
}
