mod machinery;
mod shading;
mod tracer;

use std::num::NonZeroU32;

pub use crate::renderer::machinery::{Rendering, render};
pub use crate::renderer::tracer::Tracer;

use crate::geometry::FloatType;
use crate::util::{Color, WHITE};

/// Deepest reflected ray, primary rays have depth 0.
pub const MAX_RECURSION: usize = 8;

/// Offset of reflected ray origins along the reflected direction
pub const REFLECTION_EPSILON: FloatType = 1e-10;

/// Offset of shadow ray origins along the surface normal, towards the light
pub const SHADOW_BIAS: FloatType = 1e-9;

pub const DEFAULT_DOF_SAMPLES: NonZeroU32 = NonZeroU32::MIN.saturating_add(49);

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    /// Rays averaged per pixel when depth of field is enabled
    pub dof_samples: NonZeroU32,
    pub depth_of_field: bool,
    /// Distance along the primary ray that stays in focus
    pub focal_distance: FloatType,
    /// Scales the background color seen by rays that miss everything
    pub ray_intensity: Color,
    /// Seed of the depth of field jitter. Random when unset.
    pub seed: Option<u64>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            dof_samples: DEFAULT_DOF_SAMPLES,
            depth_of_field: true,
            focal_distance: 3.0,
            ray_intensity: WHITE,
            seed: None,
        }
    }
}
