mod camera;
pub mod geometry;
mod image_buffer;
mod renderer;
pub mod scene;
mod util;

pub use crate::renderer::{
    DEFAULT_DOF_SAMPLES, MAX_RECURSION, RenderSettings, Rendering, Tracer, render,
};
pub use camera::{Camera, CameraError, CubeFace};
pub use image_buffer::ImageBuffer;
pub use scene::{Scene, SceneDescription, SceneError};
pub use util::{BLACK, Color, Stats, TraceStatistics, WHITE};
