use crate::{
    camera::Camera,
    geometry::ScreenPoint,
    image_buffer::ImageBuffer,
    renderer::{RenderSettings, tracer::Tracer},
    scene::Scene,
    util::TraceStatistics,
};

/// Finished image together with what it took to make it.
#[derive(Debug)]
pub struct Rendering {
    pub image: ImageBuffer,
    pub statistics: TraceStatistics,
}

/// Renders the scene through the camera, row by row from the top.
///
/// `finished_row_callback` receives the number of finished rows and the total after each row.
pub fn render<F: FnMut(u32, u32)>(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
    mut finished_row_callback: F,
) -> Rendering {
    let resolution = camera.resolution();
    let mut image = ImageBuffer::new(resolution);
    let mut tracer = Tracer::new(scene, settings);

    for row in 0..resolution.y {
        for column in 0..resolution.x {
            let point = ScreenPoint::new(column, row);
            let color = match camera.primary_ray(&point) {
                Ok(ray) if settings.depth_of_field => {
                    tracer.trace_pixel(&ray, camera.pixel_height())
                }
                Ok(ray) => tracer.trace(&ray),
                Err(e) => {
                    log::warn!("No primary ray for pixel {column}, {row}: {e}");
                    tracer.background()
                }
            };
            image.set_pixel(&point, color);
        }
        finished_row_callback(row + 1, resolution.y);
    }

    let statistics = tracer.into_statistics();
    log::info!("Rendered {}x{}: {statistics}", resolution.x, resolution.y);

    Rendering { image, statistics }
}
