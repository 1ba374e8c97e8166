use rand::{Rng as _, SeedableRng, rngs::SmallRng};

use crate::geometry::{FloatType, Ray, WorldVector, reflect};
use crate::renderer::{MAX_RECURSION, REFLECTION_EPSILON, RenderSettings, SHADOW_BIAS, shading};
use crate::scene::{Intersection, Scene, SceneHit};
use crate::util::{BLACK, Color, TraceStatistics, clamp_color, modulate};

/// Half width of the depth of field jitter, in pixel heights
const DOF_JITTER: i32 = 30;

/// Resolves rays against a scene.
///
/// Owns all mutable state of a render: the jitter generator, the candidate buffer
/// reused by every intersection query and the statistics.
pub struct Tracer<'a> {
    scene: &'a Scene,
    settings: &'a RenderSettings,
    rng: SmallRng,
    candidates: Vec<Intersection>,
    statistics: TraceStatistics,
    /// Deepest reflection of the sample being traced
    sample_depth: usize,
}

impl<'a> Tracer<'a> {
    pub fn new(scene: &'a Scene, settings: &'a RenderSettings) -> Self {
        Tracer {
            scene,
            settings,
            rng: match settings.seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_os_rng(),
            },
            candidates: Vec::new(),
            statistics: TraceStatistics::default(),
            sample_depth: 0,
        }
    }

    pub fn statistics(&self) -> &TraceStatistics {
        &self.statistics
    }

    pub fn into_statistics(self) -> TraceStatistics {
        self.statistics
    }

    /// Color seen along a ray that missed everything.
    pub fn background(&self) -> Color {
        modulate(self.scene.background(), self.settings.ray_intensity)
    }

    /// Traces a single unperturbed camera sample.
    pub fn trace(&mut self, ray: &Ray) -> Color {
        self.sample_depth = 0;
        let color = self.trace_ray(ray, 0);
        self.statistics
            .reflection_depth
            .add_sample(self.sample_depth);
        color
    }

    /// Color of a pixel with depth of field.
    ///
    /// Averages `dof_samples` rays that all pass through the point at the focal distance
    /// along `ray`. The first sample is `ray` itself, the others start from origins shifted
    /// vertically by a random whole number of pixel heights.
    pub fn trace_pixel(&mut self, ray: &Ray, pixel_height: FloatType) -> Color {
        let samples = self.settings.dof_samples.get();
        let focal_point = ray.point_at(self.settings.focal_distance);

        let mut sum = BLACK;
        for i in 0..samples {
            if i == 0 {
                sum += self.trace(ray);
                continue;
            }

            let shift = self.rng.random_range(-DOF_JITTER..DOF_JITTER) as FloatType * pixel_height;
            let origin = ray.origin + WorldVector::new(0.0, shift, 0.0);
            match Ray::new(origin, focal_point - origin) {
                Ok(sample) => sum += self.trace(&sample),
                Err(e) => {
                    log::debug!("Skipping depth of field sample: {e}");
                    self.statistics.degenerate_rays += 1;
                    sum += self.background();
                }
            }
        }

        clamp_color(sum * (1.0 / samples as FloatType))
    }

    /// Color seen along a ray, `depth` is the number of reflections that led to it.
    ///
    /// Misses give the background scaled by the ray intensity, without clamping.
    /// Hits give a clamped shaded color.
    pub fn trace_ray(&mut self, ray: &Ray, depth: usize) -> Color {
        self.statistics.rays += 1;
        self.sample_depth = self.sample_depth.max(depth);

        match self.scene.find_nearest_intersection(ray, &mut self.candidates) {
            SceneHit::Hit(hit) => self.shade(&hit, ray, depth),
            SceneHit::Miss => {
                self.statistics.misses += 1;
                self.background()
            }
            SceneHit::Ambiguous { .. } => {
                self.statistics.ambiguous_hits += 1;
                self.background()
            }
        }
    }

    /// Ambient, diffuse and specular light at a hit plus the mirror reflection.
    pub fn shade(&mut self, hit: &Intersection, ray: &Ray, depth: usize) -> Color {
        let scene = self.scene;
        let primitive = scene.primitive(hit.primitive);
        let base_color = primitive.texel_at(hit);

        let mut color = shading::ambient(base_color);

        for light in scene.lights() {
            let towards_light = light.position - hit.point;
            let offset = if hit.normal.dot(&towards_light) < 0.0 {
                -hit.normal.as_ref() * SHADOW_BIAS
            } else {
                hit.normal.as_ref() * SHADOW_BIAS
            };

            self.statistics.shadow_rays += 1;
            if !scene.visible(&(hit.point + offset), &light.position, hit.primitive) {
                continue;
            }

            color += shading::diffuse(base_color, light, &hit.point, &hit.normal);
            color += shading::specular(light, &hit.point, &hit.normal, &ray.direction);
        }

        let reflectivity = primitive.reflectivity();
        if reflectivity > 0.0 && depth < MAX_RECURSION {
            let direction = reflect(&ray.direction, &hit.normal);
            let origin = hit.point + direction * REFLECTION_EPSILON;
            match Ray::new(origin, direction) {
                Ok(reflected) => color += self.trace_ray(&reflected, depth + 1) * reflectivity,
                Err(e) => {
                    log::debug!("Skipping reflection: {e}");
                    self.statistics.degenerate_rays += 1;
                }
            }
        }

        clamp_color(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{WorldPoint, WorldVector};
    use crate::scene::{LightSource, Material, Plane, Sphere};
    use crate::util::WHITE;
    use assert2::{assert, let_assert};
    use std::num::NonZeroU32;
    use test_strategy::proptest;

    fn settings() -> RenderSettings {
        RenderSettings {
            seed: Some(1234),
            ..Default::default()
        }
    }

    fn ray(origin: [FloatType; 3], direction: [FloatType; 3]) -> Ray {
        Ray::new(origin.into(), direction.into()).unwrap()
    }

    fn sphere(center: [FloatType; 3], radius: FloatType) -> Sphere {
        Sphere {
            center: center.into(),
            radius,
        }
    }

    /// Red ball in front of the camera lit from above, large floor ball below.
    fn lit_scene() -> Scene {
        let mut scene = Scene::new(Color::new(0.1, 0.2, 0.3));
        scene.add_primitive(sphere([0.0, 0.0, -5.0], 1.0), Material::new(Color::new(1.0, 0.0, 0.0), 0.0));
        scene.add_primitive(sphere([0.0, -102.0, -5.0], 100.0), Material::new(WHITE, 0.0));
        scene.add_light(LightSource {
            position: WorldPoint::new(0.0, 10.0, -5.0),
            color: WHITE,
        });
        scene
    }

    fn assert_close(a: Color, b: Color) {
        assert!((a.r - b.r).abs() < 1e-12);
        assert!((a.g - b.g).abs() < 1e-12);
        assert!((a.b - b.b).abs() < 1e-12);
    }

    #[test]
    fn miss_returns_scaled_background() {
        let scene = lit_scene();
        let settings = RenderSettings {
            ray_intensity: Color::new(2.0, 1.0, 0.5),
            ..settings()
        };
        let mut tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]), 0);

        assert!(color == Color::new(0.2, 0.2, 0.15));
        assert!(tracer.statistics().misses == 1);
    }

    #[test]
    fn ambiguous_hit_is_a_miss() {
        let mut scene = Scene::new(Color::new(0.5, 0.5, 0.5));
        scene.add_primitive(sphere([0.0, 0.0, -5.0], 1.0), Material::new(WHITE, 0.0));
        scene.add_primitive(sphere([0.0, 0.0, -5.0], 1.0), Material::new(WHITE, 0.0));
        let settings = settings();
        let mut tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace_ray(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]), 0);

        assert!(color == Color::new(0.5, 0.5, 0.5));
        assert!(tracer.statistics().ambiguous_hits == 1);
    }

    #[test]
    fn lit_sphere_top() {
        let scene = lit_scene();
        let settings = settings();
        let mut tracer = Tracer::new(&scene, &settings);

        // Straight down onto the top of the red ball, light straight above
        let down = ray([0.0, 5.0, -5.0], [0.0, -1.0, 0.0]);
        let color = tracer.trace_ray(&down, 0);

        // Ambient 0.2 + diffuse 1 + specular 1 on red, specular 1 on the other channels
        assert_close(color, Color::new(1.0, 1.0, 1.0));

        // Grazing the side, light is perpendicular to the normal
        let side = ray([5.0, 0.0, -5.0], [-1.0, 0.0, 0.0]);
        let color = tracer.trace_ray(&side, 0);
        assert!((color.r - 0.2).abs() < 1e-6);
        assert!(color.g < 1e-6);
    }

    #[test]
    fn occluder_removes_light() {
        let blocker = sphere([0.0, 5.0, -5.0], 1.0);
        let mut scene = Scene::new(BLACK);
        let floor = scene.add_primitive(
            Plane::builder()
                .center(WorldPoint::new(0.0, -1.0, -5.0))
                .width(10.0)
                .length(10.0)
                .normal(WorldVector::new(0.0, 1.0, 0.0))
                .headup(WorldVector::new(0.0, 0.0, -1.0))
                .build()
                .unwrap(),
            Material::new(Color::new(0.5, 0.5, 0.5), 0.0),
        );
        scene.add_light(LightSource {
            position: WorldPoint::new(0.0, 10.0, -5.0),
            color: WHITE,
        });
        let settings = settings();
        let down = ray([0.0, 0.0, -5.0], [0.0, -1.0, 0.0]);

        let lit = Tracer::new(&scene, &settings).trace_ray(&down, 0);
        assert!(lit.r > 0.2);

        scene.add_primitive(blocker, Material::new(WHITE, 0.0));
        let mut tracer = Tracer::new(&scene, &settings);
        let mut candidates = Vec::new();
        let_assert!(SceneHit::Hit(hit) = scene.find_nearest_intersection(&down, &mut candidates));
        assert!(hit.primitive == floor);

        // Only the ambient term is left
        let shadowed = tracer.trace_ray(&down, 0);
        assert_close(shadowed, Color::new(0.1, 0.1, 0.1));
    }

    #[test]
    fn facing_mirrors_stop_at_max_depth() {
        let mirror = |z: FloatType, normal_z: FloatType| {
            Plane::builder()
                .center(WorldPoint::new(0.0, 0.0, z))
                .width(100.0)
                .length(100.0)
                .normal(WorldVector::new(0.0, 0.0, normal_z))
                .headup(WorldVector::new(0.0, 1.0, 0.0))
                .build()
                .unwrap()
        };
        let mut scene = Scene::new(BLACK);
        scene.add_primitive(mirror(-5.0, 1.0), Material::new(Color::new(0.1, 0.1, 0.1), 1.0));
        scene.add_primitive(mirror(5.0, -1.0), Material::new(Color::new(0.1, 0.1, 0.1), 1.0));
        let settings = settings();
        let mut tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]));

        let statistics = tracer.statistics();
        assert!(statistics.reflection_depth.max == MAX_RECURSION);
        assert!(statistics.rays == MAX_RECURSION + 1);
        assert!(statistics.misses == 0);
        assert!(color.r <= 1.0);
    }

    /// Black mirror floor at y = 0, no lights, so only the reflected term contributes.
    fn mirror_floor_scene(ball_center: [FloatType; 3]) -> Scene {
        let mut scene = Scene::new(Color::new(0.4, 0.4, 0.4));
        scene.add_primitive(
            Plane::builder()
                .center(WorldPoint::origin())
                .width(100.0)
                .length(100.0)
                .normal(WorldVector::new(0.0, 1.0, 0.0))
                .headup(WorldVector::new(0.0, 0.0, -1.0))
                .build()
                .unwrap(),
            Material::new(BLACK, 0.5),
        );
        scene.add_primitive(sphere(ball_center, 0.5), Material::new(WHITE, 0.0));
        scene
    }

    #[test]
    fn reflection_is_scaled_by_reflectivity() {
        // The ball is far off the reflected path, the mirror shows the background
        let scene = mirror_floor_scene([-3.0, 2.0, 0.0]);
        let settings = settings();
        let mut tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace(&ray([0.0, 1.0, 0.0], [1.0, -1.0, 0.0]));

        assert_close(color, Color::new(0.2, 0.2, 0.2));
        assert!(tracer.statistics().rays == 2);
        assert!(tracer.statistics().reflection_depth.max == 1);
    }

    #[test]
    fn reflection_follows_mirror_direction() {
        // The ray hits the floor at (1, 0, 0) and bounces along (1, 1, 0) through the ball
        let scene = mirror_floor_scene([3.0, 2.0, 0.0]);
        let settings = settings();
        let mut tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace(&ray([0.0, 1.0, 0.0], [1.0, -1.0, 0.0]));

        // Ambient of the white ball, halved by the mirror
        assert_close(color, Color::new(0.1, 0.1, 0.1));
        assert!(tracer.statistics().misses == 0);
    }

    /// Small red ball without lights: every hit shades to the same ambient red.
    fn focus_scene() -> Scene {
        let mut scene = Scene::new(Color::new(0.0, 0.0, 1.0));
        scene.add_primitive(sphere([0.0, 0.0, -5.0], 0.2), Material::new(Color::new(1.0, 0.0, 0.0), 0.0));
        scene
    }

    #[test]
    fn object_at_focal_distance_stays_sharp() {
        let scene = focus_scene();
        let settings = RenderSettings {
            focal_distance: 5.0,
            ..settings()
        };
        let mut tracer = Tracer::new(&scene, &settings);

        // All samples pass through the ball's center
        let color = tracer.trace_pixel(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]), 0.01);

        assert!((color.r - 0.2).abs() < 1e-12);
        assert!(color.b == 0.0);
        assert!(tracer.statistics().misses == 0);
    }

    #[test]
    fn object_off_focal_distance_blurs() {
        let scene = focus_scene();
        let settings = RenderSettings {
            focal_distance: 1.0,
            ..settings()
        };
        let mut tracer = Tracer::new(&scene, &settings);

        // Samples cross at z = -1 and spread by four times their origin shift at the ball,
        // only shifts of at most 5 pixel heights still hit it
        let color = tracer.trace_pixel(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]), 0.01);

        assert!(color.r < 0.1);
        assert!(color.b > 0.5);
        assert!(tracer.statistics().misses > 0);
    }

    #[test]
    fn single_sample_equals_plain_trace() {
        let scene = lit_scene();
        let settings = RenderSettings {
            dof_samples: NonZeroU32::MIN,
            focal_distance: 7.0,
            ..settings()
        };
        let primary = ray([0.0, 0.0, 0.0], [0.1, -0.05, -1.0]);

        let dof = Tracer::new(&scene, &settings).trace_pixel(&primary, 0.01);
        let plain = Tracer::new(&scene, &settings).trace(&primary);

        assert!(dof == plain);
    }

    #[test]
    fn dof_is_reproducible_with_seed() {
        let scene = lit_scene();
        let settings = settings();
        let primary = ray([0.0, 0.0, 0.0], [0.0, -0.1, -1.0]);

        let a = Tracer::new(&scene, &settings).trace_pixel(&primary, 0.01);
        let b = Tracer::new(&scene, &settings).trace_pixel(&primary, 0.01);
        assert!(a == b);
    }

    #[test]
    fn dof_counts_every_sample() {
        let scene = lit_scene();
        let settings = settings();
        let mut tracer = Tracer::new(&scene, &settings);

        tracer.trace_pixel(&ray([0.0, 0.0, 0.0], [0.0, 0.0, -1.0]), 0.01);

        let statistics = tracer.statistics();
        assert!(statistics.reflection_depth.count == 50);
        assert!(statistics.rays == 50);
    }

    #[proptest]
    fn bright_lights_stay_clamped(
        #[strategy(0.0..1e9)] brightness: FloatType,
        #[strategy(-0.5..0.5)] dx: FloatType,
        #[strategy(-0.5..0.5)] dy: FloatType,
    ) {
        let mut scene = Scene::new(Color::new(0.3, 0.3, 0.3));
        scene.add_primitive(sphere([0.0, 0.0, -5.0], 1.0), Material::new(WHITE, 0.5));
        scene.add_primitive(sphere([0.0, -102.0, -5.0], 100.0), Material::new(WHITE, 0.5));
        scene.add_light(LightSource {
            position: WorldPoint::new(3.0, 10.0, 0.0),
            color: Color::new(brightness, brightness, brightness),
        });
        let settings = RenderSettings {
            dof_samples: NonZeroU32::new(4).unwrap(),
            ..settings()
        };
        let mut tracer = Tracer::new(&scene, &settings);

        let color = tracer.trace_pixel(&ray([0.0, 0.0, 0.0], [dx, dy, -1.0]), 0.01);
        for channel in [color.r, color.g, color.b] {
            assert!((0.0..=1.0).contains(&channel));
        }
    }
}
