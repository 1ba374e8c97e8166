use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools as _;
use raycaster::{
    Color, CubeFace, DEFAULT_DOF_SAMPLES, RenderSettings, SceneDescription, TraceStatistics,
    geometry::WorldPoint, render,
};

/// Renders cube map views of a scene file into binary PPM images.
#[derive(Parser, Debug)]
#[command(name = "raycaster", version)]
struct Cli {
    /// Scene description file
    scene: PathBuf,

    /// Directory for the rendered images
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Cube faces to render: 0 front, 1 right, 2 left, 3 back, 4 top, 5 bottom
    #[arg(long, value_delimiter = ',', default_values_t = [0, 1, 2, 3, 4, 5])]
    faces: Vec<usize>,

    /// Distances along the primary rays that stay in focus, one image set each
    #[arg(long, value_delimiter = ',', default_values_t = [3.0, 7.0, 11.0])]
    focal_distance: Vec<f64>,

    /// Rays averaged per pixel for depth of field
    #[arg(long, default_value_t = DEFAULT_DOF_SAMPLES)]
    samples: std::num::NonZeroU32,

    /// Trace a single ray per pixel
    #[arg(long)]
    no_dof: bool,

    /// Seed of the depth of field jitter
    #[arg(long)]
    seed: Option<u64>,

    /// Image size in pixels, overrides the scene's `camera` size
    #[arg(long)]
    size: Option<u32>,

    /// Background color
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"], default_values_t = [0.0, 0.0, 0.0])]
    background: Vec<f64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let faces = cli
        .faces
        .iter()
        .map(|&index| {
            CubeFace::from_index(index).with_context(|| format!("no cube face {index}, expected 0-5"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let description = SceneDescription::from_file(&cli.scene)?;
    let Some(size) = cli.size.or(description.image_size) else {
        bail!(
            "{} does not set the image size with `camera`, pass --size",
            cli.scene.display()
        );
    };

    let Some((r, g, b)) = cli.background.iter().copied().collect_tuple() else {
        bail!("background needs exactly three channels");
    };
    let scene = description
        .build(Color::new(r, g, b))
        .with_context(|| format!("building scene {}", cli.scene.display()))?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("creating {}", cli.output_dir.display()))?;
    let stem = cli
        .scene
        .file_stem()
        .context("scene path has no file name")?
        .to_string_lossy();

    let mut total_statistics = TraceStatistics::default();

    for &focal_distance in &cli.focal_distance {
        let settings = RenderSettings {
            dof_samples: cli.samples,
            depth_of_field: !cli.no_dof,
            focal_distance,
            seed: cli.seed,
            ..Default::default()
        };

        for &face in &faces {
            let camera = face.camera(WorldPoint::origin(), size)?;
            let path = output_path(&cli.output_dir, &stem, focal_distance, face);

            let bar = ProgressBar::new(size.into());
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} rows")?
                    .progress_chars("=> "),
            );
            bar.set_message(path.display().to_string());

            let rendering = render(&scene, &camera, &settings, |finished, _| {
                bar.set_position(finished.into())
            });
            bar.finish();

            rendering
                .image
                .save_ppm(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            log::info!("Output generated in {}", path.display());

            total_statistics = total_statistics.merge(&rendering.statistics);
        }
    }

    log::info!("Total: {total_statistics}");

    Ok(())
}

/// `<stem>_<focal distance>_<face>.ppm`, the focal distance truncated to an integer.
fn output_path(directory: &Path, stem: &str, focal_distance: f64, face: CubeFace) -> PathBuf {
    directory.join(format!(
        "{stem}_{}_{}.ppm",
        focal_distance as i64,
        face.index()
    ))
}
