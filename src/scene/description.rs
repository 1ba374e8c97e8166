//! Text scene description.
//!
//! The format is a stream of whitespace separated keywords, each followed by its operands:
//!
//! ```text
//! camera 512
//! sphere
//!     center 0 0 -5
//!     dimension 1
//!     color 1 0 0
//!     reflectivity 0.3
//! plane
//!     center 0 -1 -5
//!     dimension 10 10
//!     normal 0 1 0
//!     headup 0 0 -1
//!     texture floor.ppm
//! light
//!     location 0 10 -5
//!     color 1 1 1
//! ```
//!
//! `sphere`, `plane` and `light` start a new object, the other keywords modify the most
//! recently started one. Unknown keywords are skipped.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use itertools::Itertools as _;
use thiserror::Error;

use crate::geometry::{FloatType, GeometryError, WorldPoint, WorldVector};
use crate::scene::{LightSource, Material, Plane, Scene, Sphere, Texture};
use crate::util::{Color, WHITE};

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to read scene {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("plane {index}: {source}")]
    InvalidPlane {
        index: usize,
        #[source]
        source: GeometryError,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SphereDescription {
    pub center: WorldPoint,
    pub radius: FloatType,
    pub color: Color,
    pub reflectivity: FloatType,
    pub texture: Option<PathBuf>,
}

impl Default for SphereDescription {
    fn default() -> Self {
        SphereDescription {
            center: WorldPoint::origin(),
            radius: 1.0,
            color: WHITE,
            reflectivity: 0.0,
            texture: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaneDescription {
    pub center: WorldPoint,
    pub width: FloatType,
    pub length: FloatType,
    pub normal: WorldVector,
    pub headup: WorldVector,
    pub color: Color,
    pub reflectivity: FloatType,
    pub texture: Option<PathBuf>,
}

impl Default for PlaneDescription {
    fn default() -> Self {
        PlaneDescription {
            center: WorldPoint::origin(),
            width: 1.0,
            length: 1.0,
            normal: WorldVector::new(0.0, 1.0, 0.0),
            headup: WorldVector::new(0.0, 0.0, -1.0),
            color: WHITE,
            reflectivity: 0.0,
            texture: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightDescription {
    pub location: WorldPoint,
    pub color: Color,
}

impl Default for LightDescription {
    fn default() -> Self {
        LightDescription {
            location: WorldPoint::new(0.0, 10.0, -5.0),
            color: WHITE,
        }
    }
}

/// Parsed, not yet built scene.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneDescription {
    /// Side of the square output image in pixels
    pub image_size: Option<u32>,
    pub spheres: Vec<SphereDescription>,
    pub planes: Vec<PlaneDescription>,
    pub lights: Vec<LightDescription>,
}

/// Object that the property keywords apply to.
#[derive(Copy, Clone, Debug)]
enum Current {
    Nothing,
    Sphere,
    Plane,
    Light,
}

impl SceneDescription {
    /// Reads a scene file. Relative texture paths are resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<SceneDescription, SceneError> {
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut description: SceneDescription = text.parse()?;

        if let Some(directory) = path.parent() {
            let textures = description
                .spheres
                .iter_mut()
                .map(|sphere| &mut sphere.texture)
                .chain(description.planes.iter_mut().map(|plane| &mut plane.texture));
            for texture in textures.flatten() {
                if texture.is_relative() {
                    *texture = directory.join(&*texture);
                }
            }
        }

        Ok(description)
    }

    /// Creates the renderable scene.
    /// Spheres get the first primitive ids, planes follow, both in file order.
    /// Textures that fail to load are skipped with a warning.
    pub fn build(&self, background: Color) -> Result<Scene, SceneError> {
        let mut scene = Scene::new(background);

        for sphere in &self.spheres {
            let material = Material::new(sphere.color, sphere.reflectivity)
                .with_texture(sphere.texture.as_deref().and_then(Texture::load_or_disable));
            scene.add_primitive(
                Sphere {
                    center: sphere.center,
                    radius: sphere.radius,
                },
                material,
            );
        }

        for (index, plane) in self.planes.iter().enumerate() {
            let shape = Plane::builder()
                .center(plane.center)
                .width(plane.width)
                .length(plane.length)
                .normal(plane.normal)
                .headup(plane.headup)
                .build()
                .map_err(|source| SceneError::InvalidPlane { index, source })?;
            let material = Material::new(plane.color, plane.reflectivity)
                .with_texture(plane.texture.as_deref().and_then(Texture::load_or_disable));
            scene.add_primitive(shape, material);
        }

        for light in &self.lights {
            scene.add_light(LightSource {
                position: light.location,
                color: light.color,
            });
        }

        log::info!(
            "Built scene with {} spheres, {} planes and {} lights",
            self.spheres.len(),
            self.planes.len(),
            self.lights.len()
        );

        Ok(scene)
    }

    fn parse_line<'a>(
        &mut self,
        current: &mut Current,
        line: usize,
        mut tokens: impl Iterator<Item = &'a str>,
    ) -> Result<(), SceneError> {
        let syntax = |message: String| SceneError::Syntax { line, message };

        while let Some(keyword) = tokens.next() {
            match (keyword, *current) {
                ("camera", _) => self.image_size = Some(operand(&mut tokens, line, keyword)?),
                ("sphere", _) => {
                    self.spheres.push(SphereDescription::default());
                    *current = Current::Sphere;
                }
                ("plane", _) => {
                    self.planes.push(PlaneDescription::default());
                    *current = Current::Plane;
                }
                ("light", _) => {
                    self.lights.push(LightDescription::default());
                    *current = Current::Light;
                }

                ("dimension", Current::Sphere) => {
                    self.current_sphere(line)?.radius = operand(&mut tokens, line, keyword)?;
                }
                ("dimension", Current::Plane) => {
                    let (width, length) = operand_pair(&mut tokens, line, keyword)?;
                    let plane = self.current_plane(line)?;
                    plane.width = width;
                    plane.length = length;
                }
                ("center", Current::Sphere) => {
                    self.current_sphere(line)?.center = triple(&mut tokens, line, keyword)?.into();
                }
                ("center", Current::Plane) => {
                    self.current_plane(line)?.center = triple(&mut tokens, line, keyword)?.into();
                }
                ("color", Current::Sphere) => {
                    self.current_sphere(line)?.color = color(&mut tokens, line, keyword)?;
                }
                ("color", Current::Plane) => {
                    self.current_plane(line)?.color = color(&mut tokens, line, keyword)?;
                }
                ("color", Current::Light) => {
                    self.current_light(line)?.color = color(&mut tokens, line, keyword)?;
                }
                ("reflectivity", Current::Sphere) => {
                    self.current_sphere(line)?.reflectivity = operand(&mut tokens, line, keyword)?;
                }
                ("reflectivity", Current::Plane) => {
                    self.current_plane(line)?.reflectivity = operand(&mut tokens, line, keyword)?;
                }
                ("texture", Current::Sphere) => {
                    self.current_sphere(line)?.texture = Some(texture(&mut tokens, line)?);
                }
                ("texture", Current::Plane) => {
                    self.current_plane(line)?.texture = Some(texture(&mut tokens, line)?);
                }
                ("normal", Current::Plane) => {
                    self.current_plane(line)?.normal = triple(&mut tokens, line, keyword)?.into();
                }
                ("headup", Current::Plane) => {
                    self.current_plane(line)?.headup = triple(&mut tokens, line, keyword)?.into();
                }
                ("location", Current::Light) => {
                    self.current_light(line)?.location = triple(&mut tokens, line, keyword)?.into();
                }

                (
                    "dimension" | "center" | "color" | "reflectivity" | "texture" | "normal"
                    | "headup" | "location",
                    current,
                ) => {
                    return Err(syntax(format!(
                        "`{keyword}` does not apply to {}",
                        match current {
                            Current::Nothing => "nothing (no object started yet)",
                            Current::Sphere => "a sphere",
                            Current::Plane => "a plane",
                            Current::Light => "a light",
                        }
                    )));
                }
                (unknown, _) => log::warn!("Line {line}: skipping unknown token `{unknown}`"),
            }
        }

        Ok(())
    }

    fn current_sphere(&mut self, line: usize) -> Result<&mut SphereDescription, SceneError> {
        self.spheres.last_mut().ok_or_else(|| no_object(line, "sphere"))
    }

    fn current_plane(&mut self, line: usize) -> Result<&mut PlaneDescription, SceneError> {
        self.planes.last_mut().ok_or_else(|| no_object(line, "plane"))
    }

    fn current_light(&mut self, line: usize) -> Result<&mut LightDescription, SceneError> {
        self.lights.last_mut().ok_or_else(|| no_object(line, "light"))
    }
}

impl FromStr for SceneDescription {
    type Err = SceneError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut description = SceneDescription::default();
        let mut current = Current::Nothing;

        for (index, line) in text.lines().enumerate() {
            description.parse_line(&mut current, index + 1, line.split_whitespace())?;
        }

        Ok(description)
    }
}

fn operand<'a, T: FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    keyword: &str,
) -> Result<T, SceneError> {
    let token = tokens.next().ok_or_else(|| SceneError::Syntax {
        line,
        message: format!("`{keyword}` is missing an operand"),
    })?;
    token.parse().map_err(|_| SceneError::Syntax {
        line,
        message: format!("`{token}` is not a valid operand of `{keyword}`"),
    })
}

fn operand_pair<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    keyword: &str,
) -> Result<(FloatType, FloatType), SceneError> {
    Ok((
        operand(tokens, line, keyword)?,
        operand(tokens, line, keyword)?,
    ))
}

fn triple<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    keyword: &str,
) -> Result<[FloatType; 3], SceneError> {
    let (x, y, z) = tokens.next_tuple().ok_or_else(|| SceneError::Syntax {
        line,
        message: format!("`{keyword}` needs three operands"),
    })?;
    let parse = |token: &str| operand(&mut std::iter::once(token), line, keyword);
    Ok([parse(x)?, parse(y)?, parse(z)?])
}

fn texture<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<PathBuf, SceneError> {
    tokens
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| SceneError::Syntax {
            line,
            message: "`texture` needs a file name".to_string(),
        })
}

fn no_object(line: usize, kind: &str) -> SceneError {
    SceneError::Syntax {
        line,
        message: format!("no {kind} started"),
    }
}

fn color<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    line: usize,
    keyword: &str,
) -> Result<Color, SceneError> {
    let [r, g, b] = triple(tokens, line, keyword)?;
    Ok(Color::new(r, g, b))
}
