use std::{
    error::Error,
    fmt::Display,
    fs::{self, File},
    io::BufWriter,
    path::Path,
    str::FromStr,
};

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use png::Encoder;
use serde::Deserialize;
use serde_json::from_str;

use crate::{
    camera::{Camera, Transform},
    color::Color,
    framebuffer::Framebuffer,
    objects::{PointLight, Sphere},
    render::{band_layout, Renderer},
    scene::Scene,
    shade::Antialiasing,
    vector::Vector3,
};

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SceneParams {
    pub camera: CameraParams,
    pub settings: SettingsParams,
    pub spheres: Vec<SphereParams>,
    pub lights: Vec<LightParams>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct CameraParams {
    pub film_dimensions: [u32; 2],
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub field_of_view: f32,
    pub transform: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsParams {
    pub workers: usize,
    pub antialiasing: Antialiasing,
    pub background: Color,
    pub ambient: Color,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SphereParams {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: Color,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct LightParams {
    pub position: [f32; 3],
    #[serde(default = "white")]
    pub color: Color,
}

fn white() -> Color {
    Color::WHITE
}

impl Default for SceneParams {
    fn default() -> Self {
        let scene = Scene::three_spheres();
        SceneParams {
            camera: CameraParams::default(),
            settings: SettingsParams::default(),
            spheres: scene
                .spheres
                .iter()
                .map(|sphere| SphereParams {
                    center: sphere.center().to_array(),
                    radius: sphere.radius(),
                    color: sphere.albedo(),
                })
                .collect(),
            lights: scene
                .lights
                .iter()
                .map(|light| LightParams {
                    position: light.position.to_array(),
                    color: light.color,
                })
                .collect(),
        }
    }
}

impl Default for CameraParams {
    fn default() -> Self {
        CameraParams {
            film_dimensions: [1280, 720],
            eye: [0.0, 0.0, 0.0],
            target: [0.0, 0.0, -1.0],
            field_of_view: 90.0,
            transform: true,
        }
    }
}

impl Default for SettingsParams {
    fn default() -> Self {
        SettingsParams {
            workers: 24,
            antialiasing: Antialiasing::RotatedGrid,
            background: Color::BLACK,
            ambient: Color::BLACK,
        }
    }
}

#[derive(Debug)]
pub struct SceneParseError {
    message: String,
}

impl Display for SceneParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SceneParseError {}

impl SceneParseError {
    fn new(message: impl Into<String>) -> Self {
        SceneParseError {
            message: message.into(),
        }
    }
}

pub fn read_input(filename: &str) -> Result<SceneParams, SceneParseError> {
    let Ok(scene_json) = fs::read_to_string(Path::new(filename)) else {
        return Err(SceneParseError::new(format!("Couldn't open file at {}", filename)));
    };

    parse_scene(&scene_json).map_err(|error| SceneParseError::new(format!("{}: {}", filename, error)))
}

pub fn parse_scene(scene_json: &str) -> Result<SceneParams, SceneParseError> {
    let scene_params = match from_str::<SceneParams>(scene_json) {
        Ok(scene_params) => scene_params,
        Err(error) => {
            return Err(SceneParseError::new(format!(
                "Scene isn't in a valid format ({})",
                error
            )))
        }
    };

    scene_params.validate()?;
    Ok(scene_params)
}

impl SceneParams {
    pub fn width(&self) -> u32 {
        self.camera.film_dimensions[0]
    }

    pub fn height(&self) -> u32 {
        self.camera.film_dimensions[1]
    }

    pub fn validate(&self) -> Result<(), SceneParseError> {
        let [width, height] = self.camera.film_dimensions;
        if width == 0 || height == 0 {
            return Err(SceneParseError::new(format!(
                "Film dimensions {}x{} must both be positive",
                width, height
            )));
        }

        if self.camera.field_of_view <= 0.0 || self.camera.field_of_view >= 180.0 {
            return Err(SceneParseError::new(
                "Camera field of view must be between 0 and 180 degrees",
            ));
        }

        if self.camera.transform && self.camera.eye == self.camera.target {
            return Err(SceneParseError::new("Camera eye and target must differ"));
        }

        if let Err(error) = band_layout(height, self.settings.workers) {
            return Err(SceneParseError::new(error.to_string()));
        }

        for (i, sphere) in self.spheres.iter().enumerate() {
            if !(sphere.radius > 0.0) {
                return Err(SceneParseError::new(format!(
                    "Sphere {} has non-positive radius {}",
                    i, sphere.radius
                )));
            }
        }

        Ok(())
    }

    pub fn scene(&self) -> Scene {
        let mut scene = Scene::new(
            self.spheres
                .iter()
                .map(|sphere| Sphere::new(Vector3::from_array(sphere.center), sphere.radius, sphere.color))
                .collect(),
            self.lights
                .iter()
                .map(|light| PointLight::new(Vector3::from_array(light.position), light.color))
                .collect(),
        );
        scene.background = self.settings.background;
        scene.ambient = self.settings.ambient;
        scene
    }

    pub fn camera(&self) -> Camera {
        let transform = self.camera.transform.then(|| {
            Transform::look_at(
                Vector3::from_array(self.camera.eye),
                Vector3::from_array(self.camera.target),
            )
        });

        Camera::new(self.width(), self.height(), self.camera.field_of_view, transform)
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(
            self.scene(),
            self.camera(),
            self.settings.antialiasing,
            self.settings.workers,
        )
    }
}

/// Command line options; anything given here overrides the scene file.
#[derive(Debug, Clone)]
pub struct Args {
    pub scene: Option<String>,
    pub output: String,
    pub workers: Option<usize>,
    pub antialiasing: Option<Antialiasing>,
    pub log_level: LevelFilter,
}

impl Args {
    fn from_matches(matches: &ArgMatches) -> Self {
        let log_level = matches
            .get_one::<String>("log-level")
            .and_then(|level| LevelFilter::from_str(level).ok())
            .unwrap_or(LevelFilter::Info);

        Args {
            scene: matches.get_one::<String>("scene").cloned(),
            output: matches
                .get_one::<String>("output")
                .cloned()
                .unwrap_or_else(|| "render.png".to_string()),
            workers: matches.get_one::<usize>("workers").copied(),
            antialiasing: matches.get_flag("no-aa").then_some(Antialiasing::Center),
            log_level,
        }
    }

    pub fn apply(&self, scene_params: &mut SceneParams) {
        if let Some(workers) = self.workers {
            scene_params.settings.workers = workers;
        }

        if let Some(antialiasing) = self.antialiasing {
            scene_params.settings.antialiasing = antialiasing;
        }
    }
}

pub fn command() -> Command {
    Command::new("raycast")
        .about("Renders spheres lit by point lights with shadows")
        .arg(Arg::new("scene").help("JSON scene file, the built-in scene if omitted"))
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .default_value("render.png")
                .help("PNG file to write"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_parser(value_parser!(usize))
                .help("Worker threads, must divide the image height"),
        )
        .arg(
            Arg::new("no-aa")
                .long("no-aa")
                .action(ArgAction::SetTrue)
                .help("Trace a single sample through each pixel center"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
        )
}

pub fn read_args() -> Args {
    Args::from_matches(&command().get_matches())
}

pub fn save_to_png(framebuffer: &Framebuffer, filename: &str) -> Result<(), Box<dyn Error>> {
    let mut rgba_values = Vec::with_capacity((framebuffer.width() * framebuffer.height()) as usize * 4);
    for y in 0..framebuffer.height() {
        for x in 0..framebuffer.width() {
            let [a, r, g, b] = framebuffer.pixel(x, y).to_be_bytes();
            rgba_values.extend_from_slice(&[r, g, b, a]);
        }
    }

    let mut encoder = Encoder::new(
        BufWriter::new(File::create(Path::new(filename))?),
        framebuffer.width(),
        framebuffer.height(),
    );

    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.write_header()?.write_image_data(&rgba_values)?;

    Ok(())
}
