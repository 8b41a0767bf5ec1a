//! Direct illumination: one primary ray per subsample, one shadow ray per
//! light at every hit, Lambertian response, no further bounces.

use serde::Deserialize;

use crate::{
    camera::Camera,
    color::Color,
    objects::Ray,
    scene::Scene,
    vector::{Normalize, Vector3},
};

/// Offset along the surface normal applied to shadow ray origins.
pub const SHADOW_BIAS: f32 = 1e-6;

/// Slack allowed above 1 for the cosine of two unit vectors in f32.
const NDOTL_TOLERANCE: f32 = 1e-5;

const CENTER: [(f32, f32); 1] = [(0.5, 0.5)];
const ROTATED_GRID: [(f32, f32); 4] = [(0.2, 0.6), (0.4, 0.2), (0.6, 0.8), (0.8, 0.4)];

/// Fixed subpixel sampling pattern used for every pixel of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Antialiasing {
    /// One sample through the pixel center.
    Center,
    /// Four stratified samples on a rotated grid.
    #[default]
    RotatedGrid,
}

impl Antialiasing {
    pub fn offsets(&self) -> &'static [(f32, f32)] {
        match self {
            Antialiasing::Center => &CENTER,
            Antialiasing::RotatedGrid => &ROTATED_GRID,
        }
    }

    pub fn sample_count(&self) -> usize {
        self.offsets().len()
    }
}

/// Shades one primary ray.
///
/// Returns the saturated color and the number of rays traced, counting the
/// primary ray and each shadow ray.
pub fn shade(ray: &Ray, scene: &Scene) -> (Color, u64) {
    let mut rays = 1;

    let Some(hit) = scene.trace(ray) else {
        return (scene.background, rays);
    };

    let hit_point = ray.at(hit.distance);
    let normal = hit.sphere.normal_at(hit_point);
    let mut color = scene.ambient;

    for light in &scene.lights {
        rays += 1;
        if let Some(ndotl) = light_cosine(scene, hit_point, normal, light.position) {
            color += hit.sphere.albedo() * light.color * ndotl;
        }
    }

    (color.saturated(), rays)
}

/// Cosine between the normal and the direction to an unoccluded light.
///
/// `None` when something sits between the point and the light, or when the
/// light is below the surface.
fn light_cosine(scene: &Scene, point: Vector3, normal: Vector3, light_position: Vector3) -> Option<f32> {
    let mut to_light = light_position - point;
    let distance_squared = to_light.dot(to_light);
    to_light.normalize_in_place();

    if is_occluded(scene, point, normal, to_light, distance_squared) {
        return None;
    }

    let ndotl = normal.dot(to_light);
    if ndotl <= 0.0 {
        return None;
    }

    debug_assert!(
        ndotl <= 1.0 + NDOTL_TOLERANCE,
        "cosine {} above 1, normal or light direction not unit length",
        ndotl
    );
    Some(ndotl)
}

/// Whether a sphere blocks the path from `point` to a light `distance_squared` away.
///
/// `to_light` must be unit length so the hit distance is comparable with
/// the light distance. Blockers beyond the light do not count.
pub fn is_occluded(
    scene: &Scene,
    point: Vector3,
    normal: Vector3,
    to_light: Vector3,
    distance_squared: f32,
) -> bool {
    let shadow_ray = Ray::new(point + SHADOW_BIAS * normal, to_light);
    scene
        .trace(&shadow_ray)
        .is_some_and(|hit| hit.distance * hit.distance < distance_squared)
}

/// Averages every subsample of pixel `(x, y)` and packs it as `0xAARRGGBB`.
pub fn pixel(camera: &Camera, scene: &Scene, antialiasing: Antialiasing, x: u32, y: u32) -> (u32, u64) {
    let offsets = antialiasing.offsets();
    let mut total = Color::ZERO;
    let mut rays = 0;

    for &offset in offsets {
        let ray = camera.primary_ray(x, y, offset);
        let (color, traced) = shade(&ray, scene);
        total += color;
        rays += traced;
    }

    total *= 1.0 / offsets.len() as f32;
    (total.to_u32(), rays)
}
