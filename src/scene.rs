use crate::{
    color::Color,
    objects::{Hit, PointLight, Ray, Sphere},
    vector::Vector3,
};

/// Immutable set of spheres and lights shared by every worker during a render.
#[derive(Debug, Clone)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub lights: Vec<PointLight>,
    /// Color returned for rays that hit nothing.
    pub background: Color,
    /// Starting shade of every hit before lights are added.
    pub ambient: Color,
}

impl Scene {
    pub fn new(spheres: Vec<Sphere>, lights: Vec<PointLight>) -> Self {
        Scene {
            spheres,
            lights,
            background: Color::BLACK,
            ambient: Color::BLACK,
        }
    }

    /// Red, green and blue spheres in a row, lit from the upper right.
    pub fn three_spheres() -> Self {
        Scene::new(
            vec![
                Sphere::new(Vector3::new(-1.0, 0.0, -1.5), 0.6, Color::RED),
                Sphere::new(Vector3::new(0.0, 0.0, -1.0), 0.75, Color::GREEN),
                Sphere::new(Vector3::new(1.0, 0.0, -1.5), 0.6, Color::BLUE),
            ],
            vec![PointLight::new(Vector3::new(3.0, 5.0, 1.0), Color::WHITE)],
        )
    }

    /// Closest sphere hit with a strictly positive distance.
    ///
    /// Spheres are scanned in declaration order and the first one wins ties.
    pub fn trace(&self, ray: &Ray) -> Option<Hit<'_>> {
        let mut closest: Option<Hit> = None;

        for sphere in &self.spheres {
            let Some(distance) = sphere.intersect(ray) else {
                continue;
            };

            if distance <= 0.0 {
                continue;
            }

            if closest.map_or(true, |hit| distance < hit.distance) {
                closest = Some(Hit { distance, sphere });
            }
        }

        closest
    }
}

impl Default for Scene {
    fn default() -> Self {
        Scene::three_spheres()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_nearest_sphere() {
        let scene = Scene::new(
            vec![
                Sphere::new(Vector3::new(0.0, 0.0, -10.0), 1.0, Color::RED),
                Sphere::new(Vector3::new(0.0, 0.0, -4.0), 1.0, Color::GREEN),
            ],
            vec![],
        );
        let ray = Ray::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0));
        let hit = scene.trace(&ray).unwrap();
        assert_eq!(hit.sphere.albedo(), Color::GREEN);
        assert!((hit.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn first_sphere_wins_exact_ties() {
        let scene = Scene::new(
            vec![
                Sphere::new(Vector3::new(0.0, 0.0, -4.0), 1.0, Color::RED),
                Sphere::new(Vector3::new(0.0, 0.0, -4.0), 1.0, Color::BLUE),
            ],
            vec![],
        );
        let ray = Ray::new(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(scene.trace(&ray).unwrap().sphere.albedo(), Color::RED);
    }

    #[test]
    fn miss_returns_none() {
        let scene = Scene::three_spheres();
        let up = Ray::new(Vector3::ZERO, Vector3::Y);
        assert!(scene.trace(&up).is_none());
        let behind = Ray::new(Vector3::ZERO, Vector3::Z);
        assert!(scene.trace(&behind).is_none());
    }

    #[test]
    fn zero_distance_is_not_a_hit() {
        // ray starts on the surface of the only sphere and leaves it
        let scene = Scene::new(vec![Sphere::new(Vector3::ZERO, 1.0, Color::RED)], vec![]);
        let ray = Ray::new(Vector3::new(0.0, 0.0, 1.0), Vector3::Z);
        assert!(scene.trace(&ray).is_none());
    }

    #[test]
    fn empty_scene_never_hits() {
        let scene = Scene::new(vec![], vec![]);
        assert!(scene.trace(&Ray::new(Vector3::ZERO, Vector3::X)).is_none());
    }
}
