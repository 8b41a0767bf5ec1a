//! Camera transform and primary ray generation.

use glam::{Affine3A, Mat3};

use crate::{
    objects::Ray,
    vector::{normalize, Vector3, WORLD_UP},
};

/// 3x4 affine view-to-world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    affine: Affine3A,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        affine: Affine3A::IDENTITY,
    };

    /// Builds the transform for an eye looking at a target.
    ///
    /// The camera looks down its own -Z axis. Rows are `[right | -right.eye]`,
    /// `[up | -up.eye]` and `[-look | -look.eye]`.
    pub fn look_at(eye: Vector3, target: Vector3) -> Self {
        let look = normalize(target - eye);
        let right = normalize(look.cross(WORLD_UP));
        let up = normalize(right.cross(look));

        // glam matrices are column-major, so the rows go in as columns and get flipped
        let rotation = Mat3::from_cols(right, up, -look).transpose();
        let translation = Vector3::new(-right.dot(eye), -up.dot(eye), -look.dot(eye));

        Transform {
            affine: Affine3A::from_mat3_translation(rotation, translation),
        }
    }

    /// Transforms a point (implicit w = 1).
    pub fn mult_point(&self, point: Vector3) -> Vector3 {
        self.affine.transform_point3(point)
    }

    /// Transforms a direction (implicit w = 0).
    pub fn mult_vector(&self, vector: Vector3) -> Vector3 {
        self.affine.transform_vector3(vector)
    }

    pub fn mult_ray(&self, ray: &Ray) -> Ray {
        Ray::new(self.mult_point(ray.origin), self.mult_vector(ray.direction))
    }

    /// Row `i` of the 3x4 matrix.
    pub fn row(&self, i: usize) -> [f32; 4] {
        let m = self.affine.matrix3;
        [
            m.x_axis[i],
            m.y_axis[i],
            m.z_axis[i],
            self.affine.translation[i],
        ]
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

/// Pinhole camera producing one primary ray per pixel subsample.
#[derive(Debug, Clone)]
pub struct Camera {
    width: u32,
    height: u32,
    tan_half_fov: f32,
    aspect_times_tan: f32,
    view_to_world: Option<Transform>,
}

impl Camera {
    /// `field_of_view` is the vertical angle in degrees.
    pub fn new(width: u32, height: u32, field_of_view: f32, view_to_world: Option<Transform>) -> Self {
        let tan_half_fov = (field_of_view.to_radians() / 2.0).tan();
        let aspect = width as f32 / height as f32;

        Camera {
            width,
            height,
            tan_half_fov,
            aspect_times_tan: aspect * tan_half_fov,
            view_to_world,
        }
    }

    pub fn look_at(width: u32, height: u32, field_of_view: f32, eye: Vector3, target: Vector3) -> Self {
        Camera::new(width, height, field_of_view, Some(Transform::look_at(eye, target)))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Point on the image plane at z = -1 in camera space.
    fn film_point(&self, x: u32, y: u32, offset: (f32, f32)) -> Vector3 {
        let (offset_x, offset_y) = offset;
        let film_x = (2.0 * (x as f32 + offset_x) / self.width as f32 - 1.0) * self.aspect_times_tan;
        let film_y = (1.0 - 2.0 * (y as f32 + offset_y) / self.height as f32) * self.tan_half_fov;
        Vector3::new(film_x, film_y, -1.0)
    }

    /// World-space ray through pixel `(x, y)` at subpixel `offset` in [0, 1)^2.
    ///
    /// The returned direction is unit length.
    pub fn primary_ray(&self, x: u32, y: u32, offset: (f32, f32)) -> Ray {
        let film_point = self.film_point(x, y, offset);

        match &self.view_to_world {
            Some(transform) => {
                let origin = transform.mult_point(Vector3::ZERO);
                let target = transform.mult_point(film_point);
                Ray::new(origin, normalize(target - origin))
            }
            None => Ray::new(Vector3::ZERO, normalize(film_point)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_down_negative_z_is_identity() {
        let transform = Transform::look_at(Vector3::ZERO, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(transform.row(0), [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(transform.row(1), [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(transform.row(2), [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn rows_hold_basis_and_translation() {
        let eye = Vector3::new(1.0, 2.0, 3.0);
        let transform = Transform::look_at(eye, Vector3::new(1.0, 2.0, 0.0));
        // looking down -Z from a shifted eye keeps the basis axis-aligned
        let rows = [transform.row(0), transform.row(1), transform.row(2)];
        assert_eq!(&rows[0][..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&rows[1][..3], &[0.0, 1.0, 0.0]);
        assert_eq!(&rows[2][..3], &[0.0, 0.0, 1.0]);
        assert_eq!(rows[0][3], -1.0);
        assert_eq!(rows[1][3], -2.0);
        assert_eq!(rows[2][3], 3.0);
    }

    #[test]
    fn points_translate_and_vectors_do_not() {
        let transform = Transform::look_at(Vector3::new(1.0, 2.0, 3.0), Vector3::new(1.0, 2.0, 0.0));
        let v = Vector3::new(0.5, -0.5, 2.0);
        assert!(transform.mult_vector(v).abs_diff_eq(v, 1e-6));
        assert!(transform
            .mult_point(v)
            .abs_diff_eq(v + Vector3::new(-1.0, -2.0, 3.0), 1e-6));

        let ray = transform.mult_ray(&Ray::new(Vector3::ZERO, Vector3::Z));
        assert!(ray.origin.abs_diff_eq(Vector3::new(-1.0, -2.0, 3.0), 1e-6));
        assert!(ray.direction.abs_diff_eq(Vector3::Z, 1e-6));
    }

    #[test]
    fn basis_is_orthonormal() {
        let transform = Transform::look_at(Vector3::new(0.0, 1.0, 4.0), Vector3::new(2.0, -1.0, -3.0));
        let rows: Vec<Vector3> = (0..3)
            .map(|i| {
                let r = transform.row(i);
                Vector3::new(r[0], r[1], r[2])
            })
            .collect();
        for (i, a) in rows.iter().enumerate() {
            assert!((a.length() - 1.0).abs() < 1e-5);
            for b in rows.iter().skip(i + 1) {
                assert!(a.dot(*b).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn center_ray_looks_straight_ahead() {
        let camera = Camera::new(1280, 720, 90.0, None);
        let ray = camera.primary_ray(640, 360, (0.0, 0.0));
        assert_eq!(ray.origin, Vector3::ZERO);
        assert!(ray.direction.abs_diff_eq(Vector3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn corner_rays_span_field_of_view() {
        let camera = Camera::new(200, 200, 90.0, None);
        let top_left = camera.primary_ray(0, 0, (0.0, 0.0));
        // 90 degrees with a square image puts the corner at (-1, 1, -1)
        let expected = normalize(Vector3::new(-1.0, 1.0, -1.0));
        assert!(top_left.direction.abs_diff_eq(expected, 1e-5));
    }

    #[test]
    fn identity_transform_matches_untransformed_camera() {
        let plain = Camera::new(64, 48, 60.0, None);
        let transformed = Camera::look_at(64, 48, 60.0, Vector3::ZERO, Vector3::new(0.0, 0.0, -5.0));
        for (x, y) in [(0, 0), (10, 20), (63, 47)] {
            let a = plain.primary_ray(x, y, (0.5, 0.5));
            let b = transformed.primary_ray(x, y, (0.5, 0.5));
            assert!(a.direction.abs_diff_eq(b.direction, 1e-5));
            assert!(b.origin.abs_diff_eq(Vector3::ZERO, 1e-6));
        }
    }

    #[test]
    fn directions_are_unit_length() {
        let camera = Camera::look_at(32, 16, 75.0, Vector3::new(0.0, 1.0, 2.0), Vector3::new(0.5, 0.0, -1.0));
        for y in 0..16 {
            for x in 0..32 {
                let ray = camera.primary_ray(x, y, (0.2, 0.6));
                assert!((ray.direction.length() - 1.0).abs() < 1e-5);
            }
        }
    }
}
