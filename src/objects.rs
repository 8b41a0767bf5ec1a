use crate::{color::Color, vector::Vector3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

/// Analytic sphere with a constant diffuse albedo.
#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    center: Vector3,
    radius: f32,
    albedo: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vector3,
    pub color: Color,
}

/// Closest intersection found by a scene query.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub distance: f32,
    pub sphere: &'a Sphere,
}

impl Ray {
    /// The direction is stored as given; callers normalize where they need to.
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Ray { origin, direction }
    }

    pub fn at(&self, distance: f32) -> Vector3 {
        self.origin + distance * self.direction
    }
}

impl Sphere {
    /// Radius must be positive; scene loading rejects anything else.
    pub fn new(center: Vector3, radius: f32, albedo: Color) -> Self {
        debug_assert!(radius > 0.0, "sphere radius must be positive");
        Sphere {
            center,
            radius,
            albedo,
        }
    }

    pub fn center(&self) -> Vector3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    /// Smallest non-negative ray parameter where the ray meets the surface.
    ///
    /// A root of exactly zero is returned; the scene query is the one that
    /// discards it to avoid hitting the surface a ray starts on.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let l = ray.origin - self.center;
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * ray.direction.dot(l);
        let c = l.dot(l) - self.radius * self.radius;
        nearest_root(a, b, c)
    }

    /// Outward unit normal at a point on the surface.
    pub fn normal_at(&self, point: Vector3) -> Vector3 {
        crate::vector::normalize(point - self.center)
    }
}

impl PointLight {
    pub fn new(position: Vector3, color: Color) -> Self {
        PointLight { position, color }
    }
}

/// Solves `a*x^2 + b*x + c = 0` for its smallest non-negative root.
fn nearest_root(a: f32, b: f32, c: f32) -> Option<f32> {
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    if discriminant == 0.0 {
        let root = -0.5 * b / a;
        return (root >= 0.0).then_some(root);
    }

    // Same root pair as q = -0.5 * (b - sign(b) * sqrt): with the sign of b
    // added instead, b and the square root never cancel.
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let x0 = q / a;
    let x1 = c / q;
    let (near, far) = if x0 < x1 { (x0, x1) } else { (x1, x0) };

    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        Some(far)
    } else {
        None
    }
}
