use glam::Vec3;

/// Points and directions in world or camera space.
pub type Vector3 = Vec3;

/// World up axis used to build camera bases.
pub const WORLD_UP: Vector3 = Vec3::Y;

/// Normalization that leaves degenerate vectors untouched.
///
/// `glam`'s own `normalize` produces NaN for a zero vector. Here the inverse
/// length has to be finite and positive before the vector is scaled.
pub trait Normalize {
    fn normalize_in_place(&mut self);
    fn normalized(self) -> Self;
}

impl Normalize for Vector3 {
    fn normalize_in_place(&mut self) {
        let inverse_length = self.length().recip();
        if inverse_length.is_finite() && inverse_length > 0.0 {
            *self *= inverse_length;
        }
    }

    fn normalized(mut self) -> Self {
        self.normalize_in_place();
        self
    }
}

/// Pure form of [`Normalize::normalize_in_place`].
pub fn normalize(v: Vector3) -> Vector3 {
    v.normalized()
}
