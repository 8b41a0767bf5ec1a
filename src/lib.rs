//! Ray caster for a fixed scene of spheres and point lights.
//!
//! Each pixel is sampled on a fixed subpixel pattern, every primary ray is
//! shaded with direct Lambertian lighting and one shadow ray per light, and
//! the image is split into row bands traced in parallel.

pub mod camera;
pub mod color;
pub mod framebuffer;
pub mod io;
pub mod objects;
pub mod render;
pub mod scene;
pub mod shade;
pub mod vector;
