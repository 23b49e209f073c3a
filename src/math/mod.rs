mod aabb;
mod color;
mod ray;

pub use aabb::AABB;
pub use color::{parse_hex_color, srgb_to_linear};
pub use ray::Ray;
