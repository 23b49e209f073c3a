pub mod clock;
pub mod easing;
pub mod timer;
pub mod triangle_intersection;

pub use clock::Clock;
pub use easing::Easing;
pub use timer::{Throttled, Tween};
pub use triangle_intersection::{moller_trumbore_intersect, Culling, TriangleIntersection};
