pub mod bounds;
pub mod mat2;
pub mod ray;
pub mod transform;
pub mod vec2;

pub use bounds::Bounds;
pub use mat2::Mat2;
pub use ray::Ray;
pub use transform::Transform;
pub use vec2::Vec2;
