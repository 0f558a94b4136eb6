mod flip;
mod general;

pub use flip::FlipOrientation;
pub use general::Transform;
