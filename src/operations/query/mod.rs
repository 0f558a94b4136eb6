mod check_mesh;
mod validate_attributes;

pub use check_mesh::CheckMesh;
pub use validate_attributes::ValidateAttributes;
