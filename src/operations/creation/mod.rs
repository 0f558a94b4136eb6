mod make_indexed_mesh;

pub use make_indexed_mesh::{IndexedFace, MakeIndexedMesh};
