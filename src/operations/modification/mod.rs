mod remove_face;

pub use remove_face::RemoveFace;
