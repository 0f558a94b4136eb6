mod generate;

pub use generate::{GenerateSeams, BORDER_SEAM_NAME};
