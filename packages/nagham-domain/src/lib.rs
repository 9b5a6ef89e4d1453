pub mod filename;
pub mod intent;
pub mod normalize;

pub use normalize::{normalize, normalize_title};
