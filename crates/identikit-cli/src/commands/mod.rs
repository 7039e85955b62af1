pub mod config;
pub mod identify;

pub use identify::{identify_gallery, identify_scene};
