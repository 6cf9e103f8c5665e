pub mod classification;
pub mod core;
pub mod courses;
