pub mod detector;
pub mod frames;
pub mod labels;
pub mod roi;
pub mod types;
