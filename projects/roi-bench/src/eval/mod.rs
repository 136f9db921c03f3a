pub mod align;
pub mod annotations;
pub mod compression;
pub mod scorer;
