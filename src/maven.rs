pub mod access;
pub mod coordinates;
pub mod metadata;
pub mod module_metadata;
pub mod pattern;
pub mod resolver;
