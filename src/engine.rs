pub mod artifact_resolver;
pub mod resource;
pub mod result;
