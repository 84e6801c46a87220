pub mod engine;
pub mod maven;
pub mod util;
