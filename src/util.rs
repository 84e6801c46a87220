pub mod blob;
pub mod diagnostics;
pub mod http_accessor;
pub mod in_memory;
pub mod validating_http_body;
