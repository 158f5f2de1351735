pub mod fetch;
pub mod tracing;
