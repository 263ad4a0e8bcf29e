pub mod constants;
pub mod jwt;
pub mod middleware;
pub mod services;

pub use services::{configure_routes, extractor_configs};
