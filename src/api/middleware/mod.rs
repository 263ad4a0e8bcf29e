pub mod auth;

pub use auth::{AdminAuth, CurrentUser, authenticate};
