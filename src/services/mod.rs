//! Service layer for business logic
//!
//! Shared between the HTTP API and the CLI.

mod analytics_service;
mod devotional_service;
pub mod live_status;
mod payment_service;
mod user_service;

pub use analytics_service::*;
pub use devotional_service::*;
pub use live_status::{LiveStatus, LiveStatusProvider, LiveStatusService, TwitchClient};
pub use payment_service::*;
pub use user_service::*;
