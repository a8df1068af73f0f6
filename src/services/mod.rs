// Core Admin Services
// Business logic layer

pub mod api_client;
mod credential_store;
mod dashboard;
mod descriptor_builder;
mod encryption;
mod events;
mod log_manager;
mod platform_registry;
mod process_filter;
mod settings_manager;
mod wizard;

pub use api_client::{ApiError, ApiResult, CoreClient, FileInfo, LoginResponse, RestreamResult, Session};
pub use credential_store::*;
pub use dashboard::*;
pub use descriptor_builder::*;
pub use encryption::*;
pub use events::*;
pub use log_manager::*;
pub use platform_registry::*;
pub use process_filter::*;
pub use settings_manager::*;
pub use wizard::*;
