// Core Admin Commands
// User-facing operations behind the command line

mod auth;
mod dashboard;
mod process;
mod stream;
mod system;

pub use auth::*;
pub use dashboard::*;
pub use process::*;
pub use stream::*;
pub use system::*;

use crate::models::ClientSettings;
use crate::services::{ApiError, CoreClient};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a command needs to run
pub struct Context {
    pub client: CoreClient,
    pub settings: ClientSettings,
    pub log_dir: PathBuf,
}

/// What a command produces for the terminal
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Json(Value),
    Text(String),
    None,
}

impl Output {
    pub fn render(&self) -> Option<String> {
        match self {
            Output::Json(value) => Some(
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
            ),
            Output::Text(text) => Some(text.clone()),
            Output::None => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Input(String),
}

impl CommandError {
    pub fn user_message(&self) -> String {
        match self {
            CommandError::Api(e) => e.user_message(),
            CommandError::Input(message) => message.clone(),
        }
    }
}

pub type CommandResult = Result<Output, CommandError>;
