//! Application-level error type shared by the binary's commands.

use bda_mcp_server::{ServerError, ToolRegistryError, TransportError};
use thiserror::Error;

use crate::config;
use crate::services::AutomationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    ConfigLoad(#[from] config::AppConfigError),
    #[error(transparent)]
    Automation(#[from] AutomationError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Registry(#[from] ToolRegistryError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
