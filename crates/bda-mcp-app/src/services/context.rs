use std::{sync::Arc, time::Duration};

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_bedrockdataautomation::error::DisplayErrorContext;
use aws_sdk_s3::config::{Credentials, Region};
use thiserror::Error;

use crate::config::{AppConfig, AppConfigError};
use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::services::blob_store::{S3ObjectStore, S3Uri, StorageBridge, StorageError};
use crate::services::jobs::{BedrockJobRunner, JobRunner};
use crate::services::projects::{BedrockProjectCatalog, ProjectCatalog};

const CREDENTIALS_PROVIDER_NAME: &str = "bda-mcp-config";

/// Everything a tool invocation needs: built once at startup, shared behind `Arc`.
pub struct AutomationContext {
    pub storage: StorageBridge,
    pub projects: Arc<dyn ProjectCatalog>,
    pub jobs: Arc<dyn JobRunner>,
    pub settings: AutomationSettings,
}

#[derive(Debug, Clone, bon::Builder)]
pub struct AutomationSettings {
    #[builder(into)]
    pub default_project_arn: String,
    #[builder(into)]
    pub profile_arn: String,
    /// Prefix handed to Data Automation as the job output location.
    pub output_uri: S3Uri,
    #[builder(default = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS))]
    pub poll_interval: Duration,
}

impl AutomationSettings {
    pub fn from_config(config: &AppConfig) -> AutomationResult<Self> {
        let output_uri = S3Uri::new(
            config.aws.bucket()?,
            config.automation.output_prefix.as_str(),
        )?;
        Ok(Self::builder()
            .default_project_arn(config.default_project_arn())
            .profile_arn(config.profile_arn()?)
            .output_uri(output_uri)
            .poll_interval(Duration::from_millis(config.automation.poll_interval_ms))
            .build())
    }
}

pub type AutomationResult<T> = Result<T, AutomationError>;

#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Config(#[from] AppConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("project {arn} not found")]
    ProjectNotFound { arn: String },
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },
    #[error("invalid {operation} request: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },
}

impl AutomationError {
    pub fn message(msg: impl Into<String>) -> Self {
        AutomationError::Message(msg.into())
    }

    /// Render an SDK failure with its full source chain.
    pub(crate) fn service<E: std::error::Error>(operation: &'static str, err: E) -> Self {
        AutomationError::Service {
            operation,
            message: DisplayErrorContext(err).to_string(),
        }
    }

    pub(crate) fn request(operation: &'static str, err: impl std::fmt::Display) -> Self {
        AutomationError::Request {
            operation,
            message: err.to_string(),
        }
    }
}

/// The SDK models some members as required and others as optional depending on
/// the service version; normalise both shapes to `Option`.
pub(crate) fn present<T>(value: impl Into<Option<T>>) -> Option<T> {
    value.into()
}

pub async fn build_automation_context(config: &AppConfig) -> AutomationResult<AutomationContext> {
    config.validate()?;

    let sdk_config = load_sdk_config(config).await?;
    let settings = AutomationSettings::from_config(config)?;

    let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
    if config.aws.force_path_style {
        s3_config = s3_config.force_path_style(true);
    }
    let s3 = aws_sdk_s3::Client::from_conf(s3_config.build());

    let storage = StorageBridge::builder()
        .store(Arc::new(S3ObjectStore::new(s3)))
        .bucket(config.aws.bucket()?)
        .asset_prefix(config.automation.asset_prefix.as_str())
        .build();
    let projects: Arc<dyn ProjectCatalog> = Arc::new(BedrockProjectCatalog::new(
        aws_sdk_bedrockdataautomation::Client::new(&sdk_config),
    ));
    let jobs: Arc<dyn JobRunner> = Arc::new(BedrockJobRunner::new(
        aws_sdk_bedrockdataautomationruntime::Client::new(&sdk_config),
    ));

    tracing::info!(
        region = %config.aws.region,
        bucket = %storage.bucket(),
        output = %settings.output_uri,
        default_project = %settings.default_project_arn,
        "automation context ready"
    );

    Ok(AutomationContext {
        storage,
        projects,
        jobs,
        settings,
    })
}

async fn load_sdk_config(config: &AppConfig) -> AutomationResult<SdkConfig> {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws.region.trim().to_string()));

    if let Some(creds) = config.aws.static_credentials()? {
        tracing::debug!("using static credentials from configuration");
        loader = loader.credentials_provider(Credentials::new(
            creds.access_key_id,
            creds.secret_access_key,
            creds.session_token.map(str::to_string),
            None,
            CREDENTIALS_PROVIDER_NAME,
        ));
    } else {
        tracing::debug!("using default AWS credential chain");
    }
    if let Some(endpoint) = config.aws.endpoint_url() {
        loader = loader.endpoint_url(endpoint);
    }

    Ok(loader.load().await)
}
