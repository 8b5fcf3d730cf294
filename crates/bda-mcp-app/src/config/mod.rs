//! Configuration loading and XDG path helpers.

use std::{env, fmt, path::PathBuf};

use bda_mcp_server::ServerConfig;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    DEFAULT_ASSET_PREFIX, DEFAULT_OUTPUT_PREFIX, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PROFILE_ID,
    DEFAULT_REGION, profile_arn, public_default_project_arn,
};

const CONFIG_FILE: &str = "config/settings";
const SETTINGS_FILE_NAME: &str = "settings.toml";
pub const CONFIG_FILE_ENV: &str = "BDA_MCP_CONFIG_FILE";
pub const ENV_PREFIX: &str = "BDA_MCP";

/// Plain AWS variables honoured for compatibility with existing client setups.
const WELL_KNOWN_AWS_VARS: &[(&str, &str)] = &[
    ("AWS_REGION", "aws.region"),
    ("AWS_ACCESS_KEY_ID", "aws.access_key_id"),
    ("AWS_SECRET_ACCESS_KEY", "aws.secret_access_key"),
    ("AWS_SESSION_TOKEN", "aws.session_token"),
    ("AWS_ACCOUNT_ID", "aws.account_id"),
    ("AWS_BUCKET_NAME", "aws.bucket"),
];

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error(transparent)]
    Build(#[from] config::ConfigError),
    #[error("missing required setting `{key}` (set {env})")]
    Missing {
        key: &'static str,
        env: &'static str,
    },
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub aws: AwsConfig,
    pub automation: AutomationConfig,
}

#[derive(Deserialize, Clone, Default)]
pub struct AwsConfig {
    pub region: String,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    /// Override for S3-compatible endpoints (MinIO, LocalStack).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
}

impl fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("AwsConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redacted(&self.secret_access_key))
            .field("session_token", &redacted(&self.session_token))
            .field("account_id", &self.account_id)
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

/// Static credentials resolved from configuration.
#[derive(Clone)]
pub struct StaticCredentials<'a> {
    pub access_key_id: &'a str,
    pub secret_access_key: &'a str,
    pub session_token: Option<&'a str>,
}

impl AwsConfig {
    pub fn account_id(&self) -> Result<&str, AppConfigError> {
        non_empty(&self.account_id).ok_or(AppConfigError::Missing {
            key: "aws.account_id",
            env: "AWS_ACCOUNT_ID",
        })
    }

    pub fn bucket(&self) -> Result<&str, AppConfigError> {
        non_empty(&self.bucket).ok_or(AppConfigError::Missing {
            key: "aws.bucket",
            env: "AWS_BUCKET_NAME",
        })
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        non_empty(&self.endpoint_url)
    }

    /// `None` means "use the default AWS credential chain".
    pub fn static_credentials(&self) -> Result<Option<StaticCredentials<'_>>, AppConfigError> {
        match (
            non_empty(&self.access_key_id),
            non_empty(&self.secret_access_key),
        ) {
            (Some(access_key_id), Some(secret_access_key)) => Ok(Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: non_empty(&self.session_token),
            })),
            (None, None) => Ok(None),
            (Some(_), None) => Err(AppConfigError::Missing {
                key: "aws.secret_access_key",
                env: "AWS_SECRET_ACCESS_KEY",
            }),
            (None, Some(_)) => Err(AppConfigError::Missing {
                key: "aws.access_key_id",
                env: "AWS_ACCESS_KEY_ID",
            }),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AutomationConfig {
    pub asset_prefix: String,
    pub output_prefix: String,
    pub poll_interval_ms: u64,
    pub profile_id: String,
    #[serde(default)]
    pub default_project_arn: Option<String>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            profile_id: DEFAULT_PROFILE_ID.to_string(),
            default_project_arn: None,
        }
    }
}

impl AppConfig {
    /// Check everything the AWS clients need before any of them is built.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.aws.region.trim().is_empty() {
            return Err(AppConfigError::Missing {
                key: "aws.region",
                env: "AWS_REGION",
            });
        }
        self.aws.account_id()?;
        self.aws.bucket()?;
        self.aws.static_credentials()?;

        if self.automation.poll_interval_ms == 0 {
            return Err(AppConfigError::Invalid {
                key: "automation.poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        validate_prefix("automation.asset_prefix", &self.automation.asset_prefix)?;
        validate_prefix("automation.output_prefix", &self.automation.output_prefix)?;
        if self.automation.output_prefix.is_empty() {
            return Err(AppConfigError::Invalid {
                key: "automation.output_prefix",
                reason: "may not be empty".to_string(),
            });
        }
        if self.automation.profile_id.trim().is_empty() {
            return Err(AppConfigError::Invalid {
                key: "automation.profile_id",
                reason: "may not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn profile_arn(&self) -> Result<String, AppConfigError> {
        Ok(profile_arn(
            &self.aws.region,
            self.aws.account_id()?,
            &self.automation.profile_id,
        ))
    }

    pub fn default_project_arn(&self) -> String {
        non_empty(&self.automation.default_project_arn)
            .map(str::to_string)
            .unwrap_or_else(|| public_default_project_arn(&self.aws.region))
    }
}

pub fn load() -> Result<AppConfig, AppConfigError> {
    let mut builder = Config::builder()
        .set_default("server.transport", "stdio")?
        .set_default("server.listen_addr", ServerConfig::DEFAULT_LISTEN_ADDR)?
        .set_default("aws.region", DEFAULT_REGION)?
        .set_default("aws.force_path_style", false)?
        .set_default("automation.asset_prefix", DEFAULT_ASSET_PREFIX)?
        .set_default("automation.output_prefix", DEFAULT_OUTPUT_PREFIX)?
        .set_default(
            "automation.poll_interval_ms",
            i64::try_from(DEFAULT_POLL_INTERVAL_MS).unwrap_or(i64::MAX),
        )?
        .set_default("automation.profile_id", DEFAULT_PROFILE_ID)?;

    if let Some(dirs) = project_dirs() {
        builder = builder
            .add_source(File::from(dirs.config_dir().join(SETTINGS_FILE_NAME)).required(false));
    }
    builder = builder.add_source(File::with_name(CONFIG_FILE).required(false));
    if let Some(path) = env::var_os(CONFIG_FILE_ENV).filter(|path| !path.is_empty()) {
        builder = builder.add_source(File::from(PathBuf::from(path)).required(true));
    }

    let cfg = builder
        .add_source(well_known_aws_env()?)
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()?;
    Ok(cfg)
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "bda-mcp", "bda-mcp")
}

fn well_known_aws_env() -> Result<Config, AppConfigError> {
    let mut builder = Config::builder();
    for (var, key) in WELL_KNOWN_AWS_VARS {
        let value = env::var(var).ok().filter(|value| !value.is_empty());
        builder = builder.set_override_option(*key, value)?;
    }
    Ok(builder.build()?)
}

fn validate_prefix(key: &'static str, prefix: &str) -> Result<(), AppConfigError> {
    if prefix.starts_with('/') || prefix.ends_with('/') {
        return Err(AppConfigError::Invalid {
            key,
            reason: format!("`{prefix}` may not start or end with `/`"),
        });
    }
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            aws: AwsConfig {
                region: "eu-west-1".to_string(),
                account_id: Some("123456789012".to_string()),
                bucket: Some("assets".to_string()),
                ..AwsConfig::default()
            },
            automation: AutomationConfig::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        valid().validate().expect("valid config");
    }

    #[test]
    fn missing_bucket_names_the_env_var() {
        let mut cfg = valid();
        cfg.aws.bucket = Some("  ".to_string());
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            AppConfigError::Missing {
                key: "aws.bucket",
                env: "AWS_BUCKET_NAME"
            }
        ));
    }

    #[test]
    fn missing_account_id_is_rejected() {
        let mut cfg = valid();
        cfg.aws.account_id = None;
        assert!(matches!(
            cfg.validate(),
            Err(AppConfigError::Missing {
                key: "aws.account_id",
                ..
            })
        ));
    }

    #[test]
    fn half_a_credential_pair_is_rejected() {
        let mut cfg = valid();
        cfg.aws.access_key_id = Some("AKIA".to_string());
        assert!(matches!(
            cfg.validate(),
            Err(AppConfigError::Missing {
                key: "aws.secret_access_key",
                ..
            })
        ));

        cfg.aws.secret_access_key = Some("secret".to_string());
        let creds = cfg.aws.static_credentials().unwrap().unwrap();
        assert_eq!(creds.access_key_id, "AKIA");
        assert!(creds.session_token.is_none());
    }

    #[test]
    fn no_credentials_falls_back_to_default_chain() {
        assert!(valid().aws.static_credentials().unwrap().is_none());
    }

    #[test]
    fn zero_poll_interval_is_invalid() {
        let mut cfg = valid();
        cfg.automation.poll_interval_ms = 0;
        assert!(matches!(
            cfg.validate(),
            Err(AppConfigError::Invalid {
                key: "automation.poll_interval_ms",
                ..
            })
        ));
    }

    #[test]
    fn slash_delimited_prefix_is_invalid() {
        let mut cfg = valid();
        cfg.automation.output_prefix = "/mcp/out/".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(AppConfigError::Invalid {
                key: "automation.output_prefix",
                ..
            })
        ));
    }

    #[test]
    fn derived_arns_use_region_and_account() {
        let cfg = valid();
        assert_eq!(
            cfg.profile_arn().unwrap(),
            "arn:aws:bedrock:eu-west-1:123456789012:data-automation-profile/us.data-automation-v1"
        );
        assert_eq!(
            cfg.default_project_arn(),
            "arn:aws:bedrock:eu-west-1:aws:data-automation-project/public-default"
        );
    }

    #[test]
    fn configured_default_project_wins() {
        let mut cfg = valid();
        cfg.automation.default_project_arn = Some("arn:custom".to_string());
        assert_eq!(cfg.default_project_arn(), "arn:custom");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut cfg = valid();
        cfg.aws.secret_access_key = Some("hunter2".to_string());
        let rendered = format!("{:?}", cfg.aws);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
