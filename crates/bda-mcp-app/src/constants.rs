//! Cross-cutting application constants.

/// Region used when neither `AWS_REGION` nor `aws.region` is set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Key prefix for uploaded assets inside the bucket.
pub const DEFAULT_ASSET_PREFIX: &str = "mcp";

/// Key prefix under which Data Automation writes job output.
pub const DEFAULT_OUTPUT_PREFIX: &str = "mcp/test-output";

/// Fixed delay after every job status fetch.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;

/// Data Automation profile used for cross-region inference.
pub const DEFAULT_PROFILE_ID: &str = "us.data-automation-v1";

/// Name reported in the MCP `initialize` handshake.
pub const SERVER_NAME: &str = "bda-mcp";

/// ARN of the AWS-managed public default project in `region`.
pub fn public_default_project_arn(region: &str) -> String {
    format!("arn:aws:bedrock:{region}:aws:data-automation-project/public-default")
}

/// ARN of the Data Automation profile `profile_id` owned by `account_id`.
pub fn profile_arn(region: &str, account_id: &str, profile_id: &str) -> String {
    format!("arn:aws:bedrock:{region}:{account_id}:data-automation-profile/{profile_id}")
}
