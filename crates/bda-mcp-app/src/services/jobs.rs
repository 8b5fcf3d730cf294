use std::fmt;

use async_trait::async_trait;
use aws_sdk_bedrockdataautomationruntime::types::{
    AutomationJobStatus, DataAutomationConfiguration, InputConfiguration, OutputConfiguration,
};

use crate::services::blob_store::S3Uri;
use crate::services::context::{AutomationError, AutomationResult, present};

const INVOKE_OPERATION: &str = "InvokeDataAutomationAsync";
const STATUS_OPERATION: &str = "GetDataAutomationStatus";

/// Provider-side lifecycle of an async invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    InProgress,
    Success,
    ServiceError,
    ClientError,
    /// Anything the provider reports that this client does not recognise.
    Other(String),
}

impl JobStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, JobStatus::InProgress)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Success)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Created => f.write_str("Created"),
            JobStatus::InProgress => f.write_str("InProgress"),
            JobStatus::Success => f.write_str("Success"),
            JobStatus::ServiceError => f.write_str("ServiceError"),
            JobStatus::ClientError => f.write_str("ClientError"),
            JobStatus::Other(raw) => write!(f, "Other({raw})"),
        }
    }
}

impl From<&AutomationJobStatus> for JobStatus {
    fn from(status: &AutomationJobStatus) -> Self {
        match status {
            AutomationJobStatus::Created => JobStatus::Created,
            AutomationJobStatus::InProgress => JobStatus::InProgress,
            AutomationJobStatus::Success => JobStatus::Success,
            AutomationJobStatus::ServiceError => JobStatus::ServiceError,
            AutomationJobStatus::ClientError => JobStatus::ClientError,
            other => JobStatus::Other(other.as_str().to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobRequest {
    pub input_uri: S3Uri,
    pub output_uri: S3Uri,
    pub project_arn: String,
    pub profile_arn: String,
}

#[derive(Debug, Clone)]
pub struct SubmittedJob {
    pub invocation_arn: String,
}

#[derive(Debug, Clone)]
pub struct JobStatusReport {
    pub status: JobStatus,
    /// Location of the job-metadata document, when the provider reported one.
    pub output_uri: Option<String>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn submit_job(&self, request: &JobRequest) -> AutomationResult<SubmittedJob>;

    async fn job_status(&self, invocation_arn: &str) -> AutomationResult<JobStatusReport>;
}

/// `JobRunner` backed by the Bedrock Data Automation runtime API.
#[derive(Debug, Clone)]
pub struct BedrockJobRunner {
    client: aws_sdk_bedrockdataautomationruntime::Client,
}

impl BedrockJobRunner {
    pub fn new(client: aws_sdk_bedrockdataautomationruntime::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRunner for BedrockJobRunner {
    async fn submit_job(&self, request: &JobRequest) -> AutomationResult<SubmittedJob> {
        debug_assert!(!request.project_arn.is_empty());
        debug_assert!(!request.profile_arn.is_empty());

        let input = InputConfiguration::builder()
            .s3_uri(request.input_uri.to_string())
            .build()
            .map_err(|err| AutomationError::request(INVOKE_OPERATION, err))?;
        let output = OutputConfiguration::builder()
            .s3_uri(request.output_uri.to_string())
            .build()
            .map_err(|err| AutomationError::request(INVOKE_OPERATION, err))?;
        let project = DataAutomationConfiguration::builder()
            .data_automation_project_arn(&request.project_arn)
            .build()
            .map_err(|err| AutomationError::request(INVOKE_OPERATION, err))?;

        let response = self
            .client
            .invoke_data_automation_async()
            .input_configuration(input)
            .output_configuration(output)
            .data_automation_configuration(project)
            .data_automation_profile_arn(&request.profile_arn)
            .send()
            .await
            .map_err(|err| AutomationError::service(INVOKE_OPERATION, &err))?;

        let invocation_arn = present::<String>(response.invocation_arn)
            .filter(|arn| !arn.is_empty())
            .ok_or_else(|| {
                AutomationError::message("job submission returned no invocation ARN")
            })?;
        Ok(SubmittedJob { invocation_arn })
    }

    async fn job_status(&self, invocation_arn: &str) -> AutomationResult<JobStatusReport> {
        debug_assert!(!invocation_arn.is_empty());

        let response = self
            .client
            .get_data_automation_status()
            .invocation_arn(invocation_arn)
            .send()
            .await
            .map_err(|err| AutomationError::service(STATUS_OPERATION, &err))?;

        let status = present::<AutomationJobStatus>(response.status)
            .map(|status| JobStatus::from(&status))
            .unwrap_or_else(|| JobStatus::Other("UNREPORTED".to_string()));
        let output_uri = present::<OutputConfiguration>(response.output_configuration)
            .and_then(|config| present::<String>(config.s3_uri))
            .filter(|uri| !uri.is_empty());

        Ok(JobStatusReport {
            status,
            output_uri,
            error_type: present::<String>(response.error_type),
            error_message: present::<String>(response.error_message),
        })
    }
}
