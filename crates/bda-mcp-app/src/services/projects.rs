use std::collections::BTreeMap;

use async_trait::async_trait;
use aws_sdk_bedrockdataautomation::primitives::{DateTime, DateTimeFormat};
use aws_sdk_bedrockdataautomation::types::{
    DataAutomationProject, DataAutomationProjectStage, DataAutomationProjectStatus,
    DataAutomationProjectSummary, DataAutomationProjectType,
};
use serde::Serialize;

use crate::services::context::{AutomationError, AutomationResult, present};
use crate::services::project_config::{CustomOutput, Libraries, Overrides, StandardOutput};

const LIST_OPERATION: &str = "ListDataAutomationProjects";
const GET_OPERATION: &str = "GetDataAutomationProject";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub project_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
}

/// Full project description, including its output, override, library and
/// encryption settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    pub project_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_output_configuration: Option<StandardOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_output_configuration: Option<CustomOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_configuration: Option<Overrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_automation_library_configuration: Option<Libraries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_encryption_context: Option<BTreeMap<String, String>>,
}

/// Read-only access to Data Automation projects.
#[async_trait]
pub trait ProjectCatalog: Send + Sync {
    /// Every project visible to the caller, following pagination to the end.
    async fn list_projects(&self) -> AutomationResult<Vec<ProjectSummary>>;

    async fn get_project(&self, project_arn: &str) -> AutomationResult<ProjectDetails>;
}

#[derive(Debug, Clone)]
pub struct BedrockProjectCatalog {
    client: aws_sdk_bedrockdataautomation::Client,
}

impl BedrockProjectCatalog {
    pub fn new(client: aws_sdk_bedrockdataautomation::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProjectCatalog for BedrockProjectCatalog {
    async fn list_projects(&self) -> AutomationResult<Vec<ProjectSummary>> {
        let mut projects = Vec::new();
        let mut next_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let output = self
                .client
                .list_data_automation_projects()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|err| AutomationError::service(LIST_OPERATION, &err))?;
            pages += 1;

            projects.extend(output.projects().iter().map(ProjectSummary::from));
            next_token = output
                .next_token()
                .filter(|token| !token.is_empty())
                .map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        tracing::debug!(count = projects.len(), pages, "listed projects");
        Ok(projects)
    }

    async fn get_project(&self, project_arn: &str) -> AutomationResult<ProjectDetails> {
        debug_assert!(project_arn.len() < 4096);

        let output = match self
            .client
            .get_data_automation_project()
            .project_arn(project_arn)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception())
                {
                    return Err(AutomationError::ProjectNotFound {
                        arn: project_arn.to_string(),
                    });
                }
                return Err(AutomationError::service(GET_OPERATION, &err));
            }
        };

        present::<DataAutomationProject>(output.project)
            .map(|project| ProjectDetails::from(&project))
            .ok_or_else(|| AutomationError::ProjectNotFound {
                arn: project_arn.to_string(),
            })
    }
}

impl From<&DataAutomationProjectSummary> for ProjectSummary {
    fn from(summary: &DataAutomationProjectSummary) -> Self {
        Self {
            project_arn: present::<String>(summary.project_arn.clone()).unwrap_or_default(),
            project_name: present::<String>(summary.project_name.clone()),
            project_stage: present::<DataAutomationProjectStage>(summary.project_stage.clone())
                .map(|stage| stage.as_str().to_string()),
            project_type: present::<DataAutomationProjectType>(summary.project_type.clone())
                .map(|kind| kind.as_str().to_string()),
            creation_time: present::<DateTime>(summary.creation_time).and_then(format_time),
        }
    }
}

impl From<&DataAutomationProject> for ProjectDetails {
    fn from(project: &DataAutomationProject) -> Self {
        Self {
            project_arn: present::<String>(project.project_arn.clone()).unwrap_or_default(),
            creation_time: present::<DateTime>(project.creation_time).and_then(format_time),
            last_modified_time: present::<DateTime>(project.last_modified_time)
                .and_then(format_time),
            project_name: present::<String>(project.project_name.clone()),
            project_stage: present::<DataAutomationProjectStage>(project.project_stage.clone())
                .map(|stage| stage.as_str().to_string()),
            project_type: present::<DataAutomationProjectType>(project.project_type.clone())
                .map(|kind| kind.as_str().to_string()),
            project_description: present::<String>(project.project_description.clone()),
            standard_output_configuration: project
                .standard_output_configuration
                .as_ref()
                .map(StandardOutput::from),
            custom_output_configuration: project
                .custom_output_configuration
                .as_ref()
                .map(CustomOutput::from),
            override_configuration: project.override_configuration.as_ref().map(Overrides::from),
            data_automation_library_configuration: project
                .data_automation_library_configuration
                .as_ref()
                .map(Libraries::from),
            status: present::<DataAutomationProjectStatus>(project.status.clone())
                .map(|status| status.as_str().to_string()),
            kms_key_id: project.kms_key_id.clone(),
            kms_encryption_context: project
                .kms_encryption_context
                .as_ref()
                .map(|context| context.clone().into_iter().collect()),
        }
    }
}

fn format_time(time: DateTime) -> Option<String> {
    time.fmt(DateTimeFormat::DateTime).ok()
}
