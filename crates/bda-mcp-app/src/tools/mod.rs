//! MCP tools exposed by the server.
//!
//! Each tool is a thin adapter: typed arguments in, one orchestrator call, the
//! outcome serialised into a text block. Failures become `isError` envelopes
//! with an `Error: ` prefix so clients see them as tool output, not faults.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bda_mcp_server::{
    McpServer, NoArguments, ServerInfo, Tool, ToolRegistry, ToolRegistryError, ToolResult,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::constants::SERVER_NAME;
use crate::services::{AutomationContext, AutomationResult};

const INSTRUCTIONS: &str = "Tools for Amazon Bedrock Data Automation. Use list-projects to \
discover projects, get-project-details to inspect one, and analyze-asset to extract insights \
from a local document, image, video or audio file.";

pub struct ListProjects {
    ctx: Arc<AutomationContext>,
}

#[async_trait]
impl Tool for ListProjects {
    type Args = NoArguments;
    const NAME: &'static str = "list-projects";
    const DESCRIPTION: &'static str = "Get a list of data automation projects";

    async fn call(&self, _args: NoArguments) -> ToolResult {
        render(Self::NAME, self.ctx.list_projects().await)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetProjectDetailsArgs {
    /// The ARN of the project
    pub project_arn: String,
}

pub struct GetProjectDetails {
    ctx: Arc<AutomationContext>,
}

#[async_trait]
impl Tool for GetProjectDetails {
    type Args = GetProjectDetailsArgs;
    const NAME: &'static str = "get-project-details";
    const DESCRIPTION: &'static str = "Get details of a data automation project";

    async fn call(&self, args: GetProjectDetailsArgs) -> ToolResult {
        render(Self::NAME, self.ctx.get_project(&args.project_arn).await)
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeAssetArgs {
    /// The path to the asset
    pub asset_path: String,
    /// The ARN of the project. Uses default public project if not provided
    #[serde(default)]
    pub project_arn: Option<String>,
}

pub struct AnalyzeAsset {
    ctx: Arc<AutomationContext>,
}

#[async_trait]
impl Tool for AnalyzeAsset {
    type Args = AnalyzeAssetArgs;
    const NAME: &'static str = "analyze-asset";
    const DESCRIPTION: &'static str = "Extracts insights from unstructured content (documents, \
images, video, audio) using a data automation project";

    async fn call(&self, args: AnalyzeAssetArgs) -> ToolResult {
        let path = PathBuf::from(args.asset_path);
        render(
            Self::NAME,
            self.ctx.analyze(&path, args.project_arn.as_deref()).await,
        )
    }
}

fn render<T: Serialize>(tool: &'static str, outcome: AutomationResult<T>) -> ToolResult {
    let value = match outcome {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(tool, error = %err, "tool call failed");
            return ToolResult::error(format!("Error: {err}"));
        }
    };
    ToolResult::json(&value).unwrap_or_else(|err| ToolResult::error(format!("Error: {err}")))
}

pub fn register_tools(
    registry: &mut ToolRegistry,
    ctx: Arc<AutomationContext>,
) -> Result<(), ToolRegistryError> {
    registry
        .register(ListProjects { ctx: ctx.clone() })?
        .register(GetProjectDetails { ctx: ctx.clone() })?
        .register(AnalyzeAsset { ctx })?;
    Ok(())
}

/// MCP server with every tool registered against `ctx`.
pub fn build_mcp_server(ctx: Arc<AutomationContext>) -> Result<McpServer, ToolRegistryError> {
    let mut registry = ToolRegistry::new();
    register_tools(&mut registry, ctx)?;
    Ok(
        McpServer::new(ServerInfo::new(SERVER_NAME, env!("CARGO_PKG_VERSION")), registry)
            .with_instructions(INSTRUCTIONS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::blob_store::tests::InMem;
    use crate::services::{
        AutomationError, AutomationSettings, JobRequest, JobRunner, JobStatus, JobStatusReport,
        ProjectCatalog, ProjectDetails, ProjectSummary, S3Uri, StorageBridge, SubmittedJob,
    };
    use serde_json::{Value, json};
    use std::time::Duration;

    struct FixedProjects;

    #[async_trait]
    impl ProjectCatalog for FixedProjects {
        async fn list_projects(&self) -> AutomationResult<Vec<ProjectSummary>> {
            Ok(vec![ProjectSummary {
                project_arn: "arn:p1".to_string(),
                project_name: Some("invoices".to_string()),
                project_stage: Some("LIVE".to_string()),
                ..ProjectSummary::default()
            }])
        }

        async fn get_project(&self, project_arn: &str) -> AutomationResult<ProjectDetails> {
            Err(AutomationError::ProjectNotFound {
                arn: project_arn.to_string(),
            })
        }
    }

    struct RejectingRunner;

    #[async_trait]
    impl JobRunner for RejectingRunner {
        async fn submit_job(&self, _request: &JobRequest) -> AutomationResult<SubmittedJob> {
            Err(AutomationError::Service {
                operation: "InvokeDataAutomationAsync",
                message: "AccessDeniedException".to_string(),
            })
        }

        async fn job_status(&self, _invocation_arn: &str) -> AutomationResult<JobStatusReport> {
            Ok(JobStatusReport {
                status: JobStatus::ClientError,
                output_uri: None,
                error_type: None,
                error_message: None,
            })
        }
    }

    fn server() -> McpServer {
        let ctx = AutomationContext {
            storage: StorageBridge::builder()
                .store(Arc::new(InMem::default()))
                .bucket("assets")
                .build(),
            projects: Arc::new(FixedProjects),
            jobs: Arc::new(RejectingRunner),
            settings: AutomationSettings::builder()
                .default_project_arn("arn:default")
                .profile_arn("arn:profile")
                .output_uri(S3Uri::parse("s3://assets/mcp/test-output").unwrap())
                .poll_interval(Duration::from_millis(10))
                .build(),
        };
        build_mcp_server(Arc::new(ctx)).unwrap()
    }

    async fn call(name: &str, arguments: Value) -> ToolResult {
        server()
            .tools()
            .call(name, Some(arguments))
            .await
            .expect("tool exists and arguments are valid")
    }

    #[test]
    fn registers_three_tools_in_order() {
        let names: Vec<String> = server()
            .tools()
            .definitions()
            .into_iter()
            .map(|def| def.name)
            .collect();
        assert_eq!(names, ["list-projects", "get-project-details", "analyze-asset"]);
    }

    #[test]
    fn analyze_schema_requires_only_asset_path() {
        let defs = server().tools().definitions();
        let analyze = defs.iter().find(|def| def.name == "analyze-asset").unwrap();
        assert_eq!(analyze.input_schema["required"], json!(["assetPath"]));
        assert!(analyze.input_schema["properties"]["projectArn"].is_object());
    }

    #[tokio::test]
    async fn list_projects_returns_json_text() {
        let result = call("list-projects", json!({})).await;
        assert!(!result.is_error());
        let payload: Value = serde_json::from_str(result.first_text().unwrap()).unwrap();
        assert_eq!(
            payload,
            json!([{ "projectArn": "arn:p1", "projectName": "invoices", "projectStage": "LIVE" }])
        );
    }

    #[tokio::test]
    async fn get_project_details_failure_is_error_envelope() {
        let result = call("get-project-details", json!({ "projectArn": "arn:missing" })).await;
        assert!(result.is_error());
        assert_eq!(result.first_text(), Some("Error: project arn:missing not found"));
    }

    #[tokio::test]
    async fn analyze_asset_missing_file_is_error_envelope() {
        let result = call("analyze-asset", json!({ "assetPath": "/no/such/file.pdf" })).await;
        assert!(result.is_error());
        let text = result.first_text().unwrap();
        assert!(text.starts_with("Error: failed to read asset"), "{text}");
    }

    #[tokio::test]
    async fn analyze_asset_submission_failure_is_error_envelope() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"jpeg").unwrap();

        let result = call(
            "analyze-asset",
            json!({ "assetPath": path.to_string_lossy(), "projectArn": "arn:custom" }),
        )
        .await;

        assert!(result.is_error());
        assert_eq!(
            result.first_text(),
            Some("Error: InvokeDataAutomationAsync failed: AccessDeniedException")
        );
    }
}
