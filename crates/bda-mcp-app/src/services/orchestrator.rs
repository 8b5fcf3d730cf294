use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::blob_store::S3Uri;
use crate::services::context::{AutomationContext, AutomationResult};
use crate::services::jobs::{JobRequest, JobStatusReport};
use crate::services::projects::{ProjectDetails, ProjectSummary};

const STANDARD_OUTPUT_POINTER: &str = "/output_metadata/0/segment_metadata/0/standard_output_path";
const CUSTOM_OUTPUT_POINTER: &str = "/output_metadata/0/segment_metadata/0/custom_output_path";

/// Outputs of a finished job; a slot stays `null` when the job did not produce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub standard_output: Option<Value>,
    pub custom_output: Option<Value>,
}

/// Output locations named by the first segment of a job-metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub standard: Option<String>,
    pub custom: Option<String>,
}

impl OutputPaths {
    pub fn from_job_metadata(metadata: &Value) -> Self {
        let path_at = |pointer: &str| {
            metadata
                .pointer(pointer)
                .and_then(Value::as_str)
                .filter(|path| !path.is_empty())
                .map(str::to_string)
        };
        Self {
            standard: path_at(STANDARD_OUTPUT_POINTER),
            custom: path_at(CUSTOM_OUTPUT_POINTER),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_none() && self.custom.is_none()
    }
}

impl AutomationContext {
    pub async fn list_projects(&self) -> AutomationResult<Vec<ProjectSummary>> {
        self.projects.list_projects().await
    }

    pub async fn get_project(&self, project_arn: &str) -> AutomationResult<ProjectDetails> {
        self.projects.get_project(project_arn).await
    }

    /// Explicit ARN when given and non-blank, otherwise the configured default.
    pub fn resolve_project_arn(&self, project_arn: Option<&str>) -> String {
        project_arn
            .map(str::trim)
            .filter(|arn| !arn.is_empty())
            .unwrap_or(self.settings.default_project_arn.as_str())
            .to_string()
    }

    /// Upload `asset_path`, run it through a Data Automation project and collect
    /// the outputs. `Ok(None)` means the job finished without usable output.
    pub async fn analyze(
        &self,
        asset_path: &Path,
        project_arn: Option<&str>,
    ) -> AutomationResult<Option<AnalysisResult>> {
        let input_uri = self.storage.upload(asset_path).await?;
        let request = JobRequest {
            input_uri,
            output_uri: self.settings.output_uri.clone(),
            project_arn: self.resolve_project_arn(project_arn),
            profile_arn: self.settings.profile_arn.clone(),
        };

        let job = self.jobs.submit_job(&request).await?;
        tracing::info!(
            invocation_arn = %job.invocation_arn,
            project_arn = %request.project_arn,
            input = %request.input_uri,
            "submitted data automation job"
        );

        let report = self.wait_for_completion(&job.invocation_arn).await?;
        if !report.status.is_success() {
            tracing::warn!(
                invocation_arn = %job.invocation_arn,
                status = %report.status,
                error_type = report.error_type.as_deref().unwrap_or_default(),
                error_message = report.error_message.as_deref().unwrap_or_default(),
                "job did not succeed"
            );
            return Ok(None);
        }
        let Some(metadata_uri) = report.output_uri else {
            tracing::warn!(invocation_arn = %job.invocation_arn, "job reported no output location");
            return Ok(None);
        };

        let Some(metadata) = self.storage.download(&metadata_uri).await? else {
            tracing::debug!(%metadata_uri, "job metadata is empty");
            return Ok(None);
        };
        let paths = OutputPaths::from_job_metadata(&metadata);
        tracing::debug!(?paths, %metadata_uri, "resolved output paths");
        if paths.is_empty() {
            return Ok(None);
        }

        let standard_output = self.download_optional(paths.standard.as_deref()).await?;
        let custom_output = self.download_optional(paths.custom.as_deref()).await?;
        tracing::info!(
            invocation_arn = %job.invocation_arn,
            standard = standard_output.is_some(),
            custom = custom_output.is_some(),
            "analysis complete"
        );

        Ok(Some(AnalysisResult {
            standard_output,
            custom_output,
        }))
    }

    /// Fetch status until it leaves `InProgress`, sleeping the poll interval
    /// after every fetch including the last one.
    pub async fn wait_for_completion(
        &self,
        invocation_arn: &str,
    ) -> AutomationResult<JobStatusReport> {
        debug_assert!(!self.settings.poll_interval.is_zero());

        let mut polls = 0u64;
        loop {
            let report = self.jobs.job_status(invocation_arn).await?;
            polls += 1;
            tracing::debug!(invocation_arn, polls, status = %report.status, "polled job status");

            tokio::time::sleep(self.settings.poll_interval).await;
            if !report.status.is_in_progress() {
                tracing::info!(invocation_arn, polls, status = %report.status, "job finished");
                return Ok(report);
            }
        }
    }

    async fn download_optional(&self, uri: Option<&str>) -> AutomationResult<Option<Value>> {
        match uri {
            Some(uri) => {
                let uri = S3Uri::parse(uri)?;
                Ok(self.storage.download_uri(&uri).await?)
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::blob_store::tests::InMem;
    use crate::services::blob_store::{StorageBridge, StorageError};
    use crate::services::context::{AutomationError, AutomationSettings};
    use crate::services::jobs::{JobRunner, JobStatus, SubmittedJob};
    use crate::services::projects::ProjectCatalog;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    const POLL: Duration = Duration::from_millis(3_000);
    const METADATA_URI: &str = "s3://assets/mcp/test-output/job/job_metadata.json";
    const DEFAULT_PROJECT: &str =
        "arn:aws:bedrock:us-east-1:aws:data-automation-project/public-default";
    const PROFILE: &str =
        "arn:aws:bedrock:us-east-1:123456789012:data-automation-profile/us.data-automation-v1";

    struct ScriptedRunner {
        statuses: Mutex<VecDeque<JobStatusReport>>,
        submitted: Mutex<Vec<JobRequest>>,
        polls: Mutex<usize>,
    }

    impl ScriptedRunner {
        fn new(statuses: Vec<JobStatusReport>) -> Self {
            Self {
                statuses: Mutex::new(statuses.into()),
                submitted: Mutex::new(Vec::new()),
                polls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl JobRunner for ScriptedRunner {
        async fn submit_job(&self, request: &JobRequest) -> AutomationResult<SubmittedJob> {
            self.submitted.lock().await.push(request.clone());
            Ok(SubmittedJob {
                invocation_arn: "arn:aws:bedrock:us-east-1:1:data-automation-invocation/job"
                    .to_string(),
            })
        }

        async fn job_status(&self, _invocation_arn: &str) -> AutomationResult<JobStatusReport> {
            *self.polls.lock().await += 1;
            self.statuses
                .lock()
                .await
                .pop_front()
                .ok_or_else(|| AutomationError::message("status script exhausted"))
        }
    }

    struct NoProjects;

    #[async_trait]
    impl ProjectCatalog for NoProjects {
        async fn list_projects(&self) -> AutomationResult<Vec<ProjectSummary>> {
            Ok(Vec::new())
        }

        async fn get_project(&self, project_arn: &str) -> AutomationResult<ProjectDetails> {
            Err(AutomationError::ProjectNotFound {
                arn: project_arn.to_string(),
            })
        }
    }

    fn report(status: JobStatus, output_uri: Option<&str>) -> JobStatusReport {
        JobStatusReport {
            status,
            output_uri: output_uri.map(str::to_string),
            error_type: None,
            error_message: None,
        }
    }

    fn in_progress() -> JobStatusReport {
        report(JobStatus::InProgress, None)
    }

    fn success() -> JobStatusReport {
        report(JobStatus::Success, Some(METADATA_URI))
    }

    fn context(store: Arc<InMem>, runner: Arc<ScriptedRunner>) -> AutomationContext {
        AutomationContext {
            storage: StorageBridge::builder().store(store).bucket("assets").build(),
            projects: Arc::new(NoProjects),
            jobs: runner,
            settings: AutomationSettings::builder()
                .default_project_arn(DEFAULT_PROJECT)
                .profile_arn(PROFILE)
                .output_uri(S3Uri::parse("s3://assets/mcp/test-output").unwrap())
                .poll_interval(POLL)
                .build(),
        }
    }

    fn asset() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();
        (dir, path)
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_first_status_is_fetched_once() {
        let runner = Arc::new(ScriptedRunner::new(vec![report(JobStatus::ClientError, None)]));
        let ctx = context(Arc::new(InMem::default()), runner.clone());

        let started = tokio::time::Instant::now();
        let report = ctx.wait_for_completion("job").await.unwrap();

        assert_eq!(report.status, JobStatus::ClientError);
        assert_eq!(*runner.polls.lock().await, 1);
        assert!(started.elapsed() >= POLL, "sleeps after the terminal fetch too");
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_polling_while_in_progress() {
        let runner = Arc::new(ScriptedRunner::new(vec![
            in_progress(),
            in_progress(),
            in_progress(),
            report(JobStatus::Success, None),
        ]));
        let ctx = context(Arc::new(InMem::default()), runner.clone());

        let started = tokio::time::Instant::now();
        let report = ctx.wait_for_completion("job").await.unwrap();

        assert!(report.status.is_success());
        assert_eq!(*runner.polls.lock().await, 4);
        assert!(started.elapsed() >= POLL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn created_status_ends_polling() {
        let runner = Arc::new(ScriptedRunner::new(vec![report(JobStatus::Created, None)]));
        let ctx = context(Arc::new(InMem::default()), runner.clone());

        let report = ctx.wait_for_completion("job").await.unwrap();
        assert_eq!(report.status, JobStatus::Created);
        assert_eq!(*runner.polls.lock().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_yields_none_without_downloads() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        let runner = Arc::new(ScriptedRunner::new(vec![
            in_progress(),
            report(JobStatus::ServiceError, Some(METADATA_URI)),
        ]));
        let ctx = context(store.clone(), runner);

        let result = ctx.analyze(&path, None).await.unwrap();

        assert!(result.is_none());
        assert!(store.reads.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn success_without_output_location_yields_none() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        let runner = Arc::new(ScriptedRunner::new(vec![report(JobStatus::Success, None)]));
        let ctx = context(store.clone(), runner);

        assert!(ctx.analyze(&path, None).await.unwrap().is_none());
        assert!(store.reads.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn standard_output_only_fills_one_slot() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        store
            .insert(
                METADATA_URI,
                r#"{"output_metadata":[{"segment_metadata":[{"standard_output_path":"s3://b/std.json"}]}]}"#,
            )
            .await;
        store.insert("s3://b/std.json", r#"{"document":{"pages":1}}"#).await;
        let runner = Arc::new(ScriptedRunner::new(vec![in_progress(), success()]));
        let ctx = context(store.clone(), runner);

        let result = ctx.analyze(&path, None).await.unwrap().unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "standardOutput": { "document": { "pages": 1 } },
                "customOutput": null
            })
        );
        assert_eq!(
            *store.reads.lock().await,
            vec![METADATA_URI.to_string(), "s3://b/std.json".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn both_outputs_are_downloaded() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        store
            .insert(
                METADATA_URI,
                &json!({
                    "output_metadata": [{
                        "segment_metadata": [{
                            "standard_output_path": "s3://out/std.json",
                            "custom_output_path": "s3://out/custom/result.json"
                        }]
                    }]
                })
                .to_string(),
            )
            .await;
        store.insert("s3://out/std.json", r#"{"kind":"standard"}"#).await;
        store
            .insert("s3://out/custom/result.json", r#"{"kind":"custom"}"#)
            .await;
        let ctx = context(store, Arc::new(ScriptedRunner::new(vec![success()])));

        let result = ctx.analyze(&path, None).await.unwrap().unwrap();
        assert_eq!(result.standard_output, Some(json!({ "kind": "standard" })));
        assert_eq!(result.custom_output, Some(json!({ "kind": "custom" })));
    }

    #[tokio::test(start_paused = true)]
    async fn metadata_without_paths_yields_none() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        store
            .insert(
                METADATA_URI,
                r#"{"output_metadata":[{"segment_metadata":[{"standard_output_path":""}]}]}"#,
            )
            .await;
        let ctx = context(store.clone(), Arc::new(ScriptedRunner::new(vec![success()])));

        assert!(ctx.analyze(&path, None).await.unwrap().is_none());
        assert_eq!(store.reads.lock().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_metadata_document_yields_none() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        store.insert(METADATA_URI, "").await;
        let ctx = context(store, Arc::new(ScriptedRunner::new(vec![success()])));

        assert!(ctx.analyze(&path, None).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn missing_output_object_propagates_not_found() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        store
            .insert(
                METADATA_URI,
                r#"{"output_metadata":[{"segment_metadata":[{"custom_output_path":"s3://b/gone.json"}]}]}"#,
            )
            .await;
        let ctx = context(store, Arc::new(ScriptedRunner::new(vec![success()])));

        let err = ctx.analyze(&path, None).await.unwrap_err();
        assert!(matches!(
            err,
            AutomationError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn upload_failure_stops_before_submission() {
        let runner = Arc::new(ScriptedRunner::new(vec![success()]));
        let ctx = context(Arc::new(InMem::default()), runner.clone());

        let err = ctx
            .analyze(Path::new("/no/such/asset.png"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, AutomationError::Storage(StorageError::Io { .. })));
        assert!(runner.submitted.lock().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submission_carries_uploaded_asset_and_resolved_project() {
        let (_dir, path) = asset();
        let store = Arc::new(InMem::default());
        let runner = Arc::new(ScriptedRunner::new(vec![report(JobStatus::ClientError, None)]));
        let ctx = context(store.clone(), runner.clone());

        ctx.analyze(&path, Some("arn:custom-project")).await.unwrap();
        ctx.analyze(&path, Some("   ")).await.unwrap_err();

        let submitted = runner.submitted.lock().await;
        assert_eq!(submitted.len(), 2);
        let first = &submitted[0];
        assert_eq!(first.project_arn, "arn:custom-project");
        assert_eq!(first.output_uri.to_string(), "s3://assets/mcp/test-output");
        assert_eq!(first.profile_arn, PROFILE);
        assert_eq!(first.input_uri.bucket(), "assets");
        assert!(first.input_uri.key().ends_with(".pdf"));
        assert!(store.map.lock().await.contains_key(&(
            "assets".to_string(),
            first.input_uri.key().to_string()
        )));
        assert_eq!(submitted[1].project_arn, DEFAULT_PROJECT);
    }

    #[test]
    fn output_paths_read_only_the_first_segment() {
        let metadata = json!({
            "output_metadata": [
                { "segment_metadata": [
                    { "custom_output_path": "s3://b/custom.json" },
                    { "standard_output_path": "s3://b/ignored.json" }
                ] },
                { "segment_metadata": [{ "standard_output_path": "s3://b/also-ignored.json" }] }
            ]
        });
        let paths = OutputPaths::from_job_metadata(&metadata);
        assert_eq!(paths.standard, None);
        assert_eq!(paths.custom.as_deref(), Some("s3://b/custom.json"));
    }

    #[test]
    fn non_string_paths_are_ignored() {
        let metadata = json!({
            "output_metadata": [{ "segment_metadata": [{ "standard_output_path": 7 }] }]
        });
        assert!(OutputPaths::from_job_metadata(&metadata).is_empty());
        assert!(OutputPaths::from_job_metadata(&json!({})).is_empty());
    }
}
