//! Orchestration layer over the AWS services behind the tools.
//!
//! Every external system sits behind a trait (`ObjectStore`, `ProjectCatalog`,
//! `JobRunner`) so the orchestrator can be driven by in-memory doubles. Clients
//! are built once into an `AutomationContext` and never mutated afterwards.

pub mod blob_store;
pub mod context;
pub mod jobs;
pub mod orchestrator;
pub mod project_config;
pub mod projects;

pub use blob_store::{ObjectStore, S3ObjectStore, S3Uri, StorageBridge, StorageError};
pub use context::{
    AutomationContext, AutomationError, AutomationResult, AutomationSettings,
    build_automation_context,
};
pub use jobs::{
    BedrockJobRunner, JobRequest, JobRunner, JobStatus, JobStatusReport, SubmittedJob,
};
pub use orchestrator::{AnalysisResult, OutputPaths};
pub use projects::{BedrockProjectCatalog, ProjectCatalog, ProjectDetails, ProjectSummary};
