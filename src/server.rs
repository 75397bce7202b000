//! MCP exposure of the job queries and the build trigger workflow.
//!
//! Tools here hold no decision logic: each one deserializes its arguments,
//! delegates to [`crate::jobs`] or [`crate::trigger`], and renders the
//! outcome as structured content. Errors come back as structured tool
//! failures carrying the error's display message, never as a raw panic.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::{Deserialize, Serialize};

use crate::client::JenkinsClient;
use crate::error::JenkinsMcpError;
use crate::{jobs, trigger};

const INSTRUCTIONS: &str = "Query and control a Jenkins CI server. \
Use list_jobs to discover job names, get_job_info for metadata and build \
history, get_job_result for a build's test report, and trigger_build to \
start a build. When trigger_build is called without parameters the last \
build's parameters are replayed.";

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetJobInfoRequest {
    /// Name of the Jenkins job; folder-style names like "team/app" are
    /// supported
    job_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GetJobResultRequest {
    /// Name of the Jenkins job
    job_name: String,
    /// Build number to fetch the test report for; defaults to the job's
    /// last build
    build_number: Option<u64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct TriggerBuildRequest {
    /// Name of the Jenkins job to build
    job_name: String,
    /// Build parameters as name/value pairs. Omit to replay the parameters
    /// of the job's last build (empty defaults apply when the job has never
    /// built).
    parameters: Option<HashMap<String, String>>,
}

/// The request-scoped context every tool call runs against: one shared
/// connection handle, handed out per call, never rebuilt.
#[derive(Clone)]
pub struct JenkinsServer {
    client: Arc<JenkinsClient>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl JenkinsServer {
    pub fn new(client: JenkinsClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    fn success<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
        match serde_json::to_string_pretty(value) {
            Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Failed to serialize response: {e}"
            ))])),
        }
    }

    fn failure(error: &JenkinsMcpError) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
    }

    #[tool(description = "List all Jenkins jobs visible to the authenticated user")]
    async fn list_jobs(&self) -> Result<CallToolResult, McpError> {
        match jobs::list_jobs(&self.client).await {
            Ok(names) => Self::success(&names),
            Err(e) => Self::failure(&e),
        }
    }

    #[tool(description = "Get the identity Jenkins authenticated this connection as")]
    async fn get_current_user(&self) -> Result<CallToolResult, McpError> {
        match jobs::who_am_i(&self.client).await {
            Ok(identity) => Self::success(&identity),
            Err(e) => Self::failure(&e),
        }
    }

    #[tool(
        description = "Get a job's metadata: buildability, queue state, recent builds, and the last/last-successful/last-failed build numbers"
    )]
    async fn get_job_info(
        &self,
        Parameters(req): Parameters<GetJobInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        match jobs::get_job_info(&self.client, &req.job_name).await {
            Ok(info) => Self::success(&info),
            Err(e) => Self::failure(&e),
        }
    }

    #[tool(
        description = "Get the test report of a build. Omit build_number to read the job's most recent build."
    )]
    async fn get_job_result(
        &self,
        Parameters(req): Parameters<GetJobResultRequest>,
    ) -> Result<CallToolResult, McpError> {
        match jobs::get_job_result(&self.client, &req.job_name, req.build_number).await {
            Ok(report) => Self::success(&report),
            Err(e) => Self::failure(&e),
        }
    }

    #[tool(
        description = "Trigger a build of a job and return its queue item. Pass parameters to build with explicit values; omit them to replay the last build's parameters."
    )]
    async fn trigger_build(
        &self,
        Parameters(req): Parameters<TriggerBuildRequest>,
    ) -> Result<CallToolResult, McpError> {
        let parameters = req.parameters.map(|params| params.into_iter().collect());
        match trigger::trigger_build(&self.client, &req.job_name, parameters).await {
            Ok(item) => Self::success(&item),
            Err(e) => Self::failure(&e),
        }
    }
}

#[tool_handler]
impl ServerHandler for JenkinsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
