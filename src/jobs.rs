//! Read-only job queries: listing, identity, job metadata, test reports.
//!
//! Every function takes the shared [`JenkinsClient`] explicitly so the
//! operations stay testable without standing up the MCP exposure layer.

use log::info;

use crate::client::{JenkinsClient, JobInfo, TestReport};
use crate::error::{JenkinsMcpError, Result};

/// Lists all job names visible to the authenticated identity.
///
/// Order is whatever the server reports; callers must not rely on it.
pub async fn list_jobs(client: &JenkinsClient) -> Result<Vec<String>> {
    client.list_jobs().await
}

/// Returns the authenticated user's identity string.
pub async fn who_am_i(client: &JenkinsClient) -> Result<String> {
    client.who_am_i().await
}

/// Fetches full job metadata including the build list.
///
/// # Errors
///
/// Fails with [`JenkinsMcpError::JobNotFound`] if the job does not exist.
pub async fn get_job_info(client: &JenkinsClient, job_name: &str) -> Result<JobInfo> {
    client
        .get_job_info(job_name, false)
        .await
        .map_err(|e| match e {
            JenkinsMcpError::NotFound(_) => JenkinsMcpError::JobNotFound(job_name.to_string()),
            other => other,
        })
}

/// Fetches the test report for a specific build, or for the job's last
/// build when `build_number` is omitted.
///
/// # Errors
///
/// Fails with [`JenkinsMcpError::JobNotFound`] if the job is absent and
/// with [`JenkinsMcpError::NoBuildsYet`] if a last-build lookup finds a job
/// that has never built.
pub async fn get_job_result(
    client: &JenkinsClient,
    job_name: &str,
    build_number: Option<u64>,
) -> Result<TestReport> {
    let build_number = match build_number {
        Some(number) => number,
        None => {
            let info = get_job_info(client, job_name).await?;
            let last = info
                .last_build
                .ok_or_else(|| JenkinsMcpError::NoBuildsYet(job_name.to_string()))?;
            info!("Resolved last build of '{job_name}' to #{}", last.number);
            last.number
        }
    };

    client.get_build_test_report(job_name, build_number).await
}
