mod types;

pub use types::{
    ActionParameter, BuildAction, BuildInfo, BuildRef, JobInfo, JobSummary, QueueExecutable,
    QueueItem, QueueTask, TestCase, TestReport, TestSuite,
};

use indexmap::IndexMap;
use reqwest::header::LOCATION;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::auth::ApiToken;
use crate::config::Config;
use crate::error::{JenkinsMcpError, Result};

use types::{AllBuilds, JobListing, WhoAmI};

/// Authenticated connection handle to one Jenkins server.
///
/// Created once at startup and shared by every operation for the process
/// lifetime; nothing here is mutated after construction. Failures are
/// normalized but never retried at this layer — retry policy belongs to the
/// caller.
pub struct JenkinsClient {
    client: Client,
    base_url: Url,
    username: String,
    token: ApiToken,
}

impl JenkinsClient {
    /// Creates a client from startup configuration.
    ///
    /// TLS certificate verification stays on unless the configuration
    /// explicitly opts out.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed or the
    /// base URL is invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("jenkins-mcp/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs));

        if config.insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| JenkinsMcpError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&config.url)
            .map_err(|e| JenkinsMcpError::Config(format!("Invalid Jenkins URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(JenkinsMcpError::Config(format!(
                "Invalid Jenkins URL: {}",
                config.url
            )));
        }

        Ok(Self {
            client,
            base_url,
            username: config.username.clone(),
            token: ApiToken::from(config.api_token.clone()),
        })
    }

    /// Lists all job names visible to the authenticated identity, in the
    /// order the server reports them.
    pub async fn list_jobs(&self) -> Result<Vec<String>> {
        let mut url = self.root_url(&["api", "json"])?;
        url.set_query(Some("tree=jobs[name,url]"));

        let listing: JobListing = self.get_json(url, "job listing").await?;
        Ok(listing.jobs.into_iter().map(|job| job.name).collect())
    }

    /// Returns the authenticated user's identity string.
    pub async fn who_am_i(&self) -> Result<String> {
        let url = self.root_url(&["me", "api", "json"])?;
        let who: WhoAmI = self.get_json(url, "current user").await?;

        Ok(who
            .full_name
            .filter(|name| !name.is_empty())
            .unwrap_or(who.id))
    }

    /// Fetches job metadata. With `fetch_all_builds` the build list is
    /// replaced by the full history instead of the server's recent-builds
    /// window.
    pub async fn get_job_info(&self, job_name: &str, fetch_all_builds: bool) -> Result<JobInfo> {
        let url = self.job_url(job_name, &["api", "json"])?;
        let mut info: JobInfo = self
            .get_json(url, &format!("job '{job_name}'"))
            .await?;

        if fetch_all_builds {
            let mut url = self.job_url(job_name, &["api", "json"])?;
            url.set_query(Some("tree=allBuilds[number,url]"));
            let history: AllBuilds = self
                .get_json(url, &format!("build history of job '{job_name}'"))
                .await?;
            info.builds = history.all_builds;
        }

        Ok(info)
    }

    /// Probes whether a job exists. Only a clean 404 maps to `false`; any
    /// other failure propagates so callers cannot mistake an outage for an
    /// absent job.
    pub async fn job_exists(&self, job_name: &str) -> Result<bool> {
        match self.get_job_info(job_name, false).await {
            Ok(_) => Ok(true),
            Err(JenkinsMcpError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fetches one build's full snapshot, including its recorded actions.
    pub async fn get_build_info(&self, job_name: &str, build_number: u64) -> Result<BuildInfo> {
        let number = build_number.to_string();
        let url = self.job_url(job_name, &[&number, "api", "json"])?;
        self.get_json(url, &format!("build #{build_number} of job '{job_name}'"))
            .await
    }

    /// Fetches the test report recorded for one build. Jenkins answers 404
    /// when the build published no report.
    pub async fn get_build_test_report(
        &self,
        job_name: &str,
        build_number: u64,
    ) -> Result<TestReport> {
        let number = build_number.to_string();
        let url = self.job_url(job_name, &[&number, "testReport", "api", "json"])?;
        self.get_json(
            url,
            &format!("test report for build #{build_number} of job '{job_name}'"),
        )
        .await
    }

    /// Submits a build request and returns the queue id Jenkins assigned.
    ///
    /// An empty parameter set posts to the plain `build` endpoint so the
    /// job's configured defaults apply; otherwise the parameters travel as
    /// query values on `buildWithParameters`. The queue id is only
    /// communicated through the `Location` response header.
    pub async fn submit_build(
        &self,
        job_name: &str,
        parameters: &IndexMap<String, String>,
    ) -> Result<u64> {
        let request = if parameters.is_empty() {
            let url = self.job_url(job_name, &["build"])?;
            self.client.post(url)
        } else {
            let url = self.job_url(job_name, &["buildWithParameters"])?;
            self.client.post(url).query(parameters)
        };

        let response = self.send(request).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(JenkinsMcpError::NotFound(format!("job '{job_name}'")));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(JenkinsMcpError::UpstreamError {
                status: status.as_u16(),
                message,
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok());

        location
            .and_then(parse_queue_id)
            .ok_or_else(|| JenkinsMcpError::UpstreamError {
                status: status.as_u16(),
                message: format!(
                    "build accepted but no queue id in Location header: {}",
                    location.unwrap_or("<missing>")
                ),
            })
    }

    /// Fetches one queue entry by the id `submit_build` returned.
    pub async fn get_queue_item(&self, queue_id: u64) -> Result<QueueItem> {
        let id = queue_id.to_string();
        let url = self.root_url(&["queue", "item", &id, "api", "json"])?;
        self.get_json(url, &format!("queue item {queue_id}")).await
    }

    fn root_url(&self, trailing: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| JenkinsMcpError::Config(format!("Invalid Jenkins URL: {}", self.base_url)))?;
            segments.pop_if_empty();
            segments.extend(trailing);
        }
        Ok(url)
    }

    /// Builds `/job/<seg>/job/<seg>/...` paths. Folder-style names ("a/b")
    /// address nested jobs; each segment is percent-encoded by the URL
    /// builder.
    fn job_url(&self, job_name: &str, trailing: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| JenkinsMcpError::Config(format!("Invalid Jenkins URL: {}", self.base_url)))?;
            segments.pop_if_empty();
            for part in job_name.split('/').filter(|part| !part.is_empty()) {
                segments.push("job");
                segments.push(part);
            }
            segments.extend(trailing);
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        request
            .basic_auth(&self.username, Some(self.token.as_str()))
            .send()
            .await
            .map_err(map_transport_error)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T> {
        let response = self.send(self.client.get(url)).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(JenkinsMcpError::NotFound(resource.to_string()));
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(JenkinsMcpError::UpstreamError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn map_transport_error(error: reqwest::Error) -> JenkinsMcpError {
    if error.is_connect() || error.is_timeout() {
        JenkinsMcpError::UpstreamUnavailable(error.to_string())
    } else {
        JenkinsMcpError::Network(error)
    }
}

/// Extracts the queue id from a `.../queue/item/<id>/` Location header.
fn parse_queue_id(location: &str) -> Option<u64> {
    let mut segments = location.trim_end_matches('/').rsplit('/');
    let id = segments.next()?.parse().ok()?;
    match segments.next() {
        Some("item") => Some(id),
        _ => None,
    }
}
