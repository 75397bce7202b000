use serde::{Deserialize, Serialize};

/// A single entry in the server's job listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    /// Job name, unique within the Jenkins namespace
    pub name: String,
    /// Absolute URL of the job on the Jenkins server
    #[serde(default)]
    pub url: Option<String>,
}

/// Response shape of `GET /api/json?tree=jobs[name,url]`.
#[derive(Debug, Deserialize)]
pub struct JobListing {
    #[serde(default)]
    pub jobs: Vec<JobSummary>,
}

/// Response shape of `GET /me/api/json`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Lightweight reference to a build, as it appears in a job's build list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRef {
    pub number: u64,
    #[serde(default)]
    pub url: Option<String>,
}

/// Job metadata snapshot from `GET /job/<name>/api/json`.
///
/// Fetched fresh on every query; nothing here is cached locally, so the
/// fields always reflect the server's state at call time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the job can currently be built (false for disabled jobs)
    #[serde(default)]
    pub buildable: bool,
    /// Whether the job currently has a queued build
    #[serde(default)]
    pub in_queue: bool,
    /// Recent builds; replaced by the full history when `fetch_all_builds`
    /// was requested
    #[serde(default)]
    pub builds: Vec<BuildRef>,
    /// Most recent build, absent when the job has never run
    #[serde(default)]
    pub last_build: Option<BuildRef>,
    #[serde(default)]
    pub last_successful_build: Option<BuildRef>,
    #[serde(default)]
    pub last_failed_build: Option<BuildRef>,
    #[serde(default)]
    pub next_build_number: Option<u64>,
}

/// Response shape of the `tree=allBuilds[number,url]` history query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllBuilds {
    #[serde(default)]
    pub all_builds: Vec<BuildRef>,
}

/// One named parameter value recorded on a build.
///
/// Jenkins stores values as whatever scalar the parameter type produced
/// (string, boolean, number), so the value is kept loose here and
/// stringified at the reconciliation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// One entry of a build's `actions` array.
///
/// The array is heterogeneous; only entries whose `_class` marks them as a
/// parameters action carry a `parameters` list, so every field defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildAction {
    #[serde(default, rename = "_class")]
    pub class: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ActionParameter>,
}

/// Build snapshot from `GET /job/<name>/<number>/api/json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub number: u64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub building: bool,
    /// Terminal result ("SUCCESS", "FAILURE", ...), absent while building
    #[serde(default)]
    pub result: Option<String>,
    /// Start time, epoch milliseconds
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub actions: Vec<BuildAction>,
}

/// The job a queue item belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueTask {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// The build a queue item resolved into, present once Jenkins has assigned
/// a build number (a fast server may have done so by the time the trigger
/// call returns).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueExecutable {
    pub number: u64,
    #[serde(default)]
    pub url: Option<String>,
}

/// Queue entry snapshot from `GET /queue/item/<id>/api/json`.
///
/// This is the handle returned by a build submission; it describes whether
/// the build is still queued, blocked, or already running. The queue entry
/// itself is owned by Jenkins and only referenced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: u64,
    #[serde(default)]
    pub url: Option<String>,
    /// Human-readable reason the item is still waiting
    #[serde(default)]
    pub why: Option<String>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub buildable: bool,
    #[serde(default)]
    pub stuck: bool,
    #[serde(default)]
    pub cancelled: bool,
    /// Enqueue time, epoch milliseconds
    #[serde(default)]
    pub in_queue_since: Option<u64>,
    #[serde(default)]
    pub task: Option<QueueTask>,
    #[serde(default)]
    pub executable: Option<QueueExecutable>,
}

/// A single test case inside a report suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub class_name: Option<String>,
    pub name: String,
    /// "PASSED", "FAILED", "SKIPPED", "REGRESSION", "FIXED"
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub error_details: Option<String>,
}

/// One suite of a build's test report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuite {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test report snapshot from `GET /job/<name>/<number>/testReport/api/json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestReport {
    #[serde(default)]
    pub fail_count: u64,
    #[serde(default)]
    pub pass_count: u64,
    #[serde(default)]
    pub skip_count: u64,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub suites: Vec<TestSuite>,
}
