//! Build invocation workflow: validate the target job, reconcile the
//! parameter set, submit, and hand back the queue item.
//!
//! Within one invocation the steps are strictly ordered — existence check,
//! then reconciliation, then submission — and nothing is retried or rolled
//! back here; each failure is surfaced under its own name so the caller can
//! decide what to do.

use indexmap::IndexMap;
use log::info;

use crate::client::{BuildAction, JenkinsClient, QueueItem};
use crate::error::{JenkinsMcpError, Result};

/// Triggers a build of `job_name` and returns the resulting queue item.
///
/// When `parameters` is omitted the last build's recorded parameters are
/// replayed, giving "rebuild with the same config" semantics; a job with no
/// prior builds (or whose last build recorded no parameters) is submitted
/// with an empty set so the server applies the job's configured defaults.
///
/// The returned queue item is the immediate post-submission state — the
/// build may still be queued, or on a fast server already running with a
/// build number assigned. No further polling happens here.
///
/// # Errors
///
/// - [`JenkinsMcpError::InvalidArgument`] for an empty job name or an empty
///   parameter name, before any upstream call is made.
/// - [`JenkinsMcpError::JobLookupFailed`] when the existence check itself
///   fails (transport or server fault) — distinct from the job being absent.
/// - [`JenkinsMcpError::JobNotFound`] when the job does not exist.
/// - Any adapter failure from the parameter lookup or the submission,
///   unchanged.
pub async fn trigger_build(
    client: &JenkinsClient,
    job_name: &str,
    parameters: Option<IndexMap<String, String>>,
) -> Result<QueueItem> {
    let job_name = job_name.trim();
    if job_name.is_empty() {
        return Err(JenkinsMcpError::InvalidArgument(
            "job name must be a non-empty string".to_string(),
        ));
    }
    if let Some(params) = &parameters {
        if params.keys().any(|name| name.trim().is_empty()) {
            return Err(JenkinsMcpError::InvalidArgument(
                "parameter names must be non-empty strings".to_string(),
            ));
        }
    }

    let exists = client
        .job_exists(job_name)
        .await
        .map_err(|e| JenkinsMcpError::JobLookupFailed {
            job: job_name.to_string(),
            source: Box::new(e),
        })?;
    if !exists {
        return Err(JenkinsMcpError::JobNotFound(job_name.to_string()));
    }

    let parameters = match parameters {
        Some(params) => params,
        None => last_build_parameters(client, job_name).await?,
    };

    info!(
        "Submitting build of '{job_name}' with {} parameter(s)",
        parameters.len()
    );
    let queue_id = client.submit_build(job_name, &parameters).await?;
    client.get_queue_item(queue_id).await
}

/// Looks up the parameter set recorded on the job's most recent build.
///
/// Absence is not an error here: a job that never built, or whose last
/// build carries no parameters action, yields an empty set.
async fn last_build_parameters(
    client: &JenkinsClient,
    job_name: &str,
) -> Result<IndexMap<String, String>> {
    let info = client.get_job_info(job_name, false).await?;
    let Some(last) = info.last_build else {
        info!("Job '{job_name}' has no builds yet, submitting with defaults");
        return Ok(IndexMap::new());
    };

    let build = client.get_build_info(job_name, last.number).await?;
    let params = parameters_from_actions(&build.actions);
    info!(
        "Inherited {} parameter(s) from build #{} of '{job_name}'",
        params.len(),
        last.number
    );
    Ok(params)
}

/// Extracts the name→value mapping from a build's recorded parameters
/// action.
///
/// Returns an empty map when no parameters action is present. If a name
/// repeats within the action list the last occurrence wins, matching what
/// Jenkins itself reports for such builds.
fn parameters_from_actions(actions: &[BuildAction]) -> IndexMap<String, String> {
    let Some(action) = actions.iter().find(|action| {
        action
            .class
            .as_deref()
            .is_some_and(|class| class.ends_with("ParametersAction"))
    }) else {
        return IndexMap::new();
    };

    let mut params = IndexMap::new();
    for parameter in &action.parameters {
        params.insert(parameter.name.clone(), scalar_to_string(&parameter.value));
    }
    params
}

/// Renders a recorded parameter value back to the string form Jenkins
/// accepts on resubmission. Booleans and numbers round-trip as their plain
/// text form; null becomes the empty string.
fn scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ActionParameter;
    use crate::config::Config;

    fn test_client(base_url: &str) -> JenkinsClient {
        JenkinsClient::new(&Config {
            url: base_url.to_string(),
            username: "ci-bot".to_string(),
            api_token: "11abc".to_string(),
            insecure_skip_tls_verify: false,
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn params_action(entries: &[(&str, serde_json::Value)]) -> BuildAction {
        BuildAction {
            class: Some("hudson.model.ParametersAction".to_string()),
            parameters: entries
                .iter()
                .map(|(name, value)| ActionParameter {
                    name: (*name).to_string(),
                    value: value.clone(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_parameters_from_actions_extracts_mapping() {
        let actions = vec![
            BuildAction {
                class: Some("hudson.model.CauseAction".to_string()),
                parameters: Vec::new(),
            },
            params_action(&[
                ("A", serde_json::json!("1")),
                ("B", serde_json::json!("2")),
            ]),
        ];

        let params = parameters_from_actions(&actions);
        assert_eq!(params.get("A").map(String::as_str), Some("1"));
        assert_eq!(params.get("B").map(String::as_str), Some("2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parameters_from_actions_last_occurrence_wins() {
        let actions = vec![params_action(&[
            ("env", serde_json::json!("staging")),
            ("env", serde_json::json!("production")),
        ])];

        let params = parameters_from_actions(&actions);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("env").map(String::as_str), Some("production"));
    }

    #[test]
    fn test_parameters_from_actions_without_parameters_action() {
        let actions = vec![BuildAction {
            class: Some("hudson.model.CauseAction".to_string()),
            parameters: Vec::new(),
        }];

        assert!(parameters_from_actions(&actions).is_empty());
    }

    #[test]
    fn test_parameters_from_actions_stringifies_scalars() {
        let actions = vec![params_action(&[
            ("dry_run", serde_json::json!(false)),
            ("replicas", serde_json::json!(3)),
            ("note", serde_json::Value::Null),
        ])];

        let params = parameters_from_actions(&actions);
        assert_eq!(params.get("dry_run").map(String::as_str), Some("false"));
        assert_eq!(params.get("replicas").map(String::as_str), Some("3"));
        assert_eq!(params.get("note").map(String::as_str), Some(""));
    }

    #[tokio::test]
    async fn test_empty_job_name_fails_before_any_upstream_call() {
        let mut server = mockito::Server::new_async().await;
        let any_request = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = trigger_build(&client, "  ", None).await.unwrap_err();

        assert!(matches!(err, JenkinsMcpError::InvalidArgument(_)));
        any_request.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_parameter_name_fails_before_any_upstream_call() {
        let mut server = mockito::Server::new_async().await;
        let any_request = server
            .mock("GET", mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let mut params = IndexMap::new();
        params.insert(String::new(), "value".to_string());
        let err = trigger_build(&client, "deploy", Some(params))
            .await
            .unwrap_err();

        assert!(matches!(err, JenkinsMcpError::InvalidArgument(_)));
        any_request.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_job_never_reaches_submit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/ghost/api/json")
            .with_status(404)
            .create_async()
            .await;
        let submit = server
            .mock("POST", mockito::Matcher::Regex("^/job/ghost/.*".to_string()))
            .expect(0)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = trigger_build(&client, "ghost", Some(IndexMap::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, JenkinsMcpError::JobNotFound(name) if name == "ghost"));
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_existence_check_is_not_job_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/deploy/api/json")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = trigger_build(&client, "deploy", None).await.unwrap_err();

        match err {
            JenkinsMcpError::JobLookupFailed { job, source } => {
                assert_eq!(job, "deploy");
                assert!(matches!(
                    *source,
                    JenkinsMcpError::UpstreamError { status: 502, .. }
                ));
            }
            other => panic!("expected JobLookupFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replays_last_build_parameters() {
        let mut server = mockito::Server::new_async().await;
        // Existence check and reconciliation both read the job info.
        server
            .mock("GET", "/job/deploy/api/json")
            .with_status(200)
            .with_body(r#"{"name": "deploy", "lastBuild": {"number": 42}}"#)
            .expect(2)
            .create_async()
            .await;
        server
            .mock("GET", "/job/deploy/42/api/json")
            .with_status(200)
            .with_body(
                r#"{"number": 42, "building": false, "result": "SUCCESS",
                    "actions": [
                        {"_class": "hudson.model.CauseAction"},
                        {"_class": "hudson.model.ParametersAction",
                         "parameters": [{"name": "env", "value": "staging"}]}
                    ]}"#,
            )
            .create_async()
            .await;
        let submit = server
            .mock("POST", "/job/deploy/buildWithParameters")
            .match_query(mockito::Matcher::UrlEncoded("env".into(), "staging".into()))
            .with_status(201)
            .with_header("Location", &format!("{}/queue/item/55/", server.url()))
            .create_async()
            .await;
        server
            .mock("GET", "/queue/item/55/api/json")
            .with_status(200)
            .with_body(
                r#"{"id": 55, "blocked": false, "buildable": true,
                    "task": {"name": "deploy"}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let item = trigger_build(&client, "deploy", None).await.unwrap();

        assert_eq!(item.id, 55);
        assert_eq!(item.task.unwrap().name.as_deref(), Some("deploy"));
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_job_without_builds_submits_empty_set() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/fresh/api/json")
            .with_status(200)
            .with_body(r#"{"name": "fresh", "buildable": true}"#)
            .expect(2)
            .create_async()
            .await;
        let submit = server
            .mock("POST", "/job/fresh/build")
            .with_status(201)
            .with_header("Location", &format!("{}/queue/item/7/", server.url()))
            .create_async()
            .await;
        server
            .mock("GET", "/queue/item/7/api/json")
            .with_status(200)
            .with_body(r#"{"id": 7, "buildable": true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let item = trigger_build(&client, "fresh", None).await.unwrap();

        assert_eq!(item.id, 7);
        submit.assert_async().await;
    }

    #[tokio::test]
    async fn test_explicit_parameters_skip_reconciliation() {
        let mut server = mockito::Server::new_async().await;
        // Only the existence check reads job info; build #42 is never fetched.
        server
            .mock("GET", "/job/deploy/api/json")
            .with_status(200)
            .with_body(r#"{"name": "deploy", "lastBuild": {"number": 42}}"#)
            .expect(1)
            .create_async()
            .await;
        let build_info = server
            .mock("GET", "/job/deploy/42/api/json")
            .expect(0)
            .create_async()
            .await;
        server
            .mock("POST", "/job/deploy/buildWithParameters")
            .match_query(mockito::Matcher::UrlEncoded("env".into(), "production".into()))
            .with_status(201)
            .with_header("Location", &format!("{}/queue/item/60/", server.url()))
            .create_async()
            .await;
        server
            .mock("GET", "/queue/item/60/api/json")
            .with_status(200)
            .with_body(r#"{"id": 60, "buildable": true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let mut params = IndexMap::new();
        params.insert("env".to_string(), "production".to_string());
        let item = trigger_build(&client, "deploy", Some(params)).await.unwrap();

        assert_eq!(item.id, 60);
        build_info.assert_async().await;
    }

    #[tokio::test]
    async fn test_queue_item_with_started_build() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/deploy/api/json")
            .with_status(200)
            .with_body(r#"{"name": "deploy"}"#)
            .expect(2)
            .create_async()
            .await;
        server
            .mock("POST", "/job/deploy/build")
            .with_status(201)
            .with_header("Location", &format!("{}/queue/item/8/", server.url()))
            .create_async()
            .await;
        server
            .mock("GET", "/queue/item/8/api/json")
            .with_status(200)
            .with_body(
                r#"{"id": 8, "executable": {"number": 43,
                    "url": "https://jenkins.example.com/job/deploy/43/"}}"#,
            )
            .create_async()
            .await;

        let client = test_client(&server.url());
        let item = trigger_build(&client, "deploy", None).await.unwrap();
        assert_eq!(item.executable.unwrap().number, 43);
    }
}
