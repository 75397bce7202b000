use clap::Parser;

/// Startup configuration for the Jenkins MCP server.
///
/// Every field is backed by a `JENKINS_*` environment variable so the server
/// can be dropped into an MCP client config without command-line plumbing.
/// Missing required values abort startup; they are never deferred to a
/// per-call error.
#[derive(Debug, Parser)]
#[command(name = "jenkins-mcp")]
#[command(author, version, about = "MCP server for querying and controlling Jenkins CI", long_about = None)]
pub struct Config {
    /// Jenkins base URL (e.g. <https://jenkins.example.com>)
    #[arg(long, env = "JENKINS_URL")]
    pub url: String,

    /// Username to authenticate as
    #[arg(long, env = "JENKINS_USERNAME")]
    pub username: String,

    /// API token for HTTP basic auth
    #[arg(long, env = "JENKINS_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Disable TLS certificate verification. Off by default; only enable
    /// for Jenkins instances behind self-signed certificates.
    #[arg(long, env = "JENKINS_SKIP_TLS_VERIFY", default_value_t = false)]
    pub insecure_skip_tls_verify: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "JENKINS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,
}
