//! Artifact listing and download client for GitHub Actions.
//!
//! Only the fields the collector reads are modelled; the rest of the API
//! payload is ignored.

use chrono::{DateTime, NaiveDate};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::defaults::GithubConfig;
use crate::error::{Error, Result};
use crate::keychain;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// One entry of the artifacts listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub created_at: String,
    pub archive_download_url: String,
    #[serde(default)]
    pub workflow_run: Option<WorkflowRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    #[serde(default)]
    pub head_branch: Option<String>,
}

/// One page of the artifacts listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Artifact {
    pub fn branch(&self) -> Option<&str> {
        self.workflow_run.as_ref()?.head_branch.as_deref()
    }

    /// Creation day, from the RFC 3339 timestamp.
    pub fn created_day(&self) -> Result<NaiveDate> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.created_at) {
            return Ok(ts.date_naive());
        }

        // Fall back to the leading YYYY-MM-DD for timestamps without offset.
        self.created_at
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .ok_or_else(|| {
                Error::internal_json(
                    format!("Unparseable created_at '{}'", self.created_at),
                    Some(format!("artifact {}", self.name)),
                )
            })
    }
}

/// Source of artifact pages and archive bytes.
pub trait ArtifactSource {
    /// Fetch page `page` (1-based) of the listing.
    fn fetch_page(&self, page: u32) -> Result<ArtifactPage>;

    /// Download the zip archive of one artifact.
    fn download(&self, artifact: &Artifact) -> Result<Vec<u8>>;
}

/// Blocking GitHub REST client.
pub struct GithubClient {
    client: Client,
    api_base: String,
    repo: String,
}

impl GithubClient {
    pub fn new(config: &GithubConfig, token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("token {}", token)).map_err(|_| {
                Error::config_invalid_value("github.token", None, "token contains invalid characters")
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        // Artifact archives can be hundreds of megabytes; no overall timeout.
        let client = Client::builder()
            .user_agent(format!("rcpack/{}", VERSION))
            .default_headers(headers)
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            repo: config.repo.clone(),
        })
    }

    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}/repos/{}/actions/artifacts?page={}",
            self.api_base, self.repo, page
        )
    }

    fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::remote_request_failed(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::remote_status(url, status.as_u16(), body));
        }

        Ok(response)
    }
}

impl ArtifactSource for GithubClient {
    fn fetch_page(&self, page: u32) -> Result<ArtifactPage> {
        let url = self.listing_url(page);
        self.get(&url)?.json().map_err(|e| {
            Error::internal_json(e.to_string(), Some(format!("parse artifact listing page {}", page)))
        })
    }

    fn download(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        let url = &artifact.archive_download_url;
        let bytes = self
            .get(url)?
            .bytes()
            .map_err(|e| Error::remote_request_failed(url.as_str(), e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Where the token in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    Env,
    Config,
    Keychain,
    None,
}

/// Resolve the API token: environment, then config, then keychain.
///
/// Keychain errors are treated as "no token"; listing works anonymously.
pub fn resolve_token(config: &GithubConfig) -> (Option<String>, TokenSource) {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.trim().is_empty() {
            return (Some(token.trim().to_string()), TokenSource::Env);
        }
    }

    if let Some(token) = config.token.as_ref().filter(|t| !t.trim().is_empty()) {
        return (Some(token.trim().to_string()), TokenSource::Config);
    }

    match keychain::get(&config.repo) {
        Ok(Some(token)) => (Some(token), TokenSource::Keychain),
        _ => (None, TokenSource::None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    /// Answer one connection per canned response, in order.
    fn serve(responses: Vec<String>) -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 4096];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        (format!("http://{}", addr), handle)
    }

    /// Client against a local server, ignoring any proxy set in the environment.
    fn local_client(base: &str) -> GithubClient {
        GithubClient {
            client: Client::builder().no_proxy().build().unwrap(),
            api_base: base.to_string(),
            repo: "supermerill/SuperSlicer".to_string(),
        }
    }

    fn artifact_json(name: &str, created_at: &str, branch: Option<&str>) -> serde_json::Value {
        serde_json::json!({
            "id": 1,
            "name": name,
            "created_at": created_at,
            "archive_download_url": format!("https://api.github.com/artifacts/{}/zip", name),
            "expired": false,
            "workflow_run": { "id": 7, "head_branch": branch },
        })
    }

    #[test]
    fn page_deserializes_and_ignores_unknown_fields() {
        let json = serde_json::json!({
            "total_count": 2,
            "artifacts": [
                artifact_json("rc_win64", "2024-01-10T08:15:00Z", Some("rc")),
                artifact_json("nightly_win64", "2024-01-09T08:15:00Z", Some("dev")),
            ],
        });

        let page: ArtifactPage = serde_json::from_value(json).unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.artifacts[0].branch(), Some("rc"));
        assert_eq!(page.artifacts[1].branch(), Some("dev"));
    }

    #[test]
    fn missing_workflow_run_has_no_branch() {
        let json = serde_json::json!({
            "name": "orphan",
            "created_at": "2024-01-10T08:15:00Z",
            "archive_download_url": "https://x/zip",
        });
        let artifact: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(artifact.branch(), None);
    }

    #[test]
    fn created_day_truncates_to_date() {
        let json = artifact_json("rc_win64", "2024-01-10T23:59:59Z", Some("rc"));
        let artifact: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(
            artifact.created_day().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
    }

    #[test]
    fn created_day_accepts_bare_date_prefix() {
        let json = artifact_json("rc_win64", "2024-01-10 08:00", Some("rc"));
        let artifact: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(
            artifact.created_day().unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );

        let json = artifact_json("rc_win64", "yesterday", Some("rc"));
        let artifact: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(
            artifact.created_day().unwrap_err().code.as_str(),
            "internal.json_error"
        );
    }

    #[test]
    fn listing_url_targets_repo_artifacts() {
        let config = GithubConfig {
            repo: "supermerill/SuperSlicer".to_string(),
            api_base: "https://api.github.com/".to_string(),
            token: None,
        };
        let client = GithubClient::new(&config, Some("ghp_x")).unwrap();
        assert_eq!(
            client.listing_url(3),
            "https://api.github.com/repos/supermerill/SuperSlicer/actions/artifacts?page=3"
        );
    }

    #[test]
    fn fetch_page_parses_listing() {
        let body = serde_json::json!({
            "total_count": 1,
            "artifacts": [artifact_json("rc_win64", "2024-01-10T08:15:00Z", Some("rc"))],
        })
        .to_string();
        let (base, server) = serve(vec![http_response("200 OK", &body)]);

        let page = local_client(&base).fetch_page(1).unwrap();
        server.join().unwrap();

        assert_eq!(page.total_count, 1);
        assert_eq!(page.artifacts[0].name, "rc_win64");
        assert_eq!(page.artifacts[0].branch(), Some("rc"));
    }

    #[test]
    fn non_success_status_is_status_error() {
        let (base, server) = serve(vec![http_response("404 Not Found", r#"{"message":"Not Found"}"#)]);

        let err = local_client(&base).fetch_page(1).unwrap_err();
        server.join().unwrap();

        assert_eq!(err.code.as_str(), "remote.status_error");
        assert_eq!(err.details["status"], 404);
        assert!(err.details["body"].as_str().unwrap_or_default().contains("Not Found"));
    }

    #[test]
    fn invalid_listing_body_is_json_error() {
        let (base, server) = serve(vec![http_response("200 OK", "<html>rate limited</html>")]);

        let err = local_client(&base).fetch_page(2).unwrap_err();
        server.join().unwrap();

        assert_eq!(err.code.as_str(), "internal.json_error");
    }

    #[test]
    fn download_returns_body_bytes() {
        let (base, server) = serve(vec![http_response("200 OK", "PK-archive")]);
        let artifact = Artifact {
            name: "rc_win64".to_string(),
            created_at: "2024-01-10T08:15:00Z".to_string(),
            archive_download_url: format!("{}/artifacts/1/zip", base),
            workflow_run: None,
        };

        let bytes = local_client(&base).download(&artifact).unwrap();
        server.join().unwrap();

        assert_eq!(bytes, b"PK-archive".to_vec());
    }
}
