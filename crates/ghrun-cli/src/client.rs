//! REST client for the Actions API.

use async_trait::async_trait;
use ghrun_core::{ActionsApi, Annotation, Error, Job, RepoRef, Result, Run};
use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;

const USER_AGENT: &str = "ghrun-cli";
const API_VERSION: &str = "2022-11-28";
const JOBS_PER_PAGE: u32 = 100;

/// Actions API client backed by `reqwest`.
pub struct GitHubClient {
    client: reqwest::Client,
    config: Config,
}

impl GitHubClient {
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));

        // Reject tokens that cannot travel in a header up front.
        let tokens = config
            .token
            .iter()
            .chain(config.file.hosts.iter().filter_map(|h| h.token.as_ref()));
        for token in tokens {
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| Error::InvalidInput("token contains invalid characters".to_string()))?;
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Request(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Base URL for requests about `repo`.
    fn base_url(&self, repo: &RepoRef) -> String {
        let base = self
            .config
            .api_url
            .clone()
            .or_else(|| self.config.host(&repo.host).and_then(|h| h.api_url.clone()))
            .unwrap_or_else(|| repo.api_base());
        base.trim_end_matches('/').to_string()
    }

    fn token(&self, repo: &RepoRef) -> Option<&str> {
        self.config
            .token
            .as_deref()
            .or_else(|| self.config.host(&repo.host).and_then(|h| h.token.as_deref()))
    }

    fn repo_url(&self, repo: &RepoRef, path: &str) -> String {
        format!("{}/repos/{}/{}", self.base_url(repo), repo.full_name(), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, repo: &RepoRef, url: &str) -> Result<T> {
        debug!(url = %url, "GET");

        let mut request = self.client.get(url);
        if let Some(token) = self.token(repo) {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Request(e.to_string()))?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Response");

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }
}

#[async_trait]
impl ActionsApi for GitHubClient {
    async fn get_run(&self, repo: &RepoRef, run_id: &str) -> Result<Run> {
        let url = self.repo_url(repo, &format!("actions/runs/{}", run_id));
        self.get_json(repo, &url).await
    }

    async fn get_jobs(&self, repo: &RepoRef, run: &Run) -> Result<Vec<Job>> {
        let jobs_url = if run.jobs_url.is_empty() {
            self.repo_url(repo, &format!("actions/runs/{}/jobs", run.id))
        } else {
            run.jobs_url.clone()
        };
        let url = format!("{}?per_page={}", jobs_url, JOBS_PER_PAGE);
        let body: JobsResponse = self.get_json(repo, &url).await?;
        Ok(body.jobs)
    }

    async fn get_annotations(&self, repo: &RepoRef, job: &Job) -> Result<Vec<Annotation>> {
        let url = self.repo_url(repo, &format!("check-runs/{}/annotations", job.id));
        let annotations: Vec<Annotation> = match self.get_json(repo, &url).await {
            Ok(annotations) => annotations,
            // Jobs without a check run have no annotations.
            Err(Error::NotFound(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(annotations
            .into_iter()
            .map(|a| Annotation {
                job_name: job.name.clone(),
                ..a
            })
            .collect())
    }

    async fn list_runs(&self, repo: &RepoRef, limit: u32) -> Result<Vec<Run>> {
        let url = self.repo_url(repo, &format!("actions/runs?per_page={}", limit));
        let body: RunsResponse = self.get_json(repo, &url).await?;
        Ok(body.workflow_runs)
    }
}

#[derive(Debug, Deserialize)]
struct JobsResponse {
    jobs: Vec<Job>,
}

#[derive(Debug, Deserialize)]
struct RunsResponse {
    workflow_runs: Vec<Run>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}
