//! Actions API trait.
//!
//! The CLI talks to the remote service only through this trait, so commands can
//! be exercised against an in-memory implementation.

use async_trait::async_trait;

use crate::{Annotation, Job, RepoRef, Result, Run};

/// Read access to workflow runs.
#[async_trait]
pub trait ActionsApi: Send + Sync {
    /// Fetch a single run by its identifier.
    async fn get_run(&self, repo: &RepoRef, run_id: &str) -> Result<Run>;

    /// Fetch the jobs of a run, steps included, in the order the API returns them.
    async fn get_jobs(&self, repo: &RepoRef, run: &Run) -> Result<Vec<Job>>;

    /// Fetch the annotations attached to a job. Each annotation carries the job name.
    async fn get_annotations(&self, repo: &RepoRef, job: &Job) -> Result<Vec<Annotation>>;

    /// List the most recent runs of a repository, newest first.
    async fn list_runs(&self, repo: &RepoRef, limit: u32) -> Result<Vec<Run>>;
}
