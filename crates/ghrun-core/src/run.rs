//! Workflow run, job, step and annotation types.
//!
//! These mirror the JSON returned by the Actions REST API. Everything here is a
//! read-only snapshot fetched once per command invocation.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle status of a run, job or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[display("queued")]
    Queued,
    #[display("in_progress")]
    InProgress,
    #[display("completed")]
    Completed,
    #[display("requested")]
    Requested,
    #[display("waiting")]
    Waiting,
    #[display("pending")]
    Pending,
    #[serde(other)]
    #[display("unknown")]
    Unknown,
}

impl Status {
    pub fn is_completed(&self) -> bool {
        matches!(self, Status::Completed)
    }
}

/// Terminal outcome of a run, job or step. Only meaningful once the status is
/// [`Status::Completed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    #[display("action_required")]
    ActionRequired,
    #[display("cancelled")]
    Cancelled,
    #[display("failure")]
    Failure,
    #[display("neutral")]
    Neutral,
    #[display("skipped")]
    Skipped,
    #[display("stale")]
    Stale,
    #[display("startup_failure")]
    StartupFailure,
    #[display("success")]
    Success,
    #[display("timed_out")]
    TimedOut,
    #[serde(other)]
    #[display("unknown")]
    Unknown,
}

impl Conclusion {
    pub fn is_failure(&self) -> bool {
        is_failure_state(Some(*self))
    }
}

/// Whether a conclusion counts as a failure.
///
/// Shared by every decision that depends on failure: step expansion for jobs,
/// the empty-jobs exit status and the final exit status of `run view`.
pub fn is_failure_state(conclusion: Option<Conclusion>) -> bool {
    matches!(
        conclusion,
        Some(
            Conclusion::ActionRequired
                | Conclusion::Failure
                | Conclusion::StartupFailure
                | Conclusion::TimedOut
        )
    )
}

/// The glyph class shown next to a run, job or step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Success,
    Failure,
    Neutral,
    Pending,
}

impl Symbol {
    pub fn for_state(status: Status, conclusion: Option<Conclusion>) -> Self {
        if !status.is_completed() {
            return Symbol::Pending;
        }
        match conclusion {
            Some(Conclusion::Success) => Symbol::Success,
            Some(Conclusion::Skipped | Conclusion::Cancelled | Conclusion::Neutral) => {
                Symbol::Neutral
            }
            _ => Symbol::Failure,
        }
    }
}

/// One execution of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_branch: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub head_sha: String,
    pub event: String,
    pub created_at: DateTime<Utc>,
    pub status: Status,
    pub conclusion: Option<Conclusion>,
    #[serde(default)]
    pub jobs_url: String,
    #[serde(rename = "html_url")]
    pub url: String,
}

/// A named group of steps executed as part of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub name: String,
    pub status: Status,
    pub conclusion: Option<Conclusion>,
    /// Steps in execution order. Never reordered.
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
    #[serde(rename = "html_url", default, deserialize_with = "null_as_default")]
    pub url: String,
}

/// A single action within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub name: String,
    #[serde(default)]
    pub number: u32,
    pub status: Status,
    pub conclusion: Option<Conclusion>,
}

/// Severity of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationLevel {
    #[display("failure")]
    Failure,
    #[display("warning")]
    Warning,
    #[display("notice")]
    Notice,
    #[serde(other)]
    #[display("unknown")]
    Unknown,
}

/// A diagnostic message attached to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Filled in from the owning job; the API does not return it.
    #[serde(default)]
    pub job_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default)]
    pub start_line: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(rename = "annotation_level")]
    pub level: AnnotationLevel,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_states() {
        assert!(is_failure_state(Some(Conclusion::Failure)));
        assert!(is_failure_state(Some(Conclusion::TimedOut)));
        assert!(is_failure_state(Some(Conclusion::StartupFailure)));
        assert!(is_failure_state(Some(Conclusion::ActionRequired)));

        assert!(!is_failure_state(Some(Conclusion::Success)));
        assert!(!is_failure_state(Some(Conclusion::Cancelled)));
        assert!(!is_failure_state(Some(Conclusion::Skipped)));
        assert!(!is_failure_state(None));
        assert!(Conclusion::Failure.is_failure());
        assert!(!Conclusion::Neutral.is_failure());
    }

    #[test]
    fn test_symbol_for_state() {
        assert_eq!(
            Symbol::for_state(Status::Completed, Some(Conclusion::Success)),
            Symbol::Success
        );
        assert_eq!(
            Symbol::for_state(Status::Completed, Some(Conclusion::Cancelled)),
            Symbol::Neutral
        );
        assert_eq!(
            Symbol::for_state(Status::Completed, Some(Conclusion::Skipped)),
            Symbol::Neutral
        );
        assert_eq!(
            Symbol::for_state(Status::Completed, Some(Conclusion::TimedOut)),
            Symbol::Failure
        );
        assert_eq!(
            Symbol::for_state(Status::InProgress, None),
            Symbol::Pending
        );
        // A conclusion is ignored until the status says completed.
        assert_eq!(
            Symbol::for_state(Status::Queued, Some(Conclusion::Failure)),
            Symbol::Pending
        );
    }

    #[test]
    fn test_deserialize_run() {
        let json = r#"{
            "id": 3456,
            "name": "CI",
            "head_branch": "trunk",
            "head_sha": "1234567890abcdef",
            "event": "push",
            "created_at": "2021-02-23T04:51:00Z",
            "status": "completed",
            "conclusion": "failure",
            "jobs_url": "https://api.github.com/repos/owner/repo/actions/runs/3456/jobs",
            "html_url": "https://github.com/owner/repo/actions/runs/3456"
        }"#;

        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.id, 3456);
        assert_eq!(run.head_branch, "trunk");
        assert_eq!(run.status, Status::Completed);
        assert_eq!(run.conclusion, Some(Conclusion::Failure));
        assert_eq!(run.url, "https://github.com/owner/repo/actions/runs/3456");
    }

    #[test]
    fn test_deserialize_unknown_and_null_values() {
        let json = r#"{
            "id": 10,
            "name": null,
            "head_branch": null,
            "event": "workflow_dispatch",
            "created_at": "2021-02-23T04:51:00Z",
            "status": "brand_new_status",
            "conclusion": null,
            "html_url": "https://github.com/owner/repo/actions/runs/10"
        }"#;

        let run: Run = serde_json::from_str(json).unwrap();
        assert_eq!(run.name, "");
        assert_eq!(run.head_branch, "");
        assert_eq!(run.status, Status::Unknown);
        assert_eq!(run.conclusion, None);
    }

    #[test]
    fn test_deserialize_job_preserves_step_order() {
        let json = r#"{
            "id": 20,
            "name": "build",
            "status": "completed",
            "conclusion": "success",
            "html_url": "https://github.com/owner/repo/runs/20",
            "steps": [
                {"name": "checkout", "number": 1, "status": "completed", "conclusion": "success"},
                {"name": "compile", "number": 2, "status": "completed", "conclusion": "success"},
                {"name": "archive", "number": 3, "status": "completed", "conclusion": "skipped"}
            ]
        }"#;

        let job: Job = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = job.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["checkout", "compile", "archive"]);
        assert_eq!(job.steps[2].conclusion, Some(Conclusion::Skipped));
    }

    #[test]
    fn test_deserialize_annotation() {
        let json = r#"{
            "path": "src/lib.rs",
            "start_line": 42,
            "end_line": 42,
            "annotation_level": "warning",
            "message": "unused variable"
        }"#;

        let annotation: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(annotation.level, AnnotationLevel::Warning);
        assert_eq!(annotation.start_line, 42);
        assert!(annotation.job_name.is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::InProgress.to_string(), "in_progress");
        assert_eq!(Conclusion::StartupFailure.to_string(), "startup_failure");
        assert_eq!(AnnotationLevel::Notice.to_string(), "notice");
    }
}
