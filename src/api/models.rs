use serde::{Deserialize, Serialize};

/// Content source type understood by the summarization API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Rss,
}

impl Platform {
    pub fn label(self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Rss => "Podcast RSS",
        }
    }
}

/// Lifecycle of a server-side summarization job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Downloading,
    Transcribing,
    Summarizing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Steps shown in the progress view, in pipeline order.
    pub const STEPS: [TaskStatus; 4] = [
        TaskStatus::Downloading,
        TaskStatus::Transcribing,
        TaskStatus::Summarizing,
        TaskStatus::Completed,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::Downloading => "Downloading",
            TaskStatus::Transcribing => "Transcribing",
            TaskStatus::Summarizing => "Summarizing",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TaskStatus::Pending => "Task is queued for processing",
            TaskStatus::Downloading => "Downloading audio content",
            TaskStatus::Transcribing => "Converting audio to text",
            TaskStatus::Summarizing => "Generating AI summary",
            TaskStatus::Completed => "Summary ready!",
            TaskStatus::Failed => "Processing failed",
        }
    }

    /// Position among [`TaskStatus::STEPS`]; `None` for pending and failed.
    fn step_index(self) -> Option<usize> {
        Self::STEPS.iter().position(|s| *s == self)
    }

    /// Whether `step` has already been passed while in this status.
    pub fn has_passed(self, step: TaskStatus) -> bool {
        match (self.step_index(), step.step_index()) {
            (Some(current), Some(step)) => current > step,
            _ => false,
        }
    }
}

/// Payload attached to a completed task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskResult {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub duration_string: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub task_id: String,
    pub status: TaskStatus,
    pub progress: f64,
    #[serde(default)]
    pub message: String,
    pub created_at: f64,
    pub updated_at: f64,
    #[serde(default)]
    pub result: Option<TaskResult>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskInfo {
    /// "1a2b3c4d…" form used in the progress view.
    pub fn short_id(&self) -> String {
        let short: String = self.task_id.chars().take(8).collect();
        format!("{short}\u{2026}")
    }

    /// Progress as a whole percentage clamped to 0..=100.
    pub fn percent(&self) -> u32 {
        self.progress.clamp(0.0, 100.0).round() as u32
    }

    /// Local wall-clock time the task was created, e.g. "14:05:09".
    pub fn started_at(&self) -> Option<String> {
        chrono::DateTime::from_timestamp(self.created_at as i64, 0)
            .map(|utc| utc.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleEpisode {
    pub title: String,
    #[serde(default)]
    pub published: String,
}

/// Platform-specific metadata returned by a successful validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationData {
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub feed_title: Option<String>,
    #[serde(default)]
    pub episode_count: Option<u32>,
    #[serde(default)]
    pub sample_episodes: Vec<SampleEpisode>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
    pub data: Option<ValidationData>,
}

impl ValidationResult {
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

/// What a successful login hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    pub token: Option<String>,
    pub user: User,
}

/// Body of `POST /api/summarize`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummarizeRequest {
    pub source_url: String,
    pub episode_name: Option<String>,
    pub detail_level: f64,
    pub platform: Platform,
}

/// Completed summary as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub title: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub channel: Option<String>,
    pub duration_string: Option<String>,
    pub release_date: Option<String>,
}

impl From<TaskResult> for Summary {
    fn from(result: TaskResult) -> Self {
        let title = if result.title.trim().is_empty() {
            "Podcast Summary".to_string()
        } else {
            result.title
        };
        let content = if result.summary.trim().is_empty() {
            "No summary available.".to_string()
        } else {
            result.summary
        };
        Self {
            title,
            content,
            thumbnail: result.thumbnail,
            channel: result.channel,
            duration_string: result.duration_string,
            release_date: result.release_date,
        }
    }
}

// Wire envelopes.

#[derive(Debug, Deserialize)]
pub(super) struct LoginEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ValidateEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ValidationData>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SummarizeEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}

impl SummarizeEnvelope {
    /// Server-provided reason, preferring `error` over the `errors` list.
    pub fn reason(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        let joined = self
            .errors
            .iter()
            .filter_map(|e| match e {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Object(o) => o
                    .get("msg")
                    .and_then(|m| m.as_str())
                    .map(str::to_string),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; ");
        (!joined.is_empty()).then_some(joined)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct StatusEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub task: Option<TaskInfo>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_info_parses_server_payload() {
        let json = r###"{
            "task_id": "3f2a9c1e-77aa-4b1c-9d2e-000000000000",
            "status": "completed",
            "progress": 100.0,
            "message": "Done",
            "created_at": 1719000000.5,
            "updated_at": 1719000100.0,
            "result": {
                "title": "Episode 12",
                "summary": "## Key points",
                "channel": "The Show"
            }
        }"###;
        let task: TaskInfo = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.status.is_terminal());
        assert_eq!(task.short_id(), "3f2a9c1e\u{2026}");
        let result = task.result.unwrap();
        assert_eq!(result.channel.as_deref(), Some("The Show"));
        assert_eq!(result.thumbnail, None);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Downloading,
            TaskStatus::Transcribing,
            TaskStatus::Summarizing,
        ] {
            assert!(!status.is_terminal(), "{status:?}");
        }
        assert!(TaskStatus::Failed.is_terminal());
    }

    #[test]
    fn steps_passed_follow_pipeline_order() {
        assert!(TaskStatus::Summarizing.has_passed(TaskStatus::Downloading));
        assert!(!TaskStatus::Summarizing.has_passed(TaskStatus::Summarizing));
        assert!(!TaskStatus::Pending.has_passed(TaskStatus::Downloading));
        assert!(!TaskStatus::Failed.has_passed(TaskStatus::Downloading));
    }

    #[test]
    fn percent_is_rounded_and_clamped() {
        let mut task: TaskInfo = serde_json::from_str(
            r#"{"task_id":"t","status":"downloading","progress":33.6,"created_at":0,"updated_at":0}"#,
        )
        .unwrap();
        assert_eq!(task.percent(), 34);
        task.progress = 140.0;
        assert_eq!(task.percent(), 100);
    }

    #[test]
    fn summary_falls_back_to_defaults() {
        let summary = Summary::from(TaskResult {
            title: String::new(),
            summary: "  ".into(),
            thumbnail: None,
            channel: None,
            duration_string: None,
            release_date: None,
        });
        assert_eq!(summary.title, "Podcast Summary");
        assert_eq!(summary.content, "No summary available.");
    }

    #[test]
    fn summarize_reason_joins_error_list() {
        let envelope: SummarizeEnvelope = serde_json::from_str(
            r#"{"success":false,"errors":["source_url is required",{"msg":"detail_level out of range"}]}"#,
        )
        .unwrap();
        assert_eq!(
            envelope.reason().as_deref(),
            Some("source_url is required; detail_level out of range")
        );
    }

    #[test]
    fn summarize_request_serializes_platform_lowercase() {
        let body = serde_json::to_value(SummarizeRequest {
            source_url: "https://youtu.be/abc".into(),
            episode_name: None,
            detail_level: 0.5,
            platform: Platform::Youtube,
        })
        .unwrap();
        assert_eq!(body["platform"], "youtube");
        assert!(body["episode_name"].is_null());
    }
}
