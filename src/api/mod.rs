mod client;
mod error;
pub mod models;

use std::future::Future;

pub use client::ApiClient;
pub use error::ApiError;
pub use models::{
    AuthState, LoginGrant, Platform, SampleEpisode, Summary, SummarizeRequest, TaskInfo,
    TaskStatus, User, ValidationData, ValidationResult,
};

/// Operations the remote summarization service offers.
pub trait SummarizerApi: Send + Sync + 'static {
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<LoginGrant, ApiError>> + Send;

    /// A `success: false` answer is a valid result, not an error.
    fn validate(
        &self,
        url: &str,
        platform: Platform,
    ) -> impl Future<Output = Result<ValidationResult, ApiError>> + Send;

    /// Submit a job and return its task id.
    fn summarize(
        &self,
        request: &SummarizeRequest,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;

    fn task_status(&self, task_id: &str) -> impl Future<Output = Result<TaskInfo, ApiError>> + Send;
}
