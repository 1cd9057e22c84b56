use crate::api::{Platform, SummarizeRequest, Summary, TaskStatus};
use crate::auth::Auth;
use crate::form::{FormError, SourceForm};
use crate::poller::TaskState;
use crate::session::SessionStorage;
use crate::validation::{ValidationEvent, ValidationOutcome};

use std::fmt;
use std::sync::Arc;

use super::state::BackendEvent;

/// Which page the window shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Main,
}

/// Side effect the GTK side must carry out after an event is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Validate the current URL again; a result for an older URL arrived.
    Revalidate,
    StartPolling(String),
    StopPolling,
    SummaryReady {
        summary: Summary,
        source_url: String,
        platform: Platform,
    },
}

/// Encoded image data, shared so model snapshots stay cheap.
#[derive(Clone, PartialEq)]
pub struct ImageBytes(pub Arc<[u8]>);

impl fmt::Debug for ImageBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageBytes({} bytes)", self.0.len())
    }
}

impl From<Vec<u8>> for ImageBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes.into())
    }
}

/// Everything the window displays, free of GTK types.
#[derive(Debug, Clone)]
pub struct AppModel {
    pub view: View,
    pub auth: Auth,
    pub login_pending: bool,
    pub login_error: Option<String>,

    pub form: SourceForm,
    pub validating: bool,
    pub validation: Option<ValidationOutcome>,
    pub submitting: bool,
    pub submit_error: Option<String>,

    pub task: TaskState,
    /// Source of the job being polled, kept for the history entry.
    pub job_source: Option<SummarizeRequest>,
    pub summary: Option<Summary>,
    pub thumbnail: Option<ImageBytes>,
}

impl AppModel {
    pub fn new(session: SessionStorage, default_detail: f64) -> Self {
        Self {
            view: View::Login,
            auth: Auth::new(session),
            login_pending: false,
            login_error: None,
            form: SourceForm::new(default_detail),
            validating: false,
            validation: None,
            submitting: false,
            submit_error: None,
            task: TaskState::default(),
            job_source: None,
            summary: None,
            thumbnail: None,
        }
    }

    /// Mark a login request as in flight. Returns false if one already is.
    pub fn begin_login(&mut self) -> bool {
        if self.login_pending {
            return false;
        }
        self.login_pending = true;
        self.login_error = None;
        true
    }

    /// Validate the form and, if complete, mark a submission in flight.
    pub fn begin_submit(&mut self) -> Result<SummarizeRequest, FormError> {
        match self.form.submission() {
            Ok(request) => {
                self.submitting = true;
                self.submit_error = None;
                self.job_source = Some(request.clone());
                Ok(request)
            }
            Err(e) => {
                self.submit_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        self.submitting || self.task.is_loading
    }

    pub fn set_platform(&mut self, platform: Platform) {
        if self.form.platform != platform {
            self.form.set_platform(platform);
            self.clear_validation();
            self.submit_error = None;
        }
    }

    pub fn set_url(&mut self, url: &str) {
        self.form.set_url(url);
    }

    /// Drop the finished or failed job and go back to an empty form.
    pub fn reset_job(&mut self) {
        self.task.reset();
        self.summary = None;
        self.thumbnail = None;
        self.job_source = None;
        self.submitting = false;
        self.submit_error = None;
        self.form.reset();
        self.clear_validation();
    }

    /// Always clears the token and returns to the login view.
    pub fn logout(&mut self) {
        self.auth.logout();
        self.reset_job();
        self.view = View::Login;
        self.login_pending = false;
        self.login_error = None;
    }

    fn clear_validation(&mut self) {
        self.validation = None;
        self.validating = false;
    }

    pub fn apply(&mut self, event: BackendEvent) -> Effect {
        match event {
            BackendEvent::LoginFinished(result) => {
                self.login_pending = false;
                match result {
                    Ok((token, user)) => {
                        self.auth.sign_in(token.as_deref(), user);
                        self.login_error = None;
                        self.view = View::Main;
                    }
                    Err(message) => self.login_error = Some(message),
                }
                Effect::None
            }
            BackendEvent::Validation(event) => self.apply_validation(event),
            BackendEvent::SubmitFinished(result) => {
                if !self.submitting {
                    log::info!("Ignoring result of an abandoned submission: {result:?}");
                    return Effect::None;
                }
                self.submitting = false;
                match result {
                    Ok(task_id) => {
                        self.task.begin(&task_id);
                        Effect::StartPolling(task_id)
                    }
                    Err(message) => {
                        self.submit_error = Some(message);
                        self.job_source = None;
                        Effect::None
                    }
                }
            }
            BackendEvent::ThumbnailLoaded { url, result } => {
                let current = self
                    .summary
                    .as_ref()
                    .and_then(|summary| summary.thumbnail.as_deref());
                if current != Some(url.as_str()) {
                    log::debug!("Ignoring thumbnail for a summary no longer shown: {url}");
                    return Effect::None;
                }
                match result {
                    Ok(bytes) => self.thumbnail = Some(bytes),
                    Err(e) => log::warn!("Thumbnail {url} unavailable: {e}"),
                }
                Effect::None
            }
            BackendEvent::Poll(event) => {
                if !self.task.apply(event) {
                    return Effect::None;
                }
                if self.task.error.is_some() {
                    return Effect::StopPolling;
                }
                self.completed_summary()
            }
        }
    }

    /// A result for an older URL is still displayed, but it never marks the
    /// current URL as valid.
    fn apply_validation(&mut self, event: ValidationEvent) -> Effect {
        match event {
            ValidationEvent::Cleared => {
                self.clear_validation();
                self.form.url_valid = false;
                Effect::None
            }
            ValidationEvent::Started { .. } => {
                self.validating = true;
                Effect::None
            }
            ValidationEvent::Finished(outcome) => {
                self.validating = false;
                let current = self.form.url.trim().to_string();
                let stale = outcome.url != current;
                if stale {
                    log::warn!(
                        "Validation result for {} arrived after the URL changed to {current}",
                        outcome.url,
                    );
                    self.form.url_valid = false;
                } else {
                    self.form.url_valid = outcome.result.valid;
                }
                let revalidate = stale && !current.is_empty();
                self.validation = Some(outcome);
                if revalidate {
                    Effect::Revalidate
                } else {
                    Effect::None
                }
            }
        }
    }

    fn completed_summary(&mut self) -> Effect {
        let Some(info) = &self.task.task_info else {
            return Effect::None;
        };
        if info.status != TaskStatus::Completed || self.summary.is_some() {
            return Effect::None;
        }
        let summary = Summary::from(info.result.clone().unwrap_or_default());
        self.summary = Some(summary.clone());
        match &self.job_source {
            Some(source) => Effect::SummaryReady {
                summary,
                source_url: source.source_url.clone(),
                platform: source.platform,
            },
            None => Effect::None,
        }
    }
}
