//! Debounced source URL validation.
//!
//! Every edit restarts an idle timer; once the input has been quiet for the
//! debounce window a single validation request is sent. Edits cancel pending
//! timers but never an in-flight request, so a slow answer for an older URL
//! can still arrive after a newer edit. Outcomes carry the URL they were
//! computed for.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::api::{Platform, SummarizerApi, ValidationResult};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub url: String,
    pub platform: Platform,
    pub result: ValidationResult,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationEvent {
    /// Input was emptied; nothing is valid and no request was made.
    Cleared,
    Started { url: String },
    Finished(ValidationOutcome),
}

/// Validate one URL against the backend, mapping every failure to a
/// displayable result.
pub async fn validate_url<A: SummarizerApi>(
    api: &A,
    url: &str,
    platform: Platform,
) -> ValidationResult {
    let url = url.trim();
    if url.is_empty() {
        return ValidationResult::invalid("URL is required");
    }
    match api.validate(url, platform).await {
        Ok(result) => result,
        Err(e) => {
            log::warn!("Validation request for {url} failed: {e}");
            ValidationResult::invalid(e.user_message("Network error during validation"))
        }
    }
}

pub struct UrlValidator<A: SummarizerApi> {
    api: Arc<A>,
    runtime: Handle,
    debounce: Duration,
    timer: Option<JoinHandle<()>>,
    in_flight: Arc<AtomicBool>,
}

impl<A: SummarizerApi> UrlValidator<A> {
    pub fn new(api: Arc<A>, runtime: Handle, debounce: Duration) -> Self {
        Self {
            api,
            runtime,
            debounce,
            timer: None,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_validating(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Feed the latest input. Restarts the idle timer; an empty input
    /// reports [`ValidationEvent::Cleared`] straight away.
    pub fn input_changed<F>(&mut self, url: &str, platform: Platform, on_event: F)
    where
        F: Fn(ValidationEvent) + Send + Sync + 'static,
    {
        self.cancel();

        let url = url.trim().to_string();
        if url.is_empty() {
            on_event(ValidationEvent::Cleared);
            return;
        }

        let api = self.api.clone();
        let in_flight = self.in_flight.clone();
        let debounce = self.debounce;
        let runtime = self.runtime.clone();
        let on_event = Arc::new(on_event);

        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;

            if in_flight.load(Ordering::SeqCst) {
                log::debug!("Validation already in flight, skipping {url}");
                return;
            }
            in_flight.store(true, Ordering::SeqCst);
            on_event(ValidationEvent::Started { url: url.clone() });

            // detached so later edits cannot cancel it
            runtime.spawn(async move {
                let result = validate_url(api.as_ref(), &url, platform).await;
                in_flight.store(false, Ordering::SeqCst);
                log::info!("Validated {url}: valid={}", result.valid);
                on_event(ValidationEvent::Finished(ValidationOutcome {
                    url,
                    platform,
                    result,
                }));
            });
        });
        self.timer = Some(timer);
    }

    /// Drop any pending timer without touching in-flight requests.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<A: SummarizerApi> Drop for UrlValidator<A> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::api::ValidationData;

    fn ok_youtube(video_id: &str) -> ValidationResult {
        ValidationResult {
            valid: true,
            error: None,
            data: Some(ValidationData {
                platform: "youtube".into(),
                video_id: Some(video_id.into()),
                ..Default::default()
            }),
        }
    }

    fn validator(api: &MockApi) -> UrlValidator<MockApi> {
        UrlValidator::new(Arc::new(api.clone()), Handle::current(), DEFAULT_DEBOUNCE)
    }

    fn channel() -> (
        impl Fn(ValidationEvent) + Send + Sync + Clone + 'static,
        async_channel::Receiver<ValidationEvent>,
    ) {
        let (tx, rx) = async_channel::unbounded();
        (
            move |event| {
                let _ = tx.try_send(event);
            },
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_fire_before_idle_window() {
        let api = MockApi::with_validations(vec![ok_youtube("abc")]);
        let mut validator = validator(&api);
        let (on_event, rx) = channel();
        let started = tokio::time::Instant::now();

        validator.input_changed("https://youtu.be/abc", Platform::Youtube, on_event);

        let early = tokio::time::timeout(Duration::from_millis(999), rx.recv()).await;
        assert!(early.is_err());
        assert_eq!(api.count("validate:"), 0);

        assert_eq!(
            rx.recv().await.unwrap(),
            ValidationEvent::Started {
                url: "https://youtu.be/abc".into()
            }
        );
        assert!(started.elapsed() >= DEFAULT_DEBOUNCE);

        let ValidationEvent::Finished(outcome) = rx.recv().await.unwrap() else {
            panic!("expected a finished validation");
        };
        assert!(outcome.result.valid);
        assert_eq!(outcome.url, "https://youtu.be/abc");
        assert_eq!(
            outcome.result.data.and_then(|d| d.video_id).as_deref(),
            Some("abc")
        );
        assert!(!validator.is_validating());
    }

    #[tokio::test(start_paused = true)]
    async fn each_keystroke_restarts_the_timer() {
        let api = MockApi::with_validations(vec![ok_youtube("abc")]);
        let mut validator = validator(&api);
        let (on_event, rx) = channel();

        for partial in ["https://y", "https://youtu.be/", "https://youtu.be/abc"] {
            validator.input_changed(partial, Platform::Youtube, on_event.clone());
            tokio::time::sleep(Duration::from_millis(600)).await;
        }
        assert_eq!(api.count("validate:"), 0);

        rx.recv().await.unwrap();
        rx.recv().await.unwrap();
        assert_eq!(api.calls(), vec!["validate:https://youtu.be/abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_input_cancels_pending_validation() {
        let api = MockApi::with_validations(vec![ok_youtube("abc")]);
        let mut validator = validator(&api);
        let (on_event, rx) = channel();

        validator.input_changed("https://youtu.be/abc", Platform::Youtube, on_event.clone());
        tokio::time::sleep(Duration::from_millis(500)).await;
        validator.input_changed("   ", Platform::Youtube, on_event);

        assert_eq!(rx.recv().await.unwrap(), ValidationEvent::Cleared);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(api.count("validate:"), 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn edits_during_a_request_are_skipped() {
        let mut api = MockApi::with_validations(vec![ok_youtube("first")]);
        api.validation_delay = Some(Duration::from_secs(3));
        let mut validator = validator(&api);
        let (on_event, rx) = channel();

        validator.input_changed("https://youtu.be/first", Platform::Youtube, on_event.clone());
        rx.recv().await.unwrap();
        assert!(validator.is_validating());

        tokio::time::sleep(Duration::from_millis(500)).await;
        validator.input_changed("https://youtu.be/second", Platform::Youtube, on_event);

        let ValidationEvent::Finished(outcome) = rx.recv().await.unwrap() else {
            panic!("expected a finished validation");
        };
        assert_eq!(outcome.url, "https://youtu.be/first");
        assert_eq!(api.count("validate:"), 1);
    }

    #[tokio::test]
    async fn empty_url_is_required_without_request() {
        let api = MockApi::default();
        let result = validate_url(&api, "  ", Platform::Rss).await;
        assert_eq!(result, ValidationResult::invalid("URL is required"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_reads_as_network_error() {
        let api = MockApi::default();
        let result = validate_url(&api, "https://feeds.example.com/a.xml", Platform::Rss).await;
        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Network error during validation")
        );
    }
}
