//! Task status polling.
//!
//! A submitted job is polled on a fixed cadence until it reaches a terminal
//! status or a fetch fails. Only one task is polled at a time; starting a new
//! poll cancels the previous timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{SummarizerApi, TaskInfo};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const NETWORK_ERROR: &str = "Network error while fetching task status";

/// Outcome of a single status fetch, tagged with the task it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Status { task_id: String, task: TaskInfo },
    Error { task_id: String, message: String },
}

impl PollEvent {
    pub fn task_id(&self) -> &str {
        match self {
            PollEvent::Status { task_id, .. } | PollEvent::Error { task_id, .. } => task_id,
        }
    }
}

pub struct TaskPoller<A: SummarizerApi> {
    api: Arc<A>,
    runtime: Handle,
    interval: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<A: SummarizerApi> TaskPoller<A> {
    pub fn new(api: Arc<A>, runtime: Handle, interval: Duration) -> Self {
        Self {
            api,
            runtime,
            interval,
            timer: None,
        }
    }

    /// Cancel any running poll, fetch `task_id` now, then every interval
    /// until the task is completed/failed or a fetch fails.
    pub fn start_polling<F>(&mut self, task_id: &str, on_event: F)
    where
        F: Fn(PollEvent) + Send + 'static,
    {
        self.cancel_timer();
        log::info!("Polling task {task_id} every {:?}", self.interval);

        let api = self.api.clone();
        let interval = self.interval;
        let task_id = task_id.to_string();

        let timer = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                // first tick completes immediately
                ticker.tick().await;

                match api.task_status(&task_id).await {
                    Ok(task) => {
                        let terminal = task.status.is_terminal();
                        log::debug!(
                            "Task {task_id}: {:?} {:.0}% {}",
                            task.status,
                            task.progress,
                            task.message
                        );
                        on_event(PollEvent::Status {
                            task_id: task_id.clone(),
                            task,
                        });
                        if terminal {
                            log::info!("Task {task_id} reached a terminal status");
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("Status fetch for {task_id} failed: {e}");
                        on_event(PollEvent::Error {
                            task_id: task_id.clone(),
                            message: e.user_message(NETWORK_ERROR),
                        });
                        break;
                    }
                }
            }
        });
        self.timer = Some(timer);
    }

    /// Cancel the timer. Callers clear their [`TaskState`] alongside.
    pub fn stop_polling(&mut self) {
        if self.cancel_timer() {
            log::info!("Polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn cancel_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.abort();
                true
            }
            None => false,
        }
    }
}

impl<A: SummarizerApi> Drop for TaskPoller<A> {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// In-memory view of the task being polled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    pub task_id: Option<String>,
    pub task_info: Option<TaskInfo>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl TaskState {
    /// Called when polling starts for `task_id`.
    pub fn begin(&mut self, task_id: &str) {
        *self = Self {
            task_id: Some(task_id.to_string()),
            task_info: None,
            is_loading: true,
            error: None,
        };
    }

    /// Apply a poll result. Returns `false` when the event belongs to a task
    /// that is no longer current.
    pub fn apply(&mut self, event: PollEvent) -> bool {
        if self.task_id.as_deref() != Some(event.task_id()) {
            log::debug!("Ignoring stale poll event for {}", event.task_id());
            return false;
        }
        match event {
            PollEvent::Status { task, .. } => {
                if task.status.is_terminal() {
                    self.is_loading = false;
                }
                self.task_info = Some(task);
                self.error = None;
            }
            PollEvent::Error { message, .. } => {
                self.error = Some(message);
                self.is_loading = false;
            }
        }
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{task, MockApi};
    use crate::api::TaskStatus;

    fn poller(api: &MockApi) -> TaskPoller<MockApi> {
        TaskPoller::new(Arc::new(api.clone()), Handle::current(), DEFAULT_POLL_INTERVAL)
    }

    fn channel() -> (
        impl Fn(PollEvent) + Send + 'static,
        async_channel::Receiver<PollEvent>,
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
    async fn follows_task_until_completed_then_stops() {
        let api = MockApi::with_statuses(vec![
            Ok(task("t1", TaskStatus::Pending, 0.0, "Queued")),
            Ok(task("t1", TaskStatus::Downloading, 20.0, "Downloading audio")),
            Ok(task("t1", TaskStatus::Completed, 100.0, "Done")),
            Ok(task("t1", TaskStatus::Completed, 100.0, "never fetched")),
        ]);
        let mut poller = poller(&api);
        let (on_event, rx) = channel();
        let mut state = TaskState::default();
        state.begin("t1");

        let started = tokio::time::Instant::now();
        poller.start_polling("t1", on_event);

        let first = rx.recv().await.unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert!(state.apply(first));
        let info = state.task_info.clone().unwrap();
        assert_eq!((info.status, info.percent()), (TaskStatus::Pending, 0));
        assert_eq!(info.message, "Queued");
        assert!(state.is_loading);

        let second = rx.recv().await.unwrap();
        assert!(started.elapsed() >= DEFAULT_POLL_INTERVAL);
        state.apply(second);
        let info = state.task_info.clone().unwrap();
        assert_eq!((info.status, info.percent()), (TaskStatus::Downloading, 20));
        assert_eq!(info.message, "Downloading audio");

        state.apply(rx.recv().await.unwrap());
        let info = state.task_info.clone().unwrap();
        assert_eq!(info.status, TaskStatus::Completed);
        assert_eq!(info.message, "Done");
        assert!(!state.is_loading);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.count("status:"), 3);
        assert!(!poller.is_polling());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn waits_a_full_interval_between_fetches() {
        let api = MockApi::with_statuses(vec![
            Ok(task("t1", TaskStatus::Pending, 0.0, "")),
            Ok(task("t1", TaskStatus::Transcribing, 50.0, "")),
        ]);
        let mut poller = poller(&api);
        let (on_event, rx) = channel();
        poller.start_polling("t1", on_event);

        rx.recv().await.unwrap();
        let early = tokio::time::timeout(Duration::from_millis(4_900), rx.recv()).await;
        assert!(early.is_err(), "second fetch fired before the interval");
        assert_eq!(api.count("status:"), 1);

        rx.recv().await.unwrap();
        assert_eq!(api.count("status:"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_status_stops_polling() {
        let mut failed = task("t1", TaskStatus::Failed, 40.0, "Transcription failed");
        failed.error = Some("audio too long".into());
        let api = MockApi::with_statuses(vec![Ok(failed), Ok(task("t1", TaskStatus::Pending, 0.0, ""))]);
        let mut poller = poller(&api);
        let (on_event, rx) = channel();
        poller.start_polling("t1", on_event);

        let mut state = TaskState::default();
        state.begin("t1");
        state.apply(rx.recv().await.unwrap());
        assert!(!state.is_loading);
        assert_eq!(
            state.task_info.as_ref().and_then(|t| t.error.as_deref()),
            Some("audio too long")
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.count("status:"), 1);
        assert!(!poller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_fetch_reports_error_and_stops() {
        let api = MockApi::with_statuses(vec![Err("Task not found".into())]);
        let mut poller = poller(&api);
        let (on_event, rx) = channel();
        poller.start_polling("gone", on_event);

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            PollEvent::Error {
                task_id: "gone".into(),
                message: "Task not found".into()
            }
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.count("status:"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_reads_as_network_error() {
        let api = MockApi::default();
        let mut poller = poller(&api);
        let (on_event, rx) = channel();
        poller.start_polling("t1", on_event);

        let mut state = TaskState::default();
        state.begin("t1");
        state.apply(rx.recv().await.unwrap());
        assert_eq!(state.error.as_deref(), Some(NETWORK_ERROR));
        assert!(!state.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_polling_cancels_the_timer() {
        let api = MockApi::with_statuses(
            (0..5)
                .map(|i| Ok(task("t1", TaskStatus::Downloading, i as f64 * 10.0, "")))
                .collect(),
        );
        let mut poller = poller(&api);
        let (on_event, rx) = channel();
        poller.start_polling("t1", on_event);
        rx.recv().await.unwrap();

        poller.stop_polling();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(api.count("status:"), 1);
        assert!(!poller.is_polling());
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_replaces_the_previous_poll() {
        let api = MockApi::with_statuses(vec![
            Ok(task("a", TaskStatus::Downloading, 10.0, "")),
            Ok(task("b", TaskStatus::Pending, 0.0, "")),
            Ok(task("b", TaskStatus::Completed, 100.0, "")),
        ]);
        let mut poller = poller(&api);
        let (on_a, rx_a) = channel();
        poller.start_polling("a", on_a);
        rx_a.recv().await.unwrap();

        let (on_b, rx_b) = channel();
        poller.start_polling("b", on_b);
        rx_b.recv().await.unwrap();
        rx_b.recv().await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(api.calls(), vec!["status:a", "status:b", "status:b"]);
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut state = TaskState::default();
        state.begin("current");
        let applied = state.apply(PollEvent::Status {
            task_id: "old".into(),
            task: task("old", TaskStatus::Completed, 100.0, ""),
        });
        assert!(!applied);
        assert!(state.task_info.is_none());
        assert!(state.is_loading);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = TaskState::default();
        state.begin("t1");
        state.apply(PollEvent::Error {
            task_id: "t1".into(),
            message: "boom".into(),
        });
        state.reset();
        assert_eq!(state, TaskState::default());
    }
}
