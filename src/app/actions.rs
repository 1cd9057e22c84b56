//! User-initiated actions. Each one updates the model, dispatches any
//! network work on the tokio runtime, and refreshes the window.

use std::cell::RefCell;
use std::rc::Rc;

use super::model::ImageBytes;
use super::state::{AppState, BackendEvent};
use crate::api::{Platform, SummarizerApi};
use crate::ui;

pub fn dispatch_login(state: &Rc<RefCell<AppState>>, username: String, password: String) {
    {
        let mut s = state.borrow_mut();
        if username.trim().is_empty() || password.trim().is_empty() {
            return;
        }
        if !s.model.begin_login() {
            log::info!("Login already in progress");
            return;
        }

        let api = s.api.clone();
        let sender = s.backend_sender.clone();
        s.tokio_rt.spawn(async move {
            let result = crate::auth::request_login(api.as_ref(), &username, &password).await;
            let _ = sender.send(BackendEvent::LoginFinished(result)).await;
        });
    }
    ui::refresh(state);
}

pub fn logout(state: &Rc<RefCell<AppState>>) {
    let window = {
        let mut s = state.borrow_mut();
        s.poller.stop_polling();
        s.validator.cancel();
        s.model.logout();
        s.window.clone()
    };
    if let Some(window) = window {
        window.login.clear_password();
    }
    ui::refresh(state);
}

pub fn set_platform(state: &Rc<RefCell<AppState>>, platform: Platform) {
    {
        let mut s = state.borrow_mut();
        if s.model.form.platform == platform {
            return;
        }
        s.validator.cancel();
        s.model.set_platform(platform);
    }
    ui::refresh(state);
}

/// Record the new URL and restart the validation idle timer.
pub fn url_changed(state: &Rc<RefCell<AppState>>, url: String) {
    {
        let mut s = state.borrow_mut();
        if s.model.form.url == url {
            return;
        }
        s.model.set_url(&url);
        if s.validator.is_validating() {
            log::debug!("URL edited while an earlier validation is in flight");
        }

        let platform = s.model.form.platform;
        let sender = s.backend_sender.clone();
        s.validator.input_changed(&url, platform, move |event| {
            let _ = sender.try_send(BackendEvent::Validation(event));
        });
    }
    ui::refresh(state);
}

/// Queue a fresh validation of the URL currently in the form.
pub fn revalidate(state: &Rc<RefCell<AppState>>) {
    let mut s = state.borrow_mut();
    let url = s.model.form.url.clone();
    let platform = s.model.form.platform;
    let sender = s.backend_sender.clone();
    log::info!("Revalidating {url}");
    s.validator.input_changed(&url, platform, move |event| {
        let _ = sender.try_send(BackendEvent::Validation(event));
    });
}

pub fn episode_changed(state: &Rc<RefCell<AppState>>, episode: String) {
    {
        let mut s = state.borrow_mut();
        if s.model.form.episode_name == episode {
            return;
        }
        s.model.form.episode_name = episode;
    }
    ui::refresh(state);
}

pub fn detail_changed(state: &Rc<RefCell<AppState>>, level: f64) {
    {
        let mut s = state.borrow_mut();
        let snapped = crate::form::snap_detail(level);
        if s.model.form.detail_level == snapped && snapped == level {
            return;
        }
        s.model.form.detail_level = snapped;
    }
    ui::refresh(state);
}

/// Submit the form. Incomplete forms only show a message; nothing is sent.
pub fn dispatch_submit(state: &Rc<RefCell<AppState>>) {
    {
        let mut s = state.borrow_mut();
        if s.model.is_busy() {
            return;
        }
        match s.model.begin_submit() {
            Ok(request) => {
                log::info!(
                    "Submitting {} ({:?}, detail {})",
                    request.source_url,
                    request.platform,
                    request.detail_level
                );
                let api = s.api.clone();
                let sender = s.backend_sender.clone();
                s.tokio_rt.spawn(async move {
                    let result = api.summarize(&request).await.map_err(|e| {
                        log::error!("Summarization request failed: {e}");
                        e.user_message(
                            "Failed to connect to the summarization service. \
                             Please check your connection and try again.",
                        )
                    });
                    let _ = sender.send(BackendEvent::SubmitFinished(result)).await;
                });
            }
            Err(e) => log::info!("Form incomplete: {e}"),
        }
    }
    ui::refresh(state);
}

pub fn start_polling(state: &Rc<RefCell<AppState>>, task_id: &str) {
    let mut s = state.borrow_mut();
    if s.poller.is_polling() {
        log::info!("Replacing the running poll with {task_id}");
    }
    let sender = s.backend_sender.clone();
    s.poller.start_polling(task_id, move |event| {
        let _ = sender.try_send(BackendEvent::Poll(event));
    });
}

/// Download a summary thumbnail in the background. Only web URLs are fetched.
pub fn load_thumbnail(state: &Rc<RefCell<AppState>>, url: String) {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        log::debug!("Skipping thumbnail with unsupported URL: {url}");
        return;
    }
    let s = state.borrow();
    let api = s.api.clone();
    let sender = s.backend_sender.clone();
    s.tokio_rt.spawn(async move {
        let result = api
            .fetch_bytes(&url)
            .await
            .map(ImageBytes::from)
            .map_err(|e| e.to_string());
        let _ = sender.send(BackendEvent::ThumbnailLoaded { url, result }).await;
    });
}

/// Abandon the current job (if any) and return to an empty form.
pub fn new_summary(state: &Rc<RefCell<AppState>>) {
    {
        let mut s = state.borrow_mut();
        s.poller.stop_polling();
        s.validator.cancel();
        s.model.reset_job();
    }
    ui::refresh(state);
}

pub fn copy_summary(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    let (Some(summary), Some(window)) = (&s.model.summary, &s.window) else {
        return;
    };
    window.copy_text(&summary.content);
    window.toast("Summary copied to clipboard");
}

pub fn export_summary(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    let (Some(summary), Some(window)) = (&s.model.summary, &s.window) else {
        return;
    };
    match crate::export::export_summary(summary) {
        Ok(path) => window.toast(&format!("Saved to {}", path.display())),
        Err(e) => {
            log::error!("Export failed: {e}");
            window.toast(&format!("Export failed: {e}"));
        }
    }
}

pub fn show_history(state: &Rc<RefCell<AppState>>) {
    let s = state.borrow();
    if let Some(window) = &s.window {
        ui::history::show_history_window(&window.window, &s.history.entries);
    }
}
