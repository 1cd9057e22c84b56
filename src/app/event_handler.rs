use std::cell::RefCell;
use std::rc::Rc;

use super::actions::{load_thumbnail, revalidate, start_polling};
use super::model::Effect;
use super::state::{AppState, BackendEvent};
use crate::ui;

/// Handle a backend event. This is the core state machine.
pub fn handle_backend_event(state: &Rc<RefCell<AppState>>, event: BackendEvent) {
    log::debug!("Backend event: {event:?}");
    let effect = state.borrow_mut().model.apply(event);

    match effect {
        Effect::None => {}
        Effect::Revalidate => revalidate(state),
        Effect::StartPolling(task_id) => start_polling(state, &task_id),
        Effect::StopPolling => state.borrow_mut().poller.stop_polling(),
        Effect::SummaryReady {
            summary,
            source_url,
            platform,
        } => {
            log::info!("Summary ready: {}", summary.title);
            {
                let mut s = state.borrow_mut();
                s.history.record(&summary, &source_url, platform);
                if let Err(e) = s.history.save() {
                    log::warn!("Failed to save history: {e}");
                }
            }
            if let Some(url) = summary.thumbnail {
                load_thumbnail(state, url);
            }
        }
    }

    ui::refresh(state);
}
