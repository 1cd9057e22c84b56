use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::api::TaskStatus;
use crate::poller::TaskState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Done,
    Current,
    Waiting,
}

impl StepState {
    fn icon(self) -> Option<&'static str> {
        match self {
            StepState::Done => Some("object-select-symbolic"),
            StepState::Current => Some("emblem-synchronizing-symbolic"),
            StepState::Waiting => None,
        }
    }
}

/// Where `step` stands while the task is in `current`.
pub fn step_state(current: TaskStatus, step: TaskStatus) -> StepState {
    if current == step {
        if step == TaskStatus::Completed {
            StepState::Done
        } else {
            StepState::Current
        }
    } else if current.has_passed(step) {
        StepState::Done
    } else {
        StepState::Waiting
    }
}

#[derive(Clone)]
pub struct ProgressWidgets {
    pub group: libadwaita::PreferencesGroup,
    pub status_row: libadwaita::ActionRow,
    pub percent_label: gtk4::Label,
    pub progress_bar: gtk4::ProgressBar,
    pub message_label: gtk4::Label,
    pub error_label: gtk4::Label,
    pub steps: Vec<(TaskStatus, libadwaita::ActionRow, gtk4::Image)>,
    pub id_row: libadwaita::ActionRow,
    pub started_row: libadwaita::ActionRow,
    pub start_over_button: gtk4::Button,
}

pub fn build_progress() -> ProgressWidgets {
    let group = libadwaita::PreferencesGroup::new();
    group.set_title("Processing Status");
    group.set_visible(false);

    let status_row = libadwaita::ActionRow::builder().title("Starting").build();
    let percent_label = gtk4::Label::new(Some("0%"));
    percent_label.add_css_class("dim-label");
    status_row.add_suffix(&percent_label);
    group.add(&status_row);

    let progress_bar = gtk4::ProgressBar::new();
    progress_bar.set_margin_top(8);
    progress_bar.set_margin_bottom(8);
    group.add(&progress_bar);

    let message_label = gtk4::Label::new(None);
    message_label.add_css_class("dim-label");
    message_label.set_wrap(true);
    message_label.set_xalign(0.0);
    group.add(&message_label);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error");
    error_label.set_wrap(true);
    error_label.set_xalign(0.0);
    error_label.set_visible(false);
    group.add(&error_label);

    let steps = TaskStatus::STEPS
        .iter()
        .map(|step| {
            let row = libadwaita::ActionRow::builder().title(step.label()).build();
            let icon = gtk4::Image::new();
            row.add_suffix(&icon);
            group.add(&row);
            (*step, row, icon)
        })
        .collect();

    let id_row = libadwaita::ActionRow::builder().title("Task ID").build();
    group.add(&id_row);
    let started_row = libadwaita::ActionRow::builder().title("Started").build();
    group.add(&started_row);

    let start_over_button = gtk4::Button::builder()
        .label("Start Over")
        .halign(gtk4::Align::End)
        .margin_top(12)
        .visible(false)
        .build();
    group.add(&start_over_button);

    ProgressWidgets {
        group,
        status_row,
        percent_label,
        progress_bar,
        message_label,
        error_label,
        steps,
        id_row,
        started_row,
        start_over_button,
    }
}

impl ProgressWidgets {
    pub fn render(&self, task: &TaskState, visible: bool) {
        self.group.set_visible(visible);
        if !visible {
            return;
        }

        let status = task.task_info.as_ref().map(|info| info.status);
        match &task.task_info {
            Some(info) => {
                self.status_row.set_title(info.status.label());
                self.status_row.set_subtitle(info.status.description());
                self.percent_label.set_text(&format!("{}%", info.percent()));
                self.progress_bar.set_fraction(f64::from(info.percent()) / 100.0);
                self.message_label.set_text(&info.message);
                self.message_label.set_visible(!info.message.is_empty());
                self.id_row.set_subtitle(&info.short_id());
                self.started_row
                    .set_subtitle(&info.started_at().unwrap_or_default());
            }
            None => {
                self.status_row.set_title("Starting");
                self.status_row.set_subtitle("Waiting for the first status update");
                self.percent_label.set_text("0%");
                self.progress_bar.set_fraction(0.0);
                self.message_label.set_visible(false);
                self.id_row
                    .set_subtitle(task.task_id.as_deref().unwrap_or_default());
                self.started_row.set_subtitle("");
            }
        }

        for (step, row, icon) in &self.steps {
            let state = status.map_or(StepState::Waiting, |current| step_state(current, *step));
            icon.set_icon_name(state.icon());
            if state == StepState::Waiting {
                row.add_css_class("dim-label");
            } else {
                row.remove_css_class("dim-label");
            }
        }

        let error = task.error.clone().or_else(|| {
            task.task_info
                .as_ref()
                .filter(|info| info.status == TaskStatus::Failed)
                .map(|info| info.error.clone().unwrap_or_else(|| "Processing failed".to_string()))
        });
        match &error {
            Some(message) => {
                self.error_label.set_text(message);
                self.error_label.set_visible(true);
            }
            None => self.error_label.set_visible(false),
        }
        self.start_over_button.set_visible(error.is_some());
    }
}
