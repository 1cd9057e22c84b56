use gtk4::prelude::*;
use libadwaita::prelude::*;

use super::progress::{build_progress, ProgressWidgets};
use super::summary::{build_summary, SummaryWidgets};
use crate::api::Platform;
use crate::app::AppModel;
use crate::validation::ValidationOutcome;

/// Combo row order.
const PLATFORMS: [Platform; 2] = [Platform::Youtube, Platform::Rss];

/// Handles for the signed-in page.
#[derive(Clone)]
pub struct Dashboard {
    pub root: libadwaita::ToolbarView,
    pub window_title: libadwaita::WindowTitle,
    pub history_button: gtk4::Button,
    pub logout_button: gtk4::Button,
    pub form: SourceFormWidgets,
    pub progress: ProgressWidgets,
    pub summary: SummaryWidgets,
}

#[derive(Clone)]
pub struct SourceFormWidgets {
    pub group: libadwaita::PreferencesGroup,
    pub platform_row: libadwaita::ComboRow,
    pub url_row: libadwaita::EntryRow,
    pub validation_label: gtk4::Label,
    pub episode_row: libadwaita::EntryRow,
    pub detail_row: libadwaita::ActionRow,
    pub detail_scale: gtk4::Scale,
    pub button_box: gtk4::Box,
    pub submit_button: gtk4::Button,
    pub submit_spinner: gtk4::Spinner,
    pub error_label: gtk4::Label,
}

pub fn platform_at(index: u32) -> Platform {
    PLATFORMS
        .get(index as usize)
        .copied()
        .unwrap_or(Platform::Youtube)
}

fn platform_index(platform: Platform) -> u32 {
    PLATFORMS.iter().position(|p| *p == platform).unwrap_or(0) as u32
}

fn url_title(platform: Platform) -> &'static str {
    match platform {
        Platform::Youtube => "YouTube Video URL",
        Platform::Rss => "Podcast RSS Feed URL",
    }
}

/// Text shown under the URL field once a validation has finished.
pub fn validation_text(outcome: &ValidationOutcome) -> String {
    let result = &outcome.result;
    if !result.valid {
        return result
            .error
            .clone()
            .unwrap_or_else(|| "Invalid URL provided".to_string());
    }
    let Some(data) = &result.data else {
        return format!("Valid {} URL", outcome.platform.label());
    };

    match outcome.platform {
        Platform::Youtube => match &data.video_id {
            Some(id) => format!("Valid YouTube URL\nVideo ID: {id}"),
            None => "Valid YouTube URL".to_string(),
        },
        Platform::Rss => {
            let mut lines = vec![format!(
                "Valid podcast feed: {}",
                data.feed_title.as_deref().unwrap_or("Untitled feed")
            )];
            if let Some(count) = data.episode_count {
                lines.push(format!("{count} episodes available"));
            }
            for episode in data.sample_episodes.iter().take(3) {
                if episode.published.is_empty() {
                    lines.push(format!("\u{2022} {}", episode.title));
                } else {
                    lines.push(format!("\u{2022} {} ({})", episode.title, episode.published));
                }
            }
            lines.join("\n")
        }
    }
}

pub fn build_dashboard() -> Dashboard {
    let root = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let window_title = libadwaita::WindowTitle::new("Podcast Summarizer", "");
    header.set_title_widget(Some(&window_title));

    let history_button = gtk4::Button::from_icon_name("document-open-recent-symbolic");
    history_button.set_tooltip_text(Some("Summary history"));
    header.pack_start(&history_button);

    let logout_button = gtk4::Button::from_icon_name("system-log-out-symbolic");
    logout_button.set_tooltip_text(Some("Sign out"));
    header.pack_end(&logout_button);

    root.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    let form = build_source_form();
    content.append(&form.group);
    content.append(&form.error_label);
    content.append(&form.button_box);

    let progress = build_progress();
    content.append(&progress.group);

    let summary = build_summary();
    content.append(&summary.group);

    let clamp = libadwaita::Clamp::builder()
        .maximum_size(720)
        .child(&content)
        .build();
    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&clamp)
        .build();
    root.set_content(Some(&scrolled));

    Dashboard {
        root,
        window_title,
        history_button,
        logout_button,
        form,
        progress,
        summary,
    }
}

fn build_source_form() -> SourceFormWidgets {
    let group = libadwaita::PreferencesGroup::new();
    group.set_title("Podcast Source");
    group.set_description(Some("Choose a source and paste its link"));

    let platform_row = libadwaita::ComboRow::builder()
        .title("Source")
        .model(&gtk4::StringList::new(&["YouTube", "Other Podcasts (RSS)"]))
        .build();
    group.add(&platform_row);

    let url_row = libadwaita::EntryRow::builder()
        .title(url_title(Platform::Youtube))
        .build();
    group.add(&url_row);

    let validation_label = gtk4::Label::new(None);
    validation_label.set_wrap(true);
    validation_label.set_xalign(0.0);
    validation_label.set_margin_top(6);
    validation_label.set_visible(false);
    group.add(&validation_label);

    let episode_row = libadwaita::EntryRow::builder()
        .title("Episode Name")
        .visible(false)
        .build();
    group.add(&episode_row);

    let detail_scale = gtk4::Scale::with_range(gtk4::Orientation::Horizontal, 0.0, 1.0, 0.25);
    detail_scale.set_draw_value(false);
    detail_scale.set_width_request(220);
    detail_scale.set_valign(gtk4::Align::Center);
    detail_scale.add_mark(0.0, gtk4::PositionType::Bottom, Some("Shorter"));
    detail_scale.add_mark(1.0, gtk4::PositionType::Bottom, Some("Longer"));

    let detail_row = libadwaita::ActionRow::builder()
        .title("Summary Detail Level")
        .build();
    detail_row.add_suffix(&detail_scale);
    group.add(&detail_row);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error");
    error_label.set_wrap(true);
    error_label.set_xalign(0.0);
    error_label.set_visible(false);

    let button_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    button_box.set_halign(gtk4::Align::End);
    let submit_spinner = gtk4::Spinner::new();
    let submit_button = gtk4::Button::builder().label("Summarize").build();
    submit_button.add_css_class("suggested-action");
    submit_button.add_css_class("pill");
    button_box.append(&submit_spinner);
    button_box.append(&submit_button);

    SourceFormWidgets {
        group,
        platform_row,
        url_row,
        validation_label,
        episode_row,
        detail_row,
        detail_scale,
        button_box,
        submit_button,
        submit_spinner,
        error_label,
    }
}

impl Dashboard {
    pub fn render(&self, model: &AppModel) {
        match &model.auth.state().user {
            Some(user) => self
                .window_title
                .set_subtitle(&format!("{} ({})", user.username, user.role)),
            None => self.window_title.set_subtitle(""),
        }

        let has_job = model.task.task_id.is_some() || model.summary.is_some();
        self.form.render(model, !has_job);
        self.progress
            .render(&model.task, model.task.task_id.is_some() && model.summary.is_none());
        self.summary
            .render(model.summary.as_ref(), model.thumbnail.as_ref());
    }
}

impl SourceFormWidgets {
    /// Widget setters below only fire when the value differs, so the
    /// change handlers they trigger see the model already up to date.
    fn render(&self, model: &AppModel, visible: bool) {
        let form = &model.form;
        self.group.set_visible(visible);
        self.button_box.set_visible(visible);

        let index = platform_index(form.platform);
        if self.platform_row.selected() != index {
            self.platform_row.set_selected(index);
        }
        self.url_row.set_title(url_title(form.platform));
        if self.url_row.text().as_str() != form.url {
            self.url_row.set_text(&form.url);
        }
        self.episode_row.set_visible(form.platform == Platform::Rss);
        if self.episode_row.text().as_str() != form.episode_name {
            self.episode_row.set_text(&form.episode_name);
        }

        if (self.detail_scale.value() - form.detail_level).abs() > f64::EPSILON {
            self.detail_scale.set_value(form.detail_level);
        }
        self.detail_row.set_subtitle(&format!(
            "{} ({}%)",
            form.detail_label(),
            (form.detail_level * 100.0).round() as u32
        ));

        self.render_validation(model);

        let busy = model.is_busy();
        let ready = form.submission().is_ok();
        self.submit_button.set_sensitive(ready && !busy);
        self.submit_button
            .set_label(if model.submitting { "Submitting\u{2026}" } else { "Summarize" });
        self.submit_spinner.set_spinning(model.submitting);

        match &model.submit_error {
            Some(message) => {
                self.error_label.set_text(message);
                self.error_label.set_visible(visible);
            }
            None => self.error_label.set_visible(false),
        }
    }

    fn render_validation(&self, model: &AppModel) {
        let label = &self.validation_label;
        label.remove_css_class("success");
        label.remove_css_class("error");
        label.remove_css_class("dim-label");

        if model.validating {
            label.set_text("Validating URL\u{2026}");
            label.add_css_class("dim-label");
            label.set_visible(true);
            return;
        }
        match &model.validation {
            Some(outcome) => {
                label.set_text(&validation_text(outcome));
                label.add_css_class(if outcome.result.valid { "success" } else { "error" });
                label.set_visible(true);
            }
            None => label.set_visible(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{SampleEpisode, ValidationData, ValidationResult};

    fn outcome(platform: Platform, result: ValidationResult) -> ValidationOutcome {
        ValidationOutcome {
            url: "https://example.com".into(),
            platform,
            result,
        }
    }

    #[test]
    fn platform_rows_round_trip() {
        for platform in PLATFORMS {
            assert_eq!(platform_at(platform_index(platform)), platform);
        }
        assert_eq!(platform_at(9), Platform::Youtube);
    }

    #[test]
    fn youtube_validation_shows_video_id() {
        let text = validation_text(&outcome(
            Platform::Youtube,
            ValidationResult {
                valid: true,
                error: None,
                data: Some(ValidationData {
                    platform: "youtube".into(),
                    video_id: Some("dQw4w9WgXcQ".into()),
                    ..Default::default()
                }),
            },
        ));
        assert_eq!(text, "Valid YouTube URL\nVideo ID: dQw4w9WgXcQ");
    }

    #[test]
    fn rss_validation_lists_at_most_three_episodes() {
        let episodes = (1..=5)
            .map(|i| SampleEpisode {
                title: format!("Ep {i}"),
                published: String::new(),
            })
            .collect();
        let text = validation_text(&outcome(
            Platform::Rss,
            ValidationResult {
                valid: true,
                error: None,
                data: Some(ValidationData {
                    platform: "rss".into(),
                    feed_title: Some("The Show".into()),
                    episode_count: Some(5),
                    sample_episodes: episodes,
                    ..Default::default()
                }),
            },
        ));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Valid podcast feed: The Show");
        assert_eq!(lines[1], "5 episodes available");
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "\u{2022} Ep 3");
    }

    #[test]
    fn invalid_result_prefers_server_error() {
        let text = validation_text(&outcome(
            Platform::Youtube,
            ValidationResult::invalid("Not a YouTube link"),
        ));
        assert_eq!(text, "Not a YouTube link");

        let text = validation_text(&outcome(Platform::Rss, ValidationResult::default()));
        assert_eq!(text, "Invalid URL provided");
    }
}
