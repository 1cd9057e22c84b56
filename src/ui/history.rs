use gtk4::glib;
use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::history::SummaryRecord;

/// Characters of the summary shown in a collapsed row.
const PREVIEW_CHARS: usize = 100;

fn preview(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
    let line = line.trim_start_matches('#').trim();
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}\u{2026}")
    } else {
        line.to_string()
    }
}

/// Row titles and subtitles are parsed as Pango markup.
fn row_text(text: &str) -> String {
    glib::markup_escape_text(text).to_string()
}

/// Show a window listing past summaries.
pub fn show_history_window(parent: &impl IsA<gtk4::Window>, history: &[SummaryRecord]) {
    let window = libadwaita::Window::builder()
        .title("Summary History")
        .default_width(560)
        .default_height(600)
        .transient_for(parent)
        .modal(true)
        .build();

    let toast_overlay = libadwaita::ToastOverlay::new();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let back_btn = gtk4::Button::from_icon_name("go-previous-symbolic");
    back_btn.set_tooltip_text(Some("Back to main"));
    let win_for_back = window.clone();
    back_btn.connect_clicked(move |_| {
        win_for_back.close();
    });
    header.pack_start(&back_btn);

    toolbar_view.add_top_bar(&header);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    if history.is_empty() {
        let empty_label = gtk4::Label::new(Some("No summaries yet."));
        empty_label.add_css_class("dim-label");
        empty_label.set_vexpand(true);
        empty_label.set_valign(gtk4::Align::Center);
        content.append(&empty_label);
    } else {
        let group = libadwaita::PreferencesGroup::new();
        group.set_title("Recent Summaries");
        group.set_description(Some(&format!("{} saved", history.len())));

        for record in history.iter().rev() {
            group.add(&build_summary_row(record, &toast_overlay));
        }

        content.append(&group);
    }

    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    toast_overlay.set_child(Some(&toolbar_view));
    window.set_content(Some(&toast_overlay));
    window.present();
}

fn build_summary_row(
    record: &SummaryRecord,
    toast_overlay: &libadwaita::ToastOverlay,
) -> libadwaita::ExpanderRow {
    let row = libadwaita::ExpanderRow::builder()
        .title(row_text(&record.title))
        .subtitle(row_text(&preview(&record.summary)))
        .build();

    let when = gtk4::Label::new(Some(&format!(
        "{} \u{00b7} {}",
        record.platform.label(),
        record.timestamp
    )));
    when.add_css_class("dim-label");
    row.add_suffix(&when);

    let copy_btn = gtk4::Button::from_icon_name("edit-copy-symbolic");
    copy_btn.set_valign(gtk4::Align::Center);
    copy_btn.set_tooltip_text(Some("Copy to clipboard"));

    let text_for_copy = record.summary.clone();
    let toast_for_copy = toast_overlay.clone();
    copy_btn.connect_clicked(move |btn| {
        btn.clipboard().set_text(&text_for_copy);
        let toast = libadwaita::Toast::new("Summary copied to clipboard");
        toast.set_timeout(2);
        toast_for_copy.add_toast(toast);
    });
    row.add_suffix(&copy_btn);

    let source_row = libadwaita::ActionRow::builder()
        .title("Source")
        .subtitle(row_text(&record.source_url))
        .subtitle_selectable(true)
        .build();
    row.add_row(&source_row);

    let full_text_row = libadwaita::ActionRow::new();
    let label = gtk4::Label::new(None);
    label.set_markup(&crate::markdown::to_pango(&record.summary));
    label.set_wrap(true);
    label.set_xalign(0.0);
    label.set_margin_top(4);
    label.set_margin_bottom(4);
    label.set_margin_start(8);
    label.set_margin_end(8);
    label.set_selectable(true);
    full_text_row.set_child(Some(&label));
    row.add_row(&full_text_row);

    row
}
