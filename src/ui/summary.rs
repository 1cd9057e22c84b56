use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use gtk4::{gdk, glib};
use libadwaita::prelude::*;

use crate::api::Summary;
use crate::app::ImageBytes;
use crate::markdown;

#[derive(Clone)]
pub struct SummaryWidgets {
    pub group: libadwaita::PreferencesGroup,
    pub picture: gtk4::Picture,
    /// Bytes currently decoded into `picture`.
    shown_thumbnail: Rc<RefCell<Option<ImageBytes>>>,
    pub title_label: gtk4::Label,
    pub meta_label: gtk4::Label,
    pub body_label: gtk4::Label,
    pub copy_button: gtk4::Button,
    pub export_button: gtk4::Button,
    pub new_button: gtk4::Button,
}

/// "Channel · 42:10 · 2024-05-01", skipping whatever is unknown.
pub fn metadata_line(summary: &Summary) -> String {
    [
        &summary.channel,
        &summary.duration_string,
        &summary.release_date,
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.trim().is_empty())
    .map(String::as_str)
    .collect::<Vec<_>>()
    .join(" \u{00b7} ")
}

pub fn build_summary() -> SummaryWidgets {
    let group = libadwaita::PreferencesGroup::new();
    group.set_title("Summary");
    group.set_visible(false);

    let picture = gtk4::Picture::new();
    picture.set_can_shrink(true);
    picture.set_content_fit(gtk4::ContentFit::Cover);
    picture.set_height_request(180);
    picture.set_margin_bottom(8);
    picture.set_visible(false);
    group.add(&picture);

    let title_label = gtk4::Label::new(None);
    title_label.add_css_class("title-2");
    title_label.set_wrap(true);
    title_label.set_xalign(0.0);
    group.add(&title_label);

    let meta_label = gtk4::Label::new(None);
    meta_label.add_css_class("dim-label");
    meta_label.set_xalign(0.0);
    meta_label.set_margin_bottom(8);
    group.add(&meta_label);

    let body_label = gtk4::Label::new(None);
    body_label.set_wrap(true);
    body_label.set_xalign(0.0);
    body_label.set_selectable(true);
    body_label.set_margin_top(8);
    body_label.set_margin_bottom(8);
    group.add(&body_label);

    let actions = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    actions.set_halign(gtk4::Align::End);
    actions.set_margin_top(12);

    let copy_button = gtk4::Button::builder()
        .icon_name("edit-copy-symbolic")
        .tooltip_text("Copy to clipboard")
        .build();
    let export_button = gtk4::Button::builder()
        .icon_name("document-save-symbolic")
        .tooltip_text("Save as Markdown")
        .build();
    let new_button = gtk4::Button::builder().label("New Summary").build();
    new_button.add_css_class("suggested-action");

    actions.append(&copy_button);
    actions.append(&export_button);
    actions.append(&new_button);
    group.add(&actions);

    SummaryWidgets {
        group,
        picture,
        shown_thumbnail: Rc::new(RefCell::new(None)),
        title_label,
        meta_label,
        body_label,
        copy_button,
        export_button,
        new_button,
    }
}

impl SummaryWidgets {
    pub fn render(&self, summary: Option<&Summary>, thumbnail: Option<&ImageBytes>) {
        self.render_thumbnail(thumbnail);
        let Some(summary) = summary else {
            self.group.set_visible(false);
            return;
        };
        self.group.set_visible(true);
        self.title_label.set_text(&summary.title);

        let meta = metadata_line(summary);
        self.meta_label.set_text(&meta);
        self.meta_label.set_visible(!meta.is_empty());

        self.body_label.set_markup(&markdown::to_pango(&summary.content));
    }

    fn render_thumbnail(&self, thumbnail: Option<&ImageBytes>) {
        if self.shown_thumbnail.borrow().as_ref() == thumbnail {
            return;
        }
        *self.shown_thumbnail.borrow_mut() = thumbnail.cloned();

        let texture = thumbnail.and_then(|image| {
            gdk::Texture::from_bytes(&glib::Bytes::from(&image.0[..]))
                .inspect_err(|e| log::warn!("Could not decode thumbnail: {e}"))
                .ok()
        });
        self.picture.set_paintable(texture.as_ref());
        self.picture.set_visible(texture.is_some());
    }
}
