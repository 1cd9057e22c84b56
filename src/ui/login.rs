use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::AppModel;

/// Handles for the sign-in page.
#[derive(Clone)]
pub struct LoginPage {
    pub root: libadwaita::ToolbarView,
    pub username_row: libadwaita::EntryRow,
    pub password_row: libadwaita::PasswordEntryRow,
    pub sign_in_button: gtk4::Button,
    pub spinner: gtk4::Spinner,
    pub error_label: gtk4::Label,
}

pub fn build_login_page() -> LoginPage {
    let root = libadwaita::ToolbarView::new();
    root.add_top_bar(&libadwaita::HeaderBar::new());

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(24);
    content.set_margin_bottom(24);
    content.set_valign(gtk4::Align::Center);

    let title = gtk4::Label::new(Some("Podcast Summarizer"));
    title.add_css_class("title-1");
    content.append(&title);

    let subtitle = gtk4::Label::new(Some("AI-Powered Content Analysis"));
    subtitle.add_css_class("dim-label");
    content.append(&subtitle);

    let group = libadwaita::PreferencesGroup::new();
    group.set_title("Welcome Back");
    group.set_description(Some("Sign in to access your dashboard"));
    group.set_margin_top(12);

    let username_row = libadwaita::EntryRow::builder().title("Username").build();
    group.add(&username_row);

    let password_row = libadwaita::PasswordEntryRow::builder()
        .title("Password")
        .build();
    group.add(&password_row);

    content.append(&group);

    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error");
    error_label.set_wrap(true);
    error_label.set_visible(false);
    content.append(&error_label);

    let button_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    button_box.set_halign(gtk4::Align::Center);
    let spinner = gtk4::Spinner::new();
    let sign_in_button = gtk4::Button::builder()
        .label("Sign In")
        .sensitive(false)
        .build();
    sign_in_button.add_css_class("suggested-action");
    sign_in_button.add_css_class("pill");
    button_box.append(&spinner);
    button_box.append(&sign_in_button);
    content.append(&button_box);

    let clamp = libadwaita::Clamp::builder()
        .maximum_size(420)
        .child(&content)
        .build();
    root.set_content(Some(&clamp));

    LoginPage {
        root,
        username_row,
        password_row,
        sign_in_button,
        spinner,
        error_label,
    }
}

impl LoginPage {
    pub fn credentials(&self) -> (String, String) {
        (
            self.username_row.text().to_string(),
            self.password_row.text().to_string(),
        )
    }

    /// The button is only enabled with both fields filled and no request
    /// in flight.
    pub fn update_sign_in_sensitivity(&self, pending: bool) {
        let (username, password) = self.credentials();
        let filled = !username.trim().is_empty() && !password.trim().is_empty();
        self.sign_in_button.set_sensitive(filled && !pending);
    }

    pub fn clear_password(&self) {
        self.password_row.set_text("");
    }

    pub fn render(&self, model: &AppModel) {
        let pending = model.login_pending;
        self.username_row.set_sensitive(!pending);
        self.password_row.set_sensitive(!pending);
        self.spinner.set_spinning(pending);
        self.sign_in_button
            .set_label(if pending { "Signing in\u{2026}" } else { "Sign In" });
        self.update_sign_in_sensitivity(pending);

        match &model.login_error {
            Some(message) => {
                self.error_label.set_text(message);
                self.error_label.set_visible(true);
            }
            None => self.error_label.set_visible(false),
        }
    }
}
