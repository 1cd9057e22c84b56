pub mod dashboard;
pub mod history;
pub mod login;
pub mod progress;
pub mod summary;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::{AppModel, AppState, View};
use dashboard::Dashboard;
use login::LoginPage;

/// Handles for the application window and both of its pages.
#[derive(Clone)]
pub struct MainWindow {
    pub window: libadwaita::ApplicationWindow,
    pub stack: gtk4::Stack,
    pub toast_overlay: libadwaita::ToastOverlay,
    pub login: LoginPage,
    pub dashboard: Dashboard,
}

pub fn build_window(app: &libadwaita::Application) -> MainWindow {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("Podcast Summarizer")
        .default_width(720)
        .default_height(760)
        .build();

    let login = login::build_login_page();
    let dashboard = dashboard::build_dashboard();

    let stack = gtk4::Stack::new();
    stack.set_transition_type(gtk4::StackTransitionType::Crossfade);
    stack.add_named(&login.root, Some("login"));
    stack.add_named(&dashboard.root, Some("main"));

    let toast_overlay = libadwaita::ToastOverlay::new();
    toast_overlay.set_child(Some(&stack));
    window.set_content(Some(&toast_overlay));

    MainWindow {
        window,
        stack,
        toast_overlay,
        login,
        dashboard,
    }
}

impl MainWindow {
    pub fn render(&self, model: &AppModel) {
        match model.view {
            View::Login => {
                self.stack.set_visible_child_name("login");
                self.login.render(model);
            }
            View::Main => {
                self.stack.set_visible_child_name("main");
                self.dashboard.render(model);
            }
        }
    }

    pub fn toast(&self, message: &str) {
        let toast = libadwaita::Toast::new(message);
        toast.set_timeout(2);
        self.toast_overlay.add_toast(toast);
    }

    pub fn copy_text(&self, text: &str) {
        self.window.clipboard().set_text(text);
    }
}

/// Push the current model into the widgets.
///
/// Setting widget values fires change handlers that borrow the state
/// mutably, so the state is snapshotted and released before rendering.
pub fn refresh(state: &Rc<RefCell<AppState>>) {
    let (model, window) = {
        let s = state.borrow();
        (s.model.clone(), s.window.clone())
    };
    if let Some(window) = window {
        window.render(&model);
    }
}
