mod api;
mod app;
mod auth;
mod config;
mod export;
mod form;
mod history;
mod markdown;
mod poller;
mod session;
mod ui;
mod validation;

use std::cell::RefCell;
use std::rc::Rc;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use app::{actions, AppState, BackendEvent};

fn main() {
    env_logger::init();
    log::info!("Podcast Summarizer starting");

    let application = libadwaita::Application::builder()
        .application_id("com.github.podcast-summarizer")
        .build();

    application.connect_activate(on_activate);
    application.run();
}

fn on_activate(app: &libadwaita::Application) {
    // Backend → UI channel
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let state = match AppState::new(backend_tx) {
        Ok(state) => Rc::new(RefCell::new(state)),
        Err(e) => {
            log::error!("Failed to start async runtime: {e}");
            app.quit();
            return;
        }
    };

    let window = ui::build_window(app);
    connect_login(&state, &window);
    connect_dashboard(&state, &window);

    let main_window = window.window.clone();
    state.borrow_mut().window = Some(window);
    ui::refresh(&state);
    main_window.present();

    // Attach backend event handler
    {
        let state_clone = state.clone();
        gtk4::glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }
}

fn connect_login(state: &Rc<RefCell<AppState>>, window: &ui::MainWindow) {
    let login = &window.login;

    let submit = {
        let state = state.clone();
        let login = login.clone();
        move || {
            let (username, password) = login.credentials();
            actions::dispatch_login(&state, username, password);
        }
    };

    {
        let login_clone = login.clone();
        let state = state.clone();
        let update = move || {
            let pending = state.borrow().model.login_pending;
            login_clone.update_sign_in_sensitivity(pending);
        };
        let update_password = update.clone();
        login.username_row.connect_changed(move |_| update());
        login.password_row.connect_changed(move |_| update_password());
    }

    let on_click = submit.clone();
    login.sign_in_button.connect_clicked(move |_| on_click());
    let on_username_enter = submit.clone();
    login
        .username_row
        .connect_entry_activated(move |_| on_username_enter());
    login.password_row.connect_entry_activated(move |_| submit());
}

fn connect_dashboard(state: &Rc<RefCell<AppState>>, window: &ui::MainWindow) {
    let dash = &window.dashboard;

    {
        let state = state.clone();
        dash.logout_button
            .connect_clicked(move |_| actions::logout(&state));
    }
    {
        let state = state.clone();
        dash.history_button
            .connect_clicked(move |_| actions::show_history(&state));
    }

    let form = &dash.form;
    {
        let state = state.clone();
        form.platform_row.connect_selected_notify(move |row| {
            actions::set_platform(&state, ui::dashboard::platform_at(row.selected()));
        });
    }
    {
        let state = state.clone();
        form.url_row.connect_changed(move |row| {
            actions::url_changed(&state, row.text().to_string());
        });
    }
    {
        let state = state.clone();
        form.episode_row.connect_changed(move |row| {
            actions::episode_changed(&state, row.text().to_string());
        });
    }
    {
        let state = state.clone();
        form.detail_scale.connect_value_changed(move |scale| {
            actions::detail_changed(&state, scale.value());
        });
    }
    {
        let state = state.clone();
        form.submit_button
            .connect_clicked(move |_| actions::dispatch_submit(&state));
    }
    {
        let state = state.clone();
        dash.progress
            .start_over_button
            .connect_clicked(move |_| actions::new_summary(&state));
    }

    let summary = &dash.summary;
    {
        let state = state.clone();
        summary
            .copy_button
            .connect_clicked(move |_| actions::copy_summary(&state));
    }
    {
        let state = state.clone();
        summary
            .export_button
            .connect_clicked(move |_| actions::export_summary(&state));
    }
    {
        let state = state.clone();
        summary
            .new_button
            .connect_clicked(move |_| actions::new_summary(&state));
    }
}
