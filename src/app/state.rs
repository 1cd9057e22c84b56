use std::sync::Arc;

use crate::api::{ApiClient, User};
use crate::config::Config;
use crate::history::History;
use crate::poller::{PollEvent, TaskPoller};
use crate::session::SessionStorage;
use crate::ui::MainWindow;
use crate::validation::{UrlValidator, ValidationEvent};

use super::model::{AppModel, ImageBytes};

/// Events sent from the tokio runtime to the GTK main thread.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    LoginFinished(Result<(Option<String>, User), String>),
    Validation(ValidationEvent),
    /// Task id of the submitted job, or the message to show.
    SubmitFinished(Result<String, String>),
    Poll(PollEvent),
    /// Image bytes downloaded for a summary's thumbnail URL.
    ThumbnailLoaded {
        url: String,
        result: Result<ImageBytes, String>,
    },
}

/// Central application state. Lives on the GTK main thread inside Rc<RefCell<>>.
pub struct AppState {
    pub model: AppModel,
    pub history: History,
    pub api: Arc<ApiClient>,
    pub poller: TaskPoller<ApiClient>,
    pub validator: UrlValidator<ApiClient>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub backend_sender: async_channel::Sender<BackendEvent>,

    // UI handles
    pub window: Option<MainWindow>,
}

impl AppState {
    pub fn new(sender: async_channel::Sender<BackendEvent>) -> std::io::Result<Self> {
        let config = Config::load();
        let history = History::load();
        let session = SessionStorage::new();
        let tokio_rt = tokio::runtime::Runtime::new()?;

        log::info!("Using summarization API at {}", config.api_base_url);
        let api = Arc::new(ApiClient::new(&config.api_base_url, session.clone()));
        let poller = TaskPoller::new(api.clone(), tokio_rt.handle().clone(), config.poll_interval());
        let validator = UrlValidator::new(
            api.clone(),
            tokio_rt.handle().clone(),
            config.validation_debounce(),
        );

        Ok(Self {
            model: AppModel::new(session, config.default_detail_level),
            history,
            api,
            poller,
            validator,
            tokio_rt,
            backend_sender: sender,
            window: None,
        })
    }
}
