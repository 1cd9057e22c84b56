pub mod actions;
mod event_handler;
mod model;
mod state;

pub use event_handler::handle_backend_event;
pub use model::{AppModel, ImageBytes, View};
pub use state::{AppState, BackendEvent};
