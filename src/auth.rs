use crate::api::{AuthState, SummarizerApi, User};
use crate::session::SessionStorage;

/// Login gate: exchanges credentials for a bearer token kept in session
/// storage and tracks who is signed in.
#[derive(Debug, Clone, Default)]
pub struct Auth {
    session: SessionStorage,
    state: AuthState,
}

impl Auth {
    pub fn new(session: SessionStorage) -> Self {
        Self {
            session,
            state: AuthState::default(),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    /// Apply a successful login: store the token and mark the user signed in.
    pub fn sign_in(&mut self, token: Option<&str>, user: User) {
        if let Some(token) = token {
            self.session.set_token(token);
        }
        log::info!("Signed in as {} ({})", user.username, user.role);
        self.state = AuthState {
            is_authenticated: true,
            user: Some(user),
        };
    }

    /// Always clears the stored token and authentication state.
    pub fn logout(&mut self) {
        self.session.clear_token();
        self.state = AuthState::default();
        log::info!("Signed out");
    }
}

/// Ask the backend for a session. Returns the token and user, or the message
/// to show on the login form.
pub async fn request_login<A: SummarizerApi>(
    api: &A,
    username: &str,
    password: &str,
) -> Result<(Option<String>, User), String> {
    match api.login(username.trim(), password).await {
        Ok(grant) => Ok((grant.token, grant.user)),
        Err(e) => {
            log::warn!("Login failed: {e}");
            Err(e.user_message("Network error"))
        }
    }
}
