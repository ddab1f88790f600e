//! Session authentication: cookie-based login/signout plus the `/me` probe
//! that refreshes the injected [`SessionStore`](crate::session::SessionStore).

use serde_json::json;

use crate::error::ClientError;
use crate::protocol::types::User;

use super::ChatClient;

impl ChatClient {
    /// Sign in with username/password. The backend answers with a session
    /// cookie that the transport's cookie jar holds for all later calls.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] on rejected credentials and
    /// [`ClientError::Transport`] when the request itself fails.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<(), ClientError> {
        let body = json!({ "userName": user_name, "password": password });
        self.request_unit(http::Method::POST, &self.routes().login(), Some(&body))
            .await?;
        tracing::info!(user_name, "logged in");
        Ok(())
    }

    /// Sign in as an ephemeral guest account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the backend rejects the request.
    pub async fn guest_login(&self) -> Result<(), ClientError> {
        self.request_unit(http::Method::POST, &self.routes().guest_login(), None)
            .await?;
        tracing::info!("logged in as guest");
        Ok(())
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the backend rejects the request (for
    /// example a taken username).
    pub async fn sign_up(
        &self,
        user_name: &str,
        password: &str,
        full_name: &str,
    ) -> Result<(), ClientError> {
        let body = json!({
            "userName": user_name,
            "password": password,
            "fullName": full_name,
        });
        self.request_unit(http::Method::POST, &self.routes().sign_up(), Some(&body))
            .await
    }

    /// End the session. Clears the session store regardless of whether the
    /// backend call succeeded, so local state never outlives the cookie.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the backend rejects the request.
    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let result = self
            .request_unit(http::Method::POST, &self.routes().sign_out(), None)
            .await;
        self.session().clear();
        result
    }

    /// Fetch the signed-in user and refresh the session store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when no session is active.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        let user: User = self
            .request_data(http::Method::GET, &self.routes().me(), None)
            .await?;
        self.session().set_user(Some(user.clone()));
        Ok(user)
    }
}
