//! Self-service password change with forced re-authentication.
//!
//! Validation runs entirely client-side and short-circuits on the first
//! failure. A successful change always terminates the client-held session
//! after a short delay that lets the success notification be perceived; the
//! termination itself is mandatory.

use super::surface_error;
use crate::api::{Error, Result, UsersApi};
use crate::notify::Notifier;
use crate::session::SessionStore;
use std::sync::Arc;
use std::time::Duration;

const MIN_PASSWORD_LEN: usize = 8;
const LOGOUT_DELAY: Duration = Duration::from_millis(1500);

pub struct PasswordChange {
    api: Arc<UsersApi>,
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
    /// Form fields, mirrored from whatever surface renders them.
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    logout_delay: Duration,
}

impl PasswordChange {
    #[must_use]
    pub fn new(api: Arc<UsersApi>, store: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            current_password: String::new(),
            new_password: String::new(),
            confirm_password: String::new(),
            logout_delay: LOGOUT_DELAY,
        }
    }

    /// Override the delay between the success notification and the forced
    /// logout. The delay is a UX accommodation; the logout is not.
    #[must_use]
    pub fn with_logout_delay(mut self, delay: Duration) -> Self {
        self.logout_delay = delay;
        self
    }

    /// First failure wins; later rules are not evaluated.
    /// # Errors
    /// Returns `Validation` with the user-facing message.
    pub fn validate_form(&self) -> Result<()> {
        if self.current_password.is_empty() {
            return Err(Error::validation("Current password is required"));
        }
        if self.new_password.is_empty() {
            return Err(Error::validation("New password is required"));
        }
        if self.new_password.len() < MIN_PASSWORD_LEN {
            return Err(Error::validation(
                "New password must be at least 8 characters",
            ));
        }
        if self.new_password == self.current_password {
            return Err(Error::validation(
                "New password must be different from the current one",
            ));
        }
        if self.new_password != self.confirm_password {
            return Err(Error::validation("Passwords do not match"));
        }
        Ok(())
    }

    /// Validate and submit. A validation failure returns to editing with a
    /// message and makes no network call. Success clears the fields,
    /// notifies, waits, then destroys the session so every subscribed
    /// surface reacts to the unauthenticated state.
    pub async fn submit(&mut self) {
        if let Err(err) = self.validate_form() {
            self.notifier.error(&err.to_string());
            return;
        }

        match self
            .api
            .change_my_password(&self.current_password, &self.new_password)
            .await
        {
            Ok(()) => {
                self.current_password.clear();
                self.new_password.clear();
                self.confirm_password.clear();
                self.notifier
                    .success("Password changed successfully, signing out");

                tokio::time::sleep(self.logout_delay).await;

                self.api.clear_token();
                self.store.clear_identity();
            }
            Err(err) => surface_error(&self.store, self.notifier.as_ref(), &err),
        }
    }
}
