//! Stateful orchestrations of validation, network calls and user feedback.
//!
//! Workflows are the error boundary of the console: network failures are
//! surfaced through the notification sink and control returns to the
//! previous stable state. A rejected or expired credential additionally
//! destroys the client-held session.

pub mod password;
pub mod users_admin;

use crate::api::types::{User, UserStatus};
use crate::api::{Error, Result, UsersApi};
use crate::notify::Notifier;
use crate::session::SessionStore;
use secrecy::SecretString;
use tracing::warn;

/// Successful login: the resolved identity plus the issued token, which the
/// embedding surface may hand to its credential storage.
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

/// Report a workflow failure. An `Auth` error means the server no longer
/// honors our credential, so the session is destroyed before the message is
/// surfaced.
pub(crate) fn surface_error(store: &SessionStore, notifier: &dyn Notifier, err: &Error) {
    if err.is_auth() {
        warn!("credential rejected, clearing session");
        store.clear_identity();
    }
    notifier.error(&err.to_string());
}

/// Resolve the current identity at startup and install it into the store.
///
/// A failed fetch leaves the store unauthenticated; no fallback identity is
/// fabricated. A BLOCKED identity is never installed.
/// # Errors
/// Returns the directory-client error; the store is already cleared.
pub async fn hydrate(api: &UsersApi, store: &SessionStore) -> Result<User> {
    match api.get_current_user().await {
        Ok(user) if user.status == UserStatus::Blocked => {
            store.clear_identity();
            Err(Error::Auth("account is blocked".to_string()))
        }
        Ok(user) => {
            store.set_identity(user.clone());
            Ok(user)
        }
        Err(err) => {
            store.clear_identity();
            Err(err)
        }
    }
}

/// Sign in, stash the token in the client, resolve the identity and install
/// it into the store.
/// # Errors
/// Returns `Auth` when the credentials are rejected or the account is
/// blocked; the store stays unauthenticated in both cases.
pub async fn login(
    api: &UsersApi,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<LoginOutcome> {
    let response = api.sign_in(email, password).await?;
    api.set_token(SecretString::from(response.token.clone()));

    let user = match hydrate(api, store).await {
        Ok(user) => user,
        Err(err) => {
            api.clear_token();
            return Err(err);
        }
    };

    Ok(LoginOutcome {
        user,
        token: response.token,
    })
}

/// Drop the credential and the session; every subscriber observes the
/// unauthenticated state before this returns.
pub fn logout(api: &UsersApi, store: &SessionStore) {
    api.clear_token();
    store.clear_identity();
}
