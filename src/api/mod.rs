//! Typed client for the user-directory REST surface.
//!
//! Every operation maps 1:1 to a server endpoint under `/api/v1/users`. The
//! client attaches the bearer token from its credential slot and never
//! assumes an optimistic view of server state; callers re-fetch after every
//! mutation.

pub mod error;
pub mod types;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::sync::RwLock;
use tracing::{debug, info_span, Instrument};
use url::Url;

pub use error::{Error, Result};
use types::{
    ChangeMyPasswordRequest, ChangeUserPasswordRequest, CreateUserRequest, Role, SignInRequest,
    SignInResponse, SignUpRequest, UpdateUserStatusRequest, User, UserStatus,
};
use uuid::Uuid;

const BASE_PATH: &str = "/api/v1/users";

fn api_error_message(json_response: &Value) -> Option<&str> {
    json_response.get("error").and_then(Value::as_str)
}

/// Normalize a server URL into `scheme://host:port`.
/// # Errors
/// Returns an error if `url` cannot be parsed, has no host, or uses an
/// unsupported scheme.
pub fn server_url(url: &str) -> Result<String> {
    let url = Url::parse(url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| Error::validation("server URL has no host"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => {
                return Err(Error::validation(format!(
                    "unsupported scheme {scheme} in server URL"
                )))
            }
        },
    };

    let server_url = format!("{scheme}://{host}:{port}");

    debug!("server URL: {}", server_url);

    Ok(server_url)
}

/// Client for the user-management endpoints.
pub struct UsersApi {
    http: Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
}

impl UsersApi {
    /// # Errors
    /// Returns an error if the server URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(user_agent: &str, url: &str) -> Result<Self> {
        let http = Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            http,
            base_url: server_url(url)?,
            token: RwLock::new(None),
        })
    }

    /// Install the bearer token attached to subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token);
        }
    }

    /// Drop the stored credential.
    pub fn clear_token(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{BASE_PATH}{path}", self.base_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token.read().ok().and_then(|slot| slot.clone()) {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Authenticate with email and password, returning the issued token.
    /// # Errors
    /// Returns `Auth` when the credentials are rejected, `Transport` on
    /// network failure.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse> {
        let url = self.endpoint("/signin");
        let span = info_span!("users.sign_in", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .json(&SignInRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .instrument(span)
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// First-run bootstrap; the server only accepts it while no user exists
    /// and creates the initial ADMIN account.
    /// # Errors
    /// Returns an error if the server refuses or the request fails.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let url = self.endpoint("/signup");
        let span = info_span!("users.sign_up", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .json(&SignUpRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .instrument(span)
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Whether any account exists yet; drives the sign-in vs. first-run
    /// decision.
    /// # Errors
    /// Returns an error if the request fails or the response is malformed.
    pub async fn is_any_user_exist(&self) -> Result<bool> {
        let url = self.endpoint("/is-any-user-exist");
        let span = info_span!("users.is_any_user_exist", http.method = "GET", url = %url);
        let response = self.http.get(&url).send().instrument(span).await?;

        let json_response: Value = check(response).await?.json().await?;
        json_response
            .get("isExist")
            .and_then(Value::as_bool)
            .ok_or_else(|| Error::Status {
                status: 200,
                message: "response has no isExist field".to_string(),
            })
    }

    /// List every directory entry, in server-defined order. ADMIN only.
    /// # Errors
    /// Returns `Auth` on a rejected credential, `Transport` on network
    /// failure.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let url = self.endpoint("/admin/list");
        let span = info_span!("users.list", http.method = "GET", url = %url);
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .instrument(span)
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Provision a new account. ADMIN only.
    /// # Errors
    /// Returns `Validation` (before any network call) when email or password
    /// is empty, `Conflict` on a duplicate email.
    pub async fn create_user(&self, email: &str, password: &str, role: Role) -> Result<()> {
        if email.is_empty() || password.is_empty() {
            return Err(Error::validation("email and password are required"));
        }

        let url = self.endpoint("/admin/create-user");
        let span = info_span!("users.create", http.method = "POST", url = %url);
        let response = self
            .authorize(self.http.post(&url))
            .json(&CreateUserRequest {
                email: email.to_string(),
                password: password.to_string(),
                role,
            })
            .send()
            .instrument(span)
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Set an account's status, returning the updated entry. ADMIN only.
    /// # Errors
    /// Returns an error if the server refuses or the request fails.
    pub async fn update_user_status(&self, user_id: Uuid, status: UserStatus) -> Result<User> {
        let url = self.endpoint(&format!("/admin/{user_id}/status"));
        let span = info_span!("users.update_status", http.method = "PUT", url = %url);
        let response = self
            .authorize(self.http.put(&url))
            .json(&UpdateUserStatusRequest { status })
            .send()
            .instrument(span)
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Admin-initiated password reset; does not require the target's current
    /// password.
    /// # Errors
    /// Returns an error if the server refuses or the request fails.
    pub async fn change_user_password(&self, user_id: Uuid, new_password: &str) -> Result<()> {
        let url = self.endpoint(&format!("/admin/{user_id}/password"));
        let span = info_span!("users.change_password", http.method = "PUT", url = %url);
        let response = self
            .authorize(self.http.put(&url))
            .json(&ChangeUserPasswordRequest {
                new_password: new_password.to_string(),
            })
            .send()
            .instrument(span)
            .await?;

        check(response).await?;
        Ok(())
    }

    /// Identity behind the caller's own credential.
    /// # Errors
    /// Returns `Auth` when the credential is missing or expired.
    pub async fn get_current_user(&self) -> Result<User> {
        let url = self.endpoint("/me");
        let span = info_span!("users.me", http.method = "GET", url = %url);
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .instrument(span)
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Change the caller's own password; the server re-verifies the current
    /// one.
    /// # Errors
    /// Returns an error when the current password does not match the
    /// server-side record, or on transport failure.
    pub async fn change_my_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let url = self.endpoint("/me/password");
        let span = info_span!("users.change_my_password", http.method = "PUT", url = %url);
        let response = self
            .authorize(self.http.put(&url))
            .json(&ChangeMyPasswordRequest {
                current_password: current_password.to_string(),
                new_password: new_password.to_string(),
            })
            .send()
            .instrument(span)
            .await?;

        check(response).await?;
        Ok(())
    }
}

/// Map a non-2xx response to the error taxonomy, extracting the server's
/// `{"error": ...}` message when present.
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<Value>()
        .await
        .ok()
        .as_ref()
        .and_then(api_error_message)
        .map_or_else(|| "request failed".to_string(), ToString::to_string);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Auth(message)),
        StatusCode::CONFLICT => Err(Error::Conflict(message)),
        _ => Err(Error::Status {
            status: status.as_u16(),
            message,
        }),
    }
}
