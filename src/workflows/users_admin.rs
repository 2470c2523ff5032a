//! Administrator user-directory workflow: listing, provisioning,
//! block/unblock and password reset.
//!
//! The listing is a thin mirror of server state: every mutation is followed
//! by a full re-fetch, and a failed refresh never clears rows that were
//! already loaded.

use super::surface_error;
use crate::api::types::{Role, User, UserStatus};
use crate::api::UsersApi;
use crate::notify::Notifier;
use crate::session::SessionStore;
use std::sync::Arc;
use uuid::Uuid;

/// Listing view state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    LoadFailed,
}

/// Input captured by the creation panel while it is open.
#[derive(Debug, Default)]
pub struct CreateUserDraft {
    pub email: String,
    pub password: String,
}

pub struct UsersAdmin {
    api: Arc<UsersApi>,
    store: SessionStore,
    notifier: Arc<dyn Notifier>,
    state: LoadState,
    users: Vec<User>,
    draft: Option<CreateUserDraft>,
}

impl UsersAdmin {
    #[must_use]
    pub fn new(api: Arc<UsersApi>, store: SessionStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            store,
            notifier,
            state: LoadState::Idle,
            users: Vec::new(),
            draft: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// Rows as of the last successful refresh.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn open_create_panel(&mut self) {
        self.draft = Some(CreateUserDraft::default());
    }

    pub fn close_create_panel(&mut self) {
        self.draft = None;
    }

    #[must_use]
    pub fn draft_mut(&mut self) -> Option<&mut CreateUserDraft> {
        self.draft.as_mut()
    }

    /// Re-fetch the listing. On failure the previously loaded rows stay
    /// visible and the error goes to the notifier.
    pub async fn refresh(&mut self) {
        self.state = LoadState::Loading;
        match self.api.list_users().await {
            Ok(users) => {
                self.users = users;
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                self.state = LoadState::LoadFailed;
                surface_error(&self.store, self.notifier.as_ref(), &err);
            }
        }
    }

    /// Submit the creation draft. Administrators may only provision
    /// MANAGER accounts through this path.
    pub async fn create_user(&mut self) {
        let Some(draft) = &self.draft else {
            return;
        };
        if draft.email.is_empty() || draft.password.is_empty() {
            self.notifier.error("Email and password are required");
            return;
        }

        match self
            .api
            .create_user(&draft.email, &draft.password, Role::Manager)
            .await
        {
            Ok(()) => {
                self.draft = None;
                self.refresh().await;
                self.notifier.success("User created successfully");
            }
            Err(err) => surface_error(&self.store, self.notifier.as_ref(), &err),
        }
    }

    /// Flip ACTIVE and BLOCKED for one row. The target status is computed
    /// from that row's current status, so concurrent toggles on different
    /// rows never interfere.
    pub async fn toggle_status(&mut self, user_id: Uuid) {
        let Some(row) = self.users.iter().find(|user| user.id == user_id) else {
            self.notifier.error("User is no longer in the list");
            return;
        };
        let new_status = row.status.toggled();

        match self.api.update_user_status(user_id, new_status).await {
            Ok(_) => {
                self.refresh().await;
                self.notifier.success(match new_status {
                    UserStatus::Active => "User unblocked successfully",
                    UserStatus::Blocked => "User blocked successfully",
                });
            }
            Err(err) => surface_error(&self.store, self.notifier.as_ref(), &err),
        }
    }

    /// Submit an admin-initiated reset with the credential captured
    /// out-of-band. An empty capture means the prompt was dismissed. Only a
    /// confirmation is shown on success; the target's live session is a
    /// server-side concern.
    pub async fn reset_password(&mut self, user_id: Uuid, new_password: &str) {
        if new_password.is_empty() {
            return;
        }

        match self.api.change_user_password(user_id, new_password).await {
            Ok(()) => self.notifier.success("Password changed successfully"),
            Err(err) => surface_error(&self.store, self.notifier.as_ref(), &err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use anyhow::Result;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_AGENT: &str = "respaldo-console-test/0.1";

    const ALICE: &str = "11111111-1111-4111-8111-111111111111";
    const BOB: &str = "22222222-2222-4222-8222-222222222222";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn listing() -> serde_json::Value {
        json!([
            {
                "id": ALICE,
                "email": "alice@example.com",
                "role": "MANAGER",
                "status": "ACTIVE",
                "createdAt": "2025-04-01T12:00:00Z"
            },
            {
                "id": BOB,
                "email": "bob@example.com",
                "role": "MANAGER",
                "status": "BLOCKED",
                "createdAt": "2025-04-02T12:00:00Z"
            }
        ])
    }

    struct Fixture {
        workflow: UsersAdmin,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture(server: &MockServer) -> Result<Fixture> {
        let api = Arc::new(UsersApi::new(USER_AGENT, &server.uri())?);
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = UsersAdmin::new(
            api,
            SessionStore::new(),
            Arc::clone(&notifier) as Arc<dyn Notifier>,
        );
        Ok(Fixture { workflow, notifier })
    }

    #[tokio::test]
    async fn refresh_loads_the_listing() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/users/admin/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .mount(&server)
            .await;

        let Fixture {
            mut workflow,
            notifier,
        } = fixture(&server)?;
        assert_eq!(workflow.state(), LoadState::Idle);

        workflow.refresh().await;
        assert_eq!(workflow.state(), LoadState::Loaded);
        assert_eq!(workflow.users().len(), 2);
        assert!(notifier.errors().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previously_loaded_rows() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/users/admin/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount(&server)
            .await;

        let Fixture {
            mut workflow,
            notifier,
        } = fixture(&server)?;
        workflow.refresh().await;
        assert_eq!(workflow.users().len(), 2);

        server.reset().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/admin/list"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "database unavailable"
            })))
            .mount(&server)
            .await;

        workflow.refresh().await;
        assert_eq!(workflow.state(), LoadState::LoadFailed);
        assert_eq!(workflow.users().len(), 2);
        assert!(notifier.errors().iter().any(|m| m.contains("database")));
        Ok(())
    }

    #[tokio::test]
    async fn create_with_empty_email_never_issues_a_request() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/users/admin/create-user"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let Fixture {
            mut workflow,
            notifier,
        } = fixture(&server)?;
        workflow.open_create_panel();
        if let Some(draft) = workflow.draft_mut() {
            draft.password = "x".to_string();
        }

        workflow.create_user().await;
        assert_eq!(
            notifier.errors(),
            vec!["Email and password are required".to_string()]
        );
        // The panel stays open for a retry.
        assert!(workflow.draft_mut().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn create_always_provisions_a_manager_and_refreshes() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/users/admin/create-user"))
            .and(body_json(json!({
                "email": "carol@example.com",
                "password": "secret-pass",
                "role": "MANAGER"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/users/admin/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(1)
            .mount(&server)
            .await;

        let Fixture {
            mut workflow,
            notifier,
        } = fixture(&server)?;
        workflow.open_create_panel();
        if let Some(draft) = workflow.draft_mut() {
            draft.email = "carol@example.com".to_string();
            draft.password = "secret-pass".to_string();
        }

        workflow.create_user().await;
        // Draft cleared, panel dismissed, listing refreshed.
        assert!(workflow.draft_mut().is_none());
        assert_eq!(workflow.state(), LoadState::Loaded);
        assert_eq!(
            notifier.successes(),
            vec!["User created successfully".to_string()]
        );
        Ok(())
    }

    #[tokio::test]
    async fn toggles_are_computed_per_row() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/users/admin/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .mount(&server)
            .await;
        // Alice is ACTIVE, so her toggle must request BLOCKED.
        Mock::given(method("PUT"))
            .and(path(format!("/api/v1/users/admin/{ALICE}/status")))
            .and(body_json(json!({"status": "BLOCKED"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": ALICE,
                "email": "alice@example.com",
                "role": "MANAGER",
                "status": "BLOCKED",
                "createdAt": "2025-04-01T12:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        // Bob is BLOCKED, so his toggle must request ACTIVE.
        Mock::given(method("PUT"))
            .and(path(format!("/api/v1/users/admin/{BOB}/status")))
            .and(body_json(json!({"status": "ACTIVE"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": BOB,
                "email": "bob@example.com",
                "role": "MANAGER",
                "status": "ACTIVE",
                "createdAt": "2025-04-02T12:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let Fixture {
            mut workflow,
            notifier,
        } = fixture(&server)?;
        workflow.refresh().await;

        workflow.toggle_status(ALICE.parse()?).await;
        workflow.toggle_status(BOB.parse()?).await;

        assert_eq!(
            notifier.successes(),
            vec![
                "User blocked successfully".to_string(),
                "User unblocked successfully".to_string()
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn reset_password_shows_only_a_confirmation() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(format!("/api/v1/users/admin/{ALICE}/password")))
            .and(body_json(json!({"newPassword": "fresh-pass"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        // No refresh after a reset; nothing about the listing changed.
        Mock::given(method("GET"))
            .and(path("/api/v1/users/admin/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing()))
            .expect(0)
            .mount(&server)
            .await;

        let Fixture {
            mut workflow,
            notifier,
        } = fixture(&server)?;
        workflow.reset_password(ALICE.parse()?, "fresh-pass").await;
        workflow.reset_password(ALICE.parse()?, "").await;

        assert_eq!(
            notifier.successes(),
            vec!["Password changed successfully".to_string()]
        );
        Ok(())
    }
}
